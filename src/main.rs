extern crate id3codec;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;

use std::collections::BTreeMap;
use std::env;
use std::process;

use id3codec::{read_file, Field, FieldValue, FrameStore, Metadata, TagError, Version};

#[derive(Serialize)]
struct PictureSummary {
    mime: String,
    picture_type: u8,
    description: String,
    size: usize,
}

#[derive(Serialize)]
struct Dump {
    path: String,
    version: Version,
    frames: Vec<String>,
    fields: BTreeMap<Field, serde_json::Value>,
    errors: BTreeMap<Field, String>,
}

fn dump(path: &str) -> Result<Dump, TagError> {
    let tag = read_file(path)?;
    let mut fields = BTreeMap::new();
    let mut errors = BTreeMap::new();

    for field in Field::ALL.iter() {
        let value = match tag.field(*field) {
            Ok(FieldValue::Picture(picture)) => serde_json::to_value(PictureSummary {
                mime: picture.mime,
                picture_type: picture.picture_type,
                description: picture.description,
                size: picture.data.len(),
            }),
            Ok(value) => serde_json::to_value(value),
            Err(TagError::TagNotFound(_)) | Err(TagError::UnsupportedField(..)) => continue,
            Err(e) => {
                errors.insert(*field, e.to_string());
                continue;
            }
        };
        match value {
            Ok(value) => {
                fields.insert(*field, value);
            }
            Err(e) => {
                errors.insert(*field, e.to_string());
            }
        }
    }

    Ok(Dump {
        path: path.to_string(),
        version: tag.version(),
        frames: tag.frame_names(),
        fields: fields,
        errors: errors,
    })
}

fn main() {
    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: id3codec <file>...");
        process::exit(2);
    }

    let mut failed = false;
    for path in paths.iter() {
        match dump(path) {
            Ok(dump) => match serde_json::to_string_pretty(&dump) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("{}: {}", path, e);
                    failed = true;
                }
            },
            Err(e) => {
                eprintln!("{}: {}", path, e);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
