use errors::{Result, TagError};
use frame::Version;
use text::{self, TextEncoding};
use util;

pub const MIME_JPEG: &'static str = "image/jpeg";
pub const MIME_PNG: &'static str = "image/png";

///
/// # Picture Type
///
/// See: PIC, APIC
///
/// [See](http://id3.org/id3v2.3.0#Attached_picture)
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PictureType {
    Other,
    FileIcon,
    OtherFileIcon,
    CoverFront,
    CoverBack,
    LeafletPage,
    Media,
    LeadArtist,
    Artist,
    Conductor,
    Band,
    Composer,
    Lyricist,
    RecordingLocation,
    DuringRecording,
    DuringPerformance,
    MovieScreenCapture,
    BrightColouredFish,
    Illustration,
    BandLogotype,
    PublisherLogoType,
}

impl PictureType {
    pub fn from_byte(t: u8) -> PictureType {
        match t {
            0x01 => PictureType::FileIcon,
            0x02 => PictureType::OtherFileIcon,
            0x03 => PictureType::CoverFront,
            0x04 => PictureType::CoverBack,
            0x05 => PictureType::LeafletPage,
            0x06 => PictureType::Media,
            0x07 => PictureType::LeadArtist,
            0x08 => PictureType::Artist,
            0x09 => PictureType::Conductor,
            0x0a => PictureType::Band,
            0x0b => PictureType::Composer,
            0x0c => PictureType::Lyricist,
            0x0d => PictureType::RecordingLocation,
            0x0e => PictureType::DuringRecording,
            0x0f => PictureType::DuringPerformance,
            0x10 => PictureType::MovieScreenCapture,
            0x11 => PictureType::BrightColouredFish,
            0x12 => PictureType::Illustration,
            0x13 => PictureType::BandLogotype,
            0x14 => PictureType::PublisherLogoType,
            _ => PictureType::Other
        }
    }

    pub fn to_byte(&self) -> u8 {
        *self as u8
    }
}

///
/// # Attached picture
///
/// - [V2.2](http://id3.org/id3v2-00) > 4.15. Attached picture
/// - [V2.3](http://id3.org/id3v2.3.0#Attached_picture)
///
/// Built from the `PIC`/`APIC` value on every access; the value stays the
/// only stored copy.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttachedPicture {
    pub mime: String,
    pub picture_type: u8,
    pub description: String,
    pub data: Vec<u8>,
}

impl AttachedPicture {
    pub fn new(mime: &str, picture_type: PictureType, description: &str, data: Vec<u8>) -> Self {
        AttachedPicture {
            mime: mime.to_string(),
            picture_type: picture_type.to_byte(),
            description: description.to_string(),
            data: data,
        }
    }

    pub fn kind(&self) -> PictureType {
        PictureType::from_byte(self.picture_type)
    }

    pub fn from_bytes(raw: &[u8], version: Version) -> Result<Self> {
        if raw.is_empty() {
            return Err(TagError::IncorrectTagShape("empty picture frame"));
        }
        let text_encoding = TextEncoding::from_byte(raw[0])?;

        let (mime, rest) = match version {
            Version::V22 => {
                if raw.len() < 5 {
                    return Err(TagError::IncorrectTagShape("picture frame too short"));
                }
                (mime_of_format(&raw[1..4]), &raw[4..])
            }
            _ => match util::split_terminated(&raw[1..], 1) {
                Some((mime, rest)) if !rest.is_empty() => {
                    (String::from_utf8_lossy(mime).into_owned(), rest)
                }
                _ => return Err(TagError::IncorrectTagShape("picture mime is not terminated"))
            }
        };

        let picture_type = rest[0];
        let (description, data) =
            match util::split_terminated(&rest[1..], text_encoding.terminator_width()) {
                Some(parts) => parts,
                None => return Err(TagError::IncorrectTagShape("picture description is not terminated"))
            };

        Ok(AttachedPicture {
            mime: mime,
            picture_type: picture_type,
            description: text::decode(description, text_encoding)?,
            data: data.to_vec(),
        })
    }

    /// Always written with encoding byte 0 and a single zero after the
    /// description.
    pub fn to_bytes(&self, version: Version) -> Result<Vec<u8>> {
        let mut raw = vec![TextEncoding::ISO88591.to_byte()];
        match version {
            Version::V22 => raw.extend_from_slice(format_of_mime(&self.mime)?.as_bytes()),
            _ => {
                raw.extend_from_slice(self.mime.as_bytes());
                raw.push(0x00);
            }
        }
        raw.push(self.picture_type);
        raw.extend_from_slice(self.description.as_bytes());
        raw.push(0x00);
        raw.extend_from_slice(&self.data);

        Ok(raw)
    }
}

fn mime_of_format(format: &[u8]) -> String {
    match format {
        b"JPG" => MIME_JPEG.to_string(),
        b"PNG" => MIME_PNG.to_string(),
        _ => format!("image/{}", String::from_utf8_lossy(format).to_lowercase())
    }
}

fn format_of_mime(mime: &str) -> Result<String> {
    match mime {
        MIME_JPEG => Ok("JPG".to_string()),
        MIME_PNG => Ok("PNG".to_string()),
        _ => match mime.find('/') {
            Some(i) if mime[i + 1..].len() == 3 && mime[i + 1..].is_ascii() => {
                Ok(mime[i + 1..].to_uppercase())
            }
            _ => Err(TagError::IncorrectTagShape("no 2.2 image format for mime"))
        }
    }
}

/// Turns picture bytes into images and back, for callers that want decoded
/// pictures rather than raw bytes.
pub trait ImageCodec {
    type Image;

    /// Decodes `data` of the given MIME type; JPEG and PNG are expected.
    fn decode(&self, mime: &str, data: &[u8]) -> Result<Self::Image>;

    fn encode_png(&self, image: &Self::Image) -> Result<Vec<u8>>;
}
