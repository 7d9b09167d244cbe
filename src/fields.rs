use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use errors::{Result, TagError};
use frame::Version;
use genre;
use picture::{self, AttachedPicture, ImageCodec, PictureType};
use tag::{self, FrameStore};
use text::{self, TextEncoding};
use util;

static GENRE_CODE: OnceLock<Regex> = OnceLock::new();

const CATALOG_NUMBER: &'static str = "CATALOGNUMBER";
const COMMENT_LANGUAGE: &'static [u8; 3] = b"eng";

/// Named values a tag can carry, whatever the version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Title,
    Artist,
    Album,
    Year,
    Comment,
    Genre,
    AlbumArtist,
    Date,
    Arranger,
    Author,
    Bpm,
    CatalogNumber,
    Compilation,
    Composer,
    Conductor,
    Copyright,
    Description,
    DiscNumber,
    EncodedBy,
    TrackNumber,
    Picture,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::Title, Field::Artist, Field::Album, Field::Year, Field::Comment, Field::Genre,
        Field::AlbumArtist, Field::Date, Field::Arranger, Field::Author, Field::Bpm,
        Field::CatalogNumber, Field::Compilation, Field::Composer, Field::Conductor,
        Field::Copyright, Field::Description, Field::DiscNumber, Field::EncodedBy,
        Field::TrackNumber, Field::Picture,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How a field's value is laid out in its frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Text,
    Integer,
    /// `N` or `N/M`
    SplitNumber,
    /// `(NN)` genre codes; `free_text` allows plain names (2.4).
    Genre { free_text: bool },
    Comment,
    Picture,
    /// User-defined text frame, `key` is the description.
    UserText,
    /// Year frame plus a `DDMM` frame (2.2/2.3 dates).
    YearAndDay { day_key: &'static str },
    /// ISO 8601 timestamp, date part.
    Timestamp,
    /// ISO 8601 timestamp, year part.
    TimestampYear,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldMapping {
    pub field: Field,
    pub key: &'static str,
    pub shape: Shape,
    pub supported: bool,
}

const fn mapped(field: Field, key: &'static str, shape: Shape) -> FieldMapping {
    FieldMapping { field: field, key: key, shape: shape, supported: true }
}

const fn unsupported(field: Field) -> FieldMapping {
    FieldMapping { field: field, key: "", shape: Shape::Text, supported: false }
}

// Ordered as `Field::ALL`.
static V22_FIELDS: [FieldMapping; 21] = [
    mapped(Field::Title, "TT2", Shape::Text),
    mapped(Field::Artist, "TP1", Shape::Text),
    mapped(Field::Album, "TAL", Shape::Text),
    mapped(Field::Year, "TYE", Shape::Integer),
    mapped(Field::Comment, "COM", Shape::Comment),
    mapped(Field::Genre, "TCO", Shape::Genre { free_text: false }),
    unsupported(Field::AlbumArtist),
    mapped(Field::Date, "TYE", Shape::YearAndDay { day_key: "TDA" }),
    mapped(Field::Arranger, "TP4", Shape::Text),
    mapped(Field::Author, "TOL", Shape::Text),
    mapped(Field::Bpm, "TBP", Shape::Integer),
    mapped(Field::CatalogNumber, CATALOG_NUMBER, Shape::UserText),
    unsupported(Field::Compilation),
    mapped(Field::Composer, "TCM", Shape::Text),
    mapped(Field::Conductor, "TP3", Shape::Text),
    mapped(Field::Copyright, "TCR", Shape::Text),
    mapped(Field::Description, "TT3", Shape::Text),
    mapped(Field::DiscNumber, "TPA", Shape::SplitNumber),
    mapped(Field::EncodedBy, "TEN", Shape::Text),
    mapped(Field::TrackNumber, "TRK", Shape::SplitNumber),
    mapped(Field::Picture, "PIC", Shape::Picture),
];

static V23_FIELDS: [FieldMapping; 21] = [
    mapped(Field::Title, "TIT2", Shape::Text),
    mapped(Field::Artist, "TPE1", Shape::Text),
    mapped(Field::Album, "TALB", Shape::Text),
    mapped(Field::Year, "TYER", Shape::Integer),
    mapped(Field::Comment, "COMM", Shape::Comment),
    mapped(Field::Genre, "TCON", Shape::Genre { free_text: false }),
    mapped(Field::AlbumArtist, "TPE2", Shape::Text),
    mapped(Field::Date, "TYER", Shape::YearAndDay { day_key: "TDAT" }),
    mapped(Field::Arranger, "TPE4", Shape::Text),
    mapped(Field::Author, "TOLY", Shape::Text),
    mapped(Field::Bpm, "TBPM", Shape::Integer),
    mapped(Field::CatalogNumber, CATALOG_NUMBER, Shape::UserText),
    mapped(Field::Compilation, "TCMP", Shape::Text),
    mapped(Field::Composer, "TCOM", Shape::Text),
    mapped(Field::Conductor, "TPE3", Shape::Text),
    mapped(Field::Copyright, "TCOP", Shape::Text),
    mapped(Field::Description, "TIT3", Shape::Text),
    mapped(Field::DiscNumber, "TPOS", Shape::SplitNumber),
    mapped(Field::EncodedBy, "TENC", Shape::Text),
    mapped(Field::TrackNumber, "TRCK", Shape::SplitNumber),
    mapped(Field::Picture, "APIC", Shape::Picture),
];

static V24_FIELDS: [FieldMapping; 21] = [
    mapped(Field::Title, "TIT2", Shape::Text),
    mapped(Field::Artist, "TPE1", Shape::Text),
    mapped(Field::Album, "TALB", Shape::Text),
    mapped(Field::Year, "TDRC", Shape::TimestampYear),
    mapped(Field::Comment, "COMM", Shape::Comment),
    mapped(Field::Genre, "TCON", Shape::Genre { free_text: true }),
    mapped(Field::AlbumArtist, "TPE2", Shape::Text),
    mapped(Field::Date, "TDRC", Shape::Timestamp),
    mapped(Field::Arranger, "TPE4", Shape::Text),
    mapped(Field::Author, "TOLY", Shape::Text),
    mapped(Field::Bpm, "TBPM", Shape::Integer),
    mapped(Field::CatalogNumber, CATALOG_NUMBER, Shape::UserText),
    mapped(Field::Compilation, "TCMP", Shape::Text),
    mapped(Field::Composer, "TCOM", Shape::Text),
    mapped(Field::Conductor, "TPE3", Shape::Text),
    mapped(Field::Copyright, "TCOP", Shape::Text),
    mapped(Field::Description, "TIT3", Shape::Text),
    mapped(Field::DiscNumber, "TPOS", Shape::SplitNumber),
    mapped(Field::EncodedBy, "TENC", Shape::Text),
    mapped(Field::TrackNumber, "TRCK", Shape::SplitNumber),
    mapped(Field::Picture, "APIC", Shape::Picture),
];

pub fn field_table(version: Version) -> &'static [FieldMapping] {
    match version {
        Version::V22 => &V22_FIELDS,
        Version::V23 => &V23_FIELDS,
        Version::V24 => &V24_FIELDS,
    }
}

/// Fails with `UnsupportedField` when the version has no frame for `field`.
pub fn mapping(version: Version, field: Field) -> Result<&'static FieldMapping> {
    match field_table(version).iter().find(|m| m.field == field) {
        Some(m) if m.supported => Ok(m),
        _ => Err(TagError::UnsupportedField(field, version))
    }
}

/// Whether `key` is a frame some field of `version` reads or writes.
pub fn is_known_key(version: Version, key: &str) -> bool {
    field_table(version).iter().any(|m| {
        m.supported && match m.shape {
            Shape::UserText => false,
            Shape::YearAndDay { day_key } => m.key == key || day_key == key,
            _ => m.key == key
        }
    })
}

/// Typed value of any field, as `Metadata::field` returns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(u32),
    Pair(u32, u32),
    Date(NaiveDate),
    Picture(AttachedPicture),
}

/// `"N"` is `(N, N)`, `"N/M"` is `(N, M)`.
pub fn parse_split_number(text: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() > 2 {
        return Err(TagError::IncorrectLength);
    }
    let number = parts[0].parse::<u32>()?;
    if parts.len() == 1 {
        return Ok((number, number));
    }

    Ok((number, parts[1].parse::<u32>()?))
}

/// A code the table does not know reads as free text: the literal value on
/// 2.4, an empty string where free text is unsupported.
fn resolve_genre(text: &str, free_text: bool) -> Result<String> {
    let re = GENRE_CODE.get_or_init(|| Regex::new(r"\((\d+)\)").expect("genre code pattern"));
    let code = match re.captures(text) {
        Some(caps) => caps[1].parse::<u32>().ok(),
        None if free_text && !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            text.parse::<u32>().ok()
        }
        None => None
    };
    if let Some(name) = code.and_then(genre::name_of) {
        return Ok(name.to_string());
    }
    if !free_text {
        debug!("free text genre '{}' ignored", text);
        return Ok(String::new());
    }

    Ok(text.to_string())
}

fn trim_nul(text: String) -> String {
    text.trim_end_matches('\u{0}').to_string()
}

fn decode_comment(raw: &[u8]) -> Result<String> {
    if raw.len() < 4 {
        return Err(TagError::IncorrectLength);
    }
    let text_encoding = TextEncoding::from_byte(raw[0])?;
    match util::split_terminated(&raw[4..], text_encoding.terminator_width()) {
        Some((_, comment)) => Ok(trim_nul(text::decode(comment, text_encoding)?)),
        None => Err(TagError::IncorrectTagShape("comment without description terminator"))
    }
}

fn encode_comment(comment: &str) -> Vec<u8> {
    let mut raw = vec![TextEncoding::ISO88591.to_byte()];
    raw.extend_from_slice(COMMENT_LANGUAGE);
    raw.push(0x00);
    raw.extend_from_slice(comment.as_bytes());
    raw
}

fn parse_year_and_day(year: &str, day_month: &str) -> Result<NaiveDate> {
    if day_month.len() != 4 || !day_month.is_ascii() {
        return Err(TagError::IncorrectLength);
    }
    let year = year.parse::<i32>()?;
    let day = day_month[0..2].parse::<u32>()?;
    let month = day_month[2..4].parse::<u32>()?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(TagError::IncorrectTagShape("invalid date"))
}

fn parse_timestamp(timestamp: &str) -> Result<NaiveDate> {
    let date: String = timestamp.chars().take(10).collect();
    NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
        debug!("timestamp '{}': {}", timestamp, e);
        TagError::IncorrectTagShape("invalid date")
    })
}

fn mismatch(field: Field) -> TagError {
    debug!("value does not fit {}", field);
    TagError::IncorrectTagShape("value does not match the field")
}

///
/// # Field accessors
///
/// Every method goes through the version's field table: a field the version
/// has no frame for fails with `UnsupportedField` on get, set and delete, a
/// missing frame with `TagNotFound`. Deleting a missing frame succeeds.
///
/// Setters write encoding byte 0 followed by UTF-8, so re-saving a UTF-16
/// value changes its stored encoding.
///
pub trait Metadata: FrameStore {
    fn field(&self, field: Field) -> Result<FieldValue> {
        let m = mapping(self.version(), field)?;
        let value = match m.shape {
            Shape::Text => FieldValue::Text(self.text(m.key)?),
            Shape::Integer => FieldValue::Number(self.text(m.key)?.parse::<u32>()?),
            Shape::SplitNumber => {
                let (number, total) = parse_split_number(&self.text(m.key)?)?;
                FieldValue::Pair(number, total)
            }
            Shape::Genre { free_text } => {
                FieldValue::Text(resolve_genre(&self.text(m.key)?, free_text)?)
            }
            Shape::Comment => FieldValue::Text(decode_comment(self.bytes(m.key)?)?),
            Shape::Picture => {
                FieldValue::Picture(AttachedPicture::from_bytes(self.bytes(m.key)?, self.version())?)
            }
            Shape::UserText => FieldValue::Text(self.user_text(m.key)?),
            Shape::YearAndDay { day_key } => {
                let year = self.text(m.key)?;
                let day_month = self.text(day_key)?;
                FieldValue::Date(parse_year_and_day(&year, &day_month)?)
            }
            Shape::Timestamp => FieldValue::Date(parse_timestamp(&self.text(m.key)?)?),
            Shape::TimestampYear => {
                let year: String = self.text(m.key)?.chars().take(4).collect();
                FieldValue::Number(year.parse::<u32>()?)
            }
        };

        Ok(value)
    }

    fn set_field(&mut self, field: Field, value: FieldValue) -> Result<()> {
        let m = mapping(self.version(), field)?;
        debug!("set {} ({})", field, m.key);
        match (m.shape, value) {
            (Shape::Text, FieldValue::Text(text)) => self.set_text(m.key, &text),
            (Shape::Integer, FieldValue::Number(n)) => self.set_text(m.key, &n.to_string()),
            (Shape::SplitNumber, FieldValue::Pair(number, total)) => {
                self.set_text(m.key, &format!("{}/{}", number, total))
            }
            (Shape::Genre { free_text }, FieldValue::Text(name)) => {
                if free_text {
                    return self.set_text(m.key, &name);
                }
                match genre::code_of(&name) {
                    Some(code) => self.set_text(m.key, &format!("({})", code)),
                    None => Err(TagError::UnknownGenre(name))
                }
            }
            (Shape::Comment, FieldValue::Text(comment)) => {
                self.put_frame(m.key, encode_comment(&comment))
            }
            (Shape::Picture, FieldValue::Picture(picture)) => {
                let raw = picture.to_bytes(self.version())?;
                self.put_frame(m.key, raw)
            }
            (Shape::UserText, FieldValue::Text(text)) => {
                self.set_user_text(m.key, &text);
                Ok(())
            }
            (Shape::YearAndDay { day_key }, FieldValue::Date(date)) => {
                let day_month = format!("{:02}{:02}", date.day(), date.month());
                self.set_text(m.key, &format!("{:04}", date.year()))?;
                self.set_text(day_key, &day_month)
            }
            (Shape::Timestamp, FieldValue::Date(date)) => {
                self.set_text(m.key, &date.format("%Y-%m-%d").to_string())
            }
            (Shape::TimestampYear, FieldValue::Number(year)) => {
                let year = format!("{:04}", year);
                let timestamp = match self.text(m.key) {
                    Ok(ref current) if current.len() > 4 && current.is_char_boundary(4) => {
                        format!("{}{}", year, &current[4..])
                    }
                    _ => year
                };
                self.set_text(m.key, &timestamp)
            }
            _ => Err(mismatch(field))
        }
    }

    fn delete_field(&mut self, field: Field) -> Result<()> {
        let m = mapping(self.version(), field)?;
        match m.shape {
            Shape::UserText => {
                self.remove_user_frame(m.key);
            }
            Shape::YearAndDay { day_key } => {
                self.remove_frame(m.key);
                self.remove_frame(day_key);
            }
            _ => {
                self.remove_frame(m.key);
            }
        }

        Ok(())
    }

    /// Raw value of the frame `key`.
    fn bytes(&self, key: &str) -> Result<&[u8]> {
        self.frame_value(key).ok_or_else(|| TagError::TagNotFound(key.to_string()))
    }

    /// Decoded text frame `key`.
    fn text(&self, key: &str) -> Result<String> {
        text::decode_frame(self.bytes(key)?)
    }

    fn set_text(&mut self, key: &str, value: &str) -> Result<()> {
        self.put_frame(key, text::encode_frame(value))
    }

    fn delete_frame(&mut self, key: &str) -> Result<()> {
        if !self.remove_frame(key) {
            trace!("{} was not present", key);
        }

        Ok(())
    }

    fn delete_all(&mut self) -> Result<()> {
        self.clear_frames();

        Ok(())
    }

    fn user_text(&self, description: &str) -> Result<String> {
        let raw = self.user_frame_value(description)
                      .ok_or_else(|| TagError::TagNotFound(description.to_string()))?;
        let (_, value) = tag::split_user_value(raw)?;

        Ok(trim_nul(text::decode(value, TextEncoding::from_byte(raw[0])?)?))
    }

    fn user_int(&self, description: &str) -> Result<u32> {
        Ok(self.user_text(description)?.parse::<u32>()?)
    }

    fn set_user_text(&mut self, description: &str, value: &str) {
        self.put_user_frame(description, tag::encode_user_value(description, value));
    }

    fn delete_user_text(&mut self, description: &str) -> Result<()> {
        self.remove_user_frame(description);

        Ok(())
    }

    fn title(&self) -> Result<String> {
        self.text_of(Field::Title)
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.set_field(Field::Title, FieldValue::Text(title.to_string()))
    }

    fn delete_title(&mut self) -> Result<()> {
        self.delete_field(Field::Title)
    }

    fn artist(&self) -> Result<String> {
        self.text_of(Field::Artist)
    }

    fn set_artist(&mut self, artist: &str) -> Result<()> {
        self.set_field(Field::Artist, FieldValue::Text(artist.to_string()))
    }

    fn delete_artist(&mut self) -> Result<()> {
        self.delete_field(Field::Artist)
    }

    fn album(&self) -> Result<String> {
        self.text_of(Field::Album)
    }

    fn set_album(&mut self, album: &str) -> Result<()> {
        self.set_field(Field::Album, FieldValue::Text(album.to_string()))
    }

    fn delete_album(&mut self) -> Result<()> {
        self.delete_field(Field::Album)
    }

    fn year(&self) -> Result<u32> {
        self.number_of(Field::Year)
    }

    fn set_year(&mut self, year: u32) -> Result<()> {
        self.set_field(Field::Year, FieldValue::Number(year))
    }

    fn delete_year(&mut self) -> Result<()> {
        self.delete_field(Field::Year)
    }

    fn comment(&self) -> Result<String> {
        self.text_of(Field::Comment)
    }

    fn set_comment(&mut self, comment: &str) -> Result<()> {
        self.set_field(Field::Comment, FieldValue::Text(comment.to_string()))
    }

    fn delete_comment(&mut self) -> Result<()> {
        self.delete_field(Field::Comment)
    }

    /// Genre name. Codes like `(20)` resolve through the genre table.
    fn genre(&self) -> Result<String> {
        self.text_of(Field::Genre)
    }

    fn set_genre(&mut self, genre: &str) -> Result<()> {
        self.set_field(Field::Genre, FieldValue::Text(genre.to_string()))
    }

    fn delete_genre(&mut self) -> Result<()> {
        self.delete_field(Field::Genre)
    }

    fn album_artist(&self) -> Result<String> {
        self.text_of(Field::AlbumArtist)
    }

    fn set_album_artist(&mut self, album_artist: &str) -> Result<()> {
        self.set_field(Field::AlbumArtist, FieldValue::Text(album_artist.to_string()))
    }

    fn delete_album_artist(&mut self) -> Result<()> {
        self.delete_field(Field::AlbumArtist)
    }

    fn date(&self) -> Result<NaiveDate> {
        match self.field(Field::Date)? {
            FieldValue::Date(date) => Ok(date),
            _ => Err(mismatch(Field::Date))
        }
    }

    fn set_date(&mut self, date: NaiveDate) -> Result<()> {
        self.set_field(Field::Date, FieldValue::Date(date))
    }

    fn delete_date(&mut self) -> Result<()> {
        self.delete_field(Field::Date)
    }

    fn arranger(&self) -> Result<String> {
        self.text_of(Field::Arranger)
    }

    fn set_arranger(&mut self, arranger: &str) -> Result<()> {
        self.set_field(Field::Arranger, FieldValue::Text(arranger.to_string()))
    }

    fn delete_arranger(&mut self) -> Result<()> {
        self.delete_field(Field::Arranger)
    }

    fn author(&self) -> Result<String> {
        self.text_of(Field::Author)
    }

    fn set_author(&mut self, author: &str) -> Result<()> {
        self.set_field(Field::Author, FieldValue::Text(author.to_string()))
    }

    fn delete_author(&mut self) -> Result<()> {
        self.delete_field(Field::Author)
    }

    fn bpm(&self) -> Result<u32> {
        self.number_of(Field::Bpm)
    }

    fn set_bpm(&mut self, bpm: u32) -> Result<()> {
        self.set_field(Field::Bpm, FieldValue::Number(bpm))
    }

    fn delete_bpm(&mut self) -> Result<()> {
        self.delete_field(Field::Bpm)
    }

    fn catalog_number(&self) -> Result<String> {
        self.text_of(Field::CatalogNumber)
    }

    fn set_catalog_number(&mut self, catalog_number: &str) -> Result<()> {
        self.set_field(Field::CatalogNumber, FieldValue::Text(catalog_number.to_string()))
    }

    fn delete_catalog_number(&mut self) -> Result<()> {
        self.delete_field(Field::CatalogNumber)
    }

    fn compilation(&self) -> Result<String> {
        self.text_of(Field::Compilation)
    }

    fn set_compilation(&mut self, compilation: &str) -> Result<()> {
        self.set_field(Field::Compilation, FieldValue::Text(compilation.to_string()))
    }

    fn delete_compilation(&mut self) -> Result<()> {
        self.delete_field(Field::Compilation)
    }

    fn composer(&self) -> Result<String> {
        self.text_of(Field::Composer)
    }

    fn set_composer(&mut self, composer: &str) -> Result<()> {
        self.set_field(Field::Composer, FieldValue::Text(composer.to_string()))
    }

    fn delete_composer(&mut self) -> Result<()> {
        self.delete_field(Field::Composer)
    }

    fn conductor(&self) -> Result<String> {
        self.text_of(Field::Conductor)
    }

    fn set_conductor(&mut self, conductor: &str) -> Result<()> {
        self.set_field(Field::Conductor, FieldValue::Text(conductor.to_string()))
    }

    fn delete_conductor(&mut self) -> Result<()> {
        self.delete_field(Field::Conductor)
    }

    fn copyright(&self) -> Result<String> {
        self.text_of(Field::Copyright)
    }

    fn set_copyright(&mut self, copyright: &str) -> Result<()> {
        self.set_field(Field::Copyright, FieldValue::Text(copyright.to_string()))
    }

    fn delete_copyright(&mut self) -> Result<()> {
        self.delete_field(Field::Copyright)
    }

    fn description(&self) -> Result<String> {
        self.text_of(Field::Description)
    }

    fn set_description(&mut self, description: &str) -> Result<()> {
        self.set_field(Field::Description, FieldValue::Text(description.to_string()))
    }

    fn delete_description(&mut self) -> Result<()> {
        self.delete_field(Field::Description)
    }

    /// `(disc, total discs)`
    fn disc_number(&self) -> Result<(u32, u32)> {
        self.pair_of(Field::DiscNumber)
    }

    fn set_disc_number(&mut self, number: u32, total: u32) -> Result<()> {
        self.set_field(Field::DiscNumber, FieldValue::Pair(number, total))
    }

    fn delete_disc_number(&mut self) -> Result<()> {
        self.delete_field(Field::DiscNumber)
    }

    fn encoded_by(&self) -> Result<String> {
        self.text_of(Field::EncodedBy)
    }

    fn set_encoded_by(&mut self, encoded_by: &str) -> Result<()> {
        self.set_field(Field::EncodedBy, FieldValue::Text(encoded_by.to_string()))
    }

    fn delete_encoded_by(&mut self) -> Result<()> {
        self.delete_field(Field::EncodedBy)
    }

    /// `(track, total tracks)`
    fn track_number(&self) -> Result<(u32, u32)> {
        self.pair_of(Field::TrackNumber)
    }

    fn set_track_number(&mut self, number: u32, total: u32) -> Result<()> {
        self.set_field(Field::TrackNumber, FieldValue::Pair(number, total))
    }

    fn delete_track_number(&mut self) -> Result<()> {
        self.delete_field(Field::TrackNumber)
    }

    fn attached_picture(&self) -> Result<AttachedPicture> {
        match self.field(Field::Picture)? {
            FieldValue::Picture(picture) => Ok(picture),
            _ => Err(mismatch(Field::Picture))
        }
    }

    fn set_attached_picture(&mut self, picture: &AttachedPicture) -> Result<()> {
        self.set_field(Field::Picture, FieldValue::Picture(picture.clone()))
    }

    fn delete_picture(&mut self) -> Result<()> {
        self.delete_field(Field::Picture)
    }

    fn picture_with<C: ImageCodec>(&self, codec: &C) -> Result<C::Image> {
        let picture = self.attached_picture()?;
        codec.decode(&picture.mime, &picture.data)
    }

    /// Stores `image` as PNG. Type and description of a present picture are
    /// kept, otherwise picture type 2 without description is written.
    fn set_picture_with<C: ImageCodec>(&mut self, codec: &C, image: &C::Image) -> Result<()> {
        let data = codec.encode_png(image)?;
        let picture = match self.attached_picture() {
            Ok(mut picture) => {
                picture.mime = picture::MIME_PNG.to_string();
                picture.data = data;
                picture
            }
            Err(TagError::TagNotFound(_)) => {
                AttachedPicture::new(picture::MIME_PNG, PictureType::OtherFileIcon, "", data)
            }
            Err(e) => return Err(e)
        };

        self.set_attached_picture(&picture)
    }

    fn text_of(&self, field: Field) -> Result<String> {
        match self.field(field)? {
            FieldValue::Text(text) => Ok(text),
            _ => Err(mismatch(field))
        }
    }

    fn number_of(&self, field: Field) -> Result<u32> {
        match self.field(field)? {
            FieldValue::Number(n) => Ok(n),
            _ => Err(mismatch(field))
        }
    }

    fn pair_of(&self, field: Field) -> Result<(u32, u32)> {
        match self.field(field)? {
            FieldValue::Pair(number, total) => Ok((number, total)),
            _ => Err(mismatch(field))
        }
    }
}

impl<T> Metadata for T where T: FrameStore {}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use errors::TagError;
    use frame::Version;
    use tag::{FrameStore, Tag};

    #[test]
    fn split_numbers() {
        assert_eq!(parse_split_number("5").unwrap(), (5, 5));
        assert_eq!(parse_split_number("3/12").unwrap(), (3, 12));
        match parse_split_number("1/2/3") {
            Err(TagError::IncorrectLength) => (),
            other => panic!("unexpected {:?}", other)
        }
        match parse_split_number("x/2") {
            Err(TagError::NumberParse(_)) => (),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn tables_cover_every_field() {
        for version in [Version::V22, Version::V23, Version::V24].iter() {
            let table = field_table(*version);
            assert_eq!(table.len(), Field::ALL.len());
            for (m, field) in table.iter().zip(Field::ALL.iter()) {
                assert_eq!(m.field, *field);
            }
        }
        assert_eq!(mapping(Version::V22, Field::Title).unwrap().key, "TT2");
        assert_eq!(mapping(Version::V23, Field::Year).unwrap().key, "TYER");
        assert!(is_known_key(Version::V23, "TDAT"));
        assert!(is_known_key(Version::V24, "TDRC"));
        assert!(!is_known_key(Version::V24, "PRIV"));
    }

    #[test]
    fn unsupported_on_v22() {
        let mut tag = Tag::new(Version::V22);
        for result in vec![tag.album_artist().map(|_| ()),
                           tag.compilation().map(|_| ())] {
            match result {
                Err(TagError::UnsupportedField(_, Version::V22)) => (),
                other => panic!("unexpected {:?}", other)
            }
        }
        assert!(tag.set_album_artist("x").is_err());
        assert!(tag.delete_album_artist().is_err());
        assert!(tag.frame_names().is_empty());
    }

    #[test]
    fn missing_frames() {
        let mut tag = Tag::new(Version::V23);
        match tag.title() {
            Err(TagError::TagNotFound(key)) => assert_eq!(key, "TIT2"),
            other => panic!("unexpected {:?}", other)
        }
        assert!(tag.delete_title().is_ok());
        assert!(tag.delete_frame("PRIV").is_ok());
    }

    #[test]
    fn genres() {
        let mut v23 = Tag::new(Version::V23);
        v23.set_text("TCON", "(20)").unwrap();
        assert_eq!(v23.genre().unwrap(), "Alternative");
        v23.set_text("TCON", "Alternative").unwrap();
        assert_eq!(v23.genre().unwrap(), "");
        v23.set_genre("Rock").unwrap();
        assert_eq!(v23.text("TCON").unwrap(), "(17)");
        match v23.set_genre("Not A Genre") {
            Err(TagError::UnknownGenre(_)) => (),
            other => panic!("unexpected {:?}", other)
        }
        v23.set_text("TCON", "(250)").unwrap();
        assert_eq!(v23.genre().unwrap(), "");
        v23.set_text("TCON", "Soundtrack (2005)").unwrap();
        assert_eq!(v23.genre().unwrap(), "");

        let mut v24 = Tag::new(Version::V24);
        v24.set_genre("Shoegaze").unwrap();
        assert_eq!(v24.text("TCON").unwrap(), "Shoegaze");
        assert_eq!(v24.genre().unwrap(), "Shoegaze");
        v24.set_text("TCON", "17").unwrap();
        assert_eq!(v24.genre().unwrap(), "Rock");
        v24.set_text("TCON", "(0)Blues").unwrap();
        assert_eq!(v24.genre().unwrap(), "Blues");
        v24.set_text("TCON", "Soundtrack (2005)").unwrap();
        assert_eq!(v24.genre().unwrap(), "Soundtrack (2005)");
        v24.set_text("TCON", "250").unwrap();
        assert_eq!(v24.genre().unwrap(), "250");
    }

    #[test]
    fn comments() {
        let mut tag = Tag::new(Version::V23);
        tag.set_comment("nice").unwrap();
        assert_eq!(tag.bytes("COMM").unwrap(), b"\x00eng\x00nice");
        assert_eq!(tag.comment().unwrap(), "nice");

        tag.put_frame("COMM", b"\x00engdesc\x00text\x00".to_vec()).unwrap();
        assert_eq!(tag.comment().unwrap(), "text");
        tag.put_frame("COMM", b"\x00en".to_vec()).unwrap();
        assert!(tag.comment().is_err());
    }

    #[test]
    fn dates_v23() {
        let mut tag = Tag::new(Version::V23);
        let date = NaiveDate::from_ymd_opt(2006, 9, 26).unwrap();
        tag.set_date(date).unwrap();
        assert_eq!(tag.text("TYER").unwrap(), "2006");
        assert_eq!(tag.text("TDAT").unwrap(), "2609");
        assert_eq!(tag.date().unwrap(), date);
        assert_eq!(tag.year().unwrap(), 2006);

        tag.set_text("TDAT", "3102").unwrap();
        assert!(tag.date().is_err());
        tag.set_text("TDAT", "261").unwrap();
        match tag.date() {
            Err(TagError::IncorrectLength) => (),
            other => panic!("unexpected {:?}", other)
        }

        tag.delete_date().unwrap();
        assert!(tag.frame_names().is_empty());
    }

    #[test]
    fn dates_v24() {
        let mut tag = Tag::new(Version::V24);
        tag.set_text("TDRC", "2006-09-26T10:00:00").unwrap();
        assert_eq!(tag.date().unwrap(), NaiveDate::from_ymd_opt(2006, 9, 26).unwrap());
        assert_eq!(tag.year().unwrap(), 2006);

        tag.set_year(2007).unwrap();
        assert_eq!(tag.text("TDRC").unwrap(), "2007-09-26T10:00:00");

        tag.delete_date().unwrap();
        assert!(tag.year().is_err());
        tag.set_year(1999).unwrap();
        assert_eq!(tag.text("TDRC").unwrap(), "1999");
        assert!(tag.date().is_err());
    }

    #[test]
    fn user_text() {
        let mut tag = Tag::new(Version::V24);
        tag.set_catalog_number("WEA-123").unwrap();
        assert_eq!(tag.catalog_number().unwrap(), "WEA-123");
        assert_eq!(tag.user_text("CATALOGNUMBER").unwrap(), "WEA-123");

        tag.set_user_text("DISCOGS_ID", "42");
        assert_eq!(tag.user_int("DISCOGS_ID").unwrap(), 42);
        tag.delete_user_text("DISCOGS_ID").unwrap();
        assert!(tag.user_text("DISCOGS_ID").is_err());
    }

    #[test]
    fn field_value_mismatch() {
        let mut tag = Tag::new(Version::V23);
        assert!(tag.set_field(Field::Year, FieldValue::Text("2006".to_string())).is_err());
        assert!(tag.set_field(Field::Year, FieldValue::Number(2006)).is_ok());
        assert_eq!(tag.field(Field::Year).unwrap(), FieldValue::Number(2006));
    }
}
