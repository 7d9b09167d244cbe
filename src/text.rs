use encoding::{Encoding, DecoderTrap, EncoderTrap};
use encoding::all::{ISO_8859_1, UTF_16LE, UTF_16BE, UTF_8};

use errors::{Result, TagError};
use util;

///
/// # Frame Encoding
///
/// [See](http://id3.org/id3v2.4.0-structure) > 4. ID3v2 frame overview
///
/// `ISO88591` is read as UTF-8 first, falling back to Latin-1. `UTF16LE` is the
/// byte order mark variant: a leading BOM picks the byte order and is dropped.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    ISO88591,
    UTF16LE,
    UTF16BE,
    UTF8,
}

impl TextEncoding {
    pub fn from_byte(b: u8) -> Result<TextEncoding> {
        match b {
            0 => Ok(TextEncoding::ISO88591),
            1 => Ok(TextEncoding::UTF16LE),
            2 => Ok(TextEncoding::UTF16BE),
            3 => Ok(TextEncoding::UTF8),
            _ => Err(TagError::UnsupportedEncoding(b))
        }
    }

    pub fn to_byte(&self) -> u8 {
        match *self {
            TextEncoding::ISO88591 => 0,
            TextEncoding::UTF16LE => 1,
            TextEncoding::UTF16BE => 2,
            TextEncoding::UTF8 => 3,
        }
    }

    /// Width of the string terminator in bytes.
    pub fn terminator_width(&self) -> usize {
        match *self {
            TextEncoding::UTF16LE | TextEncoding::UTF16BE => 2,
            _ => 1
        }
    }
}

pub fn decode(bytes: &[u8], text_encoding: TextEncoding) -> Result<String> {
    match text_encoding {
        TextEncoding::ISO88591 => match UTF_8.decode(bytes, DecoderTrap::Strict) {
            Ok(text) => Ok(text),
            Err(_) => {
                trace!("not utf-8, decoding as latin-1: {}", util::to_hex(bytes));
                ISO_8859_1.decode(bytes, DecoderTrap::Replace).map_err(decode_error)
            }
        },
        TextEncoding::UTF8 => UTF_8.decode(bytes, DecoderTrap::Replace).map_err(decode_error),
        TextEncoding::UTF16LE => {
            if bytes.len() % 2 != 0 {
                return Err(TagError::OddLengthUtf16);
            }
            let decoded = match bytes {
                [0xff, 0xfe, rest @ ..] => UTF_16LE.decode(rest, DecoderTrap::Replace),
                [0xfe, 0xff, rest @ ..] => UTF_16BE.decode(rest, DecoderTrap::Replace),
                _ => UTF_16LE.decode(bytes, DecoderTrap::Replace)
            };
            decoded.map_err(decode_error)
        }
        TextEncoding::UTF16BE => {
            if bytes.len() % 2 != 0 {
                return Err(TagError::OddLengthUtf16);
            }
            UTF_16BE.decode(bytes, DecoderTrap::Replace).map_err(decode_error)
        }
    }
}

/// Encodes `text` without a terminator. `ISO88591` produces UTF-8 bytes, the
/// same bytes `decode` reads back first.
pub fn encode(text: &str, text_encoding: TextEncoding) -> Result<Vec<u8>> {
    match text_encoding {
        TextEncoding::ISO88591 | TextEncoding::UTF8 => Ok(text.as_bytes().to_vec()),
        TextEncoding::UTF16LE => {
            let mut bytes = vec![0xff, 0xfe];
            bytes.extend(UTF_16LE.encode(text, EncoderTrap::Strict).map_err(encode_error)?);
            Ok(bytes)
        }
        TextEncoding::UTF16BE => UTF_16BE.encode(text, EncoderTrap::Strict).map_err(encode_error)
    }
}

fn decode_error(msg: ::std::borrow::Cow<'static, str>) -> TagError {
    debug!("text decode failed: {}", msg);
    TagError::IncorrectTagShape("undecodable text")
}

fn encode_error(msg: ::std::borrow::Cow<'static, str>) -> TagError {
    debug!("text encode failed: {}", msg);
    TagError::IncorrectTagShape("unencodable text")
}

/// Decodes a text frame value: `[encoding][text]`.
pub fn decode_frame(raw: &[u8]) -> Result<String> {
    if raw.len() < 2 {
        return Err(TagError::IncorrectTagShape("text frame shorter than 2 bytes"));
    }

    decode(&raw[1..], TextEncoding::from_byte(raw[0])?)
}

/// Text frame value as every setter writes it: encoding byte 0, UTF-8 text.
pub fn encode_frame(text: &str) -> Vec<u8> {
    let mut raw = Vec::with_capacity(text.len() + 1);
    raw.push(TextEncoding::ISO88591.to_byte());
    raw.extend_from_slice(text.as_bytes());
    raw
}

/// Frames whose value is a single encoded string: `T***` except the
/// user-defined text frame.
pub fn is_text_frame(key: &str) -> bool {
    key.starts_with('T') && key != "TXX" && key != "TXXX"
}

/// Cuts a text frame at its first terminator, dropping the padding some
/// encoders leave behind. Values with an unknown encoding byte are kept.
pub fn truncate_text_frame(key: &str, raw: &mut Vec<u8>) {
    if !is_text_frame(key) || raw.len() < 2 {
        return;
    }
    let width = match TextEncoding::from_byte(raw[0]) {
        Ok(text_encoding) => text_encoding.terminator_width(),
        Err(_) => return
    };

    let cut = match util::split_terminated(&raw[1..], width) {
        Some((text, _)) => text.len() + 1,
        None => return
    };
    if cut < raw.len() {
        trace!("{}: truncated {} -> {}", key, raw.len(), cut);
        raw.truncate(cut);
    }
}
