use std::{
    error,
    io,
    fmt,
    result
};
use std::num::ParseIntError;

use fields::Field;
use frame::Version;

pub type Result<T> = result::Result<T, TagError>;

#[derive(Debug)]
pub enum TagError {
    EmptyInput,
    SeekFailure(io::Error),
    ReadFailure { expected: usize, read: usize },
    MalformedHeader(&'static str),
    MalformedFrame(String),
    TagNotFound(String),
    IncorrectTagShape(&'static str),
    IncorrectLength,
    NumberParse(ParseIntError),
    UnsupportedEncoding(u8),
    OddLengthUtf16,
    UnsupportedField(Field, Version),
    WriteFailure { expected: usize, written: usize },
    SizeOverflow { value: u32, bits: u32 },
    InvalidFrameKey(String),
    UnknownGenre(String),
    Image(String),
    Io(io::Error)
}

impl From<io::Error> for TagError {
    fn from(err: io::Error) -> TagError {
        TagError::Io(err)
    }
}

impl From<ParseIntError> for TagError {
    fn from(err: ParseIntError) -> TagError {
        TagError::NumberParse(err)
    }
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TagError::EmptyInput => write!(f, "Input stream is empty"),
            TagError::SeekFailure(ref err) => write!(f, "Seek failed: {}", err),
            TagError::ReadFailure { expected, read } =>
                write!(f, "Read {} bytes, expected {}", read, expected),
            TagError::MalformedHeader(reason) => write!(f, "Malformed tag header: {}", reason),
            TagError::MalformedFrame(ref reason) => write!(f, "Malformed frame: {}", reason),
            TagError::TagNotFound(ref key) => write!(f, "'{}' not found", key),
            TagError::IncorrectTagShape(reason) => write!(f, "Incorrect tag: {}", reason),
            TagError::IncorrectLength => write!(f, "Incorrect value length"),
            TagError::NumberParse(ref err) => write!(f, "Invalid number: {}", err),
            TagError::UnsupportedEncoding(b) => write!(f, "Unsupported text encoding: {}", b),
            TagError::OddLengthUtf16 => write!(f, "UTF-16 text must have an even length"),
            TagError::UnsupportedField(field, version) =>
                write!(f, "{} not available in {}", field, version),
            TagError::WriteFailure { expected, written } =>
                write!(f, "Wrote {} bytes, expected {}", written, expected),
            TagError::SizeOverflow { value, bits } =>
                write!(f, "{} does not fit in a {} bit size field", value, bits),
            TagError::InvalidFrameKey(ref key) => write!(f, "Invalid frame id '{}'", key),
            TagError::UnknownGenre(ref genre) => write!(f, "Unknown genre '{}'", genre),
            TagError::Image(ref reason) => write!(f, "Image error: {}", reason),
            TagError::Io(ref err) => fmt::Display::fmt(err, f)
        }
    }
}

impl error::Error for TagError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            TagError::SeekFailure(ref err) |
            TagError::Io(ref err) => Some(err),
            TagError::NumberParse(ref err) => Some(err),
            _ => None
        }
    }
}
