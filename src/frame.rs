use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use errors::{Result, TagError};
use readable::Readable;
use text;
use util;
use writable::Writable;

static FRAME_ID: OnceLock<Regex> = OnceLock::new();

///
/// # ID3v2 versions
///
/// Picks the frame header shape, the field table and the keys written on save.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    V22,
    V23,
    V24,
}

impl Version {
    pub fn from_major(major: u8) -> Result<Version> {
        match major {
            2 => Ok(Version::V22),
            3 => Ok(Version::V23),
            4 => Ok(Version::V24),
            _ => Err(TagError::MalformedHeader("unsupported major version"))
        }
    }

    pub fn major(&self) -> u8 {
        match *self {
            Version::V22 => 2,
            Version::V23 => 3,
            Version::V24 => 4,
        }
    }

    pub fn key_width(&self) -> usize {
        match *self {
            Version::V22 => 3,
            _ => 4
        }
    }

    /// Frame header width: 6 bytes on 2.2, 10 bytes with flags on 2.3/2.4.
    pub fn header_width(&self) -> usize {
        match *self {
            Version::V22 => 6,
            _ => 10
        }
    }

    pub fn user_text_key(&self) -> &'static str {
        match *self {
            Version::V22 => "TXX",
            _ => "TXXX"
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ID3v2.{}", self.major())
    }
}

///
/// # Frame Header
///
/// - [V2.2](http://id3.org/id3v2-00) > 3.2. ID3v2 frames overview
/// - [V2.3](http://id3.org/id3v2.3.0#ID3v2_frame_overview)
/// - [V2.4](http://id3.org/id3v2.4.0-structure) > 4. ID3v2 frames overview
///
/// Sizes are plain big-endian on 2.2 (3 bytes) and 2.3 (4 bytes), synchsafe on 2.4.
/// The two flag bytes are kept on read and written as zero.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameHeader {
    pub id: String,
    pub size: u32,
    pub status_flag: u8,
    pub encoding_flag: u8,
}

impl FrameHeader {
    /// A stream ending inside the header is `MalformedFrame`.
    pub fn read<R: Readable>(readable: &mut R, version: Version) -> Result<Self> {
        FrameHeader::read_fields(readable, version).map_err(|e| {
            TagError::MalformedFrame(format!("frame header: {}", e))
        })
    }

    fn read_fields<R: Readable>(readable: &mut R, version: Version) -> Result<Self> {
        let id = readable.read_string(version.key_width())?;
        let (size, status_flag, encoding_flag) = match version {
            Version::V22 => (readable.read_u24()?, 0, 0),
            Version::V23 => (readable.read_u32()?, readable.read_u8()?, readable.read_u8()?),
            Version::V24 => (readable.read_synchsafe()?, readable.read_u8()?, readable.read_u8()?),
        };

        Ok(FrameHeader {
            id: id,
            size: size,
            status_flag: status_flag,
            encoding_flag: encoding_flag,
        })
    }

    pub fn write<W: Writable>(&self, writable: &mut W, version: Version) -> Result<()> {
        validate_key(&self.id, version)?;
        writable.write_string(&self.id)?;
        match version {
            Version::V22 => writable.write_u24(self.size),
            Version::V23 => {
                writable.write_u32(self.size)?;
                writable.write_u16(0)
            }
            Version::V24 => {
                writable.write_synchsafe(self.size)?;
                writable.write_u16(0)
            }
        }
    }
}

/// One stored frame: key and raw value exactly as on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub key: String,
    pub value: Vec<u8>,
}

impl Frame {
    pub fn new(key: &str, value: Vec<u8>) -> Self {
        Frame {
            key: key.to_string(),
            value: value,
        }
    }

    /// Reads the value announced by `header`; text frames are cut at their
    /// first terminator.
    pub fn read<R: Readable>(readable: &mut R, header: &FrameHeader) -> Result<Self> {
        let mut value = readable.read_bytes(header.size as usize).map_err(|e| {
            TagError::MalformedFrame(format!("{}: {}", header.id, e))
        })?;
        trace!("{}: {}", header.id, util::to_hex(&value[..value.len().min(16)]));
        text::truncate_text_frame(&header.id, &mut value);

        Ok(Frame::new(&header.id, value))
    }

    pub fn encoded_len(&self, version: Version) -> usize {
        version.header_width() + self.value.len()
    }

    pub fn write<W: Writable>(&self, writable: &mut W, version: Version) -> Result<()> {
        let header = FrameHeader {
            id: self.key.clone(),
            size: self.value.len() as u32,
            status_flag: 0,
            encoding_flag: 0,
        };
        if self.value.len() as u64 > u32::max_value() as u64 {
            return Err(TagError::MalformedFrame(format!("{}: value too large", self.key)));
        }
        header.write(writable, version)?;

        writable.write_bytes(&self.value)
    }

    pub fn to_bytes(&self, version: Version) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len(version));
        self.write(&mut buf, version)?;

        Ok(buf)
    }
}

pub fn read_frame<R: Readable>(readable: &mut R, version: Version) -> Result<Frame> {
    let header = FrameHeader::read(readable, version)?;
    debug!("{:?}", header);

    Frame::read(readable, &header)
}

pub fn write_frame(key: &str, value: &[u8], version: Version) -> Result<Vec<u8>> {
    Frame::new(key, value.to_vec()).to_bytes(version)
}

/// Frame ids are upper case letters and digits, starting with a letter, and
/// exactly as wide as the version's key.
///
/// [See](http://id3.org/id3v2.4.0-structure) > 4. ID3v2 frame overview
pub fn validate_key(key: &str, version: Version) -> Result<()> {
    let re = FRAME_ID.get_or_init(|| {
        Regex::new(r"^[A-Z][A-Z0-9]{2,3}$").expect("frame id pattern")
    });
    if key.len() != version.key_width() || !re.is_match(key) {
        return Err(TagError::InvalidFrameKey(key.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use errors::TagError;

    #[test]
    fn header_shapes() {
        let v22 = write_frame("TT2", b"\x00Hello", Version::V22).unwrap();
        assert_eq!(&v22[..6], b"TT2\x00\x00\x06");

        let v23 = write_frame("TIT2", b"\x00Hello", Version::V23).unwrap();
        assert_eq!(&v23[..10], b"TIT2\x00\x00\x00\x06\x00\x00");

        // 2.3 sizes are plain, 2.4 sizes synchsafe
        let value = vec![0u8; 200];
        let v23 = write_frame("APIC", &value, Version::V23).unwrap();
        assert_eq!(&v23[4..8], &[0x00, 0x00, 0x00, 0xc8]);
        let v24 = write_frame("APIC", &value, Version::V24).unwrap();
        assert_eq!(&v24[4..8], &[0x00, 0x00, 0x01, 0x48]);
        assert_eq!(v24.len(), 210);
    }

    #[test]
    fn frame_round_trip() {
        for &(key, version) in [("TT2", Version::V22),
                                ("TIT2", Version::V23),
                                ("TIT2", Version::V24)].iter() {
            let bytes = write_frame(key, b"\x00Hello", version).unwrap();
            let frame = read_frame(&mut Cursor::new(bytes), version).unwrap();
            assert_eq!(frame.key, key);
            assert_eq!(frame.value, b"\x00Hello".to_vec());
            assert_eq!(text::decode_frame(&frame.value).unwrap(), "Hello");
        }
    }

    #[test]
    fn short_value() {
        let mut bytes = write_frame("TALB", b"\x00We Are Pilots", Version::V23).unwrap();
        bytes.truncate(14);
        match read_frame(&mut Cursor::new(bytes), Version::V23) {
            Err(TagError::MalformedFrame(_)) => (),
            other => panic!("unexpected {:?}", other)
        }
        match read_frame(&mut Cursor::new(b"TAL\x00".to_vec()), Version::V22) {
            Err(TagError::MalformedFrame(_)) => (),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn keys() {
        assert!(validate_key("TIT2", Version::V24).is_ok());
        assert!(validate_key("PIC", Version::V22).is_ok());
        assert!(validate_key("TIT2", Version::V22).is_err());
        assert!(validate_key("TT2", Version::V23).is_err());
        assert!(validate_key("tit2", Version::V23).is_err());
        match write_frame("2ABC", b"\x00x", Version::V24) {
            Err(TagError::InvalidFrameKey(key)) => assert_eq!(key, "2ABC"),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn versions() {
        assert_eq!(Version::from_major(3).unwrap(), Version::V23);
        assert!(Version::from_major(5).is_err());
        assert_eq!(Version::V22.to_string(), "ID3v2.2");
        assert_eq!(Version::V24.user_text_key(), "TXXX");
    }

    #[test]
    fn header_fields() {
        let bytes = b"TIT2\x00\x00\x00\x06\x40\x01\x00Hello".to_vec();
        let header = FrameHeader::read(&mut Cursor::new(bytes), Version::V23).unwrap();
        assert_eq!(header.id, "TIT2");
        assert_eq!(header.size, 6);
        assert_eq!(header.status_flag, 0x40);
        assert_eq!(header.encoding_flag, 0x01);

        let bytes = b"APIC\x00\x00\x01\x48\x00\x00".to_vec();
        let header = FrameHeader::read(&mut Cursor::new(bytes), Version::V24).unwrap();
        assert_eq!(header.size, 200);

        let header = FrameHeader::read(&mut Cursor::new(b"PIC\x00\x01\x00".to_vec()), Version::V22).unwrap();
        assert_eq!(header.id, "PIC");
        assert_eq!(header.size, 256);
        assert_eq!(header.status_flag, 0);
    }
}
