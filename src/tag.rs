use std::collections::BTreeMap;

use errors::{Result, TagError};
use fields;
use frame::{self, Frame, Version};
use readable::Readable;
use text::{self, TextEncoding};
use util;
use writable::Writable;

pub const HEAD_LEN: usize = 10;

pub trait FlagAware<T> {
    fn has_flag(&self, flag: T) -> bool;
    fn set_flag(&mut self, flag: T);
}

///
/// # Head flags
///
/// - [See](http://id3.org/id3v2.3.0#ID3v2_header)
/// - [See](http://id3.org/id3v2.4.0-structure) > 3.1. ID3v2 header
///
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum HeadFlag {
    Unsynchronisation,
    ExtendedHeader,
    ExperimentalIndicator,
}

///
/// # ID3V2 Header
///
/// - [V2.3](http://id3.org/id3v2.3.0#ID3v2_header)
/// - [V2.4](http://id3.org/id3v2.4.0-structure) > 3.1. ID3v2 header
///
/// `size` is the frame region, without these 10 bytes.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Head {
    pub version: u8,
    pub minor_version: u8,
    pub flag: u8,
    pub size: u32,
}

impl Head {
    pub fn new(version: Version) -> Self {
        Head {
            version: version.major(),
            minor_version: 0,
            flag: 0,
            size: 0,
        }
    }

    pub fn read<R: Readable>(readable: &mut R) -> Result<Self> {
        let bytes = readable.read_upto(HEAD_LEN)?;
        if bytes.len() != HEAD_LEN {
            return Err(TagError::MalformedHeader("header shorter than 10 bytes"));
        }
        if &bytes[0..3] != b"ID3" {
            return Err(TagError::MalformedHeader("missing ID3 marker"));
        }

        Ok(Head {
            version: bytes[3],
            minor_version: bytes[4],
            flag: bytes[5],
            size: ::bytes::decode_synchsafe(&[bytes[6], bytes[7], bytes[8], bytes[9]]),
        })
    }

    pub fn write<W: Writable>(&self, writable: &mut W) -> Result<()> {
        writable.write_string("ID3")?;
        writable.write_u8(self.version)?;
        writable.write_u8(self.minor_version)?;
        writable.write_u8(self.flag)?;
        writable.write_synchsafe(self.size)
    }
}

impl FlagAware<HeadFlag> for Head {
    fn has_flag(&self, flag: HeadFlag) -> bool {
        match flag {
            HeadFlag::Unsynchronisation => self.flag & util::BIT7 != 0,
            HeadFlag::ExtendedHeader => self.version > 2 && self.flag & util::BIT6 != 0,
            HeadFlag::ExperimentalIndicator => self.version > 2 && self.flag & util::BIT5 != 0,
        }
    }

    fn set_flag(&mut self, flag: HeadFlag) {
        match flag {
            HeadFlag::Unsynchronisation => self.flag = self.flag | util::BIT7,
            HeadFlag::ExtendedHeader => self.flag = self.flag | util::BIT6,
            HeadFlag::ExperimentalIndicator => self.flag = self.flag | util::BIT5,
        }
    }
}

/// `Known` frames back a field of the tag's version, anything else is
/// carried along untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    Known,
    Opaque,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub kind: FrameKind,
    pub value: Vec<u8>,
}

/// Raw storage the field accessors work on.
pub trait FrameStore {
    fn version(&self) -> Version;

    fn frame_value(&self, key: &str) -> Option<&[u8]>;

    /// Fails with `InvalidFrameKey` when `key` is not a frame id of this
    /// version or is the user-defined text key, which has its own store.
    fn put_frame(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Returns whether a frame was present.
    fn remove_frame(&mut self, key: &str) -> bool;

    fn user_frame_value(&self, description: &str) -> Option<&[u8]>;

    fn put_user_frame(&mut self, description: &str, value: Vec<u8>);

    fn remove_user_frame(&mut self, description: &str) -> bool;

    /// Standard frame keys followed by user frame descriptions.
    fn frame_names(&self) -> Vec<String>;

    fn clear_frames(&mut self);

    fn file_data(&self) -> &[u8];
}

///
/// # ID3v2 tag
///
/// Frames by key, user-defined text frames by description, and the audio
/// bytes that followed the tag.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    head: Head,
    version: Version,
    frames: BTreeMap<String, FrameEntry>,
    user_frames: BTreeMap<String, Vec<u8>>,
    data: Vec<u8>,
}

impl Tag {
    pub fn new(version: Version) -> Self {
        Tag::with_head(Head::new(version), version)
    }

    pub(crate) fn with_head(head: Head, version: Version) -> Self {
        Tag {
            head: head,
            version: version,
            frames: BTreeMap::new(),
            user_frames: BTreeMap::new(),
            data: vec![],
        }
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    pub fn declared_length(&self) -> u32 {
        self.head.size
    }

    pub fn frame_kind(&self, key: &str) -> Option<FrameKind> {
        self.frames.get(key).map(|entry| entry.kind)
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.iter()
                   .map(|(key, entry)| Frame::new(key, entry.value.clone()))
                   .collect()
    }

    /// User frames as they go on the wire, under the version's `TXX`/`TXXX` key.
    pub fn user_frames(&self) -> Vec<Frame> {
        let key = self.version.user_text_key();
        self.user_frames.values()
                        .map(|value| Frame::new(key, value.clone()))
                        .collect()
    }

    pub fn set_file_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Stores a frame as read from a stream. User-defined text frames are
    /// keyed by their description.
    pub(crate) fn insert_read_frame(&mut self, frame: Frame) -> Result<()> {
        if frame.key == self.version.user_text_key() {
            let (description, _) = split_user_value(&frame.value)?;
            if self.user_frames.contains_key(&description) {
                warn!("duplicate user frame '{}', keeping the last", description);
            }
            self.user_frames.insert(description, frame.value);
            return Ok(());
        }

        if self.frames.contains_key(&frame.key) {
            warn!("duplicate frame {}, keeping the last", frame.key);
        }
        let kind = kind_of(self.version, &frame.key);
        self.frames.insert(frame.key, FrameEntry { kind: kind, value: frame.value });

        Ok(())
    }
}

fn kind_of(version: Version, key: &str) -> FrameKind {
    if fields::is_known_key(version, key) {
        FrameKind::Known
    } else {
        FrameKind::Opaque
    }
}

/// Splits a user-defined text value `[encoding][description][terminator][value]`
/// into the decoded description and the raw value bytes.
pub fn split_user_value(raw: &[u8]) -> Result<(String, &[u8])> {
    if raw.is_empty() {
        return Err(TagError::IncorrectTagShape("empty user frame"));
    }
    let text_encoding = TextEncoding::from_byte(raw[0])?;
    match util::split_terminated(&raw[1..], text_encoding.terminator_width()) {
        Some((description, value)) => Ok((text::decode(description, text_encoding)?, value)),
        None => Err(TagError::IncorrectTagShape("user frame without description terminator"))
    }
}

pub fn encode_user_value(description: &str, value: &str) -> Vec<u8> {
    let mut raw = vec![TextEncoding::ISO88591.to_byte()];
    raw.extend_from_slice(description.as_bytes());
    raw.push(0x00);
    raw.extend_from_slice(value.as_bytes());
    raw
}

impl FrameStore for Tag {
    fn version(&self) -> Version {
        self.version
    }

    fn frame_value(&self, key: &str) -> Option<&[u8]> {
        self.frames.get(key).map(|entry| entry.value.as_slice())
    }

    fn put_frame(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        frame::validate_key(key, self.version)?;
        if key == self.version.user_text_key() {
            return Err(TagError::InvalidFrameKey(key.to_string()));
        }
        let kind = kind_of(self.version, key);
        self.frames.insert(key.to_string(), FrameEntry { kind: kind, value: value });

        Ok(())
    }

    fn remove_frame(&mut self, key: &str) -> bool {
        self.frames.remove(key).is_some()
    }

    fn user_frame_value(&self, description: &str) -> Option<&[u8]> {
        self.user_frames.get(description).map(|value| value.as_slice())
    }

    fn put_user_frame(&mut self, description: &str, value: Vec<u8>) {
        self.user_frames.insert(description.to_string(), value);
    }

    fn remove_user_frame(&mut self, description: &str) -> bool {
        self.user_frames.remove(description).is_some()
    }

    fn frame_names(&self) -> Vec<String> {
        self.frames.keys()
                   .chain(self.user_frames.keys())
                   .cloned()
                   .collect()
    }

    fn clear_frames(&mut self) {
        self.frames.clear();
        self.user_frames.clear();
    }

    fn file_data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use frame::{Frame, Version};

    #[test]
    fn head_read_write() {
        let bytes = b"ID3\x03\x00\x40\x00\x00\x02\x01".to_vec();
        let head = Head::read(&mut Cursor::new(bytes.clone())).unwrap();
        assert_eq!(head.version, 3);
        assert_eq!(head.size, 257);
        assert!(head.has_flag(HeadFlag::ExtendedHeader));
        assert!(!head.has_flag(HeadFlag::Unsynchronisation));

        let mut out = vec![];
        head.write(&mut out).unwrap();
        assert_eq!(out, bytes);

        assert!(Head::read(&mut Cursor::new(b"ID3\x03".to_vec())).is_err());
        assert!(Head::read(&mut Cursor::new(b"TAG\x03\x00\x00\x00\x00\x00\x00".to_vec())).is_err());
    }

    #[test]
    fn flags_by_version() {
        let mut head = Head::new(Version::V22);
        head.set_flag(HeadFlag::ExtendedHeader);
        assert!(!head.has_flag(HeadFlag::ExtendedHeader));
        head.set_flag(HeadFlag::Unsynchronisation);
        assert!(head.has_flag(HeadFlag::Unsynchronisation));
    }

    #[test]
    fn store() {
        let mut tag = Tag::new(Version::V23);
        tag.put_frame("TIT2", text::encode_frame("Title")).unwrap();
        tag.put_frame("PRIV", vec![1, 2, 3]).unwrap();
        assert!(tag.put_frame("TT2", vec![0, 1]).is_err());
        match tag.put_frame("TXXX", text::encode_frame("x")) {
            Err(TagError::InvalidFrameKey(key)) => assert_eq!(key, "TXXX"),
            other => panic!("unexpected {:?}", other)
        }
        assert_eq!(tag.frame_kind("TIT2"), Some(FrameKind::Known));
        assert_eq!(tag.frame_kind("PRIV"), Some(FrameKind::Opaque));

        tag.put_user_frame("CATALOGNUMBER", encode_user_value("CATALOGNUMBER", "X-1"));
        assert_eq!(tag.frame_names(), vec!["PRIV", "TIT2", "CATALOGNUMBER"]);
        assert_eq!(tag.user_frames()[0].key, "TXXX");

        assert!(tag.remove_frame("PRIV"));
        assert!(!tag.remove_frame("PRIV"));
        tag.clear_frames();
        assert!(tag.frame_names().is_empty());
    }

    #[test]
    fn user_frames_by_description() {
        let mut tag = Tag::new(Version::V22);
        tag.insert_read_frame(Frame::new("TXX", encode_user_value("MOOD", "calm"))).unwrap();
        let (description, value) = split_user_value(tag.user_frame_value("MOOD").unwrap()).unwrap();
        assert_eq!(description, "MOOD");
        assert_eq!(value, b"calm");

        assert!(tag.insert_read_frame(Frame::new("TXX", b"\x00no terminator".to_vec())).is_err());
    }
}
