use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use errors::{Result, TagError};
use frame::{Frame, FrameHeader, Version};
use readable::Readable;
use tag::{FlagAware, FrameStore, Head, HeadFlag, Tag, HEAD_LEN};
use util;
use writable::Writable;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Status {
    Unopened,
    HeaderParsed,
    FramesAccumulating,
    Complete,
    Failed,
}

///
/// # Tag reader
///
/// Steps through the header, the frame region and the trailing audio bytes of
/// one version's tag. The frame region must be consumed exactly: a frame that
/// runs past the declared size is an error, zero bytes are padding up to the
/// end of the region.
///
pub struct MetadataReader<'a, R: 'a + Readable> {
    readable: &'a mut R,
    version: Version,
    status: Status,
    consumed: u64,
    tag: Option<Tag>,
}

impl<'a, R: Readable> MetadataReader<'a, R> {
    pub fn new(readable: &'a mut R, version: Version) -> Self {
        MetadataReader {
            readable: readable,
            version: version,
            status: Status::Unopened,
            consumed: 0,
            tag: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn read(mut self) -> Result<Tag> {
        while self.status != Status::Complete {
            if let Err(e) = self.next() {
                debug!("stop on {:?}: {}", self.status, e);
                self.status = Status::Failed;
                return Err(e);
            }
        }

        self.tag.ok_or(TagError::MalformedHeader("no tag read"))
    }

    fn next(&mut self) -> Result<()> {
        debug!("next: {:?}", self.status);
        match self.status {
            Status::Unopened => self.head(),
            Status::HeaderParsed | Status::FramesAccumulating => {
                if self.consumed < self.declared_length() {
                    self.frame()
                } else {
                    self.trailing()
                }
            }
            Status::Complete => Ok(()),
            Status::Failed => Err(TagError::MalformedFrame("reader already failed".to_string()))
        }
    }

    fn declared_length(&self) -> u64 {
        self.tag.as_ref().map(|tag| tag.declared_length() as u64).unwrap_or(0)
    }

    fn tag_mut(&mut self) -> Result<&mut Tag> {
        self.tag.as_mut().ok_or(TagError::MalformedHeader("header not read"))
    }

    fn head(&mut self) -> Result<()> {
        self.readable.seek_to(0)?;
        if self.readable.total_len()? == 0 {
            return Err(TagError::EmptyInput);
        }

        let head = Head::read(&mut *self.readable)?;
        debug!("{:?}", head);
        if head.version != self.version.major() {
            return Err(TagError::MalformedHeader("major version mismatch"));
        }

        if head.has_flag(HeadFlag::ExtendedHeader) {
            self.consumed = self.extended_head(head.size as u64)?;
        }
        self.tag = Some(Tag::with_head(head, self.version));
        self.status = Status::HeaderParsed;

        Ok(())
    }

    // optional, skipped
    fn extended_head(&mut self, declared: u64) -> Result<u64> {
        let (size, skip) = match self.version {
            //
            // 2.3 size is plain and does not count itself.
            Version::V23 => {
                let size = self.readable.read_u32()? as u64;
                (size + 4, size)
            }
            //
            // 2.4 size is synchsafe and counts itself.
            _ => {
                let size = self.readable.read_synchsafe()? as u64;
                if size < 4 {
                    return Err(TagError::MalformedHeader("extended header size"));
                }
                (size, size - 4)
            }
        };
        if size > declared {
            return Err(TagError::MalformedHeader("extended header larger than the tag"));
        }
        let _ = self.readable.read_bytes(skip as usize)
                             .map_err(|_| TagError::MalformedHeader("extended header"))?;
        warn!("skipped extended header of {} bytes", size);

        Ok(size)
    }

    fn frame(&mut self) -> Result<()> {
        self.status = Status::FramesAccumulating;
        let remaining = self.declared_length() - self.consumed;
        let header_width = self.version.header_width() as u64;

        match self.readable.look_bytes(1)?.first() {
            None => return Err(TagError::MalformedFrame("stream ends inside the tag".to_string())),
            Some(&0) => return self.padding(remaining),
            _ => ()
        }
        if remaining < header_width {
            return Err(TagError::MalformedFrame(format!("{} bytes left, less than a frame header",
                                                        remaining)));
        }

        let header = FrameHeader::read(&mut *self.readable, self.version)?;
        debug!("{:?}", header);
        if header.size as u64 > remaining - header_width {
            return Err(TagError::MalformedFrame(format!("{}: {} bytes overrun the tag",
                                                        header.id, header.size)));
        }
        let frame = Frame::read(&mut *self.readable, &header)?;
        self.tag_mut()?.insert_read_frame(frame)?;
        self.consumed = self.consumed + header_width + header.size as u64;

        Ok(())
    }

    fn padding(&mut self, remaining: u64) -> Result<()> {
        let available = self.readable.remaining_len()?;
        if available < remaining {
            return Err(TagError::MalformedFrame(format!("padding: {} bytes declared, {} left",
                                                        remaining,
                                                        available)));
        }
        let head = self.readable.look_bytes(remaining.min(16) as usize)?;
        if head.iter().any(|b| *b != 0) {
            warn!("non zero bytes in padding: {}", util::to_hex(&head));
        }
        let _ = self.readable.skip_bytes(remaining as i64)?;
        debug!("padding: {} bytes", remaining);
        self.consumed = self.consumed + remaining;

        Ok(())
    }

    fn trailing(&mut self) -> Result<()> {
        if self.consumed > self.declared_length() {
            return Err(TagError::MalformedFrame(format!("consumed {} of {} bytes",
                                                        self.consumed,
                                                        self.declared_length())));
        }
        let data = self.readable.all_bytes()?;
        debug!("trailing data: {} bytes", data.len());
        self.tag_mut()?.set_file_data(data);
        self.status = Status::Complete;

        Ok(())
    }
}

///
/// # Tag writer
///
/// Lays out header, frames, user frames and the trailing audio bytes in one
/// buffer; the destination only sees complete output.
///
pub struct MetadataWriter<'a> {
    tag: &'a Tag
}

impl<'a> MetadataWriter<'a> {
    pub fn new(tag: &'a Tag) -> Self {
        MetadataWriter {
            tag: tag
        }
    }

    /// Neither unsynchronisation nor an extended header is written, so both
    /// flags are cleared.
    pub fn head(&self, size: u32) -> Head {
        let version = self.tag.version();
        let head = self.tag.head();

        Head {
            version: version.major(),
            minor_version: head.minor_version,
            flag: head.flag & !(util::BIT7 | util::BIT6),
            size: size,
        }
    }

    pub fn frames(&self) -> Result<Vec<u8>> {
        let version = self.tag.version();
        let mut writable = vec![];
        for frame in self.tag.frames().iter().chain(self.tag.user_frames().iter()) {
            trace!("write {}: {} bytes", frame.key, frame.value.len());
            frame.write(&mut writable, version)?;
        }

        Ok(writable)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let frame_bytes = self.frames()?;
        if frame_bytes.len() as u64 > ::bytes::SYNCHSAFE_MAX as u64 {
            return Err(TagError::SizeOverflow { value: frame_bytes.len() as u32, bits: 28 });
        }
        let head = self.head(frame_bytes.len() as u32);
        debug!("{:?}", head);

        let data = self.tag.file_data();
        let mut writable = Vec::with_capacity(HEAD_LEN + frame_bytes.len() + data.len());
        head.write(&mut writable)?;
        writable.write_bytes(&frame_bytes)?;
        writable.write_bytes(data)?;

        Ok(writable)
    }

    pub fn write<W: Writable>(&self, writable: &mut W) -> Result<()> {
        let all_bytes = self.to_bytes()?;
        writable.write_bytes(&all_bytes)?;
        writable.flush()?;

        Ok(())
    }
}

impl Tag {
    /// Reads a tag of `version` from the start of `readable`.
    pub fn read_from<R: Readable>(readable: &mut R, version: Version) -> Result<Tag> {
        MetadataReader::new(readable, version).read()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        MetadataWriter::new(self).to_bytes()
    }

    pub fn save<W: Writable>(&self, writable: &mut W) -> Result<()> {
        MetadataWriter::new(self).write(writable)
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let all_bytes = self.to_bytes()?;
        let mut writable = BufWriter::new(File::create(path)?);
        writable.write_bytes(&all_bytes)?;
        writable.flush()?;

        Ok(())
    }
}

pub fn read_tag<R: Readable>(readable: &mut R, version: Version) -> Result<Tag> {
    Tag::read_from(readable, version)
}

/// Peeks at the marker and major version, leaving the stream at its start.
pub fn detect_version<R: Readable>(readable: &mut R) -> Result<Version> {
    readable.seek_to(0)?;
    let bytes = readable.look_bytes(4)?;
    if bytes.is_empty() {
        return Err(TagError::EmptyInput);
    }
    if bytes.len() < 4 || &bytes[0..3] != b"ID3" {
        return Err(TagError::MalformedHeader("missing ID3 marker"));
    }

    Version::from_major(bytes[3])
}

pub fn read_any<R: Readable>(readable: &mut R) -> Result<Tag> {
    let version = detect_version(readable)?;
    debug!("detected {}", version);

    Tag::read_from(readable, version)
}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Tag> {
    let mut file = File::open(path)?;
    read_any(&mut file)
}
