use std::io::{ErrorKind, Write};

use bytes;
use errors::{Result, TagError};

pub trait Writable: Write {
    /// Writes all of `v`, failing with `WriteFailure` when the stream stops
    /// accepting bytes.
    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < v.len() {
            match self.write(&v[written..]) {
                Ok(0) => {
                    warn!("write try: {}: but stream accepted {}", v.len(), written);
                    return Err(TagError::WriteFailure { expected: v.len(), written: written });
                }
                Ok(n) => written = written + n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TagError::Io(e))
            }
        }

        Ok(())
    }

    fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_bytes(&[v])
    }

    fn write_u16(&mut self, v: u16) -> Result<()> {
        self.write_bytes(&bytes::encode_plain(v as u32, 2)?)
    }

    fn write_u24(&mut self, v: u32) -> Result<()> {
        self.write_bytes(&bytes::encode_plain(v, 3)?)
    }

    fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_bytes(&bytes::encode_plain(v, 4)?)
    }

    fn write_synchsafe(&mut self, v: u32) -> Result<()> {
        self.write_bytes(&bytes::encode_synchsafe(v)?)
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        self.write_bytes(v.as_bytes())
    }
}

impl<T> Writable for T where T: Write {}
