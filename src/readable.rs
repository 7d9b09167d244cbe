//MIT License
//
//Copyright (c) [2017] [Mark Han]
//
//Permission is hereby granted, free of charge, to any person obtaining a copy
//of this software and associated documentation files (the "Software"), to deal
//in the Software without restriction, including without limitation the rights
//to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//copies of the Software, and to permit persons to whom the Software is
//furnished to do so, subject to the following conditions:
//
//The above copyright notice and this permission notice shall be included in all
//copies or substantial portions of the Software.
//
//THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//SOFTWARE.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use bytes;
use errors::{Result, TagError};

pub trait Readable: Read + Seek {
    fn all_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![];
        let _ = self.read_to_end(&mut buf)?;

        Ok(buf)
    }

    /// Reads up to `amount` bytes, stopping early only at end of stream.
    /// The buffer never outgrows what the stream still holds.
    fn read_upto(&mut self, amount: usize) -> Result<Vec<u8>> {
        let amount = (amount as u64).min(self.remaining_len()?) as usize;
        let mut buf = vec![0u8; amount];
        let mut total_read = 0;

        while total_read < amount {
            match self.read(&mut buf[total_read..]) {
                Ok(0) => break,
                Ok(read) => total_read = total_read + read,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TagError::Io(e))
            }
        }
        trace!("read {}/{} bytes", total_read, amount);
        buf.truncate(total_read);

        Ok(buf)
    }

    /// Reads exactly `amount` bytes or fails with `ReadFailure`.
    fn read_bytes(&mut self, amount: usize) -> Result<Vec<u8>> {
        let buf = self.read_upto(amount)?;
        if buf.len() != amount {
            warn!("read try: {}: but got {}", amount, buf.len());
            return Err(TagError::ReadFailure { expected: amount, read: buf.len() });
        }

        Ok(buf)
    }

    fn read_string(&mut self, amount: usize) -> Result<String> {
        let ret = String::from_utf8_lossy(&self.read_bytes(amount)?).into_owned();

        Ok(ret)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u24(&mut self) -> Result<u32> {
        Ok(bytes::decode_plain(&self.read_bytes(3)?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(bytes::decode_plain(&self.read_bytes(4)?))
    }

    fn read_synchsafe(&mut self) -> Result<u32> {
        let v = self.read_bytes(4)?;

        Ok(bytes::decode_synchsafe(&[v[0], v[1], v[2], v[3]]))
    }

    fn skip_bytes(&mut self, amount: i64) -> Result<u64> {
        self.seek(SeekFrom::Current(amount)).map_err(TagError::SeekFailure)
    }

    fn seek_to(&mut self, offset: u64) -> Result<u64> {
        self.seek(SeekFrom::Start(offset)).map_err(TagError::SeekFailure)
    }

    fn total_len(&mut self) -> Result<u64> {
        let curr = self.seek(SeekFrom::Current(0)).map_err(TagError::SeekFailure)?;
        let end = self.seek(SeekFrom::End(0)).map_err(TagError::SeekFailure)?;
        self.seek_to(curr)?;

        Ok(end)
    }

    /// Bytes between the current position and the end of the stream.
    fn remaining_len(&mut self) -> Result<u64> {
        let curr = self.seek(SeekFrom::Current(0)).map_err(TagError::SeekFailure)?;
        let end = self.total_len()?;

        Ok(end.saturating_sub(curr))
    }

    /// Reads up to `amount` bytes and rewinds to where it started.
    fn look_bytes(&mut self, amount: usize) -> Result<Vec<u8>> {
        let v = self.read_upto(amount)?;
        let _ = self.skip_bytes(-(v.len() as i64))?;

        Ok(v)
    }
}

impl<T> Readable for T where T: Read + Seek {}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::Readable;
    use errors::TagError;

    #[test]
    fn exact_reads() {
        let mut readable = Cursor::new(b"0123456789".to_vec());
        assert_eq!(readable.read_bytes(4).unwrap(), b"0123");
        assert_eq!(readable.read_string(2).unwrap(), "45");
        match readable.read_bytes(10) {
            Err(TagError::ReadFailure { expected, read }) => {
                assert_eq!(expected, 10);
                assert_eq!(read, 4);
            }
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn integers() {
        let mut readable = Cursor::new(vec![0x01, 0x00, 0x01, 0x00,
                                            0x00, 0x01, 0x00, 0x00,
                                            0x00, 0x02, 0x01]);
        assert_eq!(readable.read_u8().unwrap(), 1);
        assert_eq!(readable.read_u24().unwrap(), 256);
        assert_eq!(readable.read_u32().unwrap(), 0x0001_0000);
        assert!(readable.read_synchsafe().is_err());

        let mut readable = Cursor::new(vec![0x00, 0x00, 0x02, 0x01]);
        assert_eq!(readable.read_synchsafe().unwrap(), 257);
    }

    #[test]
    fn look_and_len() {
        let mut readable = Cursor::new(b"ID3abc".to_vec());
        assert_eq!(readable.look_bytes(3).unwrap(), b"ID3");
        assert_eq!(readable.look_bytes(10).unwrap(), b"ID3abc");
        assert_eq!(readable.total_len().unwrap(), 6);
        assert_eq!(readable.read_string(3).unwrap(), "ID3");
        assert_eq!(readable.all_bytes().unwrap(), b"abc");
    }

    #[test]
    fn large_requests_on_short_streams() {
        let mut readable = Cursor::new(b"ID3abc".to_vec());
        readable.seek_to(2).unwrap();
        assert_eq!(readable.remaining_len().unwrap(), 4);
        assert_eq!(readable.read_upto(0x0fff_ffff).unwrap(), b"3abc");
        assert_eq!(readable.remaining_len().unwrap(), 0);

        readable.seek_to(0).unwrap();
        match readable.read_bytes(usize::max_value()) {
            Err(TagError::ReadFailure { read, .. }) => assert_eq!(read, 6),
            other => panic!("unexpected {:?}", other)
        }
    }
}
