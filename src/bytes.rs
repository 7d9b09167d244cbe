use errors::{Result, TagError};

/// Largest value a 4 byte synchsafe integer can hold.
pub const SYNCHSAFE_MAX: u32 = 0x0fff_ffff;

// Sizes are 4bytes long big-endian but first bit is 0
// @see http://id3.org/id3v2.4.0-structure > 6.2. Synchsafe integers
pub fn decode_synchsafe(bytes: &[u8; 4]) -> u32 {
    let mut v: u32 = (bytes[3] & 0x7f) as u32;
    v = v | ((bytes[2] & 0x7f) as u32) << 7;
    v = v | ((bytes[1] & 0x7f) as u32) << 14;
    v = v | ((bytes[0] & 0x7f) as u32) << 21;

    v
}

pub fn encode_synchsafe(v: u32) -> Result<[u8; 4]> {
    if v > SYNCHSAFE_MAX {
        return Err(TagError::SizeOverflow { value: v, bits: 28 });
    }

    Ok([((v >> 21) & 0x7f) as u8,
        ((v >> 14) & 0x7f) as u8,
        ((v >> 7) & 0x7f) as u8,
        (v & 0x7f) as u8])
}

/// Plain big-endian integer of 1 to 4 bytes.
pub fn decode_plain(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |v, b| (v << 8) | *b as u32)
}

pub fn encode_plain(v: u32, width: usize) -> Result<Vec<u8>> {
    let bits = (width * 8) as u32;
    if bits < 32 && v >> bits != 0 {
        return Err(TagError::SizeOverflow { value: v, bits: bits });
    }

    Ok((0..width).rev().map(|i| ((v >> (i * 8)) & 0xff) as u8).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors::TagError;

    #[test]
    fn synchsafe_known_values() {
        assert_eq!(decode_synchsafe(&[0x00, 0x00, 0x02, 0x01]), 257);
        assert_eq!(decode_synchsafe(&[0x7f, 0x7f, 0x7f, 0x7f]), SYNCHSAFE_MAX);
        // top bits are ignored on read
        assert_eq!(decode_synchsafe(&[0x80, 0x80, 0x80, 0x81]), 1);
        assert_eq!(encode_synchsafe(257).unwrap(), [0x00, 0x00, 0x02, 0x01]);
    }

    #[test]
    fn synchsafe_round_trip() {
        let samples = [0, 1, 127, 128, 255, 16_383, 16_384, 1_000_000, SYNCHSAFE_MAX - 1, SYNCHSAFE_MAX];
        for n in samples.iter() {
            let encoded = encode_synchsafe(*n).unwrap();
            assert!(encoded.iter().all(|b| b & 0x80 == 0));
            assert_eq!(decode_synchsafe(&encoded), *n);
        }
        let mut n = 0u32;
        while n <= SYNCHSAFE_MAX {
            assert_eq!(decode_synchsafe(&encode_synchsafe(n).unwrap()), n);
            n = n + 65_537;
        }
    }

    #[test]
    fn synchsafe_overflow() {
        match encode_synchsafe(SYNCHSAFE_MAX + 1) {
            Err(TagError::SizeOverflow { bits, .. }) => assert_eq!(bits, 28),
            other => panic!("unexpected {:?}", other)
        }
    }

    #[test]
    fn plain_sizes() {
        assert_eq!(decode_plain(&[0x00, 0x01, 0x00]), 256);
        assert_eq!(decode_plain(&[0x00, 0x00, 0x02, 0x01]), 513);
        assert_eq!(encode_plain(513, 4).unwrap(), vec![0x00, 0x00, 0x02, 0x01]);
        assert_eq!(encode_plain(0xff_ffff, 3).unwrap(), vec![0xff, 0xff, 0xff]);
        assert!(encode_plain(0x100_0000, 3).is_err());
        // 2.3 sizes are not synchsafe
        assert_ne!(decode_plain(&[0x00, 0x00, 0x02, 0x01]),
                   decode_synchsafe(&[0x00, 0x00, 0x02, 0x01]));
    }
}
