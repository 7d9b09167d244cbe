pub const BIT7: u8 = 0x80;
pub const BIT6: u8 = 0x40;
pub const BIT5: u8 = 0x20;

/// Splits `bytes` at the first terminator: one zero byte, or one aligned
/// zero code unit when `width` is 2.
pub fn split_terminated(bytes: &[u8], width: usize) -> Option<(&[u8], &[u8])> {
    if width == 2 {
        let mut i = 0;
        while i + 1 < bytes.len() {
            if bytes[i] == 0 && bytes[i + 1] == 0 {
                return Some((&bytes[..i], &bytes[i + 2..]));
            }
            i = i + 2;
        }
        None
    } else {
        bytes.iter()
             .position(|b| *b == 0)
             .map(|i| (&bytes[..i], &bytes[i + 1..]))
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    let strs: Vec<String> = bytes.iter()
                                 .map(|b| format!("{:02x}", b))
                                 .collect();
    strs.join(" ")
}
