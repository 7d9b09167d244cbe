extern crate env_logger;
extern crate tempdir;

extern crate id3codec;

use std::fs::File;
use std::io::{Cursor, Write};

use tempdir::TempDir;

use id3codec::errors::TagError;
use id3codec::readable::Readable;

#[test]
fn readable_bytes() {
    let _ = env_logger::try_init();

    let mut readable = Cursor::new("0123456789".to_string().into_bytes());
    assert!(readable.read_bytes(10).is_ok());
    match readable.read_bytes(10) {
        Err(TagError::ReadFailure { expected, read }) => {
            assert_eq!(expected, 10);
            assert_eq!(read, 0);
        }
        other => panic!("unexpected {:?}", other)
    }

    let mut readable = Cursor::new("AB가나01".to_string().into_bytes());
    assert!(readable.skip_bytes(1).is_ok());
    assert_eq!(readable.read_string(1).unwrap(), "B");
    // utf8, 3bytes
    assert_eq!(readable.read_string(3).unwrap(), "가");
    assert_eq!(readable.read_string(5).unwrap(), "나01");
    assert!(readable.read_bytes(1).is_err());
}

#[test]
fn readable_upto() {
    let _ = env_logger::try_init();

    let mut readable = Cursor::new(b"ID3\x04".to_vec());
    assert_eq!(readable.read_upto(10).unwrap(), b"ID3\x04");
    assert!(readable.read_upto(10).unwrap().is_empty());

    readable.seek_to(0).unwrap();
    assert_eq!(readable.look_bytes(3).unwrap(), b"ID3");
    assert_eq!(readable.look_bytes(8).unwrap(), b"ID3\x04");
    assert_eq!(readable.read_u8().unwrap(), b'I');
    assert_eq!(readable.total_len().unwrap(), 4);
    assert_eq!(readable.all_bytes().unwrap(), b"D3\x04");
}

#[test]
fn readable_numbers() {
    let _ = env_logger::try_init();

    let mut readable = Cursor::new(vec![0x00, 0x01, 0x00,
                                        0x00, 0x00, 0x01, 0x01,
                                        0x00, 0x00, 0x02, 0x01]);
    assert_eq!(readable.read_u24().unwrap(), 256);
    assert_eq!(readable.read_u32().unwrap(), 257);
    assert_eq!(readable.read_synchsafe().unwrap(), 257);
    assert!(readable.read_u32().is_err());
}

#[test]
fn readable_file() {
    let _ = env_logger::try_init();

    let tmp_dir = TempDir::new("id3codec").unwrap();
    let path = tmp_dir.path().join("file1.txt");
    File::create(&path).unwrap().write_all(b"abcdefghijklmnopqrst").unwrap();

    let mut readable = File::open(&path).unwrap();
    assert_eq!(readable.total_len().unwrap(), 20);
    assert!(readable.read_bytes(10).is_ok());
    assert!(readable.read_bytes(10).is_ok());
    assert_eq!(readable.skip_bytes(-5).unwrap(), 15);
    assert_eq!(readable.read_string(5).unwrap(), "pqrst");
    assert!(readable.read_bytes(10).is_err());

    assert_eq!(readable.seek_to(5).unwrap(), 5);
    assert_eq!(readable.read_string(5).unwrap(), "fghij");
}
