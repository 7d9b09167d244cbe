//!
//! # Usage
//!
//! This can be used by adding `id3codec` to your dependencies in your project's `Cargo.toml`.
//!
//! ```toml
//! [dependencies]
//! id3codec = "0.1"
//! ```
//!
//! and this to your crate root:
//!
//! ```rust
//! extern crate id3codec;
//! ```
//!
//! # Example: build, save and read back a tag
//!
//! Field accessors come from the [Metadata](fields/trait.Metadata.html) trait.
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use id3codec::fields::Metadata;
//! use id3codec::frame::Version;
//! use id3codec::metadata::read_any;
//! use id3codec::tag::Tag;
//!
//! let mut tag = Tag::new(Version::V23);
//! tag.set_title("You Are The One").unwrap();
//! tag.set_track_number(1, 11).unwrap();
//! tag.set_file_data(b"audio".to_vec());
//!
//! let mut out = Cursor::new(vec![]);
//! tag.save(&mut out).unwrap();
//!
//! let tag = read_any(&mut out).unwrap();
//! assert_eq!(tag.title().unwrap(), "You Are The One");
//! assert_eq!(tag.track_number().unwrap(), (1, 11));
//! ```
//!
//! # Example: fields a version does not have
//!
//! ```rust
//! use id3codec::errors::TagError;
//! use id3codec::fields::Metadata;
//! use id3codec::frame::Version;
//! use id3codec::tag::Tag;
//!
//! let tag = Tag::new(Version::V22);
//! match tag.album_artist() {
//!     Err(TagError::UnsupportedField(..)) => (),
//!     _ => panic!("2.2 has no album artist")
//! }
//! ```
//!
//! # Example: frames without a field
//!
//!```rust
//! use id3codec::fields::Metadata;
//! use id3codec::frame::Version;
//! use id3codec::tag::{FrameKind, FrameStore, Tag};
//!
//! let mut tag = Tag::new(Version::V24);
//! tag.put_frame("PRIV", b"owner\x00data".to_vec()).unwrap();
//! tag.set_text("TKEY", "Am").unwrap();
//!
//! assert_eq!(tag.frame_kind("PRIV"), Some(FrameKind::Opaque));
//! assert_eq!(tag.text("TKEY").unwrap(), "Am");
//!```
extern crate chrono;
extern crate encoding;
#[macro_use]
extern crate log;
extern crate regex;
extern crate serde;
#[macro_use]
extern crate serde_derive;

pub mod bytes;
pub mod errors;
pub mod fields;
pub mod frame;
pub mod genre;
pub mod metadata;
pub mod picture;
pub mod readable;
pub mod tag;
pub mod text;
pub mod writable;
mod util;

pub use errors::{Result, TagError};
pub use fields::{Field, FieldValue, Metadata};
pub use frame::Version;
pub use metadata::{detect_version, read_any, read_file, read_tag};
pub use picture::{AttachedPicture, ImageCodec, PictureType};
pub use tag::{FrameStore, Tag};
