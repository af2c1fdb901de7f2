//! # streamflate-deflate
//!
//! A streaming DEFLATE (RFC 1951) encoder wrapped in a zlib (RFC 1950)
//! container.
//!
//! This crate is encode-only: it has no public decompressor. Its output is
//! verified, in this crate's own tests, against a reference decoder kept
//! under `tests/support` rather than in `src/`.
//!
//! ## Example
//!
//! ```rust
//! use streamflate_deflate::{compress, Mode};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = compress(original, 15, Mode::Dynamic).unwrap();
//! assert_eq!(&compressed[..2], &[0x78, 0x9C]);
//! ```
//!
//! ## Block modes
//!
//! - [`Mode::Stored`]: no compression, blocks are copied through verbatim.
//! - [`Mode::Fixed`]: LZ77 matching with the predefined Huffman tables.
//! - [`Mode::Dynamic`]: LZ77 matching with per-block Huffman tables.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adler32;
pub mod bitsink;
pub mod block;
pub mod encoder;
pub mod error;
pub mod huffman;
pub mod lz77;
pub mod rle;
pub mod tables;
pub mod zlib;

pub use adler32::{Adler32, adler32 as checksum};
pub use encoder::{Encoder, EvalStatus, FlushRequest, Mode};
pub use error::EncoderError;
pub use zlib::{CompressorAdapter, compress};
