//! # streamflate-core
//!
//! Shared bit-level I/O, a sliding-window history buffer, and streaming
//! traits used across the `streamflate` workspace.
//!
//! - [`bitstream`]: Bit-level reader for variable-length codes (Huffman, etc.)
//! - [`ringbuffer`]: Sliding window buffer used by the test-only reference
//!   inflater to verify encoder output.
//! - [`traits`]: `Compressor`/`FlushMode` trait family for streaming encoders.
//! - [`error`]: Error types.
//!
//! ## Example
//!
//! ```rust
//! use streamflate_core::bitstream::BitReader;
//! use std::io::Cursor;
//!
//! let data = vec![0xAB, 0xCD];
//! let mut reader = BitReader::new(Cursor::new(data));
//! let bits = reader.read_bits(12).unwrap();
//! assert_eq!(bits, 0xBAB);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod ringbuffer;
pub mod traits;

pub use bitstream::BitReader;
pub use error::{CoreError, Result};
pub use ringbuffer::{OutputRingBuffer, RingBuffer};
pub use traits::{CompressStatus, Compressor, FlushMode};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitReader;
    pub use crate::error::{CoreError, Result};
    pub use crate::ringbuffer::{OutputRingBuffer, RingBuffer};
    pub use crate::traits::{CompressStatus, Compressor, FlushMode};
}
