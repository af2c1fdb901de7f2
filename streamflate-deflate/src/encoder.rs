//! The streaming DEFLATE encoder state machine.
//!
//! Unlike [`crate::lz77::Lz77Encoder`] or [`crate::block`], which each do
//! one unit of work given all their input up front, [`Encoder`] is built to
//! be *suspended*: the caller refills it with whatever input is currently
//! available, drives it forward with [`Encoder::eval`], and drains whatever
//! output has accumulated — in any order, repeated as many times as
//! needed. This lets a caller compress a stream whose total length it
//! cannot know in advance, one buffer at a time, without the encoder ever
//! blocking on I/O itself.
//!
//! The driver suspends at block and token granularity rather than
//! mid-bit-write: it never begins writing a token's codes without having
//! already decided, from buffered input and the caller's `last` signal,
//! that it has enough information to finish that token.

use crate::bitsink::BitSink;
use crate::block;
use crate::lz77::Lz77Encoder;
use crate::error::{EncoderError, Result};

/// How a block's contents should be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No compression; each block is copied through verbatim.
    Stored,
    /// LZ77 matching with the predefined fixed Huffman tables.
    Fixed,
    /// LZ77 matching with Huffman tables built per block from its own
    /// symbol frequencies.
    Dynamic,
}

/// A request to close out the current block early and make its output
/// available to the caller, without ending the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushRequest {
    /// Close the current block and start a new one; no state is reset.
    Sync,
    /// Like [`Self::Sync`], but also discards LZ77 match-finder history,
    /// so nothing after this point can reference data before it.
    Full,
}

/// Outcome of a call to [`Encoder::eval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalStatus {
    /// Progress was made; call `eval` again to continue.
    Ok,
    /// A block boundary (or requested flush point) was just written;
    /// output is available via [`Encoder::contents`].
    Flush,
    /// No more progress is possible without more input — call
    /// [`Encoder::refill`] or [`Encoder::last`] and call `eval` again.
    Wait,
}

/// Minimum amount of unconsumed input the driver wants buffered before it
/// will commit to ending a block, so the LZ77 lookahead used for lazy
/// matching has room to work near the tail of what's been refilled.
const LOOKAHEAD_SLACK: usize = crate::lz77::MAX_MATCH;

/// Target number of input bytes to gather into a single block before
/// emitting it, when nothing forces an earlier boundary.
const BLOCK_INPUT_TARGET: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Gathering,
    Trailer,
    Done,
}

/// A suspendable, pull-driven DEFLATE encoder.
///
/// `Encoder` never touches a reader or writer. The caller owns both ends:
/// it pushes input in with [`Self::refill`], tells the encoder when no more
/// is coming with [`Self::last`], steps the state machine with
/// [`Self::eval`], and reads finished bytes back out through
/// [`Self::contents`] / [`Self::consume`].
#[derive(Debug)]
pub struct Encoder {
    mode: Mode,
    window_bits: u8,
    lz77: Lz77Encoder,
    sink: BitSink,
    input: Vec<u8>,
    is_last: bool,
    pending_flush: Option<FlushRequest>,
    stage: Stage,
}

impl Encoder {
    /// Create a new encoder with a `2^window_bits` byte match-finding
    /// window (8..=15), emitting blocks in the given `mode`.
    pub fn new(window_bits: u8, mode: Mode) -> Result<Self> {
        if !(8..=15).contains(&window_bits) {
            return Err(EncoderError::invariant(format!(
                "window_bits must be in 8..=15, got {window_bits}"
            )));
        }

        Ok(Self {
            mode,
            window_bits,
            lz77: Lz77Encoder::new(window_bits),
            sink: BitSink::new(),
            input: Vec::new(),
            is_last: false,
            pending_flush: None,
            stage: Stage::Gathering,
        })
    }

    /// Append more input to encode.
    pub fn refill(&mut self, data: &[u8]) {
        self.input.extend_from_slice(data);
    }

    /// Tell the encoder that no more input will ever be refilled. The
    /// driver will close out the stream once the buffered input is
    /// consumed, rather than waiting indefinitely for more.
    pub fn last(&mut self, is_last: bool) {
        self.is_last = is_last;
    }

    /// Request that the current block be closed out early at the next safe
    /// point, without ending the stream.
    pub fn flush(&mut self, request: FlushRequest) {
        self.pending_flush = Some(request);
    }

    /// Currently available output bytes.
    pub fn contents(&self) -> &[u8] {
        self.sink.contents()
    }

    /// Remove the first `n` bytes of [`Self::contents`], once the caller
    /// has copied them out.
    pub fn consume(&mut self, n: usize) {
        self.sink.consume(n);
    }

    /// Whether the stream has been fully written (trailer included).
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Drive the state machine forward by one step.
    pub fn eval(&mut self) -> Result<EvalStatus> {
        match self.stage {
            Stage::Done => Ok(EvalStatus::Ok),
            Stage::Trailer => {
                self.stage = Stage::Done;
                Ok(EvalStatus::Ok)
            }
            Stage::Gathering => self.eval_gathering(),
        }
    }

    fn eval_gathering(&mut self) -> Result<EvalStatus> {
        let flush_requested = self.pending_flush.is_some();
        let have_enough_to_close =
            self.is_last || self.input.len() >= BLOCK_INPUT_TARGET + LOOKAHEAD_SLACK;

        if self.input.is_empty() && !self.is_last && !flush_requested {
            return Ok(EvalStatus::Wait);
        }

        if self.input.is_empty() && self.is_last {
            self.emit_block(&[], true);
            self.stage = Stage::Trailer;
            return Ok(EvalStatus::Flush);
        }

        if self.input.is_empty() && flush_requested {
            // Nothing new was gathered to close out; the flush sentinel
            // alone is enough (avoids emitting a spurious empty block).
            block::write_stored_block(&mut self.sink, &[], false);
            if let Some(request) = self.pending_flush.take() {
                if matches!(request, FlushRequest::Full) {
                    self.lz77.reset();
                }
            }
            return Ok(EvalStatus::Flush);
        }

        if !have_enough_to_close && !flush_requested {
            return Ok(EvalStatus::Wait);
        }

        let take = if self.is_last {
            self.input.len()
        } else {
            self.input.len().min(BLOCK_INPUT_TARGET)
        };
        let chunk: Vec<u8> = self.input.drain(..take).collect();
        let is_final_block = self.is_last && self.input.is_empty();

        self.emit_block(&chunk, is_final_block);

        if let Some(request) = self.pending_flush.take() {
            // A closed-out stored-block sentinel (aligned, LEN=0) marks the
            // flush point the way zlib's Z_SYNC_FLUSH does, so a decoder
            // stopped here sees a clean byte-aligned boundary.
            if !is_final_block {
                block::write_stored_block(&mut self.sink, &[], false);
            }
            if matches!(request, FlushRequest::Full) {
                self.lz77.reset();
            }
        }

        if is_final_block {
            self.stage = Stage::Trailer;
        }

        Ok(EvalStatus::Flush)
    }

    fn emit_block(&mut self, chunk: &[u8], is_final: bool) {
        match self.mode {
            Mode::Stored => {
                for part in chunk.chunks(block::MAX_STORED_BLOCK).enumerate() {
                    let (i, data) = part;
                    let is_last_part = (i + 1) * block::MAX_STORED_BLOCK >= chunk.len();
                    block::write_stored_block(&mut self.sink, data, is_final && is_last_part);
                }
                if chunk.is_empty() {
                    block::write_stored_block(&mut self.sink, &[], is_final);
                }
            }
            Mode::Fixed => {
                let tokens = self.lz77.compress(chunk);
                block::write_fixed_block(&mut self.sink, &tokens, is_final);
            }
            Mode::Dynamic => {
                let tokens = self.lz77.compress(chunk);
                if tokens.is_empty() {
                    // A dynamic header for zero symbols is all overhead: the
                    // HLIT/HDIST/HCLEN table plus the RLE of 257 zero
                    // lengths costs far more than just emitting a fixed
                    // block, and a fixed block's EOB-only body is exactly
                    // the same two bytes real zlib emits for trivial input.
                    block::write_fixed_block(&mut self.sink, &tokens, is_final);
                } else {
                    block::write_dynamic_block(&mut self.sink, &tokens, is_final);
                }
            }
        }
    }

    /// The configured window size in bits.
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }
}
