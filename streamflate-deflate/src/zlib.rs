//! RFC 1950 zlib framing around the DEFLATE bitstream.
//!
//! A zlib stream is a 2-byte header, a raw DEFLATE payload, and a 4-byte
//! big-endian Adler-32 trailer over the *uncompressed* input. This module
//! owns all three; [`crate::encoder::Encoder`] only ever produces the
//! middle part.

use streamflate_core::error::CoreError;
use streamflate_core::traits::{CompressStatus, Compressor, FlushMode};

use crate::adler32::Adler32;
use crate::encoder::{Encoder, EvalStatus, Mode};
use crate::error::{EncoderError, Result};

/// CINFO/CM byte: CM=8 (the only method RFC 1950 defines), CINFO derived
/// from the match-finding window size.
fn cmf_byte(window_bits: u8) -> u8 {
    debug_assert!((8..=15).contains(&window_bits));
    let cinfo = window_bits - 8;
    (cinfo << 4) | 0x08
}

/// Build the 2-byte zlib header for a given window size.
///
/// FLEVEL is fixed at 2 ("default algorithm") regardless of `mode`: FLEVEL
/// is advisory only, and this crate does not expose zlib's separate
/// compression-level concept.
pub fn header_bytes(window_bits: u8) -> [u8; 2] {
    let cmf = cmf_byte(window_bits);
    let flevel = 0b10u8;
    let fdict = 0u8;

    // Choose FCHECK so that CMF*256 + FLG is a multiple of 31.
    let partial = (flevel << 6) | (fdict << 5);
    let remainder = ((cmf as u32) * 256 + partial as u32) % 31;
    let fcheck = if remainder == 0 { 0 } else { 31 - remainder } as u8;
    let flg = partial | fcheck;

    [cmf, flg]
}

/// Compress `input` into a complete zlib stream in one call.
pub fn compress(input: &[u8], window_bits: u8, mode: Mode) -> Result<Vec<u8>> {
    let mut out = Vec::from(header_bytes(window_bits));

    let mut encoder = Encoder::new(window_bits, mode)?;
    encoder.refill(input);
    encoder.last(true);

    loop {
        match encoder.eval()? {
            EvalStatus::Flush => {
                out.extend_from_slice(encoder.contents());
                let len = encoder.contents().len();
                encoder.consume(len);
            }
            EvalStatus::Ok => {
                if encoder.is_finished() {
                    break;
                }
            }
            EvalStatus::Wait => {
                return Err(EncoderError::invariant(
                    "eval returned Wait after input was marked last",
                ));
            }
        }
    }
    out.extend_from_slice(encoder.contents());
    out.extend_from_slice(&crate::adler32::adler32(input).to_be_bytes());

    Ok(out)
}

#[derive(Debug, PartialEq, Eq)]
enum AdapterStage {
    Header,
    Body,
    Trailer,
    Done,
}

/// A [`Compressor`]-trait wrapper over [`Encoder`] that produces a genuine
/// zlib stream (header and Adler-32 trailer included) through the
/// consumed/produced/status interface instead of `Encoder`'s native
/// refill/eval/contents API.
#[derive(Debug)]
pub struct CompressorAdapter {
    encoder: Encoder,
    adler: Adler32,
    window_bits: u8,
    mode: Mode,
    stage: AdapterStage,
    header: Vec<u8>,
    trailer: Vec<u8>,
}

impl CompressorAdapter {
    /// Create a new adapter with a `2^window_bits` byte window, emitting
    /// blocks in the given `mode`.
    pub fn new(window_bits: u8, mode: Mode) -> Result<Self> {
        Ok(Self {
            encoder: Encoder::new(window_bits, mode)?,
            adler: Adler32::new(),
            window_bits,
            mode,
            stage: AdapterStage::Header,
            header: header_bytes(window_bits).to_vec(),
            trailer: Vec::new(),
        })
    }

    fn core_err(err: EncoderError) -> CoreError {
        CoreError::invalid_header(err.to_string())
    }
}

impl Compressor for CompressorAdapter {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> streamflate_core::error::Result<(usize, usize, CompressStatus)> {
        let mut produced = 0;

        if self.stage == AdapterStage::Header {
            let take = output.len().min(self.header.len());
            output[..take].copy_from_slice(&self.header[..take]);
            produced += take;
            self.header.drain(..take);
            if self.header.is_empty() {
                self.stage = AdapterStage::Body;
            } else {
                return Ok((0, produced, CompressStatus::NeedsOutput));
            }
        }

        let mut consumed = 0;
        if self.stage == AdapterStage::Body {
            self.encoder.refill(input);
            self.adler.update(input);
            consumed = input.len();

            match flush {
                FlushMode::Finish => self.encoder.last(true),
                FlushMode::Sync => self.encoder.flush(crate::encoder::FlushRequest::Sync),
                FlushMode::Full => self.encoder.flush(crate::encoder::FlushRequest::Full),
                FlushMode::None => {}
            }

            loop {
                if produced >= output.len() {
                    break;
                }
                match self.encoder.eval().map_err(Self::core_err)? {
                    EvalStatus::Flush => {
                        let chunk_len = self.encoder.contents().len();
                        if produced + chunk_len > output.len() {
                            break;
                        }
                        output[produced..produced + chunk_len]
                            .copy_from_slice(self.encoder.contents());
                        produced += chunk_len;
                        self.encoder.consume(chunk_len);
                    }
                    EvalStatus::Ok => {
                        if self.encoder.is_finished() {
                            self.trailer = self.adler.finalize().to_be_bytes().to_vec();
                            self.stage = AdapterStage::Trailer;
                        }
                        break;
                    }
                    EvalStatus::Wait => break,
                }
            }
        }

        if self.stage == AdapterStage::Trailer {
            let remaining = output.len() - produced;
            let take = remaining.min(self.trailer.len());
            output[produced..produced + take].copy_from_slice(&self.trailer[..take]);
            produced += take;
            self.trailer.drain(..take);
            if self.trailer.is_empty() {
                self.stage = AdapterStage::Done;
            }
        }

        let status = match self.stage {
            AdapterStage::Done => CompressStatus::Done,
            _ if produced == output.len() => CompressStatus::NeedsOutput,
            _ => CompressStatus::NeedsInput,
        };

        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        if let Ok(encoder) = Encoder::new(self.window_bits, self.mode) {
            self.encoder = encoder;
        }
        self.adler = Adler32::new();
        self.stage = AdapterStage::Header;
        self.header = header_bytes(self.window_bits).to_vec();
        self.trailer.clear();
    }

    fn is_finished(&self) -> bool {
        self.stage == AdapterStage::Done
    }
}
