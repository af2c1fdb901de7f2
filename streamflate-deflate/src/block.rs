//! DEFLATE block emitters (RFC 1951 §3.2.3 - §3.2.7).
//!
//! Each function here writes exactly one complete block — a 3-bit header
//! followed by the block's body — into a [`BitSink`]. The encoder driver
//! decides which kind of block to emit and chunks its input accordingly;
//! this module only knows how to serialize a block once that decision and
//! its data are in hand.

use crate::bitsink::BitSink;
use crate::huffman::{self, HuffmanBuilder, END_OF_BLOCK};
use crate::lz77::Lz77Token;
use crate::rle;
use crate::tables::{CODE_LENGTH_ORDER, distance_to_code, fixed_litlen_lengths, length_to_code};

/// Largest payload a single stored block can carry (LEN is a 16-bit field).
pub const MAX_STORED_BLOCK: usize = 65535;

fn write_code(sink: &mut BitSink, code: huffman::Code) {
    sink.write_bits(code.bits, code.length);
}

/// Write one stored (uncompressed) block.
///
/// # Panics
///
/// Panics if `data.len()` exceeds [`MAX_STORED_BLOCK`].
pub fn write_stored_block(sink: &mut BitSink, data: &[u8], is_final: bool) {
    assert!(data.len() <= MAX_STORED_BLOCK, "stored block too large");

    sink.write_bit(is_final);
    sink.write_bits(0b00, 2); // BTYPE=00
    sink.align_to_byte();

    let len = data.len() as u16;
    let nlen = !len;
    sink.write_bits(len as u32, 16);
    sink.write_bits(nlen as u32, 16);
    sink.write_bytes(data);
}

/// Write one block using the fixed Huffman codes (RFC 1951 §3.2.6).
pub fn write_fixed_block(sink: &mut BitSink, tokens: &[Lz77Token], is_final: bool) {
    sink.write_bit(is_final);
    sink.write_bits(0b01, 2); // BTYPE=01

    let litlen_codes = huffman::build_codes(&fixed_litlen_lengths());

    for token in tokens {
        match token {
            Lz77Token::Literal(byte) => {
                write_code(sink, litlen_codes[*byte as usize]);
            }
            Lz77Token::Match { length, distance } => {
                let (len_code, len_extra_bits, len_extra) = length_to_code(*length);
                write_code(sink, litlen_codes[len_code as usize]);
                if len_extra_bits > 0 {
                    sink.write_bits(len_extra as u32, len_extra_bits);
                }

                let (dist_code, dist_extra_bits, dist_extra) = distance_to_code(*distance);
                let reversed_dist = huffman::reverse_bits(dist_code, 5);
                sink.write_bits(reversed_dist as u32, 5);
                if dist_extra_bits > 0 {
                    sink.write_bits(dist_extra as u32, dist_extra_bits);
                }
            }
        }
    }

    write_code(sink, litlen_codes[END_OF_BLOCK as usize]);
}

/// Write one block using dynamically-built Huffman codes (RFC 1951 §3.2.7).
pub fn write_dynamic_block(sink: &mut BitSink, tokens: &[Lz77Token], is_final: bool) {
    let (litlen_freq, dist_freq) = count_frequencies(tokens);

    let mut litlen_builder = HuffmanBuilder::new(286, 15);
    for (sym, &freq) in litlen_freq.iter().enumerate() {
        if freq > 0 {
            litlen_builder.add_count(sym as u16, freq);
        }
    }
    if litlen_freq[END_OF_BLOCK as usize] == 0 {
        litlen_builder.add_count(END_OF_BLOCK, 1);
    }
    let litlen_lengths = litlen_builder.build_lengths();

    let mut dist_builder = HuffmanBuilder::new(30, 15);
    for (sym, &freq) in dist_freq.iter().enumerate() {
        if freq > 0 {
            dist_builder.add_count(sym as u16, freq);
        }
    }
    // RFC 1951 requires at least one distance code even when no matches
    // were emitted; a single zero-length code keeps HDIST well-formed.
    if dist_freq.iter().all(|&f| f == 0) {
        dist_builder.add_count(0, 1);
    }
    let dist_lengths = dist_builder.build_lengths();

    sink.write_bit(is_final);
    sink.write_bits(0b10, 2); // BTYPE=10

    let hlit = find_last_nonzero(&litlen_lengths, 257).saturating_sub(257);
    let hdist = find_last_nonzero(&dist_lengths, 1).saturating_sub(1);

    let combined_lengths = combine_lengths(&litlen_lengths, &dist_lengths, hlit, hdist);
    let (codelen_symbols, codelen_freqs) = rle::encode(&combined_lengths);

    let mut codelen_builder = HuffmanBuilder::new(19, 7);
    for (sym, &freq) in codelen_freqs.iter().enumerate() {
        if freq > 0 {
            codelen_builder.add_count(sym as u16, freq);
        }
    }
    let codelen_lengths = codelen_builder.build_lengths();
    let hclen = find_hclen(&codelen_lengths);

    sink.write_bits(hlit as u32, 5);
    sink.write_bits(hdist as u32, 5);
    sink.write_bits(hclen as u32, 4);

    for i in 0..hclen + 4 {
        let len = codelen_lengths[CODE_LENGTH_ORDER[i]];
        sink.write_bits(len as u32, 3);
    }

    let codelen_codes = huffman::build_codes(&codelen_lengths);
    for &(sym, extra, extra_bits) in &codelen_symbols {
        let code = codelen_codes[sym as usize];
        if code.length > 0 {
            write_code(sink, code);
            if extra_bits > 0 {
                sink.write_bits(extra as u32, extra_bits);
            }
        }
    }

    let litlen_codes = huffman::build_codes(&litlen_lengths);
    let dist_codes = huffman::build_codes(&dist_lengths);

    for token in tokens {
        match token {
            Lz77Token::Literal(byte) => {
                let code = litlen_codes[*byte as usize];
                if code.length > 0 {
                    write_code(sink, code);
                }
            }
            Lz77Token::Match { length, distance } => {
                let (len_code, len_extra_bits, len_extra) = length_to_code(*length);
                let code = litlen_codes[len_code as usize];
                if code.length > 0 {
                    write_code(sink, code);
                    if len_extra_bits > 0 {
                        sink.write_bits(len_extra as u32, len_extra_bits);
                    }
                }

                let (dist_code, dist_extra_bits, dist_extra) = distance_to_code(*distance);
                let dcode = dist_codes[dist_code as usize];
                if dcode.length > 0 {
                    write_code(sink, dcode);
                    if dist_extra_bits > 0 {
                        sink.write_bits(dist_extra as u32, dist_extra_bits);
                    }
                }
            }
        }
    }

    let eob = litlen_codes[END_OF_BLOCK as usize];
    if eob.length > 0 {
        write_code(sink, eob);
    }
}

/// Count literal/length and distance symbol frequencies across a token
/// stream, always including one count for the end-of-block symbol.
pub fn count_frequencies(tokens: &[Lz77Token]) -> ([u32; 286], [u32; 30]) {
    let mut litlen_freq = [0u32; 286];
    let mut dist_freq = [0u32; 30];

    for token in tokens {
        match token {
            Lz77Token::Literal(byte) => {
                litlen_freq[*byte as usize] += 1;
            }
            Lz77Token::Match { length, distance } => {
                let (len_code, _, _) = length_to_code(*length);
                litlen_freq[len_code as usize] += 1;

                let (dist_code, _, _) = distance_to_code(*distance);
                dist_freq[dist_code as usize] += 1;
            }
        }
    }
    litlen_freq[END_OF_BLOCK as usize] += 1;

    (litlen_freq, dist_freq)
}

fn find_last_nonzero(lengths: &[u8], min: usize) -> usize {
    let mut last = min;
    for (i, &len) in lengths.iter().enumerate() {
        if len > 0 && i >= min {
            last = i + 1;
        }
    }
    last.max(min)
}

fn combine_lengths(litlen_lengths: &[u8], dist_lengths: &[u8], hlit: usize, hdist: usize) -> Vec<u8> {
    let mut combined = Vec::with_capacity(hlit + 257 + hdist + 1);
    combined.extend_from_slice(&litlen_lengths[..hlit + 257]);
    combined.extend_from_slice(&dist_lengths[..hdist + 1]);
    combined
}

fn find_hclen(codelen_lengths: &[u8]) -> usize {
    for i in (0..=15).rev() {
        if codelen_lengths[CODE_LENGTH_ORDER[i + 4 - 1]] != 0 {
            return i;
        }
    }
    0
}
