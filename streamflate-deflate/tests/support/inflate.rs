//! A from-scratch RFC 1951 DEFLATE decoder plus RFC 1950 zlib unwrapping,
//! used only to check that this crate's encoder produces decodable,
//! round-trippable output. This is deliberately independent of any
//! encode-side code: it builds its own canonical-Huffman decode tables
//! rather than reusing [`streamflate_deflate::huffman`], so a bug shared
//! between encoder and "decoder" can't hide from these tests.

use std::io::{Cursor, Read};

use streamflate_core::bitstream::BitReader;
use streamflate_core::error::CoreError;
use streamflate_core::ringbuffer::OutputRingBuffer;
use streamflate_deflate::checksum;
use streamflate_deflate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS, decode_distance, decode_length,
    fixed_distance_lengths, fixed_litlen_lengths,
};

const MAX_BITS: usize = 15;
const END_OF_BLOCK: u16 = 256;

/// A canonical Huffman decode table built directly from a code-length
/// array, independent of how `streamflate_deflate::huffman` builds its
/// encode-side codes.
struct HuffmanTable {
    counts: [u16; MAX_BITS + 1],
    symbols: Vec<u16>,
}

impl HuffmanTable {
    fn build(lengths: &[u8]) -> Self {
        let mut counts = [0u16; MAX_BITS + 1];
        for &len in lengths {
            counts[len as usize] += 1;
        }
        counts[0] = 0;

        let mut offsets = [0u16; MAX_BITS + 2];
        for len in 1..=MAX_BITS {
            offsets[len + 1] = offsets[len] + counts[len];
        }

        let mut symbols = vec![0u16; lengths.len()];
        let mut next = offsets;
        for (sym, &len) in lengths.iter().enumerate() {
            if len != 0 {
                symbols[next[len as usize] as usize] = sym as u16;
                next[len as usize] += 1;
            }
        }

        Self { counts, symbols }
    }

    fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16, CoreError> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;

        for len in 1..=MAX_BITS {
            code |= reader.read_bits(1)? as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                return Ok(self.symbols[(index + (code - first)) as usize]);
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }

        Err(CoreError::corrupted(
            reader.bit_position() / 8,
            "no matching Huffman code of length <= 15",
        ))
    }
}

fn read_code_length_table<R: Read>(
    reader: &mut BitReader<R>,
    hclen: usize,
) -> Result<[u8; 19], CoreError> {
    let mut lengths = [0u8; 19];
    for &position in CODE_LENGTH_ORDER.iter().take(hclen) {
        lengths[position] = reader.read_bits(3)? as u8;
    }
    Ok(lengths)
}

fn read_combined_lengths<R: Read>(
    reader: &mut BitReader<R>,
    code_length_table: &HuffmanTable,
    total: usize,
) -> Result<Vec<u8>, CoreError> {
    let mut lengths = Vec::with_capacity(total);
    let mut prev = 0u8;

    while lengths.len() < total {
        let symbol = code_length_table.decode(reader)?;
        match symbol {
            0..=15 => {
                lengths.push(symbol as u8);
                prev = symbol as u8;
            }
            16 => {
                let repeat = 3 + reader.read_bits(2)?;
                for _ in 0..repeat {
                    lengths.push(prev);
                }
            }
            17 => {
                let repeat = 3 + reader.read_bits(3)?;
                for _ in 0..repeat {
                    lengths.push(0);
                }
            }
            18 => {
                let repeat = 11 + reader.read_bits(7)?;
                for _ in 0..repeat {
                    lengths.push(0);
                }
            }
            other => {
                return Err(CoreError::corrupted(
                    reader.bit_position() / 8,
                    format!("invalid code-length symbol {other}"),
                ));
            }
        }
    }

    Ok(lengths)
}

fn decode_compressed_block<R: Read>(
    reader: &mut BitReader<R>,
    litlen_table: &HuffmanTable,
    dist_table: &HuffmanTable,
    out: &mut OutputRingBuffer,
) -> Result<(), CoreError> {
    loop {
        let symbol = litlen_table.decode(reader)?;
        match symbol {
            0..=255 => out.write_literal(symbol as u8),
            s if s as u16 == END_OF_BLOCK => return Ok(()),
            257..=285 => {
                let extra_bits = LENGTH_EXTRA_BITS[(symbol - 257) as usize];
                let extra = reader.read_bits(extra_bits)? as u16;
                let length = decode_length(symbol, extra);

                let dist_symbol = dist_table.decode(reader)?;
                let dist_extra_bits = DISTANCE_EXTRA_BITS[dist_symbol as usize];
                let dist_extra = reader.read_bits(dist_extra_bits)? as u16;
                let distance = decode_distance(dist_symbol, dist_extra);

                out.copy_match(distance as usize, length as usize)?;
            }
            other => {
                return Err(CoreError::corrupted(
                    reader.bit_position() / 8,
                    format!("invalid literal/length symbol {other}"),
                ));
            }
        }
    }
}

/// Decode a raw RFC 1951 DEFLATE stream (no zlib framing).
pub fn inflate(data: &[u8], window_bits: u8) -> Result<Vec<u8>, CoreError> {
    let window_size = streamflate_core::ringbuffer::sizes::for_window_bits(window_bits);
    let mut out = OutputRingBuffer::new(window_size);
    let mut reader = BitReader::new(Cursor::new(data));

    let fixed_litlen = HuffmanTable::build(&fixed_litlen_lengths());
    let fixed_dist = HuffmanTable::build(&fixed_distance_lengths());

    loop {
        let is_final = reader.read_bit()?;
        let btype = reader.read_bits(2)?;

        match btype {
            0b00 => {
                reader.align_to_byte();
                let len = reader.read_bits(16)? as u16;
                let _nlen = reader.read_bits(16)? as u16;
                let mut buf = vec![0u8; len as usize];
                reader.read_bytes(&mut buf)?;
                out.write_literals(&buf);
            }
            0b01 => {
                decode_compressed_block(&mut reader, &fixed_litlen, &fixed_dist, &mut out)?;
            }
            0b10 => {
                let hlit = reader.read_bits(5)? as usize + 257;
                let hdist = reader.read_bits(5)? as usize + 1;
                let hclen = reader.read_bits(4)? as usize + 4;

                let code_length_lengths = read_code_length_table(&mut reader, hclen)?;
                let code_length_table = HuffmanTable::build(&code_length_lengths);

                let combined = read_combined_lengths(&mut reader, &code_length_table, hlit + hdist)?;
                let litlen_lengths = &combined[..hlit];
                let dist_lengths = &combined[hlit..];

                let litlen_table = HuffmanTable::build(litlen_lengths);
                let dist_table = HuffmanTable::build(dist_lengths);

                decode_compressed_block(&mut reader, &litlen_table, &dist_table, &mut out)?;
            }
            _ => {
                return Err(CoreError::corrupted(
                    reader.bit_position() / 8,
                    "reserved block type 11",
                ));
            }
        }

        if is_final {
            break;
        }
    }

    Ok(out.into_output())
}

/// Unwrap and decode a complete zlib stream, checking the header's mod-31
/// invariant and the trailing Adler-32 checksum against the decoded bytes.
pub fn inflate_zlib(stream: &[u8]) -> Vec<u8> {
    assert!(stream.len() >= 6, "zlib stream too short");

    let cmf = stream[0];
    let flg = stream[1];
    assert_eq!((cmf as u32 * 256 + flg as u32) % 31, 0, "bad zlib header checksum");
    assert_eq!(cmf & 0x0F, 8, "unsupported compression method");
    assert_eq!(flg & 0x20, 0, "preset dictionaries are not supported");

    let window_bits = (cmf >> 4) + 8;
    let payload = &stream[2..stream.len() - 4];
    let trailer = &stream[stream.len() - 4..];

    let decoded = inflate(payload, window_bits).expect("payload must decode");

    let expected_checksum = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    assert_eq!(
        checksum(&decoded),
        expected_checksum,
        "Adler-32 trailer does not match decoded output"
    );

    decoded
}
