//! Run-length compression of a code-length table (RFC 1951 §3.2.7).
//!
//! Dynamic Huffman blocks transmit the literal/length and distance code
//! lengths as a single combined sequence, which is itself run-length
//! encoded over a 19-symbol meta-alphabet before being Huffman-coded:
//!
//! - symbol 16: repeat the previous length 3-6 times (2 extra bits)
//! - symbol 17: repeat a zero length 3-10 times (3 extra bits)
//! - symbol 18: repeat a zero length 11-138 times (7 extra bits)
//! - symbols 0-15: a literal code length

use crate::huffman::CODELEN_ALPHABET_SIZE;

/// One entry of the run-length-encoded code-length stream: the meta-symbol,
/// its extra-bit value, and how many extra bits that value occupies.
pub type RleSymbol = (u8, u8, u8);

/// Greedily take up to `max_count` repeats from `remaining`, but never so
/// many that the leftover is 1 or 2 — that would force a lone symbol the
/// alphabet can't express as a further repeat. Shorten this chunk by 3
/// instead, pushing the leftover up to at least 3.
fn take_run(remaining: usize, max_count: usize) -> usize {
    let mut count = remaining.min(max_count);
    if count == max_count {
        let leftover = remaining - count;
        if leftover == 1 || leftover == 2 {
            count -= 3;
        }
    }
    count
}

/// Run-length encode a table of code lengths, returning the RLE symbol
/// stream and the frequency of each of the 19 meta-symbols (for building
/// the code-length Huffman tree).
pub fn encode(lengths: &[u8]) -> (Vec<RleSymbol>, [u32; CODELEN_ALPHABET_SIZE]) {
    let mut symbols = Vec::new();
    let mut freq = [0u32; CODELEN_ALPHABET_SIZE];
    let mut i = 0;

    while i < lengths.len() {
        let value = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut remaining = run;
            while remaining > 0 {
                if remaining >= 11 {
                    let count = take_run(remaining, 138);
                    symbols.push((18u8, (count - 11) as u8, 7u8));
                    freq[18] += 1;
                    remaining -= count;
                } else if remaining >= 3 {
                    let count = take_run(remaining, 10);
                    symbols.push((17u8, (count - 3) as u8, 3u8));
                    freq[17] += 1;
                    remaining -= count;
                } else {
                    symbols.push((0u8, 0, 0));
                    freq[0] += 1;
                    remaining -= 1;
                }
            }
        } else {
            symbols.push((value, 0, 0));
            freq[value as usize] += 1;
            let mut remaining = run - 1;

            while remaining > 0 {
                if remaining >= 3 {
                    let count = take_run(remaining, 6);
                    symbols.push((16u8, (count - 3) as u8, 2u8));
                    freq[16] += 1;
                    remaining -= count;
                } else {
                    symbols.push((value, 0, 0));
                    freq[value as usize] += 1;
                    remaining -= 1;
                }
            }
        }

        i += run;
    }

    (symbols, freq)
}
