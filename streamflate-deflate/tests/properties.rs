//! Property-style checks run over a curated set of input shapes and
//! `window_bits`/`mode` combinations, rather than over fully random fuzz
//! input: these shapes are chosen to stress the boundary conditions the
//! encoder actually has (empty input, maximum match length, long
//! back-references, block-size boundaries) instead of hoping a random
//! generator happens to hit them.

mod support;

use streamflate_core::traits::{CompressStatus, Compressor, FlushMode};
use streamflate_deflate::zlib::CompressorAdapter;
use streamflate_deflate::{Mode, checksum, compress};
use support::inflate::inflate_zlib;

fn lcg_bytes(seed: u32, len: usize) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        })
        .collect()
}

fn curated_shapes() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("empty", Vec::new()),
        ("single_byte", vec![0x61]),
        ("all_zeros_4k", vec![0u8; 4096]),
        ("all_same_byte_10k", vec![0x42u8; 10_000]),
        (
            "alternating_8k",
            (0..8192).map(|i| if i % 2 == 0 { 0xAA } else { 0x55 }).collect(),
        ),
        ("incrementing_2k", (0..2048u32).map(|i| i as u8).collect()),
        ("random_lcg_16k", lcg_bytes(0xDEAD_BEEF, 16 * 1024)),
        (
            "max_match_length",
            {
                let mut v = vec![b'x'];
                v.extend(std::iter::repeat_n(b'y', 258));
                v.extend(std::iter::repeat_n(b'y', 258));
                v
            },
        ),
        (
            "long_distance_match",
            {
                let mut v = vec![0u8; 30_000];
                v.extend_from_slice(b"needle-value-to-match-later");
                v.extend(vec![1u8; 10]);
                v.extend_from_slice(b"needle-value-to-match-later");
                v
            },
        ),
        ("block_boundary_65536", lcg_bytes(7, 65_536)),
        ("block_boundary_65537", lcg_bytes(7, 65_537)),
    ]
}

const MODES: [Mode; 3] = [Mode::Stored, Mode::Fixed, Mode::Dynamic];
const WINDOW_BITS: [u8; 3] = [8, 12, 15];

/// Property 1: round-trip for every shape, window size, and mode.
#[test]
fn property_round_trip() {
    for (name, data) in curated_shapes() {
        for &window_bits in &WINDOW_BITS {
            for &mode in &MODES {
                let compressed = compress(&data, window_bits, mode).unwrap();
                let decoded = inflate_zlib(&compressed);
                assert_eq!(
                    decoded, data,
                    "round-trip failed for shape={name} window_bits={window_bits} mode={mode:?}"
                );
            }
        }
    }
}

/// Property 2: header well-formedness.
#[test]
fn property_header_well_formed() {
    for &window_bits in &WINDOW_BITS {
        let out = compress(b"header check", window_bits, Mode::Dynamic).unwrap();
        let value = (out[0] as u32) * 256 + out[1] as u32;
        assert_eq!(value % 31, 0);
        assert_eq!(out[0] & 0x0F, 8);
        assert_eq!(out[0] >> 4, window_bits - 8);
    }
}

/// Property 3: trailer is big-endian Adler-32 of the uncompressed input.
#[test]
fn property_trailer_is_adler32() {
    for (_, data) in curated_shapes() {
        let out = compress(&data, 15, Mode::Dynamic).unwrap();
        let trailer = &out[out.len() - 4..];
        let value = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        assert_eq!(value, checksum(&data));
    }
}

/// Property 6: backpressure — draining one byte at a time through a
/// one-byte output view produces the same stream as a large buffer.
#[test]
fn property_backpressure_one_byte_at_a_time() {
    let data = lcg_bytes(99, 5000);

    let mut wide = CompressorAdapter::new(15, Mode::Dynamic).unwrap();
    let mut wide_out = vec![0u8; 0];
    let mut buf = vec![0u8; 1 << 20];
    let (consumed, produced, status) = wide.compress(&data, &mut buf, FlushMode::Finish).unwrap();
    assert_eq!(consumed, data.len());
    wide_out.extend_from_slice(&buf[..produced]);
    assert_eq!(status, CompressStatus::Done);

    let mut narrow = CompressorAdapter::new(15, Mode::Dynamic).unwrap();
    let mut narrow_out = Vec::new();
    let mut one_byte = [0u8; 1];
    let mut offset = 0;
    loop {
        let flush = if offset >= data.len() {
            FlushMode::Finish
        } else {
            FlushMode::None
        };
        let (consumed, produced, status) = narrow
            .compress(&data[offset..], &mut one_byte, flush)
            .unwrap();
        offset += consumed;
        narrow_out.extend_from_slice(&one_byte[..produced]);
        if status == CompressStatus::Done {
            break;
        }
    }

    assert_eq!(narrow_out, wide_out);
}

/// Property 7: feeding the same bytes through different chunk boundaries
/// produces identical output.
#[test]
fn property_input_chunking_is_order_independent() {
    let data = lcg_bytes(1234, 20_000);

    let one_shot = compress(&data, 15, Mode::Dynamic).unwrap();

    let mut encoder =
        streamflate_deflate::Encoder::new(15, Mode::Dynamic).unwrap();
    let mut chunked = Vec::from(streamflate_deflate::zlib::header_bytes(15));

    for chunk in data.chunks(777) {
        encoder.refill(chunk);
    }
    encoder.last(true);
    loop {
        match encoder.eval().unwrap() {
            streamflate_deflate::EvalStatus::Flush => {
                chunked.extend_from_slice(encoder.contents());
                let len = encoder.contents().len();
                encoder.consume(len);
            }
            streamflate_deflate::EvalStatus::Ok => {
                if encoder.is_finished() {
                    break;
                }
            }
            streamflate_deflate::EvalStatus::Wait => panic!("unexpected Wait after last(true)"),
        }
    }
    chunked.extend_from_slice(encoder.contents());
    chunked.extend_from_slice(&checksum(&data).to_be_bytes());

    assert_eq!(chunked, one_shot);
}

/// Property 4/5: a Sync flush leaves an aligned `00 00 FF FF` sentinel, and
/// a second flush with no intervening input adds only another sentinel
/// rather than re-emitting a closing block.
#[test]
fn property_idempotent_sync_flush() {
    use streamflate_deflate::encoder::{Encoder, EvalStatus, FlushRequest};

    let mut encoder = Encoder::new(15, Mode::Dynamic).unwrap();
    encoder.refill(b"some payload to close out");

    encoder.flush(FlushRequest::Sync);
    let status = encoder.eval().unwrap();
    assert_eq!(status, EvalStatus::Flush);
    let first_flush_len = encoder.contents().len();
    assert!(first_flush_len >= 4);
    assert_eq!(&encoder.contents()[first_flush_len - 4..], &[0x00, 0x00, 0xFF, 0xFF]);
    let consumed_so_far = first_flush_len;
    encoder.consume(consumed_so_far);

    encoder.flush(FlushRequest::Sync);
    let status = encoder.eval().unwrap();
    assert_eq!(status, EvalStatus::Flush);
    // No new input: the second flush must be just the byte-aligned empty
    // stored block (header byte + LEN/NLEN), not another copy of the
    // closing dynamic block from before.
    let second = encoder.contents();
    assert_eq!(second.len(), 5);
    assert_eq!(&second[1..], &[0x00, 0x00, 0xFF, 0xFF]);
}
