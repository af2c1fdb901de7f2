//! LZ77 match finding for DEFLATE.
//!
//! Finds repeated sequences in the input and replaces them with
//! back-references (length, distance pairs), using a hash-chain match
//! finder over a sliding window sized to the encoder's configured
//! `window_bits`.
//!
//! # Algorithm
//!
//! For each position, the encoder hashes the next three bytes, walks the
//! chain of earlier positions sharing that hash, and keeps the longest
//! match found within the chain-search bound. A one-position lookahead
//! (lazy matching) prefers the next position's match when it is longer,
//! emitting a literal now rather than a shorter match.

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Size of the hash table (power of 2, independent of window size).
const HASH_SIZE: usize = 32768;

/// Hash mask.
const HASH_MASK: usize = HASH_SIZE - 1;

/// Number of hash chain entries to check per match attempt.
const MAX_CHAIN_LENGTH: usize = 128;

/// A token produced by LZ77 match finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

/// Hash-chain LZ77 match finder over a sliding window.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// Sliding window buffer, sized to `2 * window_size`.
    window: Vec<u8>,
    /// Current position in the window.
    window_pos: usize,
    /// Window size in bytes (power of 2, from `window_bits`).
    window_size: usize,
    /// Hash table: maps hash -> position in window.
    hash_table: Vec<u32>,
    /// Hash chain: previous position with same hash.
    hash_chain: Vec<u32>,
}

impl Lz77Encoder {
    /// Create a new match finder for a window of `2^window_bits` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `window_bits` is outside `8..=15`.
    pub fn new(window_bits: u8) -> Self {
        assert!(
            (8..=15).contains(&window_bits),
            "window_bits must be in 8..=15, got {window_bits}"
        );
        let window_size = 1usize << window_bits;

        Self {
            window: vec![0; window_size * 2],
            window_pos: 0,
            window_size,
            hash_table: vec![0; HASH_SIZE],
            hash_chain: vec![0; window_size],
        }
    }

    /// Reset the encoder state, discarding all window history.
    pub fn reset(&mut self) {
        self.window_pos = 0;
        self.hash_table.fill(0);
        self.hash_chain.fill(0);
    }

    /// The configured window size in bytes.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Compute hash for 3 bytes using multiplicative mixing for a good
    /// avalanche over the low `HASH_SIZE` bits.
    #[inline(always)]
    fn hash(b0: u8, b1: u8, b2: u8) -> usize {
        let h = ((b0 as usize).wrapping_mul(506832829))
            ^ ((b1 as usize).wrapping_mul(2654435761) << 8)
            ^ ((b2 as usize).wrapping_mul(374761393) << 16);
        (h ^ (h >> 15)) & HASH_MASK
    }

    /// Record the current position in the hash chain for its 3-byte hash.
    fn update_hash(&mut self, pos: usize) {
        if pos + 2 < self.window.len() {
            let h = Self::hash(self.window[pos], self.window[pos + 1], self.window[pos + 2]);
            let prev = self.hash_table[h];
            self.hash_chain[pos & (self.window_size - 1)] = prev;
            self.hash_table[h] = pos as u32;
        }
    }

    /// Find the longest match at `pos`, searching at most `max_len` bytes
    /// ahead and `MAX_CHAIN_LENGTH` hash-chain links back.
    fn find_match(&self, pos: usize, max_len: usize) -> Option<(u16, u16)> {
        if pos < MIN_MATCH || max_len < MIN_MATCH {
            return None;
        }

        let h = Self::hash(self.window[pos], self.window[pos + 1], self.window[pos + 2]);

        let mut match_pos = self.hash_table[h] as usize;
        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0usize;

        let min_pos = pos.saturating_sub(self.window_size);
        let mut chain_len = 0;
        let max_check = max_len.min(MAX_MATCH);

        while match_pos >= min_pos && match_pos < pos && chain_len < MAX_CHAIN_LENGTH {
            let dist = pos - match_pos;

            if dist > 0
                && dist <= self.window_size
                && self.window[match_pos + best_len] == self.window[pos + best_len]
                && self.window[match_pos] == self.window[pos]
            {
                let mut len = 0;
                while len < max_check && self.window[match_pos + len] == self.window[pos + len] {
                    len += 1;
                }

                if len > best_len {
                    best_len = len;
                    best_dist = dist;

                    if len >= max_len || len >= MAX_MATCH {
                        break;
                    }
                }
            }

            match_pos = self.hash_chain[match_pos & (self.window_size - 1)] as usize;
            chain_len += 1;
        }

        if best_len >= MIN_MATCH {
            Some((best_len as u16, best_dist as u16))
        } else {
            None
        }
    }

    /// Compress input data into a sequence of literal/match tokens.
    pub fn compress(&mut self, input: &[u8]) -> Vec<Lz77Token> {
        let mut tokens = Vec::with_capacity(input.len());
        let mut input_pos = 0;

        while input_pos < input.len() {
            let space_in_window = self.window.len().saturating_sub(self.window_pos);
            let chunk_size = space_in_window.min(input.len() - input_pos);

            let start = self.window_pos;
            self.window[start..start + chunk_size]
                .copy_from_slice(&input[input_pos..input_pos + chunk_size]);

            let end = start + chunk_size;
            let mut pos = start;

            while pos < end {
                let remaining = end - pos;
                let match_result = self.find_match(pos, remaining);

                if let Some((length, distance)) = match_result {
                    let mut use_match = true;

                    if pos + 1 < end {
                        if let Some((next_len, _)) = self.find_match(pos + 1, remaining - 1) {
                            if next_len > length + 1 {
                                use_match = false;
                            }
                        }
                    }

                    if use_match {
                        tokens.push(Lz77Token::Match { length, distance });

                        for i in 0..length as usize {
                            self.update_hash(pos + i);
                        }

                        pos += length as usize;
                        continue;
                    }
                }

                tokens.push(Lz77Token::Literal(self.window[pos]));
                self.update_hash(pos);
                pos += 1;
            }

            self.window_pos = end;
            input_pos += chunk_size;

            if self.window_pos >= self.window_size + self.window_size / 2 {
                self.slide_window();
            }
        }

        tokens
    }

    /// Slide the window to make room for more data, adjusting the hash
    /// table and chain entries to the new positions.
    fn slide_window(&mut self) {
        let slide_amount = self.window_size;

        self.window.copy_within(slide_amount..self.window_pos, 0);
        self.window_pos -= slide_amount;

        for entry in &mut self.hash_table {
            if *entry >= slide_amount as u32 {
                *entry -= slide_amount as u32;
            } else {
                *entry = 0;
            }
        }

        for entry in &mut self.hash_chain {
            if *entry >= slide_amount as u32 {
                *entry -= slide_amount as u32;
            } else {
                *entry = 0;
            }
        }
    }

    /// Compress all data at once with a fresh encoder (convenience method).
    pub fn compress_all(input: &[u8], window_bits: u8) -> Vec<Lz77Token> {
        let mut encoder = Self::new(window_bits);
        encoder.compress(input)
    }
}
