// bookmark-line-reader
// Copyright (c) 2026 The bookmark-line-reader Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The position tracker (component B): the single authority on the
//! byte↔char-index correspondence of the currently buffered decode window.
//!
//! The tracker does not know about lines. It only ever answers "where, in
//! absolute byte/char terms, does character *k* of the current buffer
//! begin". The line scanner in [`crate::io::reader`] is the only caller.

use crate::io::advancer::{ByteAdvancementInfo, ByteAdvancer};

/// Holds the absolute byte/char anchor of the start of the current decode
/// buffer, plus whatever per-buffer table the active advancer produced.
#[derive(Debug, Default)]
pub struct PositionTracker {
    /// Absolute byte offset of the first byte of the current buffer.
    buffer_byte_anchor: u64,
    /// Absolute char index of the first code unit of the current buffer.
    buffer_char_anchor: u64,
    /// Byte length of the current buffer.
    buffer_byte_len: usize,
    /// Code-unit count of the current buffer.
    buffer_char_len: usize,
    single_byte: bool,
    advancer: Option<ByteAdvancer>,
    table: Option<ByteAdvancementInfo>,
}

impl PositionTracker {
    pub fn new() -> Self {
        PositionTracker::default()
    }

    /// Forgets all buffer state and reseeds the anchor. Called on open, on
    /// resume, and whenever the reader discards its buffer outright.
    pub fn moved_to_position(&mut self, byte_pos: u64, char_index: u64) {
        self.buffer_byte_anchor = byte_pos;
        self.buffer_char_anchor = char_index;
        self.buffer_byte_len = 0;
        self.buffer_char_len = 0;
        self.table = None;
        if let Some(advancer) = &mut self.advancer {
            advancer.reset();
        }
    }

    /// Advances the byte anchor by a detected preamble's length without
    /// touching the char anchor, since the preamble contributes no characters.
    pub fn moved_past_preamble_of_byte_length(&mut self, n: u64) {
        self.buffer_byte_anchor += n;
    }

    /// Folds the previous buffer into the anchor, records the new buffer's
    /// dimensions, and (for multi-byte encodings) builds a fresh
    /// [`ByteAdvancementInfo`] from the freshly decoded bytes/chars.
    pub fn read_bytes_and_chars(
        &mut self,
        byte_count: usize,
        char_count: usize,
        bytes: &[u8],
        encoding_name: &str,
        is_single_byte: bool,
    ) {
        self.buffer_byte_anchor += self.buffer_byte_len as u64;
        self.buffer_char_anchor += self.buffer_char_len as u64;

        self.buffer_byte_len = byte_count;
        self.buffer_char_len = char_count;
        self.single_byte = is_single_byte;

        if is_single_byte {
            self.advancer = None;
            self.table = None;
            return;
        }

        let needs_new = match &self.advancer {
            Some(adv) => adv.last_encoding() != encoding_name,
            None => true,
        };
        if needs_new {
            self.advancer = Some(ByteAdvancer::for_encoding(encoding_name));
        }

        let advancer = self.advancer.get_or_insert_with(|| ByteAdvancer::for_encoding(encoding_name));
        self.table = Some(advancer.build(bytes));
    }

    /// Absolute byte offset of the start of the current buffer.
    pub fn buffer_byte_anchor(&self) -> u64 {
        self.buffer_byte_anchor
    }

    /// Absolute char index of the start of the current buffer.
    pub fn buffer_char_anchor(&self) -> u64 {
        self.buffer_char_anchor
    }

    /// Absolute byte offset at which buffer-relative character index `k`
    /// begins. Returns `None` if `k` lies past everything this buffer has
    /// mapped.
    pub fn absolute_byte_position_of_char_index(&self, k: usize) -> Option<u64> {
        if self.single_byte {
            return Some(self.buffer_byte_anchor + k as u64);
        }
        let info = match self.table.as_ref() {
            Some(info) => info,
            // No buffer has been decoded into this tracker generation yet
            // (e.g. immediately after a resume, before the first refill):
            // character 0 is the anchor itself, by definition.
            None if k == 0 => return Some(self.buffer_byte_anchor),
            None => return None,
        };

        if let Some(i) = first_byte_index_at_or_past(&info.char_indexes_at_byte_index, k) {
            let mut absolute = self.buffer_byte_anchor + i as u64;
            if i == 0 && info.char_indexes_at_byte_index[0] == k {
                // This character's lead byte actually lived in the previous
                // buffer; step back into it rather than clamping at this
                // buffer's own start.
                absolute = absolute.saturating_sub(info.first_char_extends_back_byte_count as u64);
            }
            return Some(absolute);
        }

        // One past the last fully decoded character, with nothing
        // incomplete buffered: the position is just past all valid bytes.
        if info.extra_incomplete_char_with_byte_count == 0 {
            let valid_len = info.char_indexes_at_byte_index.len();
            let last_char = info.char_indexes_at_byte_index.last().map(|&c| c + 1).unwrap_or(0);
            if k == last_char {
                return Some(self.buffer_byte_anchor + valid_len as u64);
            }
        }

        None
    }

    /// Absolute character index at which buffer-relative character index
    /// `k` lies. Equal to `k` for single-byte/UTF-16 but may differ for
    /// UTF-8 if supplementary scalars before it consumed two code units
    /// each relative to raw scalar counting. In practice this tracker
    /// indexes by code unit throughout, so this simply offsets `k` by the
    /// buffer's char anchor.
    pub fn absolute_char_position_of_char_index(&self, k: usize) -> Option<u64> {
        if self.single_byte {
            return Some(self.buffer_char_anchor + k as u64);
        }
        let info = match self.table.as_ref() {
            Some(info) => info,
            None if k == 0 => return Some(self.buffer_char_anchor),
            None => return None,
        };
        if first_byte_index_at_or_past(&info.char_indexes_at_byte_index, k).is_some() {
            return Some(self.buffer_char_anchor + k as u64);
        }
        if info.extra_incomplete_char_with_byte_count == 0 {
            let last_char = info.char_indexes_at_byte_index.last().map(|&c| c + 1).unwrap_or(0);
            if k == last_char {
                return Some(self.buffer_char_anchor + k as u64);
            }
        }
        None
    }

    /// Full reset: anchor to zero, all flags and cached tables cleared.
    pub fn forget_state(&mut self) {
        *self = PositionTracker::new();
    }
}

/// Finds the first byte index whose stored char index is `>= k`.
fn first_byte_index_at_or_past(table: &[usize], k: usize) -> Option<usize> {
    table.iter().position(|&c| c >= k)
}
