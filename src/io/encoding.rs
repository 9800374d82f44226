// bookmark-line-reader
// Copyright (c) 2026 The bookmark-line-reader Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text encodings the reader can decode, and the incremental decoder seam
//! each one hands out.
//!
//! Decoding itself is delegated to `encoding_rs`, the engine behind
//! Firefox's text decoding, rather than hand-rolled conversion tables.
//! The reader's own [`crate::io::advancer`] module performs the
//! byte→char-index accounting independently of whatever this layer
//! produces as text.

use encoding_rs::Encoding as RsEncoding;

use crate::errors::{unsupported_encoding, ReaderResult};

/// An incremental byte→UTF-16-code-unit decoder.
///
/// A single instance is used for the whole lifetime of a
/// [`crate::io::reader::BookmarkingLineReader`]; `reset` is called whenever
/// the reader resumes from a bookmark, since a decoder carries internal
/// state (a partially consumed multi-byte scalar) that does not survive a
/// seek.
pub trait IncrementalDecoder {
    /// Converts `bytes` into `chars`, writing as many complete code units
    /// as fit. Returns `(bytes_consumed, code_units_written, had_errors)`.
    /// Malformed input is replaced with U+FFFD rather than surfaced as an
    /// error: recovery semantics for malformed bytes are undefined by this
    /// crate beyond not desynchronizing position tracking.
    fn convert(&mut self, bytes: &[u8], chars: &mut [u16]) -> (usize, usize, bool);

    /// Discards any partially decoded scalar, as if constructed fresh.
    fn reset(&mut self);
}

/// A text encoding the reader can be constructed with.
pub trait TextEncoding {
    fn name(&self) -> &str;

    /// Whether one byte always maps to exactly one UTF-16 code unit.
    fn is_single_byte(&self) -> bool;

    /// The byte-order-mark (or other preamble) this encoding may begin
    /// with. Empty if the encoding has none.
    fn preamble(&self) -> &'static [u8];

    /// An upper bound on the number of UTF-16 code units `byte_count` bytes
    /// of this encoding could ever decode to, used to size the decode
    /// output buffer.
    fn max_char_count(&self, byte_count: usize) -> usize;

    fn new_decoder(&self) -> Box<dyn IncrementalDecoder>;
}

/// An encoding is supported by the bookmarking line reader iff it is
/// single-byte, UTF-8, or one of the two UTF-16 byte orders.
pub fn is_supported_encoding(encoding: &dyn TextEncoding) -> bool {
    encoding.is_single_byte() || encoding.name() == "utf-8" || encoding.name().starts_with("utf-16")
}

struct RsDecoder {
    inner: encoding_rs::Decoder,
    encoding: &'static RsEncoding,
}

impl IncrementalDecoder for RsDecoder {
    fn convert(&mut self, bytes: &[u8], chars: &mut [u16]) -> (usize, usize, bool) {
        let (_result, read, written, had_errors) = self.inner.decode_to_utf16(bytes, chars, false);
        (read, written, had_errors)
    }

    fn reset(&mut self) {
        self.inner = self.encoding.new_decoder_without_bom_handling();
    }
}

fn rs_decoder(encoding: &'static RsEncoding) -> Box<dyn IncrementalDecoder> {
    Box::new(RsDecoder { inner: encoding.new_decoder_without_bom_handling(), encoding })
}

/// UTF-8, BOM `EF BB BF`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Encoding;

impl TextEncoding for Utf8Encoding {
    fn name(&self) -> &str {
        "utf-8"
    }

    fn is_single_byte(&self) -> bool {
        false
    }

    fn preamble(&self) -> &'static [u8] {
        &[0xEF, 0xBB, 0xBF]
    }

    fn max_char_count(&self, byte_count: usize) -> usize {
        byte_count
    }

    fn new_decoder(&self) -> Box<dyn IncrementalDecoder> {
        rs_decoder(encoding_rs::UTF_8)
    }
}

/// UTF-16 little-endian, BOM `FF FE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf16LeEncoding;

impl TextEncoding for Utf16LeEncoding {
    fn name(&self) -> &str {
        "utf-16le"
    }

    fn is_single_byte(&self) -> bool {
        false
    }

    fn preamble(&self) -> &'static [u8] {
        &[0xFF, 0xFE]
    }

    fn max_char_count(&self, byte_count: usize) -> usize {
        (byte_count + 1) / 2
    }

    fn new_decoder(&self) -> Box<dyn IncrementalDecoder> {
        rs_decoder(encoding_rs::UTF_16LE)
    }
}

/// UTF-16 big-endian, BOM `FE FF`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf16BeEncoding;

impl TextEncoding for Utf16BeEncoding {
    fn name(&self) -> &str {
        "utf-16be"
    }

    fn is_single_byte(&self) -> bool {
        false
    }

    fn preamble(&self) -> &'static [u8] {
        &[0xFE, 0xFF]
    }

    fn max_char_count(&self, byte_count: usize) -> usize {
        (byte_count + 1) / 2
    }

    fn new_decoder(&self) -> Box<dyn IncrementalDecoder> {
        rs_decoder(encoding_rs::UTF_16BE)
    }
}

/// A single-byte code page, e.g. windows-1252 or IBM866, backed by
/// `encoding_rs`.
#[derive(Debug, Clone, Copy)]
pub struct SingleByteEncoding {
    inner: &'static RsEncoding,
}

impl SingleByteEncoding {
    /// Wraps a static `encoding_rs` encoding. Fails with
    /// [`crate::errors::ReaderError::UnsupportedEncoding`] if the given
    /// encoding is not single-byte.
    pub fn new(inner: &'static RsEncoding) -> ReaderResult<Self> {
        if !inner.is_single_byte() {
            return unsupported_encoding(inner.name());
        }
        Ok(SingleByteEncoding { inner })
    }
}

impl TextEncoding for SingleByteEncoding {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_single_byte(&self) -> bool {
        true
    }

    fn preamble(&self) -> &'static [u8] {
        &[]
    }

    fn max_char_count(&self, byte_count: usize) -> usize {
        byte_count
    }

    fn new_decoder(&self) -> Box<dyn IncrementalDecoder> {
        rs_decoder(self.inner)
    }
}

impl<T: TextEncoding + ?Sized> TextEncoding for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_single_byte(&self) -> bool {
        (**self).is_single_byte()
    }

    fn preamble(&self) -> &'static [u8] {
        (**self).preamble()
    }

    fn max_char_count(&self, byte_count: usize) -> usize {
        (**self).max_char_count(byte_count)
    }

    fn new_decoder(&self) -> Box<dyn IncrementalDecoder> {
        (**self).new_decoder()
    }
}
