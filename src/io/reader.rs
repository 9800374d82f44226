// bookmark-line-reader
// Copyright (c) 2026 The bookmark-line-reader Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bookmarking line reader (component C): drives the byte source and
//! the encoding's incremental decoder, feeds the position tracker on every
//! refill, scans for line terminators, and emits [`DetailedLine`]s whose
//! bookmarks survive a seek to a freshly constructed reader.

use std::io;

use log::{debug, trace, warn};

use crate::errors::{invalid_bookmark, unsupported_encoding, unsupported_operation, ReaderResult};
use crate::io::bookmark::{DetailedLine, LineBookmark, LineEnding};
use crate::io::byte_source::ByteSource;
use crate::io::encoding::{is_supported_encoding, TextEncoding};
use crate::io::options::ReaderOptions;
use crate::io::tracker::PositionTracker;

/// Buffered, bookmarking reader that returns one line at a time.
///
/// Only the line-oriented operations in §6 of the design are exposed.
/// Anything that would consume characters without updating the tracker
/// (a raw character read, a single-character peek, read-to-end) is
/// deliberately absent: `read_char`, `peek_char`, and `read_to_end` exist
/// only to fail with `ReaderError::UnsupportedOperation`.
pub struct BookmarkingLineReader<S, E> {
    source: S,
    encoding: E,
    options: ReaderOptions,

    raw: Vec<u8>,
    char_buf: Vec<u16>,
    char_len: usize,
    char_cursor: usize,

    decoder: Box<dyn crate::io::encoding::IncrementalDecoder>,
    tracker: PositionTracker,

    preamble_checked: bool,
    before_any_bytes: bool,
    exhausted: bool,

    debug_hook: Option<Box<dyn FnMut(&str)>>,
}

impl<S, E> BookmarkingLineReader<S, E>
where
    S: ByteSource,
    E: TextEncoding,
{
    /// Builds a reader over `source`, decoding with `encoding` per `options`.
    ///
    /// Fails with [`crate::errors::ReaderError::UnsupportedEncoding`] unless
    /// `encoding` is single-byte, UTF-8, or one of the two UTF-16 byte
    /// orders (§4.1.4).
    pub fn new(source: S, encoding: E, options: ReaderOptions) -> ReaderResult<Self> {
        if !is_supported_encoding(&encoding) {
            return unsupported_encoding(encoding.name());
        }

        let buffer_size = options.buffer_size();
        let max_chars = encoding.max_char_count(buffer_size);
        let decoder = encoding.new_decoder();

        Ok(BookmarkingLineReader {
            source,
            encoding,
            options,
            raw: vec![0u8; buffer_size],
            char_buf: vec![0u16; max_chars.max(1)],
            char_len: 0,
            char_cursor: 0,
            decoder,
            tracker: PositionTracker::new(),
            preamble_checked: false,
            before_any_bytes: true,
            exhausted: false,
            debug_hook: None,
        })
    }

    /// Installs a callback that receives human-readable progress strings.
    /// Purely diagnostic: it has no effect on reader semantics and costs
    /// nothing when left unset.
    pub fn set_debug_hook(&mut self, hook: impl FnMut(&str) + 'static) {
        self.debug_hook = Some(Box::new(hook));
    }

    fn debug(&mut self, msg: impl FnOnce() -> String) {
        if let Some(hook) = &mut self.debug_hook {
            hook(&msg());
        }
    }

    /// Returns the next line, or `Ok(None)` once the stream is exhausted
    /// with no pending text remaining.
    pub fn read_detailed_line(&mut self) -> ReaderResult<Option<DetailedLine>> {
        if self.exhausted {
            return Ok(None);
        }

        let before_reading_bookmark = self.current_bookmark()?;
        let mut units: Vec<u16> = Vec::new();
        let mut line_start: Option<(u64, u64)> = None;

        loop {
            if self.char_cursor >= self.char_len {
                if !self.refill()? {
                    self.exhausted = true;
                    if units.is_empty() {
                        return Ok(None);
                    }
                    let last_rel = self.char_cursor - 1;
                    let (byte_pos, char_pos) = self.positions_at(last_rel)?;
                    let start = line_start.expect("units is non-empty only after line_start was recorded");
                    return Ok(Some(self.build_line(
                        units,
                        LineEnding::None,
                        byte_pos,
                        char_pos,
                        start,
                        before_reading_bookmark,
                    )));
                }
                continue;
            }

            if line_start.is_none() {
                line_start = Some(self.positions_at(self.char_cursor));
            }

            let unit = self.char_buf[self.char_cursor];

            if unit == 0x0A {
                let (byte_pos, char_pos) = self.positions_at(self.char_cursor);
                self.char_cursor += 1;
                let start = line_start.unwrap();
                return Ok(Some(self.build_line(
                    units,
                    LineEnding::Lf,
                    byte_pos,
                    char_pos,
                    start,
                    before_reading_bookmark,
                )));
            }

            if unit == 0x0D {
                let (cr_byte_pos, cr_char_pos) = self.positions_at(self.char_cursor);
                self.char_cursor += 1;
                let start = line_start.unwrap();

                loop {
                    if self.char_cursor < self.char_len {
                        break;
                    }
                    if !self.refill()? {
                        self.exhausted = true;
                        return Ok(Some(self.build_line(
                            units,
                            LineEnding::Cr,
                            cr_byte_pos,
                            cr_char_pos,
                            start,
                            before_reading_bookmark,
                        )));
                    }
                }

                if self.char_buf[self.char_cursor] == 0x0A {
                    let (lf_byte_pos, lf_char_pos) = self.positions_at(self.char_cursor);
                    self.char_cursor += 1;
                    return Ok(Some(self.build_line(
                        units,
                        LineEnding::CrLf,
                        lf_byte_pos,
                        lf_char_pos,
                        start,
                        before_reading_bookmark,
                    )));
                }

                return Ok(Some(self.build_line(
                    units,
                    LineEnding::Cr,
                    cr_byte_pos,
                    cr_char_pos,
                    start,
                    before_reading_bookmark,
                )));
            }

            units.push(unit);
            self.char_cursor += 1;
        }
    }

    /// Seeks to `bm.position` (or to the very start, past any preamble,
    /// for the start sentinel) and discards all buffered state.
    pub fn resume_from_bookmark(&mut self, bm: LineBookmark) -> ReaderResult<()> {
        if !bm.is_start() {
            if bm.position < 0 || bm.char_index < 0 {
                return invalid_bookmark("negative position or char index outside the start sentinel");
            }
            if let Some(len) = self.source.len()? {
                if bm.position as u64 > len {
                    return invalid_bookmark("position lies past the end of the stream");
                }
            }
            if self.options.detect_preamble() {
                let preamble_len = self.encoding.preamble().len() as i64;
                if preamble_len > 0 && bm.position < preamble_len {
                    return invalid_bookmark("position falls inside the encoding's preamble");
                }
            }
        }

        self.debug(|| format!("resume_from_bookmark: position={} char_index={}", bm.position, bm.char_index));

        let seek_pos = if bm.is_start() { 0 } else { bm.position as u64 };
        self.source.seek(seek_pos)?;
        self.decoder.reset();
        self.char_len = 0;
        self.char_cursor = 0;
        self.exhausted = false;
        self.before_any_bytes = bm.is_start();
        self.preamble_checked = !bm.is_start();

        let anchor_byte = if bm.is_start() { 0 } else { bm.position as u64 };
        let anchor_char = if bm.is_start() { 0 } else { bm.char_index as u64 };
        self.tracker.moved_to_position(anchor_byte, anchor_char);

        Ok(())
    }

    /// Convenience: seeks to byte 0 and re-detects the preamble on the
    /// next refill, as if constructed fresh.
    pub fn resume_from_beginning(&mut self) -> ReaderResult<()> {
        self.resume_from_bookmark(LineBookmark::START)
    }

    /// Disallowed per spec.md §4.3: reading a raw character, peeking one
    /// character ahead, or reading to end would consume characters without
    /// updating the tracker, desynchronizing bookmarks. Always fails.
    pub fn read_char(&mut self) -> ReaderResult<char> {
        unsupported_operation("read_char")
    }

    pub fn peek_char(&mut self) -> ReaderResult<char> {
        unsupported_operation("peek_char")
    }

    pub fn read_to_end(&mut self) -> ReaderResult<String> {
        unsupported_operation("read_to_end")
    }

    fn current_bookmark(&self) -> LineBookmark {
        if self.before_any_bytes {
            return LineBookmark::START;
        }
        let (byte_pos, char_pos) = self.positions_at(self.char_cursor);
        LineBookmark::new(byte_pos as i64, char_pos as i64)
    }

    fn positions_at(&self, rel: usize) -> (u64, u64) {
        let byte_pos = self
            .tracker
            .absolute_byte_position_of_char_index(rel)
            .expect("char_cursor always stays within the current buffer's mapped range");
        let char_pos = self
            .tracker
            .absolute_char_position_of_char_index(rel)
            .expect("char_cursor always stays within the current buffer's mapped range");
        (byte_pos, char_pos)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_line(
        &self,
        units: Vec<u16>,
        line_ending: LineEnding,
        last_line_ending_position: u64,
        last_seen_char_index: u64,
        (start_position, _start_char): (u64, u64),
        before_reading_bookmark: LineBookmark,
    ) -> DetailedLine {
        DetailedLine {
            text: decode_units(&units),
            line_ending,
            start_position,
            last_line_ending_position,
            last_seen_char_index,
            before_reading_bookmark,
        }
    }

    /// Reads and decodes one more buffer's worth of data, feeding the
    /// tracker. Returns `Ok(false)` once the source is exhausted with
    /// nothing further to decode.
    fn refill(&mut self) -> ReaderResult<bool> {
        loop {
            self.before_any_bytes = false;

            let bytes_read = self.source.read(&mut self.raw)?;
            self.debug(|| format!("refill: read {} raw bytes", bytes_read));

            if bytes_read == 0 {
                trace!("refill: end of stream, no further bytes");
                return Ok(false);
            }

            let mut start = 0usize;
            let mut len = bytes_read;

            if !self.preamble_checked {
                self.preamble_checked = true;
                if self.options.detect_preamble() {
                    let preamble = self.encoding.preamble();
                    if !preamble.is_empty() && len >= preamble.len() && &self.raw[..preamble.len()] == preamble {
                        start = preamble.len();
                        len -= preamble.len();
                        self.tracker.moved_past_preamble_of_byte_length(preamble.len() as u64);
                        debug!("refill: consumed {}-byte preamble", preamble.len());
                        if len == 0 {
                            continue;
                        }
                    }
                }
            }

            let (used, produced, had_errors) =
                self.decoder.convert(&self.raw[start..start + len], &mut self.char_buf);
            trace!(
                "refill: decoded {} of {} bytes into {} code units (errors={})",
                used,
                len,
                produced,
                had_errors
            );

            self.tracker.read_bytes_and_chars(
                used,
                produced,
                &self.raw[start..start + used],
                self.encoding.name(),
                self.encoding.is_single_byte(),
            );
            self.char_len = produced;
            self.char_cursor = 0;

            if produced == 0 {
                if used == 0 {
                    warn!("refill: decoder made no byte or char progress on a non-empty buffer");
                }
                continue;
            }

            return Ok(true);
        }
    }
}

/// Decodes UTF-16 code units into a `String`, substituting U+FFFD for any
/// lone surrogate. Malformed-input recovery beyond this is out of scope
/// (spec.md §1).
fn decode_units(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::encoding::{SingleByteEncoding, Utf16BeEncoding, Utf8Encoding};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn reader_over(bytes: &[u8], encoding: Utf8Encoding, buffer_size: usize) -> BookmarkingLineReader<Cursor<Vec<u8>>, Utf8Encoding> {
        let opts = ReaderOptions::new().with_buffer_size(buffer_size);
        BookmarkingLineReader::new(Cursor::new(bytes.to_vec()), encoding, opts).unwrap()
    }

    #[test]
    fn three_lines_with_mixed_terminators() {
        let bytes = [
            0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x0D, 0x0A, 0x78, 0x79, 0x7A, 0x7A, 0x79, 0x0A, 0x66, 0x6F, 0x6F,
            0x62, 0x61, 0x72,
        ];
        let mut r = reader_over(&bytes, Utf8Encoding, 4096);

        let l1 = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(l1.text, "abcdef");
        assert_eq!(l1.line_ending, LineEnding::CrLf);
        assert_eq!(l1.start_position, 0);
        assert_eq!(l1.last_line_ending_position, 7);
        assert_eq!(l1.read_next_bookmark(), LineBookmark::new(8, 8));

        let l2 = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(l2.text, "xyzzy");
        assert_eq!(l2.line_ending, LineEnding::Lf);
        assert_eq!(l2.start_position, 8);
        assert_eq!(l2.last_line_ending_position, 13);
        assert_eq!(l2.read_next_bookmark(), LineBookmark::new(14, 14));

        let l3 = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(l3.text, "foobar");
        assert_eq!(l3.line_ending, LineEnding::None);
        assert_eq!(l3.start_position, 14);
        assert_eq!(l3.last_line_ending_position, 19);

        assert!(r.read_detailed_line().unwrap().is_none());
    }

    #[test]
    fn utf8_bom_is_stripped_when_detection_enabled() {
        let bytes = [0xEF, 0xBB, 0xBF, 0x5A, 0x0A];
        let opts = ReaderOptions::new().with_detect_preamble(true);
        let mut r = BookmarkingLineReader::new(Cursor::new(bytes.to_vec()), Utf8Encoding, opts).unwrap();

        let line = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(line.text, "Z");
        assert_eq!(line.line_ending, LineEnding::Lf);
        assert_eq!(line.start_position, 3);
        assert_eq!(line.last_line_ending_position, 4);
        assert_eq!(line.last_seen_char_index, 1);
        assert_eq!(line.rereading_bookmark(), LineBookmark::START);
        assert_eq!(line.read_next_bookmark(), LineBookmark::new(5, 2));
    }

    #[test]
    fn utf8_bom_without_terminator() {
        let bytes = [0xEF, 0xBB, 0xBF, 0x5A];
        let opts = ReaderOptions::new().with_detect_preamble(true);
        let mut r = BookmarkingLineReader::new(Cursor::new(bytes.to_vec()), Utf8Encoding, opts).unwrap();

        let line = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(line.text, "Z");
        assert_eq!(line.line_ending, LineEnding::None);
        assert_eq!(line.start_position, 3);
        assert_eq!(line.last_line_ending_position, 3);
        assert_eq!(line.last_seen_char_index, 0);
        assert_eq!(line.read_next_bookmark(), LineBookmark::new(4, 1));

        assert!(r.read_detailed_line().unwrap().is_none());
    }

    #[test]
    fn utf16be_two_ascii_chars_no_terminator() {
        let bytes = [0x00, 0x41, 0x00, 0x5A];
        let opts = ReaderOptions::new();
        let mut r = BookmarkingLineReader::new(Cursor::new(bytes.to_vec()), Utf16BeEncoding, opts).unwrap();

        let line = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(line.text, "AZ");
        assert_eq!(line.line_ending, LineEnding::None);
        assert_eq!(line.last_seen_char_index, 1);
        assert_eq!(line.read_next_bookmark(), LineBookmark::new(4, 2));
    }

    #[test]
    fn resume_from_read_next_bookmark_reproduces_following_lines() {
        let bytes = [
            0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x0D, 0x0A, 0x78, 0x79, 0x7A, 0x7A, 0x79, 0x0A, 0x66, 0x6F, 0x6F,
            0x62, 0x61, 0x72,
        ];
        let mut r = reader_over(&bytes, Utf8Encoding, 4096);
        let l1 = r.read_detailed_line().unwrap().unwrap();
        let resume_point = l1.read_next_bookmark();

        let mut fresh = reader_over(&bytes, Utf8Encoding, 4096);
        fresh.resume_from_bookmark(resume_point).unwrap();
        let l2 = fresh.read_detailed_line().unwrap().unwrap();
        assert_eq!(l2.text, "xyzzy");
        assert_eq!(l2.line_ending, LineEnding::Lf);
        assert_eq!(l2.start_position, 8);
    }

    #[test]
    fn resume_from_rereading_bookmark_reproduces_same_line() {
        let bytes = [
            0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x0D, 0x0A, 0x78, 0x79, 0x7A, 0x7A, 0x79, 0x0A, 0x66, 0x6F, 0x6F,
            0x62, 0x61, 0x72,
        ];
        let mut r = reader_over(&bytes, Utf8Encoding, 4096);
        let l1 = r.read_detailed_line().unwrap().unwrap();
        let reread_point = l1.rereading_bookmark();
        assert_eq!(reread_point, LineBookmark::START);

        let mut fresh = reader_over(&bytes, Utf8Encoding, 4096);
        fresh.resume_from_bookmark(reread_point).unwrap();
        let again = fresh.read_detailed_line().unwrap().unwrap();
        assert_eq!(again, l1);
    }

    #[test]
    fn buffer_size_does_not_change_the_line_sequence() {
        let bytes = [
            0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x0D, 0x0A, 0x78, 0x79, 0x7A, 0x7A, 0x79, 0x0A, 0x66, 0x6F, 0x6F,
            0x62, 0x61, 0x72,
        ];
        for size in [16, 77, 128, 1024, 8192] {
            let mut r = reader_over(&bytes, Utf8Encoding, size);
            let mut lines = Vec::new();
            while let Some(line) = r.read_detailed_line().unwrap() {
                lines.push((line.text, line.line_ending, line.start_position, line.last_line_ending_position));
            }
            assert_eq!(
                lines,
                vec![
                    ("abcdef".to_string(), LineEnding::CrLf, 0, 7),
                    ("xyzzy".to_string(), LineEnding::Lf, 8, 13),
                    ("foobar".to_string(), LineEnding::None, 14, 19),
                ],
                "mismatch at buffer_size={}",
                size
            );
        }
    }

    #[test]
    fn scalar_straddling_two_128_byte_buffers_survives_resume() {
        // 76 cycles of (i copies of the grinning-face emoji) + LF, then one
        // untermined trailing line, matching the scenario in spec.md §8.
        let mut text = String::new();
        for i in 1..=76 {
            for _ in 0..i {
                text.push('\u{1F600}');
            }
            text.push('\n');
        }
        text.push_str("trailer");
        let bytes = text.into_bytes();

        let mut r = reader_over(&bytes, Utf8Encoding, 128);
        let mut bookmarks = Vec::new();
        let mut lines = Vec::new();
        loop {
            match r.read_detailed_line().unwrap() {
                Some(line) => {
                    bookmarks.push(line.read_next_bookmark());
                    lines.push(line.text_with_line_ending());
                }
                None => break,
            }
        }
        assert_eq!(lines.len(), 77);

        // Replaying from a bookmark part-way through reproduces every
        // subsequent line byte-for-byte.
        let resume_at = 30;
        let mut fresh = reader_over(&bytes, Utf8Encoding, 128);
        fresh.resume_from_bookmark(bookmarks[resume_at - 1]).unwrap();
        for expected in &lines[resume_at..] {
            let line = fresh.read_detailed_line().unwrap().unwrap();
            assert_eq!(&line.text_with_line_ending(), expected);
        }
        assert!(fresh.read_detailed_line().unwrap().is_none());
    }

    #[test]
    fn incremental_append_between_reads_is_picked_up_on_resume() {
        let mut bytes = b"A".to_vec();
        let mut r = reader_over(&bytes, Utf8Encoding, 4096);
        let first = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(first.text, "A");
        assert_eq!(first.line_ending, LineEnding::None);
        let after_first = first.read_next_bookmark();
        let reread_first = first.rereading_bookmark();

        bytes.extend_from_slice(&[0xF0, 0x9F, 0x98, 0x80]); // append the emoji
        let mut r2 = reader_over(&bytes, Utf8Encoding, 4096);
        r2.resume_from_bookmark(after_first).unwrap();
        let second = r2.read_detailed_line().unwrap().unwrap();
        assert_eq!(second.text, "\u{1F600}");
        assert_eq!(second.line_ending, LineEnding::None);

        bytes.push(0x0A);
        let mut r3 = reader_over(&bytes, Utf8Encoding, 4096);
        r3.resume_from_bookmark(reread_first).unwrap();
        let combined = r3.read_detailed_line().unwrap().unwrap();
        assert_eq!(combined.text, "A\u{1F600}");
        assert_eq!(combined.line_ending, LineEnding::Lf);
    }

    #[test]
    fn disallowed_operations_fail() {
        let mut r = reader_over(b"abc", Utf8Encoding, 4096);
        assert!(r.read_char().is_err());
        assert!(r.peek_char().is_err());
        assert!(r.read_to_end().is_err());
    }

    #[test]
    fn unsupported_encoding_is_rejected_at_construction() {
        struct FakeEncoding;
        impl TextEncoding for FakeEncoding {
            fn name(&self) -> &str {
                "utf-32"
            }
            fn is_single_byte(&self) -> bool {
                false
            }
            fn preamble(&self) -> &'static [u8] {
                &[]
            }
            fn max_char_count(&self, byte_count: usize) -> usize {
                byte_count
            }
            fn new_decoder(&self) -> Box<dyn crate::io::encoding::IncrementalDecoder> {
                unimplemented!()
            }
        }
        let err = BookmarkingLineReader::new(Cursor::new(Vec::<u8>::new()), FakeEncoding, ReaderOptions::new());
        assert!(err.is_err());
    }

    #[test]
    fn single_byte_encoding_fast_path_reads_lines() {
        let bytes = b"abc\r\ndef".to_vec();
        let enc = SingleByteEncoding::new(encoding_rs::WINDOWS_1252).unwrap();
        let mut r = BookmarkingLineReader::new(Cursor::new(bytes), enc, ReaderOptions::new()).unwrap();
        let l1 = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(l1.text, "abc");
        assert_eq!(l1.line_ending, LineEnding::CrLf);
        let l2 = r.read_detailed_line().unwrap().unwrap();
        assert_eq!(l2.text, "def");
        assert_eq!(l2.line_ending, LineEnding::None);
    }

    #[test]
    fn resume_rejects_bookmark_past_end_of_stream() {
        let mut r = reader_over(b"short", Utf8Encoding, 4096);
        let err = r.resume_from_bookmark(LineBookmark::new(1000, 1000));
        assert!(err.is_err());
    }
}
