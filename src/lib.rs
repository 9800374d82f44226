// bookmark-line-reader
// Copyright (c) 2026 The bookmark-line-reader Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! A buffered text line reader over a seekable byte stream that tracks,
//! for every line returned, an opaque *bookmark* (a `(byte offset,
//! UTF-16 code-unit index)` pair) sufficient to seed a freshly constructed
//! reader and resume with byte-identical, index-identical results.
//!
//! The hard part is the byte↔character position accounting across a
//! buffered decode: a naive line reader loses this information because the
//! buffer fetches more bytes than are consumed, variable-length encodings
//! advance bytes and characters at different rates, multi-byte sequences
//! can straddle refills, and line terminators are stripped before a caller
//! ever sees them. This crate tracks all of it so that [`LineBookmark`]s
//! taken mid-stream remain valid on a fresh reader over the same
//! (possibly grown, never rewritten) stream.
//!
//! ```
//! use std::io::Cursor;
//! use bookmark_line_reader::{BookmarkingLineReader, ReaderOptions, Utf8Encoding};
//!
//! let bytes = b"first\nsecond\n".to_vec();
//! let mut reader =
//!     BookmarkingLineReader::new(Cursor::new(bytes), Utf8Encoding, ReaderOptions::new()).unwrap();
//!
//! let first = reader.read_detailed_line().unwrap().unwrap();
//! assert_eq!(first.text, "first");
//!
//! // A bookmark taken here can seed an entirely fresh reader later.
//! let bookmark = first.read_next_bookmark();
//! let mut resumed = BookmarkingLineReader::new(
//!     Cursor::new(b"first\nsecond\n".to_vec()),
//!     Utf8Encoding,
//!     ReaderOptions::new(),
//! )
//! .unwrap();
//! resumed.resume_from_bookmark(bookmark).unwrap();
//! let second = resumed.read_detailed_line().unwrap().unwrap();
//! assert_eq!(second.text, "second");
//! ```

pub mod errors;
pub mod io;

pub use errors::{ReaderError, ReaderResult};
pub use io::{
    BookmarkingLineReader, ByteSource, DetailedLine, IncrementalDecoder, LineBookmark, LineEnding, ReaderOptions,
    SingleByteEncoding, TextEncoding, Utf16BeEncoding, Utf16LeEncoding, Utf8Encoding,
};
