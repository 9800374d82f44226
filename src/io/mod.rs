// bookmark-line-reader
// Copyright (c) 2026 The bookmark-line-reader Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte-source I/O: the three-layer pipeline described in the crate's
//! top-level documentation, leaves (advancer, tracker) before the reader
//! that drives them.

pub mod advancer;
pub mod bookmark;
pub mod byte_source;
pub mod encoding;
pub mod options;
pub mod reader;
pub mod tracker;

pub use bookmark::{DetailedLine, LineBookmark, LineEnding};
pub use byte_source::ByteSource;
pub use encoding::{IncrementalDecoder, SingleByteEncoding, TextEncoding, Utf16BeEncoding, Utf16LeEncoding, Utf8Encoding};
pub use options::ReaderOptions;
pub use reader::BookmarkingLineReader;
