// bookmark-line-reader
// Copyright (c) 2026 The bookmark-line-reader Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::io;

/// Errors produced by the bookmarking line reader and its collaborators.
#[derive(Debug)]
pub enum ReaderError {
    /// The encoding passed to the constructor is neither single-byte, UTF-8, nor UTF-16.
    UnsupportedEncoding(String),
    /// A disallowed read primitive (raw character read, peek, read-to-end) was invoked.
    UnsupportedOperation(&'static str),
    /// An I/O failure bubbled up from the byte source.
    Io(io::Error),
    /// A bookmark could not be resumed from: it lies past the end of the stream, or its byte
    /// offset falls inside a known preamble without being the start sentinel.
    InvalidBookmark(String),
}

/// The result type returned by every fallible operation in this crate.
pub type ReaderResult<T> = Result<T, ReaderError>;

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::UnsupportedEncoding(name) => {
                write!(f, "unsupported encoding: {}", name)
            }
            ReaderError::UnsupportedOperation(op) => {
                write!(f, "operation not supported by bookmarking line reader: {}", op)
            }
            ReaderError::Io(err) => write!(f, "I/O error: {}", err),
            ReaderError::InvalidBookmark(reason) => write!(f, "invalid bookmark: {}", reason),
        }
    }
}

impl std::error::Error for ReaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReaderError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ReaderError {
    fn from(err: io::Error) -> Self {
        ReaderError::Io(err)
    }
}

/// Constructs an [`ReaderError::UnsupportedEncoding`] for the given encoding name.
pub fn unsupported_encoding<T>(name: &str) -> ReaderResult<T> {
    Err(ReaderError::UnsupportedEncoding(name.to_string()))
}

/// Constructs an [`ReaderError::UnsupportedOperation`] for the given operation name.
pub fn unsupported_operation<T>(op: &'static str) -> ReaderResult<T> {
    Err(ReaderError::UnsupportedOperation(op))
}

/// Constructs an [`ReaderError::InvalidBookmark`] with a human-readable reason.
pub fn invalid_bookmark<T>(reason: impl Into<String>) -> ReaderResult<T> {
    Err(ReaderError::InvalidBookmark(reason.into()))
}
