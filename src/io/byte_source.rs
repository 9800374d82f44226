// bookmark-line-reader
// Copyright (c) 2026 The bookmark-line-reader Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// A seekable byte source the bookmarking line reader reads from.
///
/// This mirrors the teacher crate's `MediaSource` collaborator: a minimal
/// seam a caller's stream type must satisfy, kept independent of `std::io`'s
/// own `Read`/`Seek` traits so blanket impls can be layered over arbitrary
/// concrete types without orphan-rule friction.
pub trait ByteSource {
    /// Reads up to `buf.len()` bytes, returning the number of bytes read.
    /// Zero means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Moves the stream cursor to an absolute byte offset.
    fn seek(&mut self, pos: u64) -> io::Result<()>;

    /// Reports the stream cursor's current absolute byte offset.
    fn position(&mut self) -> io::Result<u64>;

    /// Reports the total byte length of the stream, if known up front.
    fn len(&mut self) -> io::Result<Option<u64>>;
}

impl ByteSource for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        Seek::seek(self, SeekFrom::Start(pos))?;
        Ok(())
    }

    fn position(&mut self) -> io::Result<u64> {
        Seek::stream_position(self)
    }

    fn len(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.metadata()?.len()))
    }
}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        Seek::seek(self, SeekFrom::Start(pos))?;
        Ok(())
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(Seek::stream_position(self)?)
    }

    fn len(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.get_ref().as_ref().len() as u64))
    }
}
