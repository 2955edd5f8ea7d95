//! Chunk-boundary-safe line splitting.
//!
//! Input arrives from a [`ChunkSource`] in pieces of arbitrary size. The
//! scanner hands out one raw line at a time, `\n`-delimited with a trailing
//! `\r` removed. A line that straddles chunks is kept as leftover bytes and
//! presented as a two-segment [`ByteSeq`] once its terminator shows up, so only
//! the leftover part is ever copied.
//!
//! A last line with no terminating `\n` is emitted like any other line.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use memchr::memchr;

use crate::bytes::ByteSeq;
use crate::error::Error;

/// Chunk size used when none is configured
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Incremental byte input.
pub trait ChunkSource {
    /// Replace the contents of `chunk` with the next available bytes.
    ///
    /// Returns `Ok(false)` once the input is exhausted. An `Ok(true)` pull may
    /// deliver an empty chunk.
    fn pull(&mut self, chunk: &mut Vec<u8>) -> io::Result<bool>;
}

impl<S: ChunkSource + ?Sized> ChunkSource for &mut S {
    fn pull(&mut self, chunk: &mut Vec<u8>) -> io::Result<bool> {
        (**self).pull(chunk)
    }
}

/// Pulls fixed-size chunks from any [`Read`].
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    /// A `chunk_size` of zero is treated as one.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
        }
    }
}

impl<R: Read> ChunkSource for ReadSource<R> {
    fn pull(&mut self, chunk: &mut Vec<u8>) -> io::Result<bool> {
        chunk.resize(self.chunk_size, 0);
        loop {
            match self.reader.read(chunk) {
                Ok(0) => {
                    chunk.clear();
                    return Ok(false);
                }
                Ok(n) => {
                    chunk.truncate(n);
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    chunk.clear();
                    return Err(e);
                }
            }
        }
    }
}

/// Delivers pre-split chunks, one per pull.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    chunks: I,
}

impl<I> IterSource<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    pub fn new(chunks: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            chunks: chunks.into_iter(),
        }
    }
}

impl<I> ChunkSource for IterSource<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    fn pull(&mut self, chunk: &mut Vec<u8>) -> io::Result<bool> {
        chunk.clear();
        match self.chunks.next() {
            Some(next) => {
                chunk.extend_from_slice(next.as_ref());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Shared cancellation flag, checked by the scanner before every line and pull.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One raw line, borrowed from the scanner's buffers until the next call.
#[derive(Debug, Clone, Copy)]
pub struct RawLine<'a> {
    /// 1-based
    pub number: usize,
    pub bytes: ByteSeq<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Reading,
    Exhausted,
    Done,
}

/// Splits a [`ChunkSource`] into lines. Forward-only and not restartable.
#[derive(Debug)]
pub struct LineScanner<S> {
    source: S,
    chunk: Vec<u8>,
    pos: usize,
    // Bytes of an unterminated line carried over from earlier chunks
    leftover: Vec<u8>,
    leftover_handed_out: bool,
    line_number: usize,
    state: State,
    cancel: Option<CancelToken>,
}

impl<S: ChunkSource> LineScanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            chunk: Vec::new(),
            pos: 0,
            leftover: Vec::new(),
            leftover_handed_out: false,
            line_number: 0,
            state: State::Reading,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Number of the last line handed out, 0 before the first.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next raw line, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<RawLine<'_>>, Error> {
        if self.leftover_handed_out {
            self.leftover.clear();
            self.leftover_handed_out = false;
        }

        loop {
            if self.state == State::Done {
                return Ok(None);
            }
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(Error::Cancelled);
            }

            if let Some(offset) = memchr(b'\n', &self.chunk[self.pos..]) {
                let start = self.pos;
                let end = start + offset;
                self.pos = end + 1;
                self.line_number += 1;
                self.leftover_handed_out = !self.leftover.is_empty();

                return Ok(Some(RawLine {
                    number: self.line_number,
                    bytes: strip_cr(ByteSeq::new(&self.leftover, &self.chunk[start..end])),
                }));
            }

            self.leftover.extend_from_slice(&self.chunk[self.pos..]);
            self.chunk.clear();
            self.pos = 0;

            if self.state == State::Exhausted {
                self.state = State::Done;
                if self.leftover.is_empty() {
                    return Ok(None);
                }

                self.line_number += 1;
                self.leftover_handed_out = true;
                return Ok(Some(RawLine {
                    number: self.line_number,
                    bytes: strip_cr(ByteSeq::from_slice(&self.leftover)),
                }));
            }

            if !self.source.pull(&mut self.chunk).map_err(Error::Source)? {
                self.state = State::Exhausted;
            }
        }
    }
}

fn strip_cr(line: ByteSeq<'_>) -> ByteSeq<'_> {
    match line.last() {
        Some(b'\r') => line.slice(0..line.len() - 1),
        _ => line,
    }
}
