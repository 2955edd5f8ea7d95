//! Byte sequences that may span two buffers, and space/tab trimming over them.
//!
//! A line handed out by the scanner is usually a slice of the current chunk, but
//! when it straddles a chunk boundary it is the bytes left over from earlier
//! pulls followed by the head of the new chunk. [`ByteSeq`] models that without
//! joining the two halves.

use std::ops::Range;

use memchr::memchr;

/// Returns true for the bytes trimmed by [`trim_start`] and [`trim_end`].
pub fn is_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// A read-only view over `head` followed by `tail`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteSeq<'a> {
    head: &'a [u8],
    tail: &'a [u8],
}

impl<'a> ByteSeq<'a> {
    pub fn new(head: &'a [u8], tail: &'a [u8]) -> Self {
        Self { head, tail }
    }

    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self {
            head: bytes,
            tail: &[],
        }
    }

    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.tail.is_empty()
    }

    /// True when all bytes live in one buffer.
    pub fn is_single_segment(&self) -> bool {
        self.head.is_empty() || self.tail.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        match index.checked_sub(self.head.len()) {
            None => Some(self.head[index]),
            Some(i) => self.tail.get(i).copied(),
        }
    }

    pub fn first(&self) -> Option<u8> {
        self.get(0)
    }

    /// Probes only the final byte; never walks the sequence.
    pub fn last(&self) -> Option<u8> {
        self.tail
            .last()
            .or_else(|| self.head.last())
            .copied()
    }

    /// Sub-view over `range`, in logical offsets.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted or runs past the end.
    pub fn slice(&self, range: Range<usize>) -> ByteSeq<'a> {
        let Range { start, end } = range;
        assert!(
            start <= end && end <= self.len(),
            "range {start}..{end} out of bounds for sequence of length {}",
            self.len()
        );

        let split = self.head.len();
        ByteSeq {
            head: &self.head[start.min(split)..end.min(split)],
            tail: &self.tail[start.saturating_sub(split)..end.saturating_sub(split)],
        }
    }

    /// Offset of the first occurrence of `needle`.
    pub fn position(&self, needle: u8) -> Option<usize> {
        memchr(needle, self.head)
            .or_else(|| memchr(needle, self.tail).map(|i| i + self.head.len()))
    }

    pub fn segments(&self) -> impl Iterator<Item = &'a [u8]> {
        [self.head, self.tail].into_iter().filter(|s| !s.is_empty())
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = u8> + 'a {
        self.head.iter().chain(self.tail.iter()).copied()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(self.head);
        out.extend_from_slice(self.tail);
        out
    }

    /// Decodes as UTF-8, replacing invalid sequences. Only a multi-segment
    /// view is copied before decoding.
    pub fn to_string_lossy(&self) -> String {
        if self.tail.is_empty() {
            String::from_utf8_lossy(self.head).into_owned()
        } else if self.head.is_empty() {
            String::from_utf8_lossy(self.tail).into_owned()
        } else {
            String::from_utf8_lossy(&self.to_vec()).into_owned()
        }
    }
}

impl PartialEq for ByteSeq<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for ByteSeq<'_> {}

impl PartialEq<[u8]> for ByteSeq<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter().copied())
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteSeq<'_> {
    fn eq(&self, other: &&[u8; N]) -> bool {
        *self == other[..]
    }
}

/// Drops leading spaces and tabs. An all-blank input yields an empty view
/// positioned at its end.
pub fn trim_start(seq: ByteSeq<'_>) -> ByteSeq<'_> {
    let skip = seq.iter().take_while(|&b| is_space(b)).count();
    seq.slice(skip..seq.len())
}

/// Drops trailing spaces and tabs.
pub fn trim_end(seq: ByteSeq<'_>) -> ByteSeq<'_> {
    match seq.last() {
        Some(byte) if is_space(byte) => {
            let skip = seq.iter().rev().take_while(|&b| is_space(b)).count();
            seq.slice(0..seq.len() - skip)
        }
        _ => seq,
    }
}

pub fn trim(seq: ByteSeq<'_>) -> ByteSeq<'_> {
    trim_end(trim_start(seq))
}
