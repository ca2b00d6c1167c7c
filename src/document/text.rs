//! Line index over immutable document content.
//!
//! Records the byte offset where each line starts so that line lookups are
//! O(log n). Only `\n` terminates a line; a `\r` before it belongs to the line.

use std::ops::Range;

use crate::error::{Error, Result};

/// Pre-computed line start offsets for one version of a document.
///
/// There is always at least one line. Content ending in `\n` has a final,
/// empty line starting at `len`, so end-of-file is addressable as its own line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset where each line starts. Strictly increasing, first is 0.
    line_starts: Vec<usize>,
    /// Length of the indexed content in bytes.
    len: usize,
}

impl LineIndex {
    /// Build a line index from content bytes.
    pub fn new(content: &[u8]) -> Self {
        let mut line_starts = vec![0];

        for (i, b) in content.iter().enumerate() {
            if *b == b'\n' {
                line_starts.push(i + 1);
            }
        }

        Self {
            line_starts,
            len: content.len(),
        }
    }

    /// Number of lines, including a trailing empty line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length in bytes of the indexed content.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset of the start of `line`.
    pub fn line_start(&self, line: u32) -> Result<usize> {
        self.line_starts
            .get(line as usize)
            .copied()
            .ok_or(Error::InvalidLine {
                line,
                line_count: self.line_starts.len(),
            })
    }

    /// Byte range of `line`, excluding its terminator.
    pub fn line_range(&self, line: u32) -> Result<Range<usize>> {
        let start = self.line_start(line)?;
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map(|&next| next - 1) // Exclude newline
            .unwrap_or(self.len);
        Ok(start..end)
    }

    /// Line containing the byte offset.
    ///
    /// The result is the line whose start is the greatest start `<= offset`.
    /// An offset pointing at a `\n` belongs to the line that `\n` terminates.
    pub fn line_of_offset(&self, offset: usize) -> Result<u32> {
        if offset > self.len {
            return Err(Error::OffsetOutOfRange {
                offset,
                file: "<content>".to_string(),
                size: self.len,
            });
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,                    // Exact match (start of line)
            Err(line) => line.saturating_sub(1), // In the middle of a line
        };
        Ok(line as u32)
    }
}
