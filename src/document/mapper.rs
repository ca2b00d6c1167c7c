//! Conversions between byte offsets, points and LSP positions.
//!
//! A [`Mapper`] binds one immutable version of a document. It is cheap to
//! create; the line index is built the first time a conversion needs it and
//! is then shared by every caller.

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use tower_lsp::lsp_types::{Location, Position, Range as LspRange, Url};

use crate::error::{ColumnUnit, Error, Result};

use super::file::TokenFile;
use super::text::LineIndex;
use super::utf16::{self, ColumnError};

/// A line and a byte column within that line, plus the offset they denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    /// Zero-based line.
    pub line: u32,
    /// Column in bytes from the start of the line.
    pub column: usize,
    /// Byte offset from the start of the content.
    pub offset: usize,
}

/// Position converter for one version of one document.
#[derive(Debug)]
pub struct Mapper {
    uri: Url,
    content: Arc<[u8]>,
    line_index: OnceLock<LineIndex>,
}

impl Mapper {
    /// Create a mapper for `content` as it is known under `uri`.
    pub fn new(uri: Url, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            uri,
            content: content.into(),
            line_index: OnceLock::new(),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The content this mapper was built for.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Shared handle to the content.
    pub fn content_arc(&self) -> Arc<[u8]> {
        Arc::clone(&self.content)
    }

    /// Get the line index, building it on first use.
    pub fn line_index(&self) -> &LineIndex {
        self.line_index.get_or_init(|| LineIndex::new(&self.content))
    }

    pub fn line_count(&self) -> usize {
        self.line_index().line_count()
    }

    /// Bytes of `line` without its terminator.
    pub fn line_text(&self, line: u32) -> Result<&[u8]> {
        let range = self.line_index().line_range(line)?;
        Ok(&self.content[range])
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// This is the single path from wire coordinates to a usable offset.
    pub fn position_offset(&self, position: Position) -> Result<usize> {
        Ok(self.position_point(position)?.offset)
    }

    /// Convert an LSP position to a point.
    pub fn position_point(&self, position: Position) -> Result<Point> {
        let line_range = self.line_index().line_range(position.line)?;
        let line_text = &self.content[line_range.clone()];

        let column =
            utf16::byte_column_for_utf16(line_text, position.character).map_err(|err| {
                column_error(position.line, position.character as usize, ColumnUnit::Utf16, err)
            })?;

        Ok(Point {
            line: position.line,
            column,
            offset: line_range.start + column,
        })
    }

    /// Convert a byte offset to an LSP position.
    pub fn offset_position(&self, offset: usize) -> Result<Position> {
        let point = self.offset_point(offset)?;
        let line_text = self.line_text(point.line)?;

        let character = utf16::utf16_column_for_byte_column(line_text, point.column)
            .map_err(|err| column_error(point.line, point.column, ColumnUnit::Bytes, err))?;

        Ok(Position::new(point.line, character))
    }

    /// Convert a byte offset to a point.
    pub fn offset_point(&self, offset: usize) -> Result<Point> {
        self.check_offset(offset)?;
        let index = self.line_index();
        let line = index.line_of_offset(offset)?;
        let line_start = index.line_start(line)?;

        Ok(Point {
            line,
            column: offset - line_start,
            offset,
        })
    }

    /// Convert a line and byte column to a byte offset.
    ///
    /// The column may address the end of the line but not its terminator.
    pub fn point_offset(&self, line: u32, column: usize) -> Result<usize> {
        let range = self.line_index().line_range(line)?;
        if column > range.len() {
            return Err(Error::ColumnOutOfRange {
                line,
                column,
                len: range.len(),
                unit: ColumnUnit::Bytes,
            });
        }
        Ok(range.start + column)
    }

    /// Convert an LSP range to a byte interval.
    ///
    /// Fails if the end resolves before the start.
    pub fn range_offsets(&self, range: LspRange) -> Result<Range<usize>> {
        let start = self.position_offset(range.start)?;
        let end = self.position_offset(range.end)?;
        if end < start {
            return Err(Error::InvertedRange { start, end });
        }
        Ok(start..end)
    }

    /// Convert a byte interval to an LSP range.
    pub fn offsets_range(&self, start: usize, end: usize) -> Result<LspRange> {
        if end < start {
            return Err(Error::InvertedRange { start, end });
        }
        Ok(LspRange::new(
            self.offset_position(start)?,
            self.offset_position(end)?,
        ))
    }

    /// Convert a byte interval to a location in this document.
    pub fn offset_location(&self, start: usize, end: usize) -> Result<Location> {
        Ok(Location::new(self.uri.clone(), self.offsets_range(start, end)?))
    }

    /// Attach this document's uri to an LSP range, validating it first.
    pub fn range_location(&self, range: LspRange) -> Result<Location> {
        self.range_offsets(range)?;
        Ok(Location::new(self.uri.clone(), range))
    }

    /// Content covered by an LSP range.
    pub fn range_text(&self, range: LspRange) -> Result<&[u8]> {
        let offsets = self.range_offsets(range)?;
        Ok(&self.content[offsets])
    }

    /// Convert a parser position in `file` to an LSP position.
    ///
    /// `file` must be the registration of this mapper's content.
    pub fn pos_position(&self, file: &TokenFile, pos: usize) -> Result<Position> {
        let offset = file.offset(pos)?;
        self.offset_position(offset)
    }

    /// Convert a pair of parser positions in `file` to an LSP range.
    pub fn pos_range(&self, file: &TokenFile, start: usize, end: usize) -> Result<LspRange> {
        let start = file.offset(start)?;
        let end = file.offset(end)?;
        self.offsets_range(start, end)
    }

    /// Convert an LSP position to a parser position in `file`.
    pub fn position_pos(&self, file: &TokenFile, position: Position) -> Result<usize> {
        let offset = self.position_offset(position)?;
        file.pos(offset)
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.content.len() {
            return Err(Error::OffsetOutOfRange {
                offset,
                file: self.uri.to_string(),
                size: self.content.len(),
            });
        }
        Ok(())
    }
}

fn column_error(line: u32, column: usize, unit: ColumnUnit, err: ColumnError) -> Error {
    match err {
        ColumnError::BeyondEnd { len } => Error::ColumnOutOfRange {
            line,
            column,
            len,
            unit,
        },
        ColumnError::NotCharBoundary => Error::NotCharBoundary { line, column },
    }
}
