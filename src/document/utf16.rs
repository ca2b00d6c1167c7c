//! Column conversion between UTF-8 bytes and UTF-16 code units.
//!
//! LSP columns count UTF-16 code units. A character encoded in 1-3 UTF-8 bytes
//! is one unit; a 4-byte character (outside the Basic Multilingual Plane) is a
//! surrogate pair of two units. Bytes that are not valid UTF-8 are decoded one
//! at a time and count as a single unit each, like U+FFFD.
//!
//! The functions here work on a single line with its terminator removed.

/// Why a column could not be resolved within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnError {
    /// The column is past the end of the line. `len` is the line length in
    /// the unit of the requested column.
    BeyondEnd { len: usize },
    /// The byte column falls inside a multi-byte character.
    NotCharBoundary,
}

/// Walk the characters of `line`, yielding `(utf8_len, utf16_len)` per char.
fn char_widths(line: &[u8]) -> impl Iterator<Item = (usize, usize)> + '_ {
    line.utf8_chunks().flat_map(|chunk| {
        let valid = chunk
            .valid()
            .chars()
            .map(|c| (c.len_utf8(), c.len_utf16()));
        let invalid = chunk.invalid().iter().map(|_| (1, 1));
        valid.chain(invalid)
    })
}

/// Length of `line` in UTF-16 code units.
pub fn utf16_len(line: &[u8]) -> usize {
    char_widths(line).map(|(_, units)| units).sum()
}

/// Convert a UTF-16 column to a byte column within `line`.
///
/// A column between the two units of a surrogate pair is rounded down to the
/// start of that character instead of failing. The column equal to the UTF-16
/// length of the line is the end-of-line position.
pub fn byte_column_for_utf16(line: &[u8], utf16_col: u32) -> Result<usize, ColumnError> {
    let target = utf16_col as usize;
    let mut units = 0;
    let mut bytes = 0;

    for (width, len16) in char_widths(line) {
        if units == target {
            return Ok(bytes);
        }
        // Second unit of a surrogate pair: round down to the character start.
        if len16 == 2 && units + 1 == target {
            log::debug!(
                "UTF-16 column {} splits a surrogate pair, using byte column {}",
                utf16_col,
                bytes
            );
            return Ok(bytes);
        }
        units += len16;
        bytes += width;
    }

    if units == target {
        Ok(bytes)
    } else {
        Err(ColumnError::BeyondEnd { len: units })
    }
}

/// Convert a byte column to a UTF-16 column within `line`.
///
/// Fails if `byte_col` is inside a character or past the end of the line.
pub fn utf16_column_for_byte_column(line: &[u8], byte_col: usize) -> Result<u32, ColumnError> {
    let mut units = 0;
    let mut bytes = 0;

    for (width, len16) in char_widths(line) {
        if bytes == byte_col {
            return Ok(units as u32);
        }
        if bytes + width > byte_col {
            return Err(ColumnError::NotCharBoundary);
        }
        bytes += width;
        units += len16;
    }

    if bytes == byte_col {
        Ok(units as u32)
    } else {
        Err(ColumnError::BeyondEnd { len: bytes })
    }
}
