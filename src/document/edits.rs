//! Producing new document content from LSP edits.
//!
//! Content is never modified in place. Applying edits yields a fresh buffer,
//! which the caller wraps in a new [`Mapper`] to get a consistent index.

use std::ops::Range;

use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, TextEdit};

use crate::error::{Error, Result};

use super::mapper::Mapper;

/// Apply a set of simultaneous text edits to the mapper's content.
///
/// All ranges refer to the original content. Edits are applied in order of
/// their start offset; edits with the same start keep their given order.
/// Overlapping edits are rejected.
pub fn apply_text_edits(mapper: &Mapper, edits: &[TextEdit]) -> Result<Vec<u8>> {
    let mut resolved: Vec<(Range<usize>, &str)> = edits
        .iter()
        .map(|edit| -> Result<_> {
            Ok((mapper.range_offsets(edit.range)?, edit.new_text.as_str()))
        })
        .collect::<Result<_>>()?;

    // Stable sort keeps insertion order for edits at the same offset.
    resolved.sort_by_key(|(range, _)| range.start);

    for pair in resolved.windows(2) {
        let (previous, next) = (&pair[0].0, &pair[1].0);
        if next.start < previous.end {
            return Err(Error::OverlappingEdits {
                previous: previous.clone(),
                next: next.clone(),
            });
        }
    }

    let content = mapper.content();
    let mut out = Vec::with_capacity(content.len());
    let mut last = 0;
    for (range, new_text) in resolved {
        out.extend_from_slice(&content[last..range.start]);
        out.extend_from_slice(new_text.as_bytes());
        last = range.end;
    }
    out.extend_from_slice(&content[last..]);

    Ok(out)
}

/// Apply `didChange` content changes in order.
///
/// A change without a range replaces the whole document. A ranged change is
/// resolved against the content produced by the changes before it.
pub fn apply_content_changes(
    mapper: &Mapper,
    changes: &[TextDocumentContentChangeEvent],
) -> Result<Vec<u8>> {
    let mut text = mapper.content().to_vec();

    for change in changes {
        match change.range {
            Some(range) => {
                let current = Mapper::new(mapper.uri().clone(), text.as_slice());
                let offsets = current.range_offsets(range)?;
                text.splice(offsets, change.text.bytes());
            }
            None => {
                text = change.text.clone().into_bytes();
            }
        }
    }

    Ok(text)
}
