//! Parser positions and their registered files.
//!
//! A parser numbers every file it has seen in one shared position space: each
//! file owns the contiguous interval `[base, base + size]`. [`TokenFile`] is
//! the only sanctioned way to move between that space and byte offsets into a
//! single file. Do not do `pos - base` arithmetic anywhere else, it skips both
//! the bounds check and the end-of-file workaround below.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Error, Result};

/// Base and size of one file in a shared position space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenFile {
    name: Arc<str>,
    base: usize,
    size: usize,
}

impl TokenFile {
    pub fn new(name: impl Into<Arc<str>>, base: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            base,
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Last valid position of the file (the end-of-file position).
    ///
    /// Saturates at `usize::MAX` for a file that does not fit in the
    /// position space.
    pub fn end(&self) -> usize {
        self.base.saturating_add(self.size)
    }

    /// Whether `pos` lies in `[base, base + size]`.
    ///
    /// Private on purpose: [`TokenFile::offset`] accepts one more position
    /// than this, and a public `contains` would be ambiguous.
    fn contains(&self, pos: usize) -> bool {
        self.base <= pos && pos <= self.end()
    }

    /// Convert a parser position to a byte offset into this file.
    ///
    /// Error-recovering parsers can produce a node whose end lies one byte
    /// beyond EOF. As a compatibility shim, `base + size + 1` is accepted and
    /// mapped to the EOF offset `size`. Any other position outside the file is
    /// an error.
    pub fn offset(&self, pos: usize) -> Result<usize> {
        if !self.contains(pos) {
            // Compatibility shim for end positions one byte beyond EOF.
            if self.end().checked_add(1) == Some(pos) {
                log::debug!(
                    "pos {} is one byte beyond EOF of {}, mapping to offset {}",
                    pos,
                    self.name,
                    self.size
                );
                return Ok(self.size);
            }

            return Err(Error::PosOutOfRange {
                pos,
                file: self.name.to_string(),
                base: self.base,
                end: self.end(),
            });
        }
        Ok(pos - self.base)
    }

    /// Convert a byte offset into this file to a parser position.
    ///
    /// Unlike [`TokenFile::offset`] there is no end-of-file tolerance here.
    pub fn pos(&self, offset: usize) -> Result<usize> {
        let out_of_range = || Error::OffsetOutOfRange {
            offset,
            file: self.name.to_string(),
            size: self.size,
        };
        if offset > self.size {
            return Err(out_of_range());
        }
        self.base.checked_add(offset).ok_or_else(out_of_range)
    }
}

/// Hands out non-overlapping [`TokenFile`]s in one position space.
///
/// Each file reserves `size + 1` positions so its EOF position never equals
/// the base of the next file. The registry is an explicit value: create one
/// per position space, there is no process-wide instance.
///
/// Bases are never reused. [`FileRegistry::remove`] only stops
/// [`FileRegistry::file_for`] from resolving positions to a file.
#[derive(Debug)]
pub struct FileRegistry {
    inner: RwLock<RegistryState>,
}

#[derive(Debug)]
struct RegistryState {
    next_base: usize,
    files: Vec<TokenFile>,
}

/// Base of the first registered file. Position 0 means "no position".
pub const DEFAULT_BASE: usize = 1;

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE)
    }
}

impl FileRegistry {
    /// Create a registry whose first file starts at `base`.
    pub fn new(base: usize) -> Self {
        Self {
            inner: RwLock::new(RegistryState {
                next_base: base,
                files: Vec::new(),
            }),
        }
    }

    /// Base that the next registered file will receive.
    pub fn next_base(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .next_base
    }

    /// Register a file of `size` bytes and return its identity.
    ///
    /// Fails if the file, plus the position after its EOF, does not fit in
    /// the remaining position space.
    pub fn add_file(&self, name: impl Into<Arc<str>>, size: usize) -> Result<TokenFile> {
        let name = name.into();
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next_base = state
            .next_base
            .checked_add(size)
            .and_then(|end| end.checked_add(1))
            .ok_or_else(|| Error::PositionSpaceExhausted {
                file: name.to_string(),
                size,
                base: state.next_base,
            })?;
        let file = TokenFile::new(name, state.next_base, size);
        state.next_base = next_base;
        state.files.push(file.clone());
        Ok(file)
    }

    /// Unregister `file`. Returns whether it was registered.
    pub fn remove(&self, file: &TokenFile) -> bool {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match state.files.binary_search_by_key(&file.base, |f| f.base) {
            Ok(idx) if state.files[idx] == *file => {
                state.files.remove(idx);
                true
            }
            _ => false,
        }
    }

    /// Find the registered file whose interval contains `pos`.
    pub fn file_for(&self, pos: usize) -> Option<TokenFile> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        // Files are pushed in increasing base order.
        let idx = state.files.partition_point(|f| f.base <= pos);
        let file = state.files.get(idx.checked_sub(1)?)?;
        file.contains(pos).then(|| file.clone())
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .files
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
