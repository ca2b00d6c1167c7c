//! Document content and position conversion.
//!
//! This module provides:
//! - `LineIndex` for line start lookups over immutable content
//! - UTF-16 <-> byte column conversion within a line
//! - `TokenFile` and `FileRegistry` for parser positions
//! - `Mapper` for offset <-> LSP position conversion
//! - `DocumentStore` for publishing immutable snapshots

mod edits;
mod file;
mod mapper;
mod state;
mod text;
pub mod utf16;

pub use edits::{apply_content_changes, apply_text_edits};
pub use file::{FileRegistry, TokenFile, DEFAULT_BASE};
pub use mapper::{Mapper, Point};
pub use state::{DocumentSnapshot, DocumentStore};
pub use text::LineIndex;
