//! Position mapping for language servers.
//!
//! Translates between three ways of addressing a location in a document:
//!
//! - byte offsets into the UTF-8 content,
//! - parser positions (`base + offset` in a position space shared by many
//!   files), see [`TokenFile`],
//! - LSP positions (zero-based line, column in UTF-16 code units), see
//!   [`Mapper`].
//!
//! ```
//! use posmap::Mapper;
//! use tower_lsp::lsp_types::{Position, Url};
//!
//! let uri = Url::parse("file:///main.go").unwrap();
//! let mapper = Mapper::new(uri, "a𐐀b\n".as_bytes());
//!
//! assert_eq!(mapper.position_offset(Position::new(0, 3)).unwrap(), 5);
//! assert_eq!(mapper.offset_position(5).unwrap(), Position::new(0, 3));
//! ```

mod document;
mod error;
pub mod settings;

pub use document::utf16;
pub use document::{
    apply_content_changes, apply_text_edits, DocumentSnapshot, DocumentStore, FileRegistry,
    LineIndex, Mapper, Point, TokenFile, DEFAULT_BASE,
};
pub use error::{ColumnUnit, Error, ErrorKind, Result};
pub use settings::{discover_settings, find_settings_file, load_settings, Settings};
