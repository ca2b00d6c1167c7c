//! Document snapshots and their publication.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};

use crate::error::{Error, Result};
use crate::settings::Settings;

use super::edits::apply_content_changes;
use super::file::{FileRegistry, TokenFile};
use super::mapper::Mapper;

/// One immutable version of an open document.
#[derive(Debug)]
pub struct DocumentSnapshot {
    /// Document version from the client.
    pub version: i32,
    /// Position converter for this version's content.
    pub mapper: Arc<Mapper>,
    /// Registration of this version in the shared position space.
    pub file: TokenFile,
}

/// Thread-safe storage for open documents.
///
/// Updates never touch a published snapshot. Each one builds a new
/// [`DocumentSnapshot`] and swaps the `Arc`, so readers holding an older
/// snapshot keep a consistent view of that version.
#[derive(Debug)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<DocumentSnapshot>>,
    registry: FileRegistry,
    reject_stale_versions: bool,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create a new empty document store with default settings.
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    /// Create a new empty document store configured by `settings`.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            documents: DashMap::new(),
            registry: FileRegistry::new(settings.files.base),
            reject_stale_versions: settings.documents.reject_stale_versions,
        }
    }

    /// The registry that assigns positions to published snapshots.
    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Open or replace a document with the given text.
    pub fn open(&self, uri: Url, text: String, version: i32) -> Result<Arc<DocumentSnapshot>> {
        let snapshot = self.snapshot(uri.clone(), text.into_bytes(), version)?;
        if let Some(previous) = self.documents.insert(uri, Arc::clone(&snapshot)) {
            self.registry.remove(&previous.file);
        }
        Ok(snapshot)
    }

    /// Apply `didChange` content changes and publish the resulting version.
    ///
    /// The version check, the rebuild and the publication happen while the
    /// document's entry is locked, so concurrent changes to one document are
    /// applied one after the other and the published version never goes back.
    pub fn change(
        &self,
        uri: &Url,
        version: i32,
        changes: &[TextDocumentContentChangeEvent],
    ) -> Result<Arc<DocumentSnapshot>> {
        let mut current = self
            .documents
            .get_mut(uri)
            .ok_or_else(|| Error::document_not_found(uri.as_str()))?;

        if self.reject_stale_versions && version <= current.version {
            log::warn!(
                "ignoring change to {} with version {} (current version is {})",
                uri,
                version,
                current.version
            );
            return Err(Error::StaleVersion {
                uri: uri.to_string(),
                current: current.version,
                received: version,
            });
        }

        let content = apply_content_changes(&current.mapper, changes)?;
        let snapshot = self.snapshot(uri.clone(), content, version)?;
        let previous = std::mem::replace(&mut *current, Arc::clone(&snapshot));
        drop(current);

        // Superseded versions stay usable by readers holding them, but their
        // positions no longer resolve through the registry.
        self.registry.remove(&previous.file);
        Ok(snapshot)
    }

    /// Close a document and release its registration.
    pub fn close(&self, uri: &Url) {
        if let Some((_, snapshot)) = self.documents.remove(uri) {
            self.registry.remove(&snapshot.file);
        }
    }

    /// Get a document's current snapshot.
    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentSnapshot>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }

    /// Get the mapper of a document's current snapshot.
    pub fn mapper(&self, uri: &Url) -> Option<Arc<Mapper>> {
        self.get(uri).map(|snapshot| Arc::clone(&snapshot.mapper))
    }

    fn snapshot(&self, uri: Url, content: Vec<u8>, version: i32) -> Result<Arc<DocumentSnapshot>> {
        let file = self.registry.add_file(uri.as_str(), content.len())?;
        log::debug!(
            "publishing {} version {} ({} bytes, base {})",
            uri,
            version,
            content.len(),
            file.base()
        );
        Ok(Arc::new(DocumentSnapshot {
            version,
            mapper: Arc::new(Mapper::new(uri, content)),
            file,
        }))
    }
}
