//! Settings infrastructure for posmap.
//!
//! Settings come from a `settings.toml` file:
//!
//! ```toml
//! [files]
//! # First base handed out in the shared position space.
//! base = 1
//!
//! [documents]
//! # Reject didChange notifications whose version is not newer.
//! reject_stale_versions = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::document::DEFAULT_BASE;

/// Name of the settings file looked up by [`discover_settings`].
pub const SETTINGS_FILE: &str = "settings.toml";

/// Root settings structure loaded from settings.toml.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Position space configuration.
    pub files: FileSettings,

    /// Document store configuration.
    pub documents: DocumentSettings,
}

/// Position space settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    /// Base of the first registered file. 0 is reserved for "no position"
    /// by most parsers, hence the default of 1.
    pub base: usize,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self { base: DEFAULT_BASE }
    }
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    pub reject_stale_versions: bool,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            reject_stale_versions: true,
        }
    }
}

/// Parse settings from TOML text.
pub fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

/// Load settings from a settings.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("failed to parse {}: {}", path.display(), e);
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

/// Locate the settings file that applies to `start_dir`.
///
/// The nearest ancestor (starting with `start_dir` itself) wins. Failing
/// that, the first immediate child directory, in name order, that holds one.
pub fn find_settings_file(start_dir: &Path) -> Option<PathBuf> {
    let in_dir = |dir: &Path| Some(dir.join(SETTINGS_FILE)).filter(|path| path.is_file());

    start_dir.ancestors().find_map(in_dir).or_else(|| {
        let mut children: Vec<PathBuf> = std::fs::read_dir(start_dir)
            .ok()?
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
            .map(|entry| entry.path())
            .collect();
        children.sort();
        children.iter().find_map(|dir| in_dir(dir.as_path()))
    })
}

/// Discover and load the settings that apply to `start_dir`.
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// holding the file found by [`find_settings_file`], or default settings and
/// `start_dir` when there is none.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let Some(path) = find_settings_file(start_dir) else {
        return (Settings::default(), start_dir.to_path_buf());
    };
    log::debug!("using settings from {}", path.display());
    let dir = path.parent().unwrap_or(start_dir).to_path_buf();
    (load_settings(&path), dir)
}
