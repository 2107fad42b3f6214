//! Settings persistence
//!
//! Stores the export preferences, the constants used for parsing and the list
//! of recently loaded directories as TOML.

use crate::error::{DocError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default extension of generated pages
const DEFAULT_PAGE_EXTENSION: &str = "html";
/// Default extension of parsed source files
const DEFAULT_SOURCE_EXTENSION: &str = "cs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Document enum members on the enum's page
    pub expand_enums: bool,
    /// Document struct members on the struct's page
    pub expand_structs: bool,
    pub export_attributes: bool,
    /// Extension of generated pages, without the dot
    pub file_extension: String,
    pub source_extension: String,
    /// `;`-separated preprocessor constants
    pub define_constants: String,
    /// Write `index.php` redirects into generated directories
    pub php_fillers: bool,
    pub export_public: bool,
    pub export_internal: bool,
    pub export_protected: bool,
    pub export_private: bool,
    /// Recently loaded directories, most recent first
    pub recents: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expand_enums: false,
            expand_structs: false,
            export_attributes: false,
            file_extension: DEFAULT_PAGE_EXTENSION.to_string(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            define_constants: String::new(),
            php_fillers: false,
            export_public: true,
            export_internal: false,
            export_protected: false,
            export_private: false,
            recents: Vec::new(),
        }
    }
}

impl Settings {
    /// Maximum number of recent directories to keep
    const MAX_RECENT: usize = 10;

    /// `<config_dir>/sharpdoc/settings.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sharpdoc").join("settings.toml"))
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(DocError::io("read", path, e)),
        };
        toml::from_str(&content).map_err(|source| DocError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DocError::io("create", parent, e))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| DocError::io("write", path, e))
    }

    /// Move `directory` to the front of the recents list
    pub fn add_recent(&mut self, directory: PathBuf) {
        self.recents.retain(|p| p != &directory);
        self.recents.insert(0, directory);
        self.recents.truncate(Self::MAX_RECENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.file_extension, "html");
        assert_eq!(settings.source_extension, "cs");
        assert!(settings.export_public);
        assert!(!settings.export_private);
        assert!(settings.recents.is_empty());
    }

    #[test]
    fn test_recents_move_to_front() {
        let mut settings = Settings::default();
        let first = PathBuf::from("/src/first");
        let second = PathBuf::from("/src/second");

        settings.add_recent(first.clone());
        settings.add_recent(second.clone());
        assert_eq!(settings.recents, vec![second.clone(), first.clone()]);

        settings.add_recent(first.clone());
        assert_eq!(settings.recents, vec![first, second]);
    }

    #[test]
    fn test_recents_are_capped() {
        let mut settings = Settings::default();
        for i in 0..15 {
            settings.add_recent(PathBuf::from(format!("/src/{}", i)));
        }
        assert_eq!(settings.recents.len(), 10);
        assert_eq!(settings.recents[0], PathBuf::from("/src/14"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings = toml::from_str("expand_enums = true\n").unwrap();
        assert!(settings.expand_enums);
        assert_eq!(settings.file_extension, "html");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.define_constants = "DEBUG;TRACE".to_string();
        settings.add_recent(PathBuf::from("/src/project"));
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "expand_enums = \"yes\"").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(DocError::SettingsRead { .. })
        ));
    }
}
