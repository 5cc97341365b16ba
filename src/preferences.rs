//! Persisted language preference.
//!
//! The preference is a single language code stored under
//! [`PREFERENCE_KEY`] in a small key–value store. Losing it is harmless (the
//! dashboard falls back to the native language), so storage failures are
//! logged and swallowed rather than returned.

use crate::i18n::Language;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Key the language code is stored under.
pub const PREFERENCE_KEY: &str = "agritech-language";

/// Durable storage for the active language.
pub trait PreferenceStore: Send + Sync {
    /// The stored language, or `None` if absent, unreadable, or not a
    /// supported language code.
    fn load(&self) -> Option<Language>;

    /// Overwrite the stored language. Never fails from the caller's side.
    fn save(&self, language: Language);
}

fn parse_code(code: &str) -> Option<Language> {
    match Language::from_code(code) {
        Ok(language) => Some(language),
        Err(e) => {
            debug!("Ignoring stored language preference: {}", e);
            None
        }
    }
}

/// Preference stored in a JSON object file, e.g. `{"agritech-language": "hi"}`.
///
/// Other keys in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> io::Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "preferences file is not a JSON object",
            )),
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Option<Language> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to read language preference from {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        entries
            .get(PREFERENCE_KEY)
            .and_then(Value::as_str)
            .and_then(parse_code)
    }

    fn save(&self, language: Language) {
        // An unreadable file is replaced rather than blocking the save
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(
            PREFERENCE_KEY.to_string(),
            Value::String(language.code().to_string()),
        );

        if let Err(e) = self.write_entries(&entries) {
            warn!(
                "Failed to save language preference to {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Preference held in memory only; lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a raw code, which need not be valid.
    pub fn with_code(code: &str) -> Self {
        Self {
            value: Mutex::new(Some(code.to_string())),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Option<Language> {
        let value = self.value.lock().ok()?.clone()?;
        parse_code(&value)
    }

    fn save(&self, language: Language) {
        match self.value.lock() {
            Ok(mut value) => *value = Some(language.code().to_string()),
            Err(_) => warn!("Language preference lock poisoned; preference not saved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("preferences.json");

        FilePreferenceStore::new(&path).save(Language::PUNJABI);

        // A fresh store reads what the first one wrote
        let loaded = FilePreferenceStore::new(&path).load();
        assert_eq!(loaded, Some(Language::PUNJABI));
    }

    #[test]
    fn test_file_missing_is_none() {
        let dir = TempDir::new().expect("tempdir");
        let store = FilePreferenceStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_file_unknown_code_is_none() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"agritech-language": "fr"}"#).unwrap();

        assert_eq!(FilePreferenceStore::new(&path).load(), None);
    }

    #[test]
    fn test_file_corrupt_is_none_and_save_recovers() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FilePreferenceStore::new(&path);
        assert_eq!(store.load(), None);

        store.save(Language::HINDI);
        assert_eq!(store.load(), Some(Language::HINDI));
    }

    #[test]
    fn test_file_save_preserves_other_keys() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"agritech-theme": "dark", "agritech-language": "en"}"#).unwrap();

        FilePreferenceStore::new(&path).save(Language::HINDI);

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["agritech-theme"], "dark");
        assert_eq!(raw[PREFERENCE_KEY], "hi");
    }

    #[test]
    fn test_file_save_creates_parent_directory() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("dir").join("preferences.json");

        let store = FilePreferenceStore::new(&path);
        store.save(Language::PUNJABI);

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load(), Some(Language::PUNJABI));
    }

    #[test]
    fn test_file_save_failure_is_swallowed() {
        let dir = TempDir::new().expect("tempdir");
        // The "parent directory" is a regular file, so the write must fail
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = FilePreferenceStore::new(blocker.join("preferences.json"));

        store.save(Language::HINDI);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let dir = TempDir::new().expect("tempdir");
        let store = FilePreferenceStore::new(dir.path().join("preferences.json"));

        store.save(Language::HINDI);
        store.save(Language::PUNJABI);
        store.save(Language::ENGLISH);

        assert_eq!(store.load(), Some(Language::ENGLISH));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.load(), None);

        store.save(Language::HINDI);
        assert_eq!(store.load(), Some(Language::HINDI));
    }

    #[test]
    fn test_memory_store_invalid_seed() {
        assert_eq!(MemoryPreferenceStore::with_code("xx").load(), None);
        assert_eq!(
            MemoryPreferenceStore::with_code("pa").load(),
            Some(Language::PUNJABI)
        );
    }
}
