//! Persisted user lists: custom filter, keep-tags and find/replace.
//!
//! Each list lives in its own text file under the settings directory. A missing
//! file reads as empty and is created empty. Read and write failures are logged
//! and never propagate.

use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::text::dedup_comma_list;

pub const CUSTOM_FILTER_FILE: &str = "custom_filter.txt";
pub const KEEP_TAGS_FILE: &str = "keep_tags.txt";
pub const CUSTOM_REPLACE_FILE: &str = "custom_replace.txt";

/// Every file the store manages.
pub const LIST_FILES: [&str; 3] = [CUSTOM_FILTER_FILE, KEEP_TAGS_FILE, CUSTOM_REPLACE_FILE];

/// File-backed store for the persisted lists.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Create any missing list file empty, leaving existing ones untouched.
    ///
    /// Returns the paths that were created.
    pub fn ensure_files(&self) -> Result<Vec<PathBuf>, SettingsError> {
        let mut created = Vec::new();
        for file in LIST_FILES {
            let path = self.path(file);
            if !path.exists() {
                self.try_write(file, "")?;
                created.push(path);
            }
        }
        Ok(created)
    }

    fn try_read(&self, file: &str) -> Result<String, SettingsError> {
        let path = self.path(file);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("{} not found, creating it empty", path.display());
                self.try_write(file, "")?;
                Ok(String::new())
            }
            Err(source) => Err(SettingsError::Read { path, source }),
        }
    }

    fn try_write(&self, file: &str, content: &str) -> Result<(), SettingsError> {
        let path = self.path(file);
        std::fs::create_dir_all(&self.dir).map_err(|source| SettingsError::Write {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, content).map_err(|source| SettingsError::Write { path, source })
    }

    fn read_or_empty(&self, file: &str) -> String {
        self.try_read(file).unwrap_or_else(|e| {
            tracing::error!("{e}");
            String::new()
        })
    }

    fn write_logged(&self, file: &str, content: &str) -> bool {
        match self.try_write(file, content) {
            Ok(()) => {
                tracing::info!("Saved {}", self.path(file).display());
                true
            }
            Err(e) => {
                tracing::error!("{e}");
                false
            }
        }
    }

    pub fn custom_filter(&self) -> String {
        self.read_or_empty(CUSTOM_FILTER_FILE)
    }

    pub fn save_custom_filter(&self, filter: &str) -> bool {
        self.write_logged(CUSTOM_FILTER_FILE, filter)
    }

    pub fn keep_tags(&self) -> String {
        self.read_or_empty(KEEP_TAGS_FILE)
    }

    pub fn save_keep_tags(&self, tags: &str) -> bool {
        self.write_logged(KEEP_TAGS_FILE, tags)
    }

    fn try_custom_replace(&self) -> Result<(String, String), SettingsError> {
        let content = self.try_read(CUSTOM_REPLACE_FILE)?;
        if content.trim().is_empty() {
            return Ok((String::new(), String::new()));
        }
        let mut lines = content.trim().lines();
        match (lines.next(), lines.next()) {
            (Some(find), Some(replace)) => Ok((find.to_string(), replace.to_string())),
            _ => Err(SettingsError::Format(self.path(CUSTOM_REPLACE_FILE))),
        }
    }

    /// The find list and replace list, line 1 and line 2 of the file.
    pub fn custom_replace(&self) -> (String, String) {
        self.try_custom_replace().unwrap_or_else(|e| {
            tracing::error!("{e}");
            (String::new(), String::new())
        })
    }

    pub fn save_custom_replace(&self, find: &str, replace: &str) -> bool {
        self.write_logged(CUSTOM_REPLACE_FILE, &format!("{find}\n{replace}"))
    }
}

/// Normalize a user-edited comma list: trim, drop empties and duplicates.
pub fn optimize(list: &str) -> String {
    dedup_comma_list(list)
}
