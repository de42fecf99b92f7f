use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::model::Document;

/// Whole-file persistence for the tracking document. Every invocation loads
/// the file once and rewrites it once; there is no locking and no atomic
/// rename, the last writer wins.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full document. A missing file is an empty document; an
    /// unreadable or malformed file is an error.
    pub fn load(&self) -> Result<Document> {
        if !self.path.exists() {
            debug!("data file {:?} does not exist yet, starting empty", self.path);
            return Ok(Document::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read data file {:?}.", self.path))?;
        let document = serde_json::from_str(&raw)
            .with_context(|| format!("Data file {:?} is not valid JSON.", self.path))?;
        Ok(document)
    }

    /// Overwrite the data file with the serialized document, creating the
    /// parent directory if needed.
    pub fn save(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}.", parent))?;
        }
        let raw = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write data file {:?}.", self.path))?;
        debug!("saved document to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn load_missing_file_yields_empty_document() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("data.json"));
        let document = store.load().unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("data.json"));

        let mut document = Document::new();
        document.create("thesis").unwrap();
        document.create("garden").unwrap();
        document.start("garden", Local::now()).unwrap();
        store.save(&document).unwrap();

        assert_eq!(store.load().unwrap(), document);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("nested").join("deeper").join("data.json"));
        store.save(&Document::new()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"{ not json").unwrap();

        let store = Store::new(path);
        assert!(store.load().is_err());
    }
}
