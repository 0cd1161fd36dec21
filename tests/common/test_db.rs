//! File-backed SQLite databases for relational connector tests.
//!
//! Each database lives in its own temporary directory and disappears with
//! the [`TestDatabase`] value.

#![allow(clippy::duplicate_mod)]

use secure_form_storage::domain::FormSettings;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway SQLite database
pub struct TestDatabase {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestDatabase {
    pub fn new(prefix: &str) -> Self {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir().expect("create temp dir");
        let path = dir.path().join("secure.db");
        Self { _dir: dir, path }
    }

    /// Connection URL creating the file on first connect
    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }

    /// Form settings pointing the relational connector at this database
    pub fn settings(&self) -> FormSettings {
        FormSettings::new()
            .with("enabled", "1")
            .with("connector", "relational")
            .with("secure_database_url", self.url())
    }
}
