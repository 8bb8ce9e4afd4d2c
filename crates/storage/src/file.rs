//! One JSON file per key under a root directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::backend::CartStorage;
use crate::error::StorageResult;

/// File-backed storage: `{root}/{key}.json`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader never sees a half-written blob.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`. Characters outside `[A-Za-z0-9._-]`
    /// are replaced so a key can never escape the root directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let safe = safe.trim_start_matches('.');
        let name = if safe.is_empty() { "_" } else { safe };
        self.root.join(format!("{name}.json"))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("failed to read cart blob at {path:?}"))
                .into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create storage directory at {:?}", self.root))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("failed to write temp file {tmp:?}"))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("failed to move {tmp:?} into place at {path:?}"))?;
        Ok(())
    }
}
