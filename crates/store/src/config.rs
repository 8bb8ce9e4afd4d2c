//! Store configuration.

use std::path::PathBuf;

use anyhow::Context;

use jsfashion_storage::FileStorage;

use crate::error::{StoreError, StoreResult};

/// Namespace key the storefront has always persisted its cart under.
pub const DEFAULT_STORAGE_KEY: &str = "cart-storage";

pub const ENV_CART_KEY: &str = "JSFASHION_CART_KEY";
pub const ENV_DATA_DIR: &str = "JSFASHION_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key of the blob holding the whole cart.
    pub storage_key: String,
    /// Root directory for file-backed storage.
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: data_dir.into(),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Read `JSFASHION_CART_KEY` / `JSFASHION_DATA_DIR`, falling back to
    /// `cart-storage` and `{app_data_dir}/jsfashion`.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = match non_blank(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir().map_err(StoreError::Config)?,
        };
        let storage_key = non_blank(ENV_CART_KEY).unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            storage_key,
            data_dir,
        })
    }

    /// File-backed storage rooted at `data_dir`.
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(self.data_dir.clone())
    }
}

/// Resolve `{app_data_dir}/jsfashion`.
fn default_data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    Ok(base.join("jsfashion"))
}
