//! JSON file account store
//!
//! One `<account-id>.json` per account under a base directory. Writes go to a
//! temporary sibling first and are renamed into place.

use async_trait::async_trait;
use keeper_core::{AccountId, KeeperError};
use keeper_recovery::{AccountRecord, RecoveryStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const RECORD_EXTENSION: &str = "json";

/// Filesystem-backed [`RecoveryStore`]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_path: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `base_path`, creating the directory if needed.
    pub async fn open(base_path: impl Into<PathBuf>) -> Result<Self, KeeperError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            KeeperError::storage(format!(
                "Failed to create store directory {}: {e}",
                base_path.display()
            ))
        })?;
        debug!(path = %base_path.display(), "opened account store");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, account_id: &AccountId) -> PathBuf {
        self.base_path.join(format!("{account_id}.{RECORD_EXTENSION}"))
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), KeeperError> {
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| KeeperError::storage(format!("Failed to create temp file: {e}")))?;
        file.write_all(data)
            .await
            .map_err(|e| KeeperError::storage(format!("Failed to write record: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| KeeperError::storage(format!("Failed to sync record: {e}")))?;

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| KeeperError::storage(format!("Failed to rename temp file: {e}")))
    }
}

#[async_trait]
impl RecoveryStore for JsonFileStore {
    async fn load(&self, account_id: &AccountId) -> keeper_core::Result<Option<AccountRecord>> {
        let bytes = match fs::read(self.record_path(account_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(KeeperError::storage(format!(
                    "Failed to read account {account_id}: {e}"
                )))
            }
        };
        let record = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }

    async fn save(&self, record: &AccountRecord) -> keeper_core::Result<()> {
        let json = serde_json::to_vec_pretty(record)?;
        self.write_atomic(&self.record_path(&record.account_id), &json)
            .await
    }

    async fn list(&self) -> keeper_core::Result<Vec<AccountId>> {
        let mut read_dir = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| KeeperError::storage(format!("Failed to read directory: {e}")))?;

        let mut accounts = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| KeeperError::storage(format!("Failed to read entry: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match stem.parse::<AccountId>() {
                Ok(account_id) => accounts.push(account_id),
                Err(_) => warn!(path = %path.display(), "skipping unrecognised file in store"),
            }
        }
        accounts.sort();
        Ok(accounts)
    }
}
