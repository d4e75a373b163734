//! File-backed snapshot of the last good rate table.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use currex_core::rates::{ExchangeRateTable, SnapshotError, SnapshotRepository};
use tracing::debug;

/// Stores the table as pretty-printed JSON at a fixed path.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// snapshot, so readers never see a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotRepository {
    path: PathBuf,
}

impl JsonFileSnapshotRepository {
    /// Creates a repository for `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotRepository for JsonFileSnapshotRepository {
    async fn load(&self) -> Result<Option<ExchangeRateTable>, SnapshotError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No exchange rate snapshot yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn save(&self, table: &ExchangeRateTable) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(table)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), entries = table.len(), "Saved exchange rate snapshot");
        Ok(())
    }
}
