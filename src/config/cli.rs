use crate::domain::ports::{EntryKind, Storage};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// 以工作目錄為基準讀取本地資產檔案
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let metadata = tokio::fs::metadata(self.full_path(path)).await.ok()?;
        Some(if metadata.is_file() {
            EntryKind::File
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        })
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.full_path(path)).await?;
        Ok(data)
    }
}
