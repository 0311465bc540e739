use crate::domain::model::{ReleaseContext, ReleaseInfo};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// 讀取待上傳資產的來源
pub trait Storage: Send + Sync {
    fn entry_kind(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Option<EntryKind>> + Send;
    fn read_file(&self, path: &Path)
        -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

#[async_trait]
pub trait ReleasePlugin: Send + Sync {
    async fn verify_conditions(&self, context: &ReleaseContext) -> Result<()>;
    async fn publish(&self, context: &ReleaseContext) -> Result<ReleaseInfo>;
}
