use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const RELEASE_NAME: &str = "GitLab release";

/// 宿主發佈流程提供的上下文
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub cwd: PathBuf,
    pub env: HashMap<String, String>,
    pub repository_url: String,
    pub branch: BranchInfo,
    pub next_release: NextRelease,
}

impl ReleaseContext {
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn is_gitlab_ci(&self) -> bool {
        self.env_var("GITLAB_CI") == Some("true")
    }
}

#[derive(Debug, Clone)]
pub struct BranchInfo {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NextRelease {
    pub version: String,
    pub git_tag: String,
    pub git_head: String,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub channel: Option<String>,
}

/// 發佈結果，回傳給宿主流程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub name: String,
    pub url: String,
}

/// 已上傳（或外部提供）的資產，尚未解析成最終連結
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedAsset {
    pub label: Option<String>,
    pub alt: Option<String>,
    pub url: Option<String>,
    pub raw_url: Option<String>,
    pub full_path: Option<String>,
    pub link_type: Option<String>,
    pub filepath: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseLink {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_asset_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAssets {
    pub links: Vec<ReleaseLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePayload {
    pub tag_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub milestones: Vec<String>,
    pub assets: ReleaseAssets,
}

/// `POST /projects/:id/uploads` 的回應
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectUploadResponse {
    pub url: String,
    pub alt: Option<String>,
    pub full_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectAccess {
    pub access_level: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPermissions {
    pub project_access: Option<ProjectAccess>,
    pub group_access: Option<ProjectAccess>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectResponse {
    #[serde(default)]
    pub permissions: ProjectPermissions,
}
