use crate::utils::error::{ReleaseError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_range, validate_url, Validate,
    LINK_TYPES, PACKAGE_STATUSES, UPLOAD_TARGETS,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_PACKAGE_NAME: &str = "release";
pub const DEFAULT_RETRY_LIMIT: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const MAX_RETRY_LIMIT: u32 = 10;

// 只替換環境變數名稱，`${nextRelease.version}` 之類的模板留給發佈階段
static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    pub gitlab_url: Option<String>,
    pub gitlab_api_path_prefix: Option<String>,
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
    #[serde(default)]
    pub milestones: Vec<String>,
    pub proxy: Option<String>,
    pub retry_limit: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    #[serde(default)]
    pub use_job_token: bool,
}

/// 資產設定：單純的路徑（可為 glob），或完整的物件定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetSpec {
    Path(String),
    Detailed(AssetDefinition),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathPatterns {
    One(String),
    Many(Vec<String>),
}

impl PathPatterns {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            PathPatterns::One(p) => vec![p.as_str()],
            PathPatterns::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathPatterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

impl AssetSpec {
    pub fn into_definition(self) -> AssetDefinition {
        match self {
            AssetSpec::Path(path) => AssetDefinition {
                path: Some(PathPatterns::One(path)),
                ..Default::default()
            },
            AssetSpec::Detailed(def) => def,
        }
    }

    pub fn definition(&self) -> AssetDefinition {
        self.clone().into_definition()
    }
}

impl AssetDefinition {
    pub fn first_path(&self) -> Option<&str> {
        self.path
            .as_ref()
            .and_then(|p| p.patterns().into_iter().next())
    }

    fn validate_at(&self, index: usize) -> Result<()> {
        let field = |name: &str| format!("assets[{}].{}", index, name);

        let has_url = self.url.as_deref().is_some_and(|u| !u.trim().is_empty());
        let has_path = self
            .path
            .as_ref()
            .is_some_and(|p| p.patterns().iter().any(|s| !s.trim().is_empty()));
        if !has_url && !has_path {
            return Err(ReleaseError::InvalidConfigValueError {
                field: format!("assets[{}]", index),
                value: format!("{:?}", self),
                reason: "An asset needs a non-empty 'path' or 'url'".to_string(),
            });
        }

        if let Some(target) = &self.target {
            validate_one_of(&field("target"), target, &UPLOAD_TARGETS)?;
        }
        if let Some(status) = &self.status {
            validate_one_of(&field("status"), status, &PACKAGE_STATUSES)?;
        }
        if let Some(link_type) = &self.link_type {
            validate_one_of(&field("type"), link_type, &LINK_TYPES)?;
        }
        if let Some(package_name) = &self.package_name {
            validate_non_empty_string(&field("package_name"), package_name)?;
        }
        Ok(())
    }
}

impl PluginConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ReleaseError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GITLAB_HOST})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit.unwrap_or(DEFAULT_RETRY_LIMIT)
    }

    pub fn retry_delay_ms(&self) -> u64 {
        self.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS)
    }
}

impl Validate for PluginConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.gitlab_url {
            validate_url("gitlab_url", url)?;
        }
        if let Some(proxy) = &self.proxy {
            validate_url("proxy", proxy)?;
        }
        validate_range("retry_limit", self.retry_limit(), 0, MAX_RETRY_LIMIT)?;

        for (index, asset) in self.assets.iter().enumerate() {
            asset.definition().validate_at(index)?;
        }
        for (index, milestone) in self.milestones.iter().enumerate() {
            validate_non_empty_string(&format!("milestones[{}]", index), milestone)?;
        }

        tracing::debug!("✅ Plugin configuration validation passed");
        Ok(())
    }
}
