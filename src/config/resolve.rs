use crate::config::plugin_config::{AssetSpec, PluginConfig};
use crate::domain::model::ReleaseContext;
use crate::utils::urls::url_join;
use std::time::Duration;

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_API_PATH_PREFIX: &str = "/api/v4";

/// GitLab 認證方式
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    PrivateToken(String),
    JobToken(String),
}

impl Credential {
    pub fn header_name(&self) -> &'static str {
        match self {
            Credential::PrivateToken(_) => "PRIVATE-TOKEN",
            Credential::JobToken(_) => "JOB-TOKEN",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Credential::PrivateToken(token) | Credential::JobToken(token) => token,
        }
    }

    pub fn is_job_token(&self) -> bool {
        matches!(self, Credential::JobToken(_))
    }
}

// token 不可出現在日誌中
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(***)", self.header_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub limit: u32,
    pub base_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub gitlab_url: String,
    pub gitlab_api_url: String,
    pub credential: Option<Credential>,
    pub assets: Vec<AssetSpec>,
    pub milestones: Vec<String>,
    pub proxy: Option<String>,
    pub retry: RetryPolicy,
}

/// 合併插件設定與 CI 環境變數
pub fn resolve_config(config: &PluginConfig, context: &ReleaseContext) -> ResolvedConfig {
    let in_gitlab_ci = context.is_gitlab_ci();
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

    let user_gitlab_url = non_empty(&config.gitlab_url);
    let user_prefix = config.gitlab_api_path_prefix.clone();

    let gitlab_url = user_gitlab_url
        .clone()
        .or_else(|| {
            in_gitlab_ci
                .then(|| context.env_var("CI_SERVER_URL").map(str::to_string))
                .flatten()
        })
        .or_else(|| context.env_var("GL_URL").map(str::to_string))
        .or_else(|| context.env_var("GITLAB_URL").map(str::to_string))
        .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string());

    let gitlab_api_url = match (&user_gitlab_url, &user_prefix) {
        (Some(url), Some(prefix)) => url_join(&[url.as_str(), prefix.as_str()]),
        _ => match context.env_var("CI_API_V4_URL").filter(|_| in_gitlab_ci) {
            Some(api_url) => api_url.to_string(),
            None => {
                let prefix = user_prefix
                    .clone()
                    .or_else(|| context.env_var("GL_PREFIX").map(str::to_string))
                    .or_else(|| context.env_var("GITLAB_PREFIX").map(str::to_string))
                    .unwrap_or_else(|| DEFAULT_API_PATH_PREFIX.to_string());
                url_join(&[gitlab_url.as_str(), prefix.as_str()])
            }
        },
    };

    let credential = if config.use_job_token {
        context
            .env_var("CI_JOB_TOKEN")
            .map(|t| Credential::JobToken(t.to_string()))
    } else {
        context
            .env_var("GL_TOKEN")
            .or_else(|| context.env_var("GITLAB_TOKEN"))
            .map(|t| Credential::PrivateToken(t.to_string()))
    };

    ResolvedConfig {
        gitlab_url,
        gitlab_api_url,
        credential,
        assets: config.assets.clone(),
        milestones: config.milestones.clone(),
        proxy: non_empty(&config.proxy),
        retry: RetryPolicy {
            limit: config.retry_limit(),
            base_delay: Duration::from_millis(config.retry_delay_ms()),
        },
    }
}
