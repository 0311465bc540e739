use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobError(#[from] glob::PatternError),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Template error: {message}")]
    TemplateError { message: String },

    #[error("GitLab API error ({status}) at {endpoint}: {message}")]
    ApiError {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Invalid GitLab token")]
    InvalidTokenError,

    #[error("Project '{project_path}' not found on {gitlab_url}")]
    MissingProjectError {
        project_path: String,
        gitlab_url: String,
    },

    #[error("Token has no push permission on project '{project_path}'")]
    NoPushPermissionError { project_path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Authentication,
    Asset,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReleaseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReleaseError::HttpError(_) | ReleaseError::ApiError { .. } => ErrorCategory::Network,
            ReleaseError::ConfigError { .. }
            | ReleaseError::InvalidConfigValueError { .. }
            | ReleaseError::MissingConfigError { .. }
            | ReleaseError::TemplateError { .. }
            | ReleaseError::UrlError(_)
            | ReleaseError::GlobError(_) => ErrorCategory::Configuration,
            ReleaseError::InvalidTokenError
            | ReleaseError::MissingProjectError { .. }
            | ReleaseError::NoPushPermissionError { .. } => ErrorCategory::Authentication,
            ReleaseError::IoError(_) | ReleaseError::ValidationError { .. } => ErrorCategory::Asset,
            ReleaseError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReleaseError::HttpError(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            ReleaseError::ApiError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            ReleaseError::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 針對錯誤類型給出修復建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReleaseError::HttpError(_) => {
                "Check network connectivity and the GitLab URL, then retry".to_string()
            }
            ReleaseError::ApiError { status, .. } if *status >= 500 => {
                "GitLab returned a server error; retry the release later".to_string()
            }
            ReleaseError::ApiError { .. } => {
                "Inspect the GitLab API response above and fix the request data".to_string()
            }
            ReleaseError::InvalidTokenError => {
                "Set a valid token in GL_TOKEN or GITLAB_TOKEN".to_string()
            }
            ReleaseError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            ReleaseError::MissingProjectError { .. } => {
                "Check repository_url and gitlab_url point at the same project".to_string()
            }
            ReleaseError::NoPushPermissionError { .. } => {
                "Grant the token at least Developer access to the project".to_string()
            }
            ReleaseError::ValidationError { .. } => {
                "Rename the generic package, version or file to match GitLab's naming rules"
                    .to_string()
            }
            ReleaseError::TemplateError { .. } => {
                "Use only nextRelease.*, branch.name or env.* placeholders".to_string()
            }
            ReleaseError::IoError(_) => "Check the asset paths and file permissions".to_string(),
            _ => "Review the plugin configuration".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not talk to GitLab: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Authentication => format!("Access problem: {}", self),
            ErrorCategory::Asset => format!("Release asset problem: {}", self),
            ErrorCategory::Internal => format!("Unexpected internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReleaseError>;
