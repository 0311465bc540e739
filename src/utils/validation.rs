use crate::utils::error::{ReleaseError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

// GitLab generic package naming rules
static PACKAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid package name regex"));
static PACKAGE_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\.?[A-Za-z0-9_+-]+\.?)+$").expect("valid package version regex")
});
static PACKAGE_FILE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._+~-]+$").expect("valid package file regex"));

pub const LINK_TYPES: [&str; 4] = ["other", "runbook", "image", "package"];
pub const UPLOAD_TARGETS: [&str; 2] = ["project_upload", "generic_package"];
pub const PACKAGE_STATUSES: [&str; 2] = ["default", "hidden"];

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ReleaseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ReleaseError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ReleaseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ReleaseError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReleaseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ReleaseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 驗證列舉型欄位；含 `${` 的模板值要等到發佈時才能確定，先放行
pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if value.contains("${") || allowed.contains(&value) {
        return Ok(());
    }
    Err(ReleaseError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("Expected one of: {}", allowed.join(", ")),
    })
}

pub fn validate_generic_package_name(name: &str) -> Result<()> {
    if PACKAGE_NAME_RE.is_match(name) {
        return Ok(());
    }
    Err(ReleaseError::ValidationError {
        message: format!(
            "Invalid generic package name '{}': only letters, digits, '.', '-' and '_' are allowed",
            name
        ),
    })
}

pub fn validate_generic_package_version(version: &str) -> Result<()> {
    if PACKAGE_VERSION_RE.is_match(version) {
        return Ok(());
    }
    Err(ReleaseError::ValidationError {
        message: format!(
            "Invalid generic package version '{}': only letters, digits, '.', '+', '-' and '_' are allowed",
            version
        ),
    })
}

pub fn validate_generic_package_file_name(file_name: &str) -> Result<()> {
    if PACKAGE_FILE_NAME_RE.is_match(file_name) && !file_name.contains("..") {
        return Ok(());
    }
    Err(ReleaseError::ValidationError {
        message: format!(
            "Invalid generic package file name '{}': only letters, digits, '.', '+', '~', '-' and '_' are allowed, without '..'",
            file_name
        ),
    })
}
