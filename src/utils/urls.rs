use crate::utils::error::Result;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// git@gitlab.com:group/project.git
static SCP_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._~-]+@[A-Za-z0-9.-]+:(.+)$").expect("valid scp-like url regex")
});

/// 以 `/` 串接 URL 片段，去除片段之間重複的斜線
pub fn url_join(parts: &[&str]) -> String {
    let mut joined = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if joined.is_empty() {
            joined.push_str(part.trim_end_matches('/'));
        } else {
            let segment = part.trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            joined.push('/');
            joined.push_str(segment);
        }
    }
    joined
}

/// 將每個片段百分比編碼後加到 URL 路徑尾端（`/` 也會被編碼）
pub fn push_encoded_segments(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

pub fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| !url.cannot_be_a_base())
}

/// 從 repository URL 推導 GitLab 專案路徑，例如 `group/subgroup/project`
pub fn project_path_from_repository(repository_url: &str, gitlab_url: &str) -> String {
    let trimmed_base = gitlab_url.trim_end_matches('/');
    // 前綴必須在路徑邊界結束，避免 gitlab.com 吃掉 gitlab.company.com 的主機名稱
    let without_base = repository_url
        .strip_prefix(trimmed_base)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(repository_url);

    let path = if let Some(caps) = SCP_LIKE_RE.captures(without_base) {
        caps[1].to_string()
    } else {
        let candidate = without_base.strip_prefix("git+").unwrap_or(without_base);
        match Url::parse(candidate) {
            Ok(url) if !url.cannot_be_a_base() => url.path().to_string(),
            _ => without_base.to_string(),
        }
    };

    let path = path.trim_start_matches('/').trim_end_matches('/');
    path.strip_suffix(".git").unwrap_or(path).to_string()
}
