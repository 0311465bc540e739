use crate::core::client::GitlabClient;
use crate::domain::model::{ProjectResponse, ReleaseContext};
use crate::utils::error::{ReleaseError, Result};
use crate::utils::urls::{project_path_from_repository, push_encoded_segments, url_join};
use reqwest::Method;

/// GitLab Developer 角色，建立 release 的最低權限
pub const MIN_PUSH_ACCESS_LEVEL: u32 = 30;

/// 決定 GitLab 專案路徑；GitLab CI 中直接使用 `CI_PROJECT_PATH`
pub fn project_path(context: &ReleaseContext, gitlab_url: &str) -> String {
    if context.is_gitlab_ci() {
        if let Some(path) = context.env_var("CI_PROJECT_PATH") {
            return path.to_string();
        }
    }
    project_path_from_repository(&context.repository_url, gitlab_url)
}

pub fn project_api_url(gitlab_api_url: &str, project_path: &str) -> Result<String> {
    Ok(push_encoded_segments(gitlab_api_url, &["projects", project_path])?.to_string())
}

pub fn release_url(gitlab_url: &str, project_path: &str, git_tag: &str) -> Result<String> {
    let releases = url_join(&[gitlab_url, project_path, "-/releases"]);
    Ok(push_encoded_segments(&releases, &[git_tag])?.to_string())
}

/// 檢查 token 能否存取專案，並具備推送權限
pub async fn verify_project_access(
    client: &GitlabClient,
    project_api_url: &str,
    project_path: &str,
    gitlab_url: &str,
) -> Result<()> {
    tracing::debug!("Checking access to project {} via {}", project_path, project_api_url);

    let project: ProjectResponse = match client.send_json(Method::GET, project_api_url, |r| r).await
    {
        Ok(project) => project,
        Err(ReleaseError::ApiError { status: 401, .. }) => {
            return Err(ReleaseError::InvalidTokenError)
        }
        Err(ReleaseError::ApiError { status: 404, .. }) => {
            return Err(ReleaseError::MissingProjectError {
                project_path: project_path.to_string(),
                gitlab_url: gitlab_url.to_string(),
            })
        }
        Err(e) => return Err(e),
    };

    let access_level = [
        project.permissions.project_access.as_ref(),
        project.permissions.group_access.as_ref(),
    ]
    .into_iter()
    .flatten()
    .map(|access| access.access_level)
    .max()
    .unwrap_or(0);

    if access_level < MIN_PUSH_ACCESS_LEVEL {
        return Err(ReleaseError::NoPushPermissionError {
            project_path: project_path.to_string(),
        });
    }

    tracing::debug!("Project access level {} for {}", access_level, project_path);
    Ok(())
}
