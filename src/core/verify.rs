use crate::config::plugin_config::PluginConfig;
use crate::config::resolve::resolve_config;
use crate::core::client::GitlabClient;
use crate::core::project::{project_api_url, project_path, verify_project_access};
use crate::domain::model::ReleaseContext;
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, validate_url, Validate};

/// 發佈前檢查：設定、token 與專案權限
pub async fn verify_conditions(config: &PluginConfig, context: &ReleaseContext) -> Result<()> {
    config.validate()?;

    let resolved = resolve_config(config, context);
    validate_url("gitlab_url", &resolved.gitlab_url)?;
    validate_url("gitlab_api_url", &resolved.gitlab_api_url)?;

    let token_field = if config.use_job_token {
        "CI_JOB_TOKEN"
    } else {
        "GL_TOKEN"
    };
    let credential = validate_required_field(token_field, &resolved.credential)?;

    let project_path = project_path(context, &resolved.gitlab_url);
    tracing::info!(
        "🔍 Verifying GitLab project {} on {}",
        project_path,
        resolved.gitlab_url
    );

    // job token 無法查詢專案權限
    if credential.is_job_token() {
        tracing::debug!("Using CI job token, skipping project permission check");
        return Ok(());
    }

    let client = GitlabClient::new(&resolved)?;
    let api_url = project_api_url(&resolved.gitlab_api_url, &project_path)?;
    verify_project_access(&client, &api_url, &project_path, &resolved.gitlab_url).await?;

    tracing::info!("✅ Verified GitLab access for {}", project_path);
    Ok(())
}
