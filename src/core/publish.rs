use crate::config::plugin_config::PluginConfig;
use crate::config::resolve::resolve_config;
use crate::core::assets::collect_assets;
use crate::core::client::GitlabClient;
use crate::core::project::{project_api_url, project_path, release_url};
use crate::core::upload::{plan_upload, AssetUploader};
use crate::core::verify::verify_conditions;
use crate::domain::model::{
    NextRelease, ReleaseAssets, ReleaseContext, ReleaseInfo, ReleaseLink, ReleasePayload,
    UploadedAsset, RELEASE_NAME,
};
use crate::domain::ports::{ReleasePlugin, Storage};
use crate::utils::error::Result;
use crate::utils::template::TemplateContext;
use crate::utils::urls::{is_absolute_url, push_encoded_segments, url_join};
use futures::future::try_join_all;
use reqwest::Method;

/// GitLab release 發佈器。
///
/// `storage` 的根目錄應與 [`ReleaseContext::cwd`] 一致，資產路徑皆相對於它。
pub struct GitlabPublisher<S: Storage> {
    config: PluginConfig,
    storage: S,
}

impl<S: Storage> GitlabPublisher<S> {
    pub fn new(config: PluginConfig, storage: S) -> Self {
        Self { config, storage }
    }
}

/// 將上傳結果轉成 release 連結：外部 URL 優先，其次絕對 URL，
/// 再來是 `full_path`，最後才以專案路徑拼接相對 URL
pub fn resolve_link(asset: UploadedAsset, gitlab_url: &str, project_path: &str) -> ReleaseLink {
    let url = match (asset.raw_url, asset.url, asset.full_path) {
        (Some(raw), _, _) => raw,
        (None, Some(url), _) if is_absolute_url(&url) => url,
        (None, _, Some(full_path)) => url_join(&[gitlab_url, &full_path]),
        (None, Some(url), None) => url_join(&[gitlab_url, project_path, &url]),
        (None, None, None) => gitlab_url.to_string(),
    };

    let name = asset
        .label
        .filter(|l| !l.is_empty())
        .or(asset.alt)
        .unwrap_or_else(|| url.clone());

    ReleaseLink {
        name,
        url,
        link_type: asset.link_type,
        direct_asset_path: asset.filepath,
    }
}

pub fn build_payload(
    next_release: &NextRelease,
    milestones: Vec<String>,
    links: Vec<ReleaseLink>,
) -> ReleasePayload {
    let description = next_release
        .notes
        .as_deref()
        .filter(|notes| !notes.trim().is_empty())
        .unwrap_or(&next_release.git_tag)
        .to_string();

    ReleasePayload {
        tag_name: next_release.git_tag.clone(),
        description,
        milestones,
        assets: ReleaseAssets { links },
    }
}

#[async_trait::async_trait]
impl<S: Storage> ReleasePlugin for GitlabPublisher<S> {
    async fn verify_conditions(&self, context: &ReleaseContext) -> Result<()> {
        verify_conditions(&self.config, context).await
    }

    async fn publish(&self, context: &ReleaseContext) -> Result<ReleaseInfo> {
        let resolved = resolve_config(&self.config, context);
        let tpl = TemplateContext::from_release(context);
        let client = GitlabClient::new(&resolved)?;
        let next_release = &context.next_release;

        let project_path = project_path(context, &resolved.gitlab_url);
        let project_api_url = project_api_url(&resolved.gitlab_api_url, &project_path)?;

        let assets = collect_assets(&context.cwd, &resolved.assets, &tpl)?;
        tracing::info!("📋 {} asset(s) to attach to {}", assets.len(), next_release.git_tag);

        // 先全部規劃完成（含 generic package 驗證），再並行上傳
        let plans = try_join_all(
            assets
                .iter()
                .map(|asset| plan_upload(asset, &next_release.version, &tpl, &self.storage)),
        )
        .await?;

        let uploader = AssetUploader::new(&client, &project_api_url, &self.storage);
        let uploaded = try_join_all(plans.into_iter().map(|plan| uploader.upload(plan))).await?;

        let links: Vec<ReleaseLink> = uploaded
            .into_iter()
            .flatten()
            .map(|asset| resolve_link(asset, &resolved.gitlab_url, &project_path))
            .collect();

        let milestones = resolved
            .milestones
            .iter()
            .map(|m| tpl.render(m))
            .collect::<Result<Vec<_>>>()?;

        let payload = build_payload(next_release, milestones, links);
        let endpoint = push_encoded_segments(&project_api_url, &["releases"])?;

        tracing::debug!(
            "POST-ing the following JSON to {}:\n{}",
            endpoint,
            serde_json::to_string_pretty(&payload)?
        );

        client
            .send(Method::POST, endpoint.as_str(), |r| r.json(&payload))
            .await
            .inspect_err(|e| {
                tracing::error!(
                    "An error occurred while making a request to the GitLab release API: {}",
                    e
                )
            })?;

        tracing::info!("🚀 Published GitLab release: {}", next_release.git_tag);

        Ok(ReleaseInfo {
            name: RELEASE_NAME.to_string(),
            url: release_url(&resolved.gitlab_url, &project_path, &next_release.git_tag)?,
        })
    }
}
