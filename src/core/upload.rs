use crate::config::plugin_config::{AssetDefinition, DEFAULT_PACKAGE_NAME};
use crate::core::client::GitlabClient;
use crate::domain::model::{ProjectUploadResponse, UploadedAsset};
use crate::domain::ports::{EntryKind, Storage};
use crate::utils::error::Result;
use crate::utils::template::TemplateContext;
use crate::utils::urls::push_encoded_segments;
use crate::utils::validation::{
    validate_generic_package_file_name, validate_generic_package_name,
    validate_generic_package_version,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::{Path, PathBuf};

pub const GENERIC_PACKAGE_TARGET: &str = "generic_package";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable,
    NotAFile,
}

/// 每個資產的上傳策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPlan {
    /// 已存在的 URL，不需上傳
    ExistingLink(UploadedAsset),
    GenericPackage(GenericPackageUpload),
    ProjectUpload(ProjectFileUpload),
    Skipped { path: String, reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericPackageUpload {
    pub file: PathBuf,
    pub package_name: String,
    pub version: String,
    pub file_name: String,
    pub status: Option<String>,
    pub filepath: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFileUpload {
    pub file: PathBuf,
    pub label: Option<String>,
    pub link_type: Option<String>,
    pub filepath: Option<String>,
}

/// 解析資產模板並決定上傳方式；generic package 的名稱、版本與檔名在此驗證
pub async fn plan_upload<S: Storage>(
    asset: &AssetDefinition,
    version: &str,
    tpl: &TemplateContext,
    storage: &S,
) -> Result<UploadPlan> {
    let url = tpl.render_opt(asset.url.as_deref())?;
    let label = tpl.render_opt(asset.label.as_deref())?;
    let link_type = tpl.render_opt(asset.link_type.as_deref())?;
    let filepath = tpl.render_opt(asset.filepath.as_deref())?;

    if let Some(raw_url) = url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!("Using link from asset configuration: {}", raw_url);
        return Ok(UploadPlan::ExistingLink(UploadedAsset {
            label,
            raw_url: Some(raw_url),
            link_type,
            filepath,
            ..Default::default()
        }));
    }

    let path = tpl.render(asset.first_path().unwrap_or_default())?;
    let target = tpl.render_opt(asset.target.as_deref())?;
    let status = tpl
        .render_opt(asset.status.as_deref())?
        .filter(|s| !s.is_empty());
    let package_name = tpl
        .render_opt(asset.package_name.as_deref())?
        .unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string());

    let file = PathBuf::from(&path);
    match storage.entry_kind(&file).await {
        Some(EntryKind::File) => {}
        Some(_) => {
            tracing::error!("The asset {} is not a file, and will be ignored.", path);
            return Ok(UploadPlan::Skipped {
                path,
                reason: SkipReason::NotAFile,
            });
        }
        None => {
            tracing::error!("The asset {} cannot be read, and will be ignored.", path);
            return Ok(UploadPlan::Skipped {
                path,
                reason: SkipReason::Unreadable,
            });
        }
    }

    tracing::debug!(
        "Asset path: {}, label: {:?}, type: {:?}, filepath: {:?}, target: {:?}, status: {:?}, package: {}",
        path,
        label,
        link_type,
        filepath,
        target,
        status,
        package_name
    );

    if target.as_deref() == Some(GENERIC_PACKAGE_TARGET) {
        let file_name = label.unwrap_or_else(|| file_basename(&file));
        validate_generic_package_name(&package_name)?;
        validate_generic_package_version(version)?;
        validate_generic_package_file_name(&file_name)?;

        return Ok(UploadPlan::GenericPackage(GenericPackageUpload {
            file,
            package_name,
            version: version.to_string(),
            file_name,
            status,
            filepath,
        }));
    }

    Ok(UploadPlan::ProjectUpload(ProjectFileUpload {
        file,
        label,
        link_type,
        filepath,
    }))
}

fn file_basename(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub struct AssetUploader<'a, S: Storage> {
    client: &'a GitlabClient,
    project_api_url: &'a str,
    storage: &'a S,
}

impl<'a, S: Storage> AssetUploader<'a, S> {
    pub fn new(client: &'a GitlabClient, project_api_url: &'a str, storage: &'a S) -> Self {
        Self {
            client,
            project_api_url,
            storage,
        }
    }

    /// 執行上傳計畫；被略過的資產回傳 `None`
    pub async fn upload(&self, plan: UploadPlan) -> Result<Option<UploadedAsset>> {
        match plan {
            UploadPlan::ExistingLink(asset) => Ok(Some(asset)),
            UploadPlan::GenericPackage(upload) => {
                self.upload_generic_package(&upload).await.map(Some)
            }
            UploadPlan::ProjectUpload(upload) => self.upload_project_file(&upload).await.map(Some),
            UploadPlan::Skipped { .. } => Ok(None),
        }
    }

    pub async fn upload_generic_package(
        &self,
        upload: &GenericPackageUpload,
    ) -> Result<UploadedAsset> {
        let download_url = push_encoded_segments(
            self.project_api_url,
            &[
                "packages",
                "generic",
                &upload.package_name,
                &upload.version,
                &upload.file_name,
            ],
        )?;

        let mut endpoint = download_url.clone();
        {
            let mut query = endpoint.query_pairs_mut();
            if let Some(status) = &upload.status {
                query.append_pair("status", status);
            }
            query.append_pair("select", "package_file");
        }

        let data = self.storage.read_file(&upload.file).await?;
        tracing::debug!(
            "PUT-ing the file {} ({} bytes) to {}",
            upload.file.display(),
            data.len(),
            endpoint
        );

        let response: serde_json::Value = self
            .client
            .send_json(Method::PUT, endpoint.as_str(), |r| r.body(data.clone()))
            .await
            .inspect_err(|e| {
                tracing::error!(
                    "An error occurred while uploading {} to the GitLab generic package API: {}",
                    upload.file.display(),
                    e
                )
            })?;

        let stored_url = response
            .pointer("/file/url")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        tracing::info!("📦 Uploaded file: {} ({})", download_url, stored_url);

        Ok(UploadedAsset {
            label: Some(upload.file_name.clone()),
            alt: Some(upload.file_name.clone()),
            url: Some(download_url.to_string()),
            link_type: Some("package".to_string()),
            filepath: upload.filepath.clone(),
            ..Default::default()
        })
    }

    pub async fn upload_project_file(&self, upload: &ProjectFileUpload) -> Result<UploadedAsset> {
        let endpoint = push_encoded_segments(self.project_api_url, &["uploads"])?;
        let data = self.storage.read_file(&upload.file).await?;
        let file_name = file_basename(&upload.file);

        tracing::debug!("POST-ing the file {} to {}", upload.file.display(), endpoint);

        let response: ProjectUploadResponse = self
            .client
            .send_json(Method::POST, endpoint.as_str(), |r| {
                let part = Part::bytes(data.clone()).file_name(file_name.clone());
                r.multipart(Form::new().part("file", part))
            })
            .await
            .inspect_err(|e| {
                tracing::error!(
                    "An error occurred while uploading {} to the GitLab project uploads API: {}",
                    upload.file.display(),
                    e
                )
            })?;

        tracing::info!("📤 Uploaded file: {}", response.url);

        Ok(UploadedAsset {
            label: upload.label.clone(),
            alt: response.alt,
            url: Some(response.url),
            full_path: response.full_path,
            link_type: upload.link_type.clone(),
            filepath: upload.filepath.clone(),
            ..Default::default()
        })
    }
}
