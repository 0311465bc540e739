use anyhow::Result;
use gitlab_release::core::ReleasePlugin;
use gitlab_release::{
    AssetDefinition, AssetSpec, BranchInfo, GitlabPublisher, LocalStorage, NextRelease,
    PathPatterns, PluginConfig, ReleaseContext, ReleaseEngine, ReleaseError,
};
use httpmock::prelude::*;
use std::collections::HashMap;
use tempfile::TempDir;

fn release_context(server: &MockServer, dir: &TempDir, notes: Option<&str>) -> ReleaseContext {
    let mut env = HashMap::new();
    env.insert("GL_TOKEN".to_string(), "test-token".to_string());

    ReleaseContext {
        cwd: dir.path().to_path_buf(),
        env,
        repository_url: format!("{}/owner/repo.git", server.base_url()),
        branch: BranchInfo {
            name: "main".to_string(),
        },
        next_release: NextRelease {
            version: "1.2.0".to_string(),
            git_tag: "v1.2.0".to_string(),
            git_head: "0123abcd".to_string(),
            name: Some("v1.2.0".to_string()),
            notes: notes.map(str::to_string),
            channel: None,
        },
    }
}

fn plugin_config(server: &MockServer, assets: Vec<AssetSpec>) -> PluginConfig {
    PluginConfig {
        gitlab_url: Some(server.base_url()),
        assets,
        retry_limit: Some(0),
        retry_delay_ms: Some(1),
        ..Default::default()
    }
}

fn asset_dir() -> Result<TempDir> {
    let dir = TempDir::new()?;
    std::fs::create_dir_all(dir.path().join("dist"))?;
    std::fs::write(dir.path().join("dist/app.zip"), b"zip-bytes")?;
    std::fs::write(dir.path().join("dist/cli-linux"), b"elf-bytes")?;
    Ok(dir)
}

#[tokio::test]
async fn test_publish_without_assets_uses_tag_as_description() -> Result<()> {
    let dir = asset_dir()?;
    let server = MockServer::start();

    let release_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/releases")
            .header("private-token", "test-token")
            .body_contains(r#""tag_name":"v1.2.0""#)
            .body_contains(r#""description":"v1.2.0""#)
            .body_contains(r#""links":[]"#);
        then.status(201).json_body(serde_json::json!({"tag_name": "v1.2.0"}));
    });

    let publisher = GitlabPublisher::new(
        plugin_config(&server, vec![]),
        LocalStorage::new(dir.path()),
    );
    let info = publisher
        .publish(&release_context(&server, &dir, None))
        .await?;

    release_mock.assert();
    assert_eq!(info.name, "GitLab release");
    assert_eq!(
        info.url,
        format!("{}/owner/repo/-/releases/v1.2.0", server.base_url())
    );
    Ok(())
}

#[tokio::test]
async fn test_publish_uploads_project_file_and_links_external_url() -> Result<()> {
    let dir = asset_dir()?;
    let server = MockServer::start();

    let upload_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/uploads")
            .header("private-token", "test-token")
            .body_contains(r#"filename="app.zip""#)
            .body_contains("zip-bytes");
        then.status(201).json_body(serde_json::json!({
            "alt": "app.zip",
            "url": "/uploads/abc123/app.zip",
            "full_path": "/-/project/7/uploads/abc123/app.zip",
            "markdown": "[app.zip](/uploads/abc123/app.zip)"
        }));
    });

    let uploaded_link = format!(
        r#"{{"name":"App archive","url":"{}/-/project/7/uploads/abc123/app.zip","link_type":"package"}}"#,
        server.base_url()
    );
    let release_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/releases")
            .body_contains(r###""description":"## Features\n\n* shiny""###)
            .body_contains(uploaded_link.as_str())
            .body_contains(
                r#"{"name":"Docs v1.2.0","url":"https://docs.example.com/1.2.0","link_type":"runbook"}"#,
            );
        then.status(201).json_body(serde_json::json!({"tag_name": "v1.2.0"}));
    });

    let assets = vec![
        AssetSpec::Detailed(AssetDefinition {
            path: Some(PathPatterns::One("dist/app.zip".to_string())),
            label: Some("App archive".to_string()),
            link_type: Some("package".to_string()),
            ..Default::default()
        }),
        AssetSpec::Detailed(AssetDefinition {
            url: Some("https://docs.example.com/${nextRelease.version}".to_string()),
            label: Some("Docs ${nextRelease.gitTag}".to_string()),
            link_type: Some("runbook".to_string()),
            ..Default::default()
        }),
    ];

    let publisher = GitlabPublisher::new(
        plugin_config(&server, assets),
        LocalStorage::new(dir.path()),
    );
    publisher
        .publish(&release_context(&server, &dir, Some("## Features\n\n* shiny")))
        .await?;

    upload_mock.assert();
    release_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_publish_generic_package() -> Result<()> {
    let dir = asset_dir()?;
    let server = MockServer::start();

    let package_mock = server.mock(|when, then| {
        when.method(PUT)
            .path_contains("/packages/generic/cli/1.2.0/cli-linux-v1.2.0")
            .query_param("status", "hidden")
            .query_param("select", "package_file")
            .body("elf-bytes");
        then.status(201).json_body(serde_json::json!({
            "id": 1,
            "file": {"url": "https://storage.example.com/cli-linux-v1.2.0"}
        }));
    });

    let release_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/releases")
            .body_contains(r#""name":"cli-linux-v1.2.0""#)
            .body_contains("/packages/generic/cli/1.2.0/cli-linux-v1.2.0\"")
            .body_contains(r#""link_type":"package""#)
            .body_contains(r#""direct_asset_path":"/bin/cli""#);
        then.status(201).json_body(serde_json::json!({"tag_name": "v1.2.0"}));
    });

    let assets = vec![AssetSpec::Detailed(AssetDefinition {
        path: Some(PathPatterns::One("dist/cli-linux".to_string())),
        label: Some("cli-linux-${nextRelease.gitTag}".to_string()),
        target: Some("generic_package".to_string()),
        status: Some("hidden".to_string()),
        package_name: Some("cli".to_string()),
        filepath: Some("/bin/cli".to_string()),
        ..Default::default()
    })];

    let publisher = GitlabPublisher::new(
        plugin_config(&server, assets),
        LocalStorage::new(dir.path()),
    );
    publisher
        .publish(&release_context(&server, &dir, None))
        .await?;

    package_mock.assert();
    release_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_invalid_generic_package_fails_before_any_upload() -> Result<()> {
    let dir = asset_dir()?;
    let server = MockServer::start();

    let upload_mock = server.mock(|when, then| {
        when.method(POST).path_contains("/uploads");
        then.status(201).json_body(serde_json::json!({"alt": "x", "url": "/uploads/x"}));
    });
    let release_mock = server.mock(|when, then| {
        when.method(POST).path_contains("/releases");
        then.status(201);
    });

    let assets = vec![
        AssetSpec::Path("dist/app.zip".to_string()),
        AssetSpec::Detailed(AssetDefinition {
            path: Some(PathPatterns::One("dist/cli-linux".to_string())),
            target: Some("generic_package".to_string()),
            package_name: Some("my package".to_string()),
            ..Default::default()
        }),
    ];

    let publisher = GitlabPublisher::new(
        plugin_config(&server, assets),
        LocalStorage::new(dir.path()),
    );
    let err = publisher
        .publish(&release_context(&server, &dir, None))
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::ValidationError { .. }));
    upload_mock.assert_hits(0);
    release_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_missing_assets_are_skipped() -> Result<()> {
    let dir = asset_dir()?;
    let server = MockServer::start();

    let upload_mock = server.mock(|when, then| {
        when.method(POST).path_contains("/uploads");
        then.status(201);
    });
    let release_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/releases")
            .body_contains(r#""links":[]"#);
        then.status(201).json_body(serde_json::json!({}));
    });

    let assets = vec![
        AssetSpec::Path("dist/does-not-exist.zip".to_string()),
        AssetSpec::Path("dist".to_string()),
    ];

    let publisher = GitlabPublisher::new(
        plugin_config(&server, assets),
        LocalStorage::new(dir.path()),
    );
    publisher
        .publish(&release_context(&server, &dir, None))
        .await?;

    upload_mock.assert_hits(0);
    release_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_upload_failure_aborts_release() -> Result<()> {
    let dir = asset_dir()?;
    let server = MockServer::start();

    let upload_mock = server.mock(|when, then| {
        when.method(POST).path_contains("/uploads");
        then.status(500)
            .json_body(serde_json::json!({"message": "500 Internal Server Error"}));
    });
    let release_mock = server.mock(|when, then| {
        when.method(POST).path_contains("/releases");
        then.status(201);
    });

    let publisher = GitlabPublisher::new(
        plugin_config(&server, vec![AssetSpec::Path("dist/*".to_string())]),
        LocalStorage::new(dir.path()),
    );
    let err = publisher
        .publish(&release_context(&server, &dir, None))
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::ApiError { status: 500, .. }));
    assert!(upload_mock.hits() >= 1);
    release_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_release_api_error_is_surfaced() -> Result<()> {
    let dir = asset_dir()?;
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path_contains("/api/v4/projects/");
        then.status(200).json_body(serde_json::json!({
            "permissions": {"project_access": {"access_level": 40}, "group_access": null}
        }));
    });
    let release_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/releases")
            .body_contains(r#""milestones":["1.2.0"]"#);
        then.status(409)
            .json_body(serde_json::json!({"message": "Release already exists"}));
    });

    let mut config = plugin_config(&server, vec![]);
    config.milestones = vec!["${nextRelease.version}".to_string()];

    let engine = ReleaseEngine::new(GitlabPublisher::new(config, LocalStorage::new(dir.path())));
    let err = engine
        .run(&release_context(&server, &dir, None))
        .await
        .unwrap_err();

    release_mock.assert();
    match err {
        ReleaseError::ApiError {
            status, message, ..
        } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Release already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_publish_with_job_token_sends_job_token_header() -> Result<()> {
    let dir = asset_dir()?;
    let server = MockServer::start();

    let upload_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/uploads")
            .header("job-token", "ci-job-token");
        then.status(201).json_body(serde_json::json!({
            "alt": "app.zip",
            "url": "/uploads/abc123/app.zip"
        }));
    });
    let release_mock = server.mock(|when, then| {
        when.method(POST)
            .path_contains("/releases")
            .header("job-token", "ci-job-token")
            .body_contains(r#""name":"app.zip""#);
        then.status(201).json_body(serde_json::json!({"tag_name": "v1.2.0"}));
    });

    let mut config = plugin_config(&server, vec![AssetSpec::Path("dist/app.zip".to_string())]);
    config.use_job_token = true;
    let mut context = release_context(&server, &dir, None);
    context
        .env
        .insert("CI_JOB_TOKEN".to_string(), "ci-job-token".to_string());

    let publisher = GitlabPublisher::new(config, LocalStorage::new(dir.path()));
    publisher.publish(&context).await?;

    upload_mock.assert();
    release_mock.assert();
    Ok(())
}
