use clap::Parser;
use gitlab_release::utils::error::ErrorSeverity;
use gitlab_release::utils::logger;
use gitlab_release::{
    BranchInfo, CliConfig, GitlabPublisher, LocalStorage, NextRelease, PluginConfig,
    ReleaseContext, ReleaseEngine,
};

fn build_context(args: &CliConfig) -> anyhow::Result<ReleaseContext> {
    let notes = match &args.notes_file {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };
    let cwd = std::fs::canonicalize(&args.cwd)?;
    let git_tag = args
        .tag
        .clone()
        .unwrap_or_else(|| format!("v{}", args.version));

    Ok(ReleaseContext {
        cwd,
        env: std::env::vars().collect(),
        repository_url: args.repository_url.clone(),
        branch: BranchInfo {
            name: args.branch.clone(),
        },
        next_release: NextRelease {
            version: args.version.clone(),
            git_head: args.git_head.clone(),
            name: Some(git_tag.clone()),
            git_tag,
            notes,
            channel: args.channel.clone(),
        },
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    logger::init_cli_logger(args.verbose);
    tracing::info!("🚀 Starting gitlab-release");
    tracing::debug!("CLI config: {:?}", args);

    let config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            match PluginConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path.display(), e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => PluginConfig::default(),
    };

    let context = build_context(&args)?;
    let storage = LocalStorage::new(context.cwd.clone());
    let engine = ReleaseEngine::new(GitlabPublisher::new(config, storage));

    let outcome = if args.verify_only {
        engine.verify(&context).await.map(|_| None)
    } else {
        engine.run(&context).await.map(Some)
    };

    match outcome {
        Ok(Some(info)) => {
            println!("✅ {} published: {}", info.name, info.url);
        }
        Ok(None) => {
            println!("✅ GitLab release conditions verified");
        }
        Err(e) => {
            tracing::error!(
                "❌ Release failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliConfig {
        let mut argv = vec![
            "gitlab-release",
            "--repository-url",
            "https://gitlab.com/owner/repo.git",
            "--release-version",
            "1.4.0",
        ];
        argv.extend_from_slice(extra);
        CliConfig::parse_from(argv)
    }

    #[test]
    fn test_release_name_follows_default_tag() {
        let context = build_context(&args(&[])).unwrap();
        assert_eq!(context.next_release.git_tag, "v1.4.0");
        assert_eq!(context.next_release.name.as_deref(), Some("v1.4.0"));
    }

    #[test]
    fn test_release_name_follows_explicit_tag() {
        let context = build_context(&args(&["--tag", "release-1.4.0"])).unwrap();
        assert_eq!(context.next_release.git_tag, "release-1.4.0");
        assert_eq!(context.next_release.name.as_deref(), Some("release-1.4.0"));
    }
}
