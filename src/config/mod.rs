pub mod cli;
pub mod plugin_config;
pub mod resolve;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "gitlab-release")]
#[command(about = "Publish a release and its assets to GitLab")]
pub struct CliConfig {
    /// Path to the TOML plugin configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Repository URL, e.g. https://gitlab.com/group/project.git
    #[arg(long)]
    pub repository_url: String,

    /// Version being released, e.g. 1.2.3
    #[arg(long = "release-version")]
    pub version: String,

    /// Git tag of the release (defaults to v<version>)
    #[arg(long)]
    pub tag: Option<String>,

    #[arg(long, default_value = "")]
    pub git_head: String,

    /// File containing the release notes
    #[arg(long)]
    pub notes_file: Option<PathBuf>,

    #[arg(long, default_value = "main")]
    pub branch: String,

    #[arg(long)]
    pub channel: Option<String>,

    /// Directory that asset paths are relative to
    #[arg(long, default_value = ".")]
    pub cwd: PathBuf,

    /// Only verify token, project access and configuration
    #[arg(long)]
    pub verify_only: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
