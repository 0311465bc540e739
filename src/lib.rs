pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::cli::LocalStorage;
pub use crate::config::plugin_config::{AssetDefinition, AssetSpec, PathPatterns, PluginConfig};
pub use crate::core::{engine::ReleaseEngine, publish::GitlabPublisher};
pub use crate::domain::model::{BranchInfo, NextRelease, ReleaseContext, ReleaseInfo};
pub use crate::utils::error::{ReleaseError, Result};
