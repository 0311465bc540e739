pub mod assets;
pub mod client;
pub mod engine;
pub mod project;
pub mod publish;
pub mod upload;
pub mod verify;

pub use crate::domain::model::{ReleaseContext, ReleaseInfo};
pub use crate::domain::ports::{ReleasePlugin, Storage};
pub use crate::utils::error::Result;
