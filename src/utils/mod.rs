pub mod error;
pub mod logger;
pub mod template;
pub mod urls;
pub mod validation;
