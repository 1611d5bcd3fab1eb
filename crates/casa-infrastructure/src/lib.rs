//! Infrastructure layer for casa: filesystem paths and configuration loading.

pub mod config_service;
pub mod paths;

pub use config_service::{ConfigOverrides, ConfigService};
pub use paths::CasaPaths;
