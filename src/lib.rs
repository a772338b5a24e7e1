pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::LocalStorage;
pub use config::{ClientConfig, Environment};

pub use crate::core::api::ApiClient;
pub use domain::ports::{ConfigProvider, Exporter, Storage};
pub use utils::error::{AppError, Result};
