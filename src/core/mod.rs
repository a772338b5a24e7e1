pub mod api;
pub mod form;
pub mod pricing;
pub mod translations;

pub use crate::domain::ports::{ConfigProvider, Exporter, Storage};
pub use crate::utils::error::Result;
