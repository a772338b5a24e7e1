use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Settings the API client is built from.
pub trait ConfigProvider: Send + Sync {
    /// Always ends in `/`, so relative endpoint paths join under it.
    fn base_url(&self) -> &str;
    fn connect_timeout(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn output_path(&self) -> &str;
}

/// Writes a project's budget tables somewhere and returns where.
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export_project(&self, project_id: i64) -> Result<String>;
}
