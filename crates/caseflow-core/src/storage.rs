use anyhow::Result;
use async_trait::async_trait;

/// Blob store holding uploaded case files and generated documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>>;

    /// With `overwrite == false`, an existing object at `path` is an error.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<()>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}
