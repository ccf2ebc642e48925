use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream, Client};
use caseflow_core::{config::Config, storage::ObjectStore};
use tracing::{debug, info};

/// Object storage over the S3 API. Works against AWS and S3-compatible
/// providers (MinIO, Supabase Storage, R2) via `STORAGE_ENDPOINT`.
pub struct S3Store {
    client: Client,
    public_base: String,
}

impl S3Store {
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.storage_region.clone()));
        if !config.storage_endpoint.is_empty() {
            loader = loader.endpoint_url(&config.storage_endpoint);
        }
        let sdk = loader.load().await;

        let s3 = aws_sdk_s3::config::Builder::from(&sdk)
            .force_path_style(!config.storage_endpoint.is_empty())
            .build();

        Self {
            client: Client::from_conf(s3),
            public_base: public_base(config),
        }
    }
}

fn public_base(config: &Config) -> String {
    let base = if !config.storage_public_url.is_empty() {
        config.storage_public_url.clone()
    } else if !config.storage_endpoint.is_empty() {
        config.storage_endpoint.clone()
    } else {
        format!("https://s3.{}.amazonaws.com", config.storage_region)
    };
    base.trim_end_matches('/').to_string()
}

fn object_url(base: &str, bucket: &str, path: &str) -> String {
    format!("{base}/{bucket}/{}", path.trim_start_matches('/'))
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| anyhow!("get {bucket}/{path}: {}", DisplayErrorContext(e)))?;

        let bytes = resp
            .body
            .collect()
            .await
            .with_context(|| format!("read body of {bucket}/{path}"))?
            .into_bytes();
        debug!(bucket, path, bytes = bytes.len(), "object downloaded");
        Ok(bytes.to_vec())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<()> {
        if !overwrite {
            match self.client.head_object().bucket(bucket).key(path).send().await {
                Ok(_) => bail!("object {bucket}/{path} already exists"),
                Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {},
                Err(e) => bail!("head {bucket}/{path}: {}", DisplayErrorContext(e)),
            }
        }

        let len = bytes.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| anyhow!("put {bucket}/{path}: {}", DisplayErrorContext(e)))?;
        info!(bucket, path, bytes = len, "object uploaded");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        object_url(&self.public_base, bucket, path)
    }
}
