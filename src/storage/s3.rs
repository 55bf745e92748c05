use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Credentials, config::Region, Client};
use tracing::info;

use super::SnapshotSink;
use crate::config::AwsCredentials;
use crate::error::UploadError;

/// Remote snapshot archive backed by an S3 bucket. Objects accumulate
/// indefinitely; uploads overwrite by key.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub async fn connect(region: String, bucket: String, credentials: &AwsCredentials) -> Self {
        let provider = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "credentials-file",
        );
        let config = aws_config::defaults(aws_config::BehaviorVersion::v2024_03_28())
            .region(Region::new(region))
            .credentials_provider(provider)
            .load()
            .await;
        let client = Client::new(&config);

        Self { client, bucket }
    }

    /// Upload a local file under `key`, reporting progress through the
    /// callback as (bytes transferred, bytes total).
    pub async fn upload_file(
        &self,
        local_path: &Path,
        key: &str,
        progress: impl Fn(u64, u64),
    ) -> Result<(), UploadError> {
        let data = tokio::fs::read(local_path)
            .await
            .map_err(UploadError::FileRead)?;
        let total = data.len() as u64;
        progress(0, total);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| UploadError::S3Upload(e.to_string()))?;

        progress(total, total);
        Ok(())
    }
}

impl SnapshotSink for S3Store {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), UploadError> {
        self.upload_file(local_path, key, |sent, total| {
            info!("{sent} / {total} bytes transmitted to S3");
        })
        .await?;
        info!(key, bucket = %self.bucket, "uploaded snapshot to S3");
        Ok(())
    }
}
