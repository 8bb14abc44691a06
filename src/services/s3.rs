use std::time::Duration;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::services::object_store::ObjectStore;

#[derive(Clone)]
pub struct S3Service {
    client: Client,
    pub bucket_name: String,
    /// Origin of the internal endpoint as it appears in presigned URLs.
    internal_origin: Option<String>,
    /// `{scheme}://{public_endpoint}`
    public_origin: String,
}

impl S3Service {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.aws_access_key_id.clone(),
            config.aws_secret_access_key.clone(),
            None,
            None,
            "manual_config",
        );

        let region = aws_sdk_s3::config::Region::new(config.aws_region.clone());

        let mut s3_config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.s3_endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        let internal_origin = config
            .s3_endpoint
            .as_deref()
            .and_then(|e| url::Url::parse(e).ok())
            .map(|u| u.origin().ascii_serialization());

        let scheme = if config.public_ssl { "https" } else { "http" };

        Self {
            client,
            bucket_name: config.s3_bucket_name.clone(),
            internal_origin,
            public_origin: format!("{}://{}", scheme, config.public_endpoint.trim_end_matches('/')),
        }
    }

    /// Creates the bucket if needed and applies the public-read policy.
    pub async fn ensure_bucket_exists(&self) -> Result<(), StorageError> {
        let resp = self.client.head_bucket().bucket(&self.bucket_name).send().await;

        if resp.is_err() {
            tracing::info!(bucket = %self.bucket_name, "Bucket does not exist, attempting to create");
            self.client
                .create_bucket()
                .bucket(&self.bucket_name)
                .send()
                .await
                .map_err(|e| StorageError::new("create_bucket", &self.bucket_name, DisplayErrorContext(&e)))?;
        }

        // Some S3 providers reject bucket policies; public URLs then need an
        // out-of-band policy, presigned URLs keep working.
        if let Err(e) = self.set_public_policy().await {
            tracing::warn!(bucket = %self.bucket_name, error = %e, "Failed to set bucket policy");
        }

        Ok(())
    }

    async fn set_public_policy(&self) -> Result<(), StorageError> {
        let policy = format!(
            r#"{{
                "Version": "2012-10-17",
                "Statement": [
                    {{
                        "Sid": "PublicReadGetObject",
                        "Effect": "Allow",
                        "Principal": "*",
                        "Action": "s3:GetObject",
                        "Resource": "arn:aws:s3:::{}/*"
                    }}
                ]
            }}"#,
            self.bucket_name
        );

        self.client
            .put_bucket_policy()
            .bucket(&self.bucket_name)
            .policy(policy)
            .send()
            .await
            .map_err(|e| StorageError::new("put_bucket_policy", &self.bucket_name, DisplayErrorContext(&e)))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Service {
    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_length(data.len() as i64)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::new("put", key, DisplayErrorContext(&e)))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let result = self
            .client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.raw_response().map(|r| r.status().as_u16()) == Some(404) => {
                tracing::debug!(key, "Object already gone");
                Ok(())
            }
            Err(e) => Err(StorageError::new("delete", key, DisplayErrorContext(&e))),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn presigned_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let presigning_config = aws_sdk_s3::presigning::PresigningConfig::expires_in(ttl)
            .map_err(|e| StorageError::new("presign", key, e))?;

        let presigned_req = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::new("presign", key, DisplayErrorContext(&e)))?;

        Ok(rewrite_to_public(
            presigned_req.uri(),
            self.internal_origin.as_deref(),
            &self.public_origin,
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_origin, self.bucket_name, key)
    }
}

/// Swaps the internal endpoint origin of a presigned URL for the public one.
fn rewrite_to_public(presigned: &str, internal_origin: Option<&str>, public_origin: &str) -> String {
    match internal_origin {
        Some(origin)
            if presigned.starts_with(origin)
                && matches!(presigned.as_bytes().get(origin.len()), None | Some(b'/')) =>
        {
            format!("{}{}", public_origin, &presigned[origin.len()..])
        }
        _ => presigned.to_string(),
    }
}
