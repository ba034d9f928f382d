use crate::config::S3Config;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;
use tracing::{debug, info, instrument};

/// Bucket-and-key addressed blob storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the full contents of an object
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Write an object, replacing any existing one under the same key
    async fn store(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str)
        -> Result<()>;
}

/// Object store backed by Amazon S3
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// Create a new S3 object store
    pub async fn new(config: &S3Config) -> Result<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        // Configure custom endpoint for MinIO/LocalStack
        if let Some(ref endpoint_url) = config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = S3Client::from_conf(s3_config_builder.build());

        info!(
            region = %config.region,
            output_bucket = %config.output_bucket,
            "S3 object store initialized"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(response) => response,
            Err(e) => {
                if e.as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false)
                {
                    return Err(anyhow!("object not found"));
                }
                return Err(anyhow!("{}", DisplayErrorContext(&e)))
                    .context("Failed to get object from S3");
            }
        };

        let body = response
            .body
            .collect()
            .await
            .context("Failed to read object body")?
            .into_bytes()
            .to_vec();

        debug!(size_bytes = body.len(), "Object downloaded from S3");

        Ok(body)
    }

    #[instrument(skip(self, body), fields(size_bytes = body.len()))]
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))
            .context("Failed to upload object to S3")?;

        info!(bucket = %bucket, key = %key, "Uploaded processed file");

        Ok(())
    }
}
