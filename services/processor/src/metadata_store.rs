use crate::config::DynamoDbConfig;
use crate::error::RecordError;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Builder as DynamoDbConfigBuilder;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_types::region::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_dynamo::{to_item, Item};
use tracing::{debug, info, instrument};

/// Outcome stored with each metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Success,
}

/// One processed file, keyed by its input key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetadataRecord {
    /// Primary key, equal to the input key
    pub file_id: String,
    pub input_file: String,
    pub output_file: String,
    /// Input object size in bytes
    pub file_size: i64,
    pub processed_at: DateTime<Utc>,
    pub status: RecordStatus,
}

impl MetadataRecord {
    /// Build a successful record stamped with the current time
    pub fn success(input_file: &str, file_size: i64, output_file: &str) -> Self {
        Self {
            file_id: input_file.to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.to_string(),
            file_size,
            processed_at: Utc::now(),
            status: RecordStatus::Success,
        }
    }
}

/// Durable key-value store for processing metadata
///
/// Writes are upserts: a record replaces any earlier record with the same
/// `file_id`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataRecorder: Send + Sync {
    async fn put_record(&self, record: &MetadataRecord) -> Result<()>;
}

/// Record a successful processing run
pub async fn record(
    recorder: &dyn MetadataRecorder,
    input_file: &str,
    file_size: i64,
    output_file: &str,
) -> Result<MetadataRecord, RecordError> {
    let record = MetadataRecord::success(input_file, file_size, output_file);

    recorder
        .put_record(&record)
        .await
        .map_err(|e| RecordError {
            file_id: record.file_id.clone(),
            message: format!("{e:#}"),
        })?;

    Ok(record)
}

/// Metadata store backed by a DynamoDB table
pub struct DynamoDbMetadataStore {
    client: DynamoDbClient,
    table: String,
}

impl DynamoDbMetadataStore {
    /// Create a new DynamoDB metadata store
    pub async fn new(config: &DynamoDbConfig) -> Result<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut dynamodb_config_builder = DynamoDbConfigBuilder::from(&aws_config);

        if let Some(ref endpoint_url) = config.endpoint_url {
            dynamodb_config_builder = dynamodb_config_builder.endpoint_url(endpoint_url);
        }

        let client = DynamoDbClient::from_conf(dynamodb_config_builder.build());

        info!(table = %config.table, region = %config.region, "DynamoDB metadata store initialized");

        Ok(Self {
            client,
            table: config.table.clone(),
        })
    }
}

#[async_trait]
impl MetadataRecorder for DynamoDbMetadataStore {
    #[instrument(skip(self, record), fields(table = %self.table, file_id = %record.file_id))]
    async fn put_record(&self, record: &MetadataRecord) -> Result<()> {
        let item: Item = to_item(record).context("Failed to convert metadata record")?;

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item.into()))
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))
            .context("Failed to put metadata item")?;

        debug!("Metadata stored in DynamoDB");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::AttributeValue;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn sample_record() -> MetadataRecord {
        MetadataRecord {
            file_id: "test-file.txt".to_string(),
            input_file: "test-file.txt".to_string(),
            output_file: "processed/test-file.txt".to_string(),
            file_size: 1024,
            processed_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap(),
            status: RecordStatus::Success,
        }
    }

    #[test]
    fn test_success_record() {
        let record = MetadataRecord::success("a/b.txt", 42, "processed/a/b.txt");

        assert_eq!(record.file_id, "a/b.txt");
        assert_eq!(record.input_file, record.file_id);
        assert_eq!(record.output_file, "processed/a/b.txt");
        assert_eq!(record.file_size, 42);
        assert_eq!(record.status, RecordStatus::Success);
    }

    #[test]
    fn test_record_item_attributes() {
        let item: Item = to_item(sample_record()).unwrap();
        let attributes: HashMap<String, AttributeValue> = item.into();

        assert_eq!(
            attributes.get("FileId"),
            Some(&AttributeValue::S("test-file.txt".to_string()))
        );
        assert_eq!(
            attributes.get("OutputFile"),
            Some(&AttributeValue::S("processed/test-file.txt".to_string()))
        );
        assert_eq!(
            attributes.get("FileSize"),
            Some(&AttributeValue::N("1024".to_string()))
        );
        assert_eq!(
            attributes.get("Status"),
            Some(&AttributeValue::S("SUCCESS".to_string()))
        );
        assert_eq!(
            attributes.get("ProcessedAt"),
            Some(&AttributeValue::S("2024-01-15T10:30:45Z".to_string()))
        );
    }

    #[tokio::test]
    async fn test_record_maps_failure() {
        let mut recorder = MockMetadataRecorder::new();
        recorder
            .expect_put_record()
            .times(1)
            .returning(|_| Err(anyhow!("ProvisionedThroughputExceededException")));

        let err = record(&recorder, "test-file.txt", 10, "processed/test-file.txt")
            .await
            .unwrap_err();

        assert_eq!(err.file_id, "test-file.txt");
        assert!(err.message.contains("ProvisionedThroughputExceededException"));
    }

    #[tokio::test]
    async fn test_record_writes_success_record() {
        let mut recorder = MockMetadataRecorder::new();
        recorder
            .expect_put_record()
            .withf(|record| {
                record.file_id == "test-file.txt"
                    && record.output_file == "processed/test-file.txt"
                    && record.file_size == 10
                    && record.status == RecordStatus::Success
            })
            .times(1)
            .returning(|_| Ok(()));

        let written = record(&recorder, "test-file.txt", 10, "processed/test-file.txt")
            .await
            .unwrap();

        assert_eq!(written.input_file, "test-file.txt");
    }
}
