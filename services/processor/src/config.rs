use serde::Deserialize;
use std::collections::HashMap;

/// Environment variable naming the bucket processed objects are written to
pub const OUTPUT_BUCKET_VAR: &str = "OUTPUT_BUCKET";

/// Environment variable naming the DynamoDB metadata table
pub const METADATA_TABLE_VAR: &str = "DYNAMODB_TABLE";

/// Main configuration for the upload processor
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,
    /// S3 configuration
    pub s3: S3Config,
    /// DynamoDB configuration
    pub dynamodb: DynamoDbConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// S3 configuration
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// Bucket that receives processed objects
    #[serde(default = "default_output_bucket")]
    pub output_bucket: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// Force path-style access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
}

/// DynamoDB configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DynamoDbConfig {
    /// Table holding one metadata record per processed file
    #[serde(default = "default_metadata_table")]
    pub table: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for DynamoDB Local, LocalStack, etc.)
    pub endpoint_url: Option<String>,
}

fn default_service_name() -> String {
    "upload-processor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_bucket() -> String {
    "your-output-bucket-name".to_string()
}

fn default_metadata_table() -> String {
    "ProcessingMetadata".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Config {
    /// Load configuration from config files and the process environment
    pub fn load() -> anyhow::Result<Self> {
        Self::from_env(std::env::vars().collect())
    }

    /// Load configuration from config files and the given environment variables
    ///
    /// `OUTPUT_BUCKET` and `DYNAMODB_TABLE` win over every other source, so a
    /// deployment that only sets those two keeps working without a config file.
    pub fn from_env(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        let output_bucket = vars.get(OUTPUT_BUCKET_VAR).cloned();
        let metadata_table = vars.get(METADATA_TABLE_VAR).cloned();

        let config = config::Config::builder()
            .set_default("service.name", default_service_name())?
            .set_default("service.log_level", default_log_level())?
            .set_default("s3.output_bucket", default_output_bucket())?
            .set_default("s3.region", default_region())?
            .set_default("dynamodb.table", default_metadata_table())?
            .set_default("dynamodb.region", default_region())?
            .add_source(config::File::with_name("config/processor").required(false))
            .add_source(
                config::File::with_name("/etc/upload-processor/processor").required(false),
            )
            // PROCESSOR__S3__OUTPUT_BUCKET -> s3.output_bucket
            .add_source(
                config::Environment::with_prefix("PROCESSOR")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .set_override_option("s3.output_bucket", output_bucket)?
            .set_override_option("dynamodb.table", metadata_table)?
            .build()?;

        config.try_deserialize().map_err(Into::into)
    }
}
