use anyhow::Context;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use upload_processor::{Config, DynamoDbMetadataStore, LambdaResponse, Processor, S3ObjectStore};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        output_bucket = %config.s3.output_bucket,
        metadata_table = %config.dynamodb.table,
        "Starting upload processor"
    );

    // Clients are built once and shared by every invocation
    let object_store = Arc::new(
        S3ObjectStore::new(&config.s3)
            .await
            .context("Failed to initialize S3 object store")?,
    );

    let metadata_store = Arc::new(
        DynamoDbMetadataStore::new(&config.dynamodb)
            .await
            .context("Failed to initialize metadata store")?,
    );

    let processor = Arc::new(Processor::new(
        object_store,
        metadata_store,
        config.s3.output_bucket.clone(),
    ));

    let func = service_fn(move |event: LambdaEvent<serde_json::Value>| {
        let processor = processor.clone();

        async move { handle_event(&processor, event).await }
    });

    run(func).await
}

async fn handle_event(
    processor: &Processor,
    event: LambdaEvent<serde_json::Value>,
) -> Result<LambdaResponse, Error> {
    let (payload, context) = event.into_parts();

    let result = processor
        .handle(&payload)
        .instrument(info_span!("invocation", request_id = %context.request_id))
        .await;

    Ok(result.into_response()?)
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();
}
