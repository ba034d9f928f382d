use crate::error::ProcessingError;
use crate::event::UploadEvent;
use crate::metadata_store::{self, MetadataRecorder};
use crate::object_store::ObjectStore;
use crate::transform;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Key prefix under which processed objects are written
pub const OUTPUT_PREFIX: &str = "processed/";

/// Content type of processed objects
pub const OUTPUT_CONTENT_TYPE: &str = "text/plain";

pub const SUCCESS_MESSAGE: &str = "File processed successfully";
pub const FAILURE_MESSAGE: &str = "Error processing file";

/// Output key for an input key
pub fn output_key(input_key: &str) -> String {
    format!("{OUTPUT_PREFIX}{input_key}")
}

/// A successfully processed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub input_file: String,
    pub output_file: String,
    /// Whether the advisory metadata record was written
    pub metadata_recorded: bool,
}

/// Envelope returned for every invocation
///
/// Serializes as the response body; the status code travels beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    #[serde(skip)]
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_recorded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl ProcessingResult {
    pub fn success(processed: Processed) -> Self {
        Self {
            status_code: 200,
            message: SUCCESS_MESSAGE.to_string(),
            input_file: Some(processed.input_file),
            output_file: Some(processed.output_file),
            metadata_recorded: Some(processed.metadata_recorded),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(err: &ProcessingError) -> Self {
        Self {
            status_code: 500,
            message: FAILURE_MESSAGE.to_string(),
            input_file: None,
            output_file: None,
            metadata_recorded: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind().to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Wire form: the status code plus the remaining fields as a JSON body
    pub fn into_response(self) -> serde_json::Result<LambdaResponse> {
        let body = serde_json::to_string(&self)?;

        Ok(LambdaResponse {
            status_code: self.status_code,
            body,
        })
    }
}

/// Response returned to the Lambda runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaResponse {
    pub status_code: u16,
    pub body: String,
}

/// Handles upload notifications: fetch, transform, store, record
pub struct Processor {
    object_store: Arc<dyn ObjectStore>,
    metadata_recorder: Arc<dyn MetadataRecorder>,
    output_bucket: String,
}

impl Processor {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        metadata_recorder: Arc<dyn MetadataRecorder>,
        output_bucket: impl Into<String>,
    ) -> Self {
        Self {
            object_store,
            metadata_recorder,
            output_bucket: output_bucket.into(),
        }
    }

    /// Handle a raw notification payload. Never fails; faults become a 500 result.
    pub async fn handle(&self, payload: &serde_json::Value) -> ProcessingResult {
        let outcome = match UploadEvent::from_payload(payload) {
            Ok(event) => self.process(event).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(processed) => ProcessingResult::success(processed),
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Error processing file");
                ProcessingResult::failure(&e)
            }
        }
    }

    /// Process one upload
    #[instrument(skip(self, event), fields(bucket = %event.bucket_name, key = %event.object_key))]
    pub async fn process(&self, event: UploadEvent) -> Result<Processed, ProcessingError> {
        info!(size_bytes = event.object_size, "Processing file");

        let raw = self
            .object_store
            .fetch(&event.bucket_name, &event.object_key)
            .await
            .map_err(|e| ProcessingError::Retrieval {
                bucket: event.bucket_name.clone(),
                key: event.object_key.clone(),
                message: format!("{e:#}"),
            })?;

        let processed = transform::apply(&raw)?;

        let output_file = output_key(&event.object_key);
        self.object_store
            .store(
                &self.output_bucket,
                &output_file,
                processed.into_bytes(),
                OUTPUT_CONTENT_TYPE,
            )
            .await
            .map_err(|e| ProcessingError::Storage {
                bucket: self.output_bucket.clone(),
                key: output_file.clone(),
                message: format!("{e:#}"),
            })?;

        // Metadata is advisory: a failed write is logged and reported, not propagated.
        let metadata_recorded = match metadata_store::record(
            self.metadata_recorder.as_ref(),
            &event.object_key,
            event.object_size,
            &output_file,
        )
        .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Error storing metadata");
                false
            }
        };

        info!(output_file = %output_file, metadata_recorded, "Successfully processed file");

        Ok(Processed {
            input_file: event.object_key,
            output_file,
            metadata_recorded,
        })
    }
}
