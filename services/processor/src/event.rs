//! Upload notifications delivered by S3 and the event extracted from them.

use crate::error::ProcessingError;
use serde::Deserialize;
use tracing::debug;

/// S3 event notification as delivered to the handler
///
/// Records are kept raw; only the first one is ever decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadNotification {
    #[serde(rename = "Records")]
    pub records: Vec<serde_json::Value>,
}

/// One entry of the notification's record list
///
/// Only the fields the processor reads are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// URL-encoded object key
    pub key: String,
    /// Object size in bytes
    pub size: i64,
}

/// The uploaded object a single invocation works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub bucket_name: String,
    pub object_key: String,
    pub object_size: i64,
}

impl UploadEvent {
    /// Extract the upload from a raw notification payload
    ///
    /// Only the first record is consumed.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, ProcessingError> {
        let notification = UploadNotification::deserialize(payload)
            .map_err(|e| ProcessingError::Extraction(e.to_string()))?;

        if notification.records.len() > 1 {
            debug!(
                record_count = notification.records.len(),
                "Notification carries multiple records, only the first is processed"
            );
        }

        let first = notification
            .records
            .first()
            .ok_or_else(|| ProcessingError::Extraction("notification has no records".to_string()))?;

        let record = NotificationRecord::deserialize(first)
            .map_err(|e| ProcessingError::Extraction(e.to_string()))?;

        Ok(Self {
            bucket_name: record.s3.bucket.name,
            object_key: decode_object_key(&record.s3.object.key)?,
            object_size: record.s3.object.size,
        })
    }
}

/// Decode an object key as S3 writes it into notifications
///
/// Spaces arrive as `+` and everything else non-alphanumeric is
/// percent-encoded.
pub fn decode_object_key(raw: &str) -> Result<String, ProcessingError> {
    let plus_decoded = raw.replace('+', " ");

    urlencoding::decode(&plus_decoded)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ProcessingError::Extraction(format!("unable to decode key {raw:?}: {e}")))
}
