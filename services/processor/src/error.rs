use thiserror::Error;

/// Faults that abort processing of an upload
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Malformed upload notification: {0}")]
    Extraction(String),

    #[error("Failed to fetch s3://{bucket}/{key}: {message}")]
    Retrieval {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Input is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("Failed to store s3://{bucket}/{key}: {message}")]
    Storage {
        bucket: String,
        key: String,
        message: String,
    },
}

impl ProcessingError {
    /// Short tag naming the step that failed
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::Extraction(_) => "extraction",
            ProcessingError::Retrieval { .. } => "retrieval",
            ProcessingError::Decode(_) => "decode",
            ProcessingError::Storage { .. } => "storage",
        }
    }
}

/// Failure to write a metadata record. Never aborts processing.
#[derive(Error, Debug)]
#[error("Failed to record metadata for {file_id}: {message}")]
pub struct RecordError {
    pub file_id: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let retrieval = ProcessingError::Retrieval {
            bucket: "in".to_string(),
            key: "a.txt".to_string(),
            message: "object not found".to_string(),
        };
        assert_eq!(retrieval.kind(), "retrieval");
        assert_eq!(
            retrieval.to_string(),
            "Failed to fetch s3://in/a.txt: object not found"
        );

        let invalid = vec![0xffu8, 0xfe];
        let decode: ProcessingError = std::str::from_utf8(&invalid).unwrap_err().into();
        assert_eq!(decode.kind(), "decode");

        assert_eq!(
            ProcessingError::Extraction("no records".to_string()).kind(),
            "extraction"
        );
    }
}
