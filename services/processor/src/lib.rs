//! Upload Processor
//!
//! Lambda handler for S3 upload notifications. Each invocation fetches the
//! uploaded object, uppercases its text under a `Processed at:` header, writes
//! the result to the output bucket under `processed/`, and records the run in a
//! DynamoDB table.
//!
//! ## Architecture
//!
//! ```text
//! S3 notification
//!        │
//!        ▼
//! ┌──────────────┐  fetch   ┌──────────────┐
//! │ Processor    │─────────▶│ Input bucket │
//! │              │          └──────────────┘
//! │              │  store   ┌──────────────┐
//! │              │─────────▶│ Output bucket│
//! │              │          │ processed/   │
//! │              │  record  ┌──────────────┐
//! │              │─────────▶│ Metadata     │
//! └──────────────┘          │ table        │
//!                           └──────────────┘
//! ```
//!
//! Fetch, transform and store failures fail the invocation with a 500 result.
//! A failed metadata write is logged and reported as `metadata_recorded: false`
//! but the invocation still succeeds.

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod metadata_store;
pub mod object_store;
pub mod transform;

pub use config::Config;
pub use error::{ProcessingError, RecordError};
pub use event::UploadEvent;
pub use handler::{LambdaResponse, Processed, ProcessingResult, Processor};
pub use metadata_store::{DynamoDbMetadataStore, MetadataRecord, MetadataRecorder, RecordStatus};
pub use object_store::{ObjectStore, S3ObjectStore};
