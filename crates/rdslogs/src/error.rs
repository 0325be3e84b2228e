// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for log export runs

use thiserror::Error;

/// Error returned by a [`crate::LogSource`] implementation
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unable to read watermark s3://{bucket}/{key}: {source}")]
    WatermarkRead {
        bucket: String,
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Watermark s3://{bucket}/{key} does not hold a non-negative integer: {content:?}")]
    InvalidWatermark {
        bucket: String,
        key: String,
        content: String,
    },

    #[error("Error writing watermark to s3://{bucket}/{key}: {source}")]
    WatermarkWrite {
        bucket: String,
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Unable to list log files for instance {instance}: {source}")]
    Enumerate {
        instance: String,
        #[source]
        source: SourceError,
    },

    #[error("Error downloading log file {file} from instance {instance}: {source}")]
    Fetch {
        instance: String,
        file: String,
        #[source]
        source: SourceError,
    },

    #[error("Pagination of log file {file} did not terminate after {pages} pages")]
    PaginationLimit { file: String, pages: usize },

    #[error("Log file {file} reported more data pending without a marker (page {page})")]
    MissingMarker { file: String, page: usize },

    #[error("Error writing to s3://{bucket}/{key}: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Failed to build object store for bucket {bucket}: {source}")]
    ObjectStore {
        bucket: String,
        #[source]
        source: object_store::Error,
    },
}
