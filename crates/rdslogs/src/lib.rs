// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Incremental export of RDS database log files to S3
//!
//! Each run copies the log files written since the previous run. Progress is
//! kept in a single watermark object in the target bucket holding the
//! `LastWritten` time of the newest file copied; nothing else is persisted,
//! so a run can be retried or repeated at any time. Delivery is
//! at-least-once: a failed run leaves the watermark alone and the next run
//! overwrites anything it had already uploaded.
//!
//! # Architecture
//!
//! - **SyncConfig**: instance, bucket, prefix, name filter and watermark key
//! - **watermark**: read/write the watermark object (missing means 0)
//! - **LogSource**: the database log API; `RdsLogSource` is the AWS one
//! - **fetch_log_file**: marker-based download of one whole file
//! - **LogSync**: the run itself
//!
//! # Usage
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use rdslogs::{LogSync, RdsLogSource, SyncConfig, build_s3_store};
//! use std::sync::Arc;
//!
//! let config = SyncConfig::from_env()?;
//! let store = build_s3_store(&config.bucket, "us-west-2")?;
//! let source = Arc::new(RdsLogSource::new("us-west-2").await);
//!
//! let report = LogSync::new(config, source, store)?.run().await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod fetch;
mod rds;
pub mod source;
mod store;
mod sync;
pub mod watermark;

pub use config::{DEFAULT_MAX_PAGES, SyncConfig};
pub use error::{SourceError, SyncError};
pub use fetch::fetch_log_file;
pub use rds::RdsLogSource;
pub use source::{LogFileDescriptor, LogPortion, LogSource, START_MARKER};
pub use store::{BlobLocation, build_s3_store};
pub use sync::{COMPLETE_MESSAGE, LogSync, PendingFiles, SyncReport};
pub use watermark::{read_watermark, write_watermark};

/// Result type for export operations
pub type Result<T> = std::result::Result<T, SyncError>;
