// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The export run.
//!
//! A run reads the watermark, lists the instance's log files, copies every
//! file written after the watermark, and finally moves the watermark to the
//! newest `LastWritten` it copied. Any failure aborts the run before the
//! watermark moves, so the next run starts over from the old watermark and
//! overwrites whatever this run already uploaded.
//!
//! Runs are assumed not to overlap. Two concurrent runs would copy the same
//! files and the last watermark write would win.

use crate::config::SyncConfig;
use crate::fetch::fetch_log_file;
use crate::source::{LogFileDescriptor, LogSource};
use crate::store::BlobLocation;
use crate::watermark::{read_watermark, write_watermark};
use crate::{Result, SyncError};
use diagnostics::*;
use object_store::{ObjectStore, PutPayload};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Human-readable completion line
pub const COMPLETE_MESSAGE: &str = "Log file export complete.";

/// Files a run would copy, given the current watermark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFiles {
    pub watermark: u64,
    /// In listing order
    pub files: Vec<LogFileDescriptor>,
}

impl PendingFiles {
    /// Newest `LastWritten` among the pending files
    #[must_use]
    pub fn max_last_written(&self) -> Option<u64> {
        self.files.iter().map(|f| f.last_written).max()
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub files_written: usize,
    pub bytes_written: u64,
    pub previous_watermark: u64,
    /// Set only when the watermark was advanced
    pub new_watermark: Option<u64>,
    pub elapsed_ms: u64,
    pub message: String,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.new_watermark {
            Some(watermark) => write!(
                f,
                "{} Wrote {} log files ({} bytes); watermark {} -> {}.",
                self.message,
                self.files_written,
                self.bytes_written,
                self.previous_watermark,
                watermark
            ),
            None => write!(f, "{} No new log files were written.", self.message),
        }
    }
}

/// Copies one instance's log files into one bucket
pub struct LogSync {
    config: SyncConfig,
    source: Arc<dyn LogSource>,
    store: Arc<dyn ObjectStore>,
}

impl LogSync {
    /// `store` must be bound to `config.bucket`.
    pub fn new(
        config: SyncConfig,
        source: Arc<dyn LogSource>,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            store,
        })
    }

    #[must_use]
    pub fn watermark_location(&self) -> BlobLocation {
        BlobLocation::new(&self.config.bucket, self.config.watermark_key())
    }

    /// Currently stored watermark (0 if none)
    pub async fn watermark(&self) -> Result<u64> {
        read_watermark(self.store.as_ref(), &self.watermark_location()).await
    }

    /// Read the watermark and list the files newer than it, without copying.
    pub async fn pending(&self) -> Result<PendingFiles> {
        let watermark = self.watermark().await?;

        let instance = &self.config.instance_id;
        let filter = &self.config.log_name_filter;
        let candidates = self
            .source
            .describe_log_files(instance, filter)
            .await
            .map_err(|source| SyncError::Enumerate {
                instance: instance.clone(),
                source,
            })?;

        let candidate_count = candidates.len();
        let files: Vec<LogFileDescriptor> = candidates
            .into_iter()
            .filter(|f| f.last_written > watermark)
            .collect();

        let pending_count = files.len();
        info!(
            "{pending_count} of {candidate_count} log files on {instance} are newer than {watermark}"
        );

        Ok(PendingFiles { watermark, files })
    }

    /// Copy every pending file, then advance the watermark if anything was
    /// written.
    pub async fn run(&self) -> Result<SyncReport> {
        let started = Instant::now();
        let PendingFiles { watermark, files } = self.pending().await?;

        let mut max_last_written = 0u64;
        let mut files_written = 0usize;
        let mut bytes_written = 0u64;

        for file in &files {
            let name = &file.name;
            let last_written = file.last_written;
            let size = file.size.unwrap_or_default();
            info!("Downloading log file {name} (LastWritten={last_written}, Size={size})");

            max_last_written = max_last_written.max(last_written);

            let content = fetch_log_file(
                self.source.as_ref(),
                &self.config.instance_id,
                name,
                self.config.max_pages,
            )
            .await?;
            let length = content.len() as u64;

            let location = BlobLocation::new(&self.config.bucket, self.config.log_key(name));
            let display = location.to_string();
            info!("Writing {display}");

            _ = self
                .store
                .put(&location.path(), PutPayload::from(content))
                .await
                .map_err(|source| SyncError::Upload {
                    bucket: location.bucket.clone(),
                    key: location.key.clone(),
                    source,
                })?;

            files_written += 1;
            bytes_written += length;
        }

        let new_watermark = if files_written > 0 {
            info!("Successfully wrote {files_written} log files ({bytes_written} bytes)");
            let location = self.watermark_location();
            if let Err(e) = write_watermark(self.store.as_ref(), &location, max_last_written).await
            {
                let display = location.to_string();
                let reason = e.to_string();
                error!(
                    "Copied {files_written} log files but failed to record progress at {display}; they will be copied again next run: {reason}"
                );
                return Err(e);
            }
            Some(max_last_written)
        } else {
            info!("No new log files were written");
            None
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(SyncReport {
            files_written,
            bytes_written,
            previous_watermark: watermark,
            new_watermark,
            elapsed_ms,
            message: COMPLETE_MESSAGE.to_string(),
        })
    }
}
