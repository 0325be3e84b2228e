// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The database log API, seen as a listing call plus a paginated download

use crate::error::SourceError;
use async_trait::async_trait;

/// Marker that starts a download at the beginning of a file
pub const START_MARKER: &str = "0";

/// One log file on the instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileDescriptor {
    pub name: String,
    /// Last write time, milliseconds since the epoch
    pub last_written: u64,
    /// Size in bytes as reported by the instance, if known
    pub size: Option<u64>,
}

/// One page of a log file download
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPortion {
    pub data: String,
    /// Where the next page starts
    pub marker: Option<String>,
    pub additional_data_pending: bool,
}

/// Access to an instance's log files.
///
/// Implementations report their own failures; callers attach the instance
/// and file context.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// All log files whose name contains `name_filter`
    async fn describe_log_files(
        &self,
        instance_id: &str,
        name_filter: &str,
    ) -> Result<Vec<LogFileDescriptor>, SourceError>;

    /// Download the page of `file_name` starting at `marker`
    async fn download_portion(
        &self,
        instance_id: &str,
        file_name: &str,
        marker: &str,
    ) -> Result<LogPortion, SourceError>;
}
