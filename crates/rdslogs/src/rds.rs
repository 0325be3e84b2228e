// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! [`LogSource`] backed by the Amazon RDS API

use crate::error::SourceError;
use crate::source::{LogFileDescriptor, LogPortion, LogSource};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_rds::Client;
use aws_sdk_rds::config::Region;
use aws_sdk_rds::error::DisplayErrorContext;
use aws_sdk_rds::types::DescribeDbLogFilesDetails;
use diagnostics::*;

/// RDS client for one region
#[derive(Debug, Clone)]
pub struct RdsLogSource {
    client: Client,
}

impl RdsLogSource {
    /// Create a client for `region`, taking credentials from the environment
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            client: Client::new(&config),
        }
    }

    /// One `DescribeDBLogFiles` call: descriptors and the next marker
    async fn describe_page(
        &self,
        instance_id: &str,
        name_filter: &str,
        marker: Option<String>,
    ) -> Result<(Vec<LogFileDescriptor>, Option<String>), SourceError> {
        let output = self
            .client
            .describe_db_log_files()
            .db_instance_identifier(instance_id)
            .filename_contains(name_filter)
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| SourceError::from(DisplayErrorContext(e).to_string()))?;

        let page = output
            .describe_db_log_files()
            .iter()
            .filter_map(descriptor_from_details)
            .collect();
        Ok((page, output.marker().map(str::to_string)))
    }
}

#[async_trait]
impl LogSource for RdsLogSource {
    async fn describe_log_files(
        &self,
        instance_id: &str,
        name_filter: &str,
    ) -> Result<Vec<LogFileDescriptor>, SourceError> {
        let files = collect_marker_pages(|marker| {
            self.describe_page(instance_id, name_filter, marker)
        })
        .await?;

        let count = files.len();
        debug!("Listed {count} log files for {instance_id}");
        Ok(files)
    }

    async fn download_portion(
        &self,
        instance_id: &str,
        file_name: &str,
        marker: &str,
    ) -> Result<LogPortion, SourceError> {
        let output = self
            .client
            .download_db_log_file_portion()
            .db_instance_identifier(instance_id)
            .log_file_name(file_name)
            .marker(marker)
            .send()
            .await
            .map_err(|e| SourceError::from(DisplayErrorContext(e).to_string()))?;

        Ok(LogPortion {
            data: output.log_file_data().unwrap_or_default().to_string(),
            marker: output.marker().map(str::to_string),
            additional_data_pending: output.additional_data_pending().unwrap_or(false),
        })
    }
}

/// Drain a marker-paginated RDS listing.
///
/// `fetch_page` receives the marker to resume from (`None` for the first
/// call) and returns one page of items with the next marker. Listing ends
/// when the next marker is absent or empty.
async fn collect_marker_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, SourceError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), SourceError>>,
{
    let mut items = Vec::new();
    let mut marker = None;

    loop {
        let (page, next) = fetch_page(marker.take()).await?;
        items.extend(page);

        match next {
            Some(next) if !next.is_empty() => marker = Some(next),
            _ => return Ok(items),
        }
    }
}

/// Entries without a name or a usable timestamp can be neither keyed nor
/// compared against the watermark.
fn descriptor_from_details(details: &DescribeDbLogFilesDetails) -> Option<LogFileDescriptor> {
    let Some(name) = details.log_file_name() else {
        warn!("Skipping log file entry without a name");
        return None;
    };

    let last_written = match details.last_written().map(u64::try_from) {
        Some(Ok(ts)) => ts,
        _ => {
            warn!("Skipping log file {name} without a valid LastWritten time");
            return None;
        }
    };

    Some(LogFileDescriptor {
        name: name.to_string(),
        last_written,
        size: details.size().and_then(|s| u64::try_from(s).ok()),
    })
}
