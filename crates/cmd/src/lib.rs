// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Wiring shared by the `rdslogs-export` CLI and the `rdslogs-lambda` function

use anyhow::{Context, Result};
use rdslogs::{LogSync, RdsLogSource, SyncConfig, SyncReport, build_s3_store};
use serde::Deserialize;
use std::sync::Arc;

/// Invocation payload. Scheduled events carry `region` at the top level;
/// every other field is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub region: String,
}

/// Build a [`LogSync`] from the process environment, with both the RDS and
/// S3 clients bound to `region`.
pub async fn open_log_sync(region: &str) -> Result<LogSync> {
    if region.trim().is_empty() {
        anyhow::bail!("region cannot be empty");
    }

    let config =
        SyncConfig::from_env().with_context(|| "Failed to load configuration from environment")?;

    let instance = &config.instance_id;
    let bucket = &config.bucket;
    diagnostics::info!("Exporting logs of {instance} to s3://{bucket} in {region}");

    let store = build_s3_store(&config.bucket, region)
        .with_context(|| format!("Failed to open bucket {}", config.bucket))?;
    let source = Arc::new(RdsLogSource::new(region).await);

    Ok(LogSync::new(config, source, store)?)
}

/// Perform one export run in `region`.
///
/// Setup and run failures are logged the same way before being returned,
/// so every failed invocation leaves an error line.
pub async fn export(region: &str) -> Result<SyncReport> {
    match open_and_run(region).await {
        Ok(report) => {
            let summary = report.to_string();
            diagnostics::info!("{summary}");
            Ok(report)
        }
        Err(e) => {
            let reason = format!("{e:#}");
            diagnostics::error!("Log export failed: {reason}");
            Err(e)
        }
    }
}

async fn open_and_run(region: &str) -> Result<SyncReport> {
    let sync = open_log_sync(region).await?;
    Ok(sync.run().await?)
}
