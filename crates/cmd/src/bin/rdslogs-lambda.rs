// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Function entrypoint: one export run per invocation

use cmd::{ExportRequest, export};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use rdslogs::SyncReport;

async fn handler(event: LambdaEvent<ExportRequest>) -> Result<SyncReport, Error> {
    Ok(export(&event.payload.region).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    diagnostics::init();
    run(service_fn(handler)).await
}
