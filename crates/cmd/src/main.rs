// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::{export, open_log_sync};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "rdslogs-export")]
/// Copy RDS log files to S3, reading settings from RDS_INSTANCE_NAME,
/// S3_BUCKET_NAME, S3_BUCKET_PREFIX, LOG_NAME_PREFIX and LAST_RECEIVED_FILE
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy log files newer than the watermark, then advance it
    Run {
        /// AWS region of the instance and the bucket
        #[arg(long)]
        region: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List log files a run would copy, without copying them
    Pending {
        /// AWS region of the instance and the bucket
        #[arg(long)]
        region: String,
    },
    /// Show the stored watermark
    Watermark {
        /// AWS region of the instance and the bucket
        #[arg(long)]
        region: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { region, json } => run_command(&region, json).await,
        Commands::Pending { region } => pending_command(&region).await,
        Commands::Watermark { region } => watermark_command(&region).await,
    }
}

async fn run_command(region: &str, json: bool) -> Result<()> {
    let report = export(region).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

async fn pending_command(region: &str) -> Result<()> {
    let sync = open_log_sync(region).await?;
    let pending = sync.pending().await?;

    println!("Watermark: {}", pending.watermark);
    for file in &pending.files {
        let size = file
            .size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("{:>15}  {:>12}  {}", file.last_written, size, file.name);
    }
    match pending.max_last_written() {
        Some(next) => println!(
            "{} files pending; watermark would become {}",
            pending.files.len(),
            next
        ),
        None => println!("No files pending"),
    }
    Ok(())
}

async fn watermark_command(region: &str) -> Result<()> {
    let sync = open_log_sync(region).await?;
    let location = sync.watermark_location();
    let watermark = sync.watermark().await?;

    println!("{location}: {watermark}");
    Ok(())
}
