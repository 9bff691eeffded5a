// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WearScan CLI - parse an STL file and run the wear-analysis pipeline.
//!
//! # Usage
//!
//! ```bash
//! wearscan part.stl
//! wearscan part.stl --isolate --weld 0.01
//! wearscan part.stl --quantize 12 --json
//! ```
//!
//! Worker defaults come from `WEARSCAN_*` environment variables; flags
//! override them. Logs go to stderr and honour `RUST_LOG`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wearscan_processing::{Request, Response, WorkerConfig, WorkerHandle};

mod error;
mod reader;
mod report;

use error::CliError;
use reader::{read_chunked, DEFAULT_CHUNK_SIZE};

#[derive(Parser)]
#[command(name = "wearscan")]
#[command(author, version, about = "STL ingestion and inner-surface wear analysis")]
struct Args {
    /// STL file (ASCII or binary)
    file: PathBuf,

    /// Select inner-surface candidate faces after parsing
    #[arg(long)]
    isolate: bool,

    /// Report quantization figures, optionally at BITS (1-16)
    #[arg(long, value_name = "BITS", num_args = 0..=1)]
    quantize: Option<Option<u8>>,

    /// Report vertex-weld figures, optionally at tolerance TOL
    #[arg(long, value_name = "TOL", num_args = 0..=1)]
    weld: Option<Option<f32>>,

    /// Read size in bytes when loading the file
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Print responses as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Classify `solid`-prefixed files as binary when their size matches the
    /// declared triangle count
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn requests(&self, bytes: Vec<u8>) -> Vec<Request> {
        let file_name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string());

        let mut requests = vec![Request::ParseStl { bytes, file_name }];
        if self.isolate {
            requests.push(Request::IsolateInnerSurface);
        }
        if let Some(bits) = self.quantize {
            requests.push(Request::QuantizeGeometry { bits });
        }
        if let Some(tolerance) = self.weld {
            requests.push(Request::WeldVertices { tolerance });
        }
        requests.push(Request::PerformanceReport);
        requests
    }
}

fn emit(response: &Response, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        println!("{}", report::describe(response));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,wearscan_processing=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if !args.file.exists() {
        return Err(CliError::FileNotFound(args.file).into());
    }

    let mut config = WorkerConfig::from_env();
    if args.strict {
        config.strict_detection = true;
    }
    tracing::info!(
        queue_depth = config.queue_depth,
        pool_max_per_size = config.pool_max_per_size,
        strict_detection = config.strict_detection,
        "Starting WearScan worker"
    );

    let bytes = read_chunked(&args.file, args.chunk_size, |_, _| {})
        .await
        .with_context(|| format!("loading {}", args.file.display()))?;
    tracing::info!(bytes = bytes.len(), file = %args.file.display(), "file loaded");

    let mut worker = WorkerHandle::spawn(config);
    let mut failure = None;

    for request in args.requests(bytes) {
        let response = worker
            .call(request, |p| {
                tracing::debug!(stage = ?p.stage(), progress = p.progress(), "progress")
            })
            .await?;
        emit(&response, args.json)?;

        if let Some(f) = response.failure() {
            failure = Some(CliError::Request {
                kind: response.kind(),
                code: f.code.clone(),
                message: f.message.clone(),
            });
            break;
        }
    }

    worker.shutdown().await?;
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
