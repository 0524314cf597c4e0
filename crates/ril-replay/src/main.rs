//! rilreplay: drive the engine from a capture file.
//!
//! Requests in the capture are submitted through the engine and logged as
//! they would be written to the modem; inbound buffers are dispatched as if
//! the modem had sent them. Every published event and completed request is
//! logged.
//!
//! Usage:
//!   rilreplay --capture boot.cap
//!   rilreplay --config kslte.yaml --capture boot.cap --log-level debug

mod capture;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clap::Parser;
use ril_engine::{
    AudioControl, CommandExecutor, Completion, ConfigError, ExecError, RequestError, Ril,
    RilConfig, Transport, TransportError,
};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::capture::{parse_capture, CaptureEntry, CaptureError};

/// Replay captured modem traffic through the engine.
#[derive(Parser, Debug)]
#[command(name = "rilreplay", version, about)]
struct Cli {
    /// Engine configuration (YAML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Capture file to replay.
    #[arg(long)]
    capture: PathBuf,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Stop at the first buffer the engine rejects.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("capture: {0}")]
    Capture(#[from] CaptureError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Rejected { line: usize, message: String },
}

// ============================================================================
// Host collaborators
// ============================================================================

/// Logs outbound requests instead of writing them to a modem.
struct LoggingTransport;

impl Transport for LoggingTransport {
    fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        info!(bytes = data.len(), data = %hex::encode(data), "outbound");
        Ok(())
    }
}

struct LoggingAudio;

impl AudioControl for LoggingAudio {
    fn set_parameter(&self, key: &str, value: &str) {
        info!(key, value, "audio parameter");
    }
}

/// Logs vendor commands; nothing is run on the host.
struct LoggingExecutor;

impl CommandExecutor for LoggingExecutor {
    fn execute(&self, command: &str) -> Result<(), ExecError> {
        info!(command, "vendor command");
        Ok(())
    }
}

// ============================================================================
// Replay
// ============================================================================

#[derive(Debug, Default)]
struct Summary {
    requests: usize,
    inbound: usize,
    rejected: usize,
    completed: usize,
    cancelled: usize,
}

fn replay(cli: &Cli) -> Result<Summary, ReplayError> {
    let config = match &cli.config {
        Some(path) => RilConfig::load(path)?,
        None => RilConfig::default(),
    };
    let text = std::fs::read_to_string(&cli.capture).map_err(|source| ReplayError::Io {
        path: cli.capture.clone(),
        source,
    })?;
    let entries = parse_capture(&text)?;

    ril_metrics::describe_metrics();
    let ril = Ril::new(
        config,
        Arc::new(LoggingTransport),
        Arc::new(LoggingAudio),
        Arc::new(LoggingExecutor),
    );
    ril.bus().add_listener(|event| info!(event = ?event, "event"));

    let completed = Arc::new(AtomicUsize::new(0));
    let mut summary = Summary::default();

    for (line, entry) in entries {
        match entry {
            CaptureEntry::Send(request) => {
                summary.requests += 1;
                let code = request.code();
                let done = completed.clone();
                let completion = Completion::new(move |outcome| match outcome {
                    Ok(response) => {
                        done.fetch_add(1, Ordering::Relaxed);
                        info!(request = %code, response = %response.summary(), "completed");
                    }
                    Err(RequestError::Cancelled(reason)) => {
                        info!(request = %code, reason = %reason, "cancelled");
                    }
                    Err(e) => {
                        done.fetch_add(1, Ordering::Relaxed);
                        warn!(request = %code, error = %e, "failed");
                    }
                });
                match ril.send(&request, completion) {
                    Ok(serial) => info!(line, serial, request = %code, "submitted"),
                    Err(e) => warn!(line, request = %code, error = %e, "submit failed"),
                }
            }
            CaptureEntry::Inbound(data) => {
                summary.inbound += 1;
                if let Err(e) = ril.process_response(&data) {
                    summary.rejected += 1;
                    if cli.strict {
                        return Err(ReplayError::Rejected {
                            line,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    summary.cancelled = ril.shutdown("end of capture");
    summary.completed = completed.load(Ordering::Relaxed);
    Ok(summary)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match replay(&cli) {
        Ok(summary) => {
            info!(
                requests = summary.requests,
                inbound = summary.inbound,
                rejected = summary.rejected,
                completed = summary.completed,
                cancelled = summary.cancelled,
                "replay finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "replay failed");
            ExitCode::FAILURE
        }
    }
}
