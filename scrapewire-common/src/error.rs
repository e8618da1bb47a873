use thiserror::Error;

use crate::value::{RawSnapshot, RawValue};

/// Errors raised while scraping a monitored source.
///
/// None of these terminate an exporter: the publisher turns them into a log
/// line, an incremented failure counter and a degraded publish.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Transport error reaching {target}: {message}")]
    Transport { target: String, message: String },

    #[error("Unexpected HTTP status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("No usable TLS client identity: {0}")]
    MissingCredential(String),

    #[error("Command {command} exited with {}: {stderr}", exit_code_display(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to start command {command}: {message}")]
    CommandSpawn { command: String, message: String },

    #[error("Command {command} did not finish within {timeout_secs}s")]
    CommandTimeout { command: String, timeout_secs: u64 },

    #[error("No such process: {0}")]
    ProcessNotFound(u32),
}

fn exit_code_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

impl ScrapeError {
    pub fn transport(target: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Stable short label for this failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Transport { .. } => "transport",
            ScrapeError::BadStatus { .. } => "bad_status",
            ScrapeError::Parse { .. } => "parse",
            ScrapeError::MissingCredential(_) => "missing_credential",
            ScrapeError::CommandFailed { .. } => "command_failed",
            ScrapeError::CommandSpawn { .. } => "command_spawn",
            ScrapeError::CommandTimeout { .. } => "command_timeout",
            ScrapeError::ProcessNotFound(_) => "process_not_found",
        }
    }

    /// Snapshot mapped in place of real data when a fetch fails.
    ///
    /// Carries only `status_code` (the HTTP status for [`ScrapeError::BadStatus`],
    /// otherwise zero) so declared fields map to zero and status-style tables
    /// report the failure class. Returns `None` when no snapshot can be formed
    /// at all and the cycle publishes only the exporter's own counters.
    pub fn failure_snapshot(&self) -> Option<RawSnapshot> {
        let status = match self {
            ScrapeError::CommandSpawn { .. } => return None,
            ScrapeError::BadStatus { status, .. } => f64::from(*status),
            _ => 0.0,
        };

        Some(RawValue::object([("status_code", RawValue::Number(status))]))
    }
}
