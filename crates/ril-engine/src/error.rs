//! Error types for the engine.

use ril_protocol::{EventCode, ProtocolError, RequestCode, Response, RilErrorCode};
use thiserror::Error;

/// Registry bookkeeping failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A request with this serial is already pending.
    #[error("duplicate serial {0}")]
    DuplicateSerial(i32),

    /// No pending request has this serial (stale or duplicate response).
    #[error("no pending request with serial {0}")]
    NotFound(i32),
}

/// Terminal failure delivered to a request's completion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    /// The modem answered with a non-success error code. A body that came
    /// with the error is decoded and attached.
    #[error("modem error: {code}")]
    Radio {
        /// The error code from the response header.
        code: RilErrorCode,
        /// Decoded body, when the error response carried one.
        response: Option<Box<Response>>,
    },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] ProtocolError),

    /// No decoder exists for the request code.
    #[error("unrecognized request {0}")]
    UnrecognizedRequest(RequestCode),

    /// The request was never registered.
    #[error("request rejected: {0}")]
    Registry(#[from] RegistryError),

    /// The request was removed without a response.
    #[error("request cancelled: {0}")]
    Cancelled(String),
}

impl RequestError {
    /// Failure carrying only an error code.
    pub fn radio(code: RilErrorCode) -> Self {
        RequestError::Radio {
            code,
            response: None,
        }
    }
}

/// Failures while routing one inbound buffer. Each one drops only that
/// buffer; the engine keeps running.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// The buffer is too short or otherwise malformed before a decoder runs.
    #[error("malformed buffer: {0}")]
    Protocol(#[from] ProtocolError),

    /// Registry lookup failed for a solicited response.
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    /// A solicited response reached the baseline for a code it cannot decode.
    #[error("unrecognized solicited response for serial {serial}: {code}")]
    UnrecognizedRequest {
        /// Serial of the failed request.
        serial: i32,
        /// Its request code.
        code: RequestCode,
    },

    /// An unsolicited notification no layer recognizes.
    #[error("unrecognized unsolicited response: {0}")]
    UnrecognizedEvent(EventCode),

    /// The buffer's leading response type is neither solicited nor unsolicited.
    #[error("invalid response type {0}")]
    InvalidResponseType(i32),

    /// Every layer declined the buffer.
    #[error("no dispatch layer claimed the buffer")]
    Unclaimed,
}

/// Errors reported by a transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The link to the modem is down.
    #[error("transport not connected")]
    NotConnected,

    /// Writing failed.
    #[error("transport I/O error: {0}")]
    Io(String),
}

/// Errors reported by the command execution collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The command could not be started.
    #[error("failed to launch `{command}`: {reason}")]
    Launch {
        /// The command line.
        command: String,
        /// Why it failed.
        reason: String,
    },
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML did not match the configuration schema.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Values parsed but are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
