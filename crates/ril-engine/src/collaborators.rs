//! Narrow interfaces to the services the engine drives but does not own.

use crate::error::{ExecError, TransportError};

/// Outbound link to the modem process.
///
/// Framing, buffering and reconnection are the implementation's business;
/// the engine only hands over complete encoded requests.
pub trait Transport: Send + Sync {
    /// Send one encoded request.
    fn send(&self, data: &[u8]) -> Result<(), TransportError>;
}

/// Receiver of inbound buffers from the transport.
pub trait InboundSink: Send + Sync {
    /// Handle one complete inbound buffer.
    fn on_buffer(&self, data: &[u8]);
}

/// Host audio subsystem.
pub trait AudioControl: Send + Sync {
    /// Set a key/value audio parameter.
    fn set_parameter(&self, key: &str, value: &str);
}

/// Runs vendor-requested commands on the host.
pub trait CommandExecutor: Send + Sync {
    /// Run a command line. Failures are reported, never fatal.
    fn execute(&self, command: &str) -> Result<(), ExecError>;
}

/// Audio collaborator that drops every parameter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAudio;

impl AudioControl for NoAudio {
    fn set_parameter(&self, key: &str, value: &str) {
        tracing::debug!(key, value, "no audio collaborator, parameter dropped");
    }
}

/// Executor that refuses every command.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExecutor;

impl CommandExecutor for NoExecutor {
    fn execute(&self, command: &str) -> Result<(), ExecError> {
        Err(ExecError::Launch {
            command: command.to_string(),
            reason: "command execution disabled".to_string(),
        })
    }
}
