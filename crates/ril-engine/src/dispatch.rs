//! Inbound buffer routing through an ordered chain of dispatch layers.
//!
//! Layers are tried in priority order. A layer either claims a buffer and
//! handles it completely, or declines and leaves the cursor exactly where it
//! found it so the next layer reads the same bytes. The last layer is the
//! baseline, which handles every code it knows and reports the rest.

use std::sync::Arc;

use ril_metrics::metric_defs;
use ril_protocol::{WireCursor, RESPONSE_SOLICITED, RESPONSE_UNSOLICITED};
use tracing::{error, warn};

use crate::baseline::BaselineLayer;
use crate::collaborators::InboundSink;
use crate::context::RilContext;
use crate::error::{DispatchError, RegistryError};

/// A layer's answer for one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// The layer consumed and acted on the buffer.
    Handled,
    /// The layer does not own the buffer's code; the cursor is untouched.
    Declined,
}

/// Which kind of buffer is being routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPath {
    /// `[serial][error]<body>`
    Solicited,
    /// `[event]<body>`
    Unsolicited,
}

impl DispatchPath {
    /// Label value for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchPath::Solicited => "solicited",
            DispatchPath::Unsolicited => "unsolicited",
        }
    }
}

/// One link in the dispatch chain.
///
/// An implementation must return [`Handling::Declined`] with the cursor at
/// its starting position for any code it does not own. Once it claims a
/// buffer, errors are returned as [`DispatchError`] and the buffer is dropped.
pub trait DispatchLayer: Send + Sync {
    /// Layer name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Try a solicited response. The cursor is at the serial.
    fn try_solicited(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<Handling, DispatchError> {
        let _ = (cursor, ctx);
        Ok(Handling::Declined)
    }

    /// Try an unsolicited notification. The cursor is at the event code.
    fn try_unsolicited(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<Handling, DispatchError> {
        let _ = (cursor, ctx);
        Ok(Handling::Declined)
    }
}

/// Routes inbound buffers through the layer chain.
pub struct DispatchEngine {
    context: Arc<RilContext>,
    layers: Vec<Box<dyn DispatchLayer>>,
}

impl DispatchEngine {
    /// Build an engine. `overrides` run first, in order, then `baseline`.
    pub fn new(
        context: Arc<RilContext>,
        overrides: Vec<Box<dyn DispatchLayer>>,
        baseline: BaselineLayer,
    ) -> Self {
        let mut layers = overrides;
        layers.push(Box::new(baseline));
        Self { context, layers }
    }

    /// Shared context.
    pub fn context(&self) -> &Arc<RilContext> {
        &self.context
    }

    /// Layer names in dispatch order.
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Route a buffer prefixed with its response type.
    pub fn process_response(&self, data: &[u8]) -> Result<(), DispatchError> {
        let mut cursor = WireCursor::new(data);
        let (path, result) = match cursor.read_i32() {
            Ok(RESPONSE_SOLICITED) => (
                DispatchPath::Solicited.as_label(),
                self.run_chain(DispatchPath::Solicited, cursor.rest()),
            ),
            Ok(RESPONSE_UNSOLICITED) => (
                DispatchPath::Unsolicited.as_label(),
                self.run_chain(DispatchPath::Unsolicited, cursor.rest()),
            ),
            Ok(other) => ("unknown", Err(DispatchError::InvalidResponseType(other))),
            Err(e) => ("unknown", Err(DispatchError::Protocol(e))),
        };
        self.report(path, result)
    }

    /// Route a solicited response (no response-type prefix).
    pub fn process_solicited(&self, data: &[u8]) -> Result<(), DispatchError> {
        let result = self.run_chain(DispatchPath::Solicited, data);
        self.report(DispatchPath::Solicited.as_label(), result)
    }

    /// Route an unsolicited notification (no response-type prefix).
    pub fn process_unsolicited(&self, data: &[u8]) -> Result<(), DispatchError> {
        let result = self.run_chain(DispatchPath::Unsolicited, data);
        self.report(DispatchPath::Unsolicited.as_label(), result)
    }

    fn run_chain(&self, path: DispatchPath, data: &[u8]) -> Result<(), DispatchError> {
        let ctx = self.context.as_ref();
        let mut cursor = WireCursor::new(data);

        for layer in &self.layers {
            let checkpoint = cursor.checkpoint();
            let handling = match path {
                DispatchPath::Solicited => layer.try_solicited(&mut cursor, ctx)?,
                DispatchPath::Unsolicited => layer.try_unsolicited(&mut cursor, ctx)?,
            };

            match handling {
                Handling::Handled => return Ok(()),
                Handling::Declined => {
                    if cursor.checkpoint() != checkpoint {
                        warn!(
                            layer = layer.name(),
                            path = path.as_label(),
                            moved_to = cursor.position(),
                            expected = checkpoint.offset(),
                            "layer declined without restoring the cursor"
                        );
                        cursor.restore(checkpoint);
                    }
                    let labels = ctx.labels().with(&[
                        ("layer", layer.name().to_string()),
                        ("path", path.as_label().to_string()),
                    ]);
                    metrics::counter!(metric_defs::DISPATCH_DECLINED.name, &labels).increment(1);
                }
            }
        }

        Err(DispatchError::Unclaimed)
    }

    /// Log a failed dispatch and count it. The error is returned unchanged.
    fn report(
        &self,
        path: &'static str,
        result: Result<(), DispatchError>,
    ) -> Result<(), DispatchError> {
        let Err(e) = &result else {
            return result;
        };

        let ctx = self.context.as_ref();
        match e {
            DispatchError::Registry(RegistryError::NotFound(serial)) => {
                warn!(serial, "dropping response with no pending request");
                metrics::counter!(metric_defs::SOLICITED_STALE.name, &ctx.labels().to_labels())
                    .increment(1);
            }
            DispatchError::UnrecognizedEvent(event) => {
                warn!(event = %event, "dropping unrecognized unsolicited response");
                let labels = ctx.labels().with(&[("event", event.0.to_string())]);
                metrics::counter!(metric_defs::UNSOLICITED_UNRECOGNIZED.name, &labels)
                    .increment(1);
            }
            DispatchError::UnrecognizedRequest { serial, code } => {
                error!(serial, request = %code, "no decoder for solicited response");
            }
            other => {
                error!(path, error = %other, "dropping inbound buffer");
            }
        }

        let labels = ctx.labels().with(&[("path", path.to_string())]);
        metrics::counter!(metric_defs::DISPATCH_ERRORS.name, &labels).increment(1);
        result
    }
}

impl InboundSink for DispatchEngine {
    fn on_buffer(&self, data: &[u8]) {
        // Failures were logged and counted by `report`.
        let _ = self.process_response(data);
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("layers", &self.layer_names())
            .finish()
    }
}
