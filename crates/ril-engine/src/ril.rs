//! Assembled engine.

use std::sync::Arc;

use ril_metrics::metric_defs;
use ril_protocol::Request;
use tracing::info;

use crate::baseline::BaselineLayer;
use crate::bus::NotificationBus;
use crate::collaborators::{AudioControl, CommandExecutor, InboundSink, Transport};
use crate::config::RilConfig;
use crate::context::{RadioState, RilContext};
use crate::dispatch::{DispatchEngine, DispatchLayer};
use crate::error::{DispatchError, RequestError};
use crate::registry::{Completion, RequestRegistry};
use crate::vendor::VendorLayer;

/// A radio interface layer instance: the vendor layer over the baseline,
/// wired to one transport.
///
/// ```rust
/// use std::sync::Arc;
/// use ril_engine::{Completion, NoAudio, NoExecutor, Ril, RilConfig, Transport, TransportError};
/// use ril_protocol::Request;
///
/// struct Discard;
/// impl Transport for Discard {
///     fn send(&self, _data: &[u8]) -> Result<(), TransportError> {
///         Ok(())
///     }
/// }
///
/// let ril = Ril::new(RilConfig::default(), Arc::new(Discard), Arc::new(NoAudio), Arc::new(NoExecutor));
/// let (completion, _outcome) = Completion::channel();
/// let serial = ril.send(&Request::GetSimStatus, completion).unwrap();
/// assert!(ril.registry().contains(serial));
/// ```
#[derive(Debug)]
pub struct Ril {
    engine: DispatchEngine,
}

impl Ril {
    /// Build the standard layer chain for `config`.
    pub fn new(
        config: RilConfig,
        transport: Arc<dyn Transport>,
        audio: Arc<dyn AudioControl>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        let vendor = VendorLayer::new(config.vendor.clone());
        let context = Arc::new(RilContext::new(config, transport, audio, executor));
        Self::with_layers(context, vec![Box::new(vendor)], BaselineLayer::standard())
    }

    /// Build with a custom layer chain.
    pub fn with_layers(
        context: Arc<RilContext>,
        overrides: Vec<Box<dyn DispatchLayer>>,
        baseline: BaselineLayer,
    ) -> Self {
        let engine = DispatchEngine::new(context, overrides, baseline);
        info!(
            instance = %engine.context().config().instance_id,
            profile = %engine.context().config().vendor.name,
            layers = ?engine.layer_names(),
            "engine ready"
        );
        Self { engine }
    }

    /// Send a request. See [`crate::RequestSender::send`].
    pub fn send(&self, request: &Request, completion: Completion) -> Result<i32, RequestError> {
        self.context().sender().send(request, completion)
    }

    /// Route an inbound buffer prefixed with its response type.
    pub fn process_response(&self, data: &[u8]) -> Result<(), DispatchError> {
        self.engine.process_response(data)
    }

    /// Arm the emergency test call latch.
    pub fn set_testing_emergency_call(&self, armed: bool) {
        self.context().state().set_testing_emergency_call(armed);
    }

    /// Cancel every pending request. Returns how many were cancelled.
    pub fn shutdown(&self, reason: &str) -> usize {
        let ctx = self.context();
        let count = ctx.registry().cancel_all(reason);
        metrics::counter!(metric_defs::REQUESTS_CANCELLED.name, &ctx.labels().to_labels())
            .increment(count as u64);
        ctx.sender().record_pending();
        info!(count, reason, "pending requests cancelled");
        count
    }

    /// The dispatch engine.
    pub fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    /// Shared context.
    pub fn context(&self) -> &Arc<RilContext> {
        self.engine.context()
    }

    /// Event fan-out.
    pub fn bus(&self) -> &NotificationBus {
        self.context().bus()
    }

    /// Pending requests.
    pub fn registry(&self) -> &Arc<RequestRegistry> {
        self.context().registry()
    }

    /// Tracked modem state.
    pub fn state(&self) -> &RadioState {
        self.context().state()
    }
}

impl InboundSink for Ril {
    fn on_buffer(&self, data: &[u8]) {
        self.engine.on_buffer(data);
    }
}
