//! State and collaborators shared by every dispatch layer.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use ril_metrics::{metric_defs, MetricLabels};
use ril_protocol::{CallListHooks, EventCode, RilErrorCode, WireCursor};
use tracing::{debug, warn};

use crate::bus::{NotificationBus, RilEvent};
use crate::collaborators::{AudioControl, CommandExecutor, Transport};
use crate::config::RilConfig;
use crate::decoders::{DecodeContext, DecodeFn};
use crate::error::RequestError;
use crate::registry::{PendingRequest, RequestRegistry};
use crate::sender::RequestSender;

const VERSION_UNKNOWN: i32 = -1;

/// Modem state the engine tracks between messages.
#[derive(Debug)]
pub struct RadioState {
    ril_version: AtomicI32,
    testing_emergency_call: AtomicBool,
}

impl Default for RadioState {
    fn default() -> Self {
        Self {
            ril_version: AtomicI32::new(VERSION_UNKNOWN),
            testing_emergency_call: AtomicBool::new(false),
        }
    }
}

impl RadioState {
    /// Protocol version from the last connection event, if any.
    pub fn ril_version(&self) -> Option<i32> {
        match self.ril_version.load(Ordering::Acquire) {
            VERSION_UNKNOWN => None,
            v => Some(v),
        }
    }

    /// Record the protocol version.
    pub fn set_ril_version(&self, version: i32) {
        self.ril_version.store(version, Ordering::Release);
    }

    /// Arm or disarm the emergency test call latch.
    pub fn set_testing_emergency_call(&self, armed: bool) {
        self.testing_emergency_call.store(armed, Ordering::Release);
    }

    /// Whether the emergency test call latch is armed.
    pub fn testing_emergency_call(&self) -> bool {
        self.testing_emergency_call.load(Ordering::Acquire)
    }

    /// Clear the latch, returning whether it was armed.
    pub fn take_testing_emergency_call(&self) -> bool {
        self.testing_emergency_call.swap(false, Ordering::AcqRel)
    }
}

/// Everything a dispatch layer can reach.
pub struct RilContext {
    config: RilConfig,
    labels: MetricLabels,
    registry: Arc<RequestRegistry>,
    sender: RequestSender,
    bus: NotificationBus,
    audio: Arc<dyn AudioControl>,
    executor: Arc<dyn CommandExecutor>,
    state: RadioState,
}

impl RilContext {
    /// Build a context around the given collaborators.
    pub fn new(
        config: RilConfig,
        transport: Arc<dyn Transport>,
        audio: Arc<dyn AudioControl>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        let labels = MetricLabels::new(config.instance_id.clone(), config.vendor.name.clone());
        let registry = Arc::new(RequestRegistry::new());
        let sender = RequestSender::new(transport, registry.clone(), labels.clone());
        let bus = NotificationBus::new(labels.clone());
        Self {
            config,
            labels,
            registry,
            sender,
            bus,
            audio,
            executor,
            state: RadioState::default(),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RilConfig {
        &self.config
    }

    /// Metric labels for this instance.
    pub fn labels(&self) -> &MetricLabels {
        &self.labels
    }

    /// Pending requests.
    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    /// Outbound request path.
    pub fn sender(&self) -> &RequestSender {
        &self.sender
    }

    /// Event fan-out.
    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    /// Audio collaborator.
    pub fn audio(&self) -> &dyn AudioControl {
        self.audio.as_ref()
    }

    /// Command execution collaborator.
    pub fn executor(&self) -> &dyn CommandExecutor {
        self.executor.as_ref()
    }

    /// Tracked modem state.
    pub fn state(&self) -> &RadioState {
        &self.state
    }

    /// Decoder inputs derived from this context.
    pub fn decode_context(&self) -> DecodeContext<'_> {
        DecodeContext {
            hooks: self,
            qan_elements: self.config.vendor.qan_elements,
        }
    }

    /// Decode a solicited body and deliver the outcome to its request.
    ///
    /// The cursor must sit just past the `[serial][error]` header. A success
    /// runs the decoder. An error with a body still runs it and attaches the
    /// result to the failure; an error without a body fails with the code
    /// alone.
    pub fn complete_solicited(
        &self,
        request: PendingRequest,
        error: i32,
        cursor: &mut WireCursor<'_>,
        decoder: DecodeFn,
    ) {
        let serial = request.serial();
        let code = request.code();
        let error = RilErrorCode::from(error);
        let body_len = cursor.remaining();
        let request_labels = self.labels.with(&[("request", code.name().to_string())]);
        metrics::histogram!(metric_defs::SOLICITED_BODY_SIZE.name, &request_labels)
            .record(body_len as f64);

        let outcome = if error.is_success() {
            decoder(cursor, &self.decode_context()).map_err(RequestError::from)
        } else if cursor.has_remaining() {
            match decoder(cursor, &self.decode_context()) {
                Ok(body) => Err(RequestError::Radio {
                    code: error,
                    response: Some(Box::new(body)),
                }),
                Err(e) => {
                    warn!(serial, request = %code, error = %e, "undecodable error body dropped");
                    Err(RequestError::radio(error))
                }
            }
        } else {
            Err(RequestError::radio(error))
        };

        let label = match &outcome {
            Ok(response) => {
                debug!(serial, request = %code, response = %response.summary(), "response");
                "ok"
            }
            Err(RequestError::Decode(e)) => {
                warn!(serial, request = %code, error = %e, "malformed response");
                "decode_failure"
            }
            Err(e) => {
                debug!(serial, request = %code, error = %e, "error response");
                "error"
            }
        };
        let outcome_labels = self.labels.with(&[
            ("request", code.name().to_string()),
            ("outcome", label.to_string()),
        ]);
        metrics::counter!(metric_defs::SOLICITED_RESPONSES.name, &outcome_labels).increment(1);

        request.complete(outcome);
        self.sender.record_pending();
    }

    /// Fail a request whose code has no decoder.
    pub fn fail_unrecognized(&self, request: PendingRequest) {
        let code = request.code();
        let outcome_labels = self.labels.with(&[
            ("request", code.name().to_string()),
            ("outcome", "unrecognized".to_string()),
        ]);
        metrics::counter!(metric_defs::SOLICITED_RESPONSES.name, &outcome_labels).increment(1);
        request.complete(Err(RequestError::UnrecognizedRequest(code)));
        self.sender.record_pending();
    }

    /// Count an unsolicited event handled by `layer`.
    pub fn record_event(&self, event: EventCode, layer: &'static str) {
        let labels = self.labels.with(&[
            ("event", event.name().to_string()),
            ("layer", layer.to_string()),
        ]);
        metrics::counter!(metric_defs::UNSOLICITED_EVENTS.name, &labels).increment(1);
    }
}

impl CallListHooks for RilContext {
    fn voice_privacy_changed(&self, enabled: bool) {
        self.bus.publish(if enabled {
            RilEvent::VoicePrivacyOn
        } else {
            RilEvent::VoicePrivacyOff
        });
    }

    fn take_emergency_test_latch(&self) -> bool {
        self.state.take_testing_emergency_call()
    }

    fn emergency_callback_mode(&self) {
        self.bus.publish(RilEvent::EmergencyCallbackMode);
    }
}

impl std::fmt::Debug for RilContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RilContext")
            .field("instance", &self.config.instance_id)
            .field("profile", &self.config.vendor.name)
            .field("pending", &self.registry.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_unknown_until_set() {
        let state = RadioState::default();
        assert_eq!(state.ril_version(), None);
        state.set_ril_version(9);
        assert_eq!(state.ril_version(), Some(9));
    }

    #[test]
    fn test_emergency_latch_clears_on_take() {
        let state = RadioState::default();
        assert!(!state.take_testing_emergency_call());
        state.set_testing_emergency_call(true);
        assert!(state.testing_emergency_call());
        assert!(state.take_testing_emergency_call());
        assert!(!state.take_testing_emergency_call());
    }
}
