//! Serial allocation and request submission.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use ril_metrics::{metric_defs, MetricLabels};
use ril_protocol::{Request, RilErrorCode};
use tracing::{debug, warn};

use crate::collaborators::Transport;
use crate::error::RequestError;
use crate::registry::{Completion, RequestRegistry};

/// Encodes requests, registers them, and hands them to the transport.
pub struct RequestSender {
    transport: Arc<dyn Transport>,
    registry: Arc<RequestRegistry>,
    next_serial: AtomicI32,
    labels: MetricLabels,
}

impl RequestSender {
    /// Create a sender. Serials start at 1.
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<RequestRegistry>,
        labels: MetricLabels,
    ) -> Self {
        Self {
            transport,
            registry,
            next_serial: AtomicI32::new(1),
            labels,
        }
    }

    /// Next free serial. Wraps to 0 after `i32::MAX` and skips serials that
    /// are still pending.
    fn allocate_serial(&self) -> i32 {
        loop {
            let serial = match self.next_serial.fetch_update(
                Ordering::Relaxed,
                Ordering::Relaxed,
                |s| Some(if s == i32::MAX { 0 } else { s + 1 }),
            ) {
                Ok(s) | Err(s) => s,
            };
            if !self.registry.contains(serial) {
                return serial;
            }
        }
    }

    /// Send a request. Returns its serial.
    ///
    /// The request is registered before the transport sees it. If the
    /// transport fails, the request is taken back and completed with
    /// `RADIO_NOT_AVAILABLE`; the same error is returned here.
    pub fn send(&self, request: &Request, completion: Completion) -> Result<i32, RequestError> {
        let serial = self.allocate_serial();
        let code = request.code();
        let payload = request.encode(serial);

        self.registry
            .register(serial, code, completion, payload.clone())?;
        self.record_pending();

        let request_labels = self.labels.with(&[("request", code.name().to_string())]);
        match self.transport.send(&payload) {
            Ok(()) => {
                debug!(serial, request = %code, bytes = payload.len(), "request sent");
                metrics::counter!(metric_defs::REQUESTS_SENT.name, &request_labels).increment(1);
                Ok(serial)
            }
            Err(e) => {
                warn!(serial, request = %code, error = %e, "transport send failed");
                metrics::counter!(metric_defs::REQUESTS_SEND_FAILED.name, &request_labels)
                    .increment(1);
                let failure = RequestError::radio(RilErrorCode::RadioNotAvailable);
                // A response may already have claimed it; then there is nothing to fail.
                if let Ok(pending) = self.registry.take_by_serial(serial) {
                    pending.complete(Err(failure.clone()));
                }
                self.record_pending();
                Err(failure)
            }
        }
    }

    /// Send a request whose outcome is only logged.
    pub fn send_and_forget(&self, request: &Request) -> Result<i32, RequestError> {
        self.send(request, Completion::log_only(request.code()))
    }

    /// Update the pending request gauge.
    pub(crate) fn record_pending(&self) {
        metrics::gauge!(metric_defs::REQUESTS_PENDING.name, &self.labels.to_labels())
            .set(self.registry.len() as f64);
    }
}

impl std::fmt::Debug for RequestSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSender")
            .field("next_serial", &self.next_serial.load(Ordering::Relaxed))
            .finish()
    }
}
