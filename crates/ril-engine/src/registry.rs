//! Outstanding request bookkeeping.
//!
//! Every registered request receives exactly one outcome: a decoded
//! response, a failure, or a cancellation. The registry owns each
//! [`PendingRequest`] from registration until it is taken back out, and a
//! request dropped without an outcome reports itself cancelled.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use ril_protocol::{RequestCode, Response};
use tracing::{debug, error, warn};

use crate::error::{RegistryError, RequestError};

/// Terminal outcome of a request.
pub type Outcome = Result<Response, RequestError>;

/// One-shot callback receiving a request's outcome.
pub struct Completion(Box<dyn FnOnce(Outcome) + Send>);

impl Completion {
    /// Wrap a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        Completion(Box::new(f))
    }

    /// A completion that forwards its outcome to the returned channel.
    pub fn channel() -> (Self, Receiver<Outcome>) {
        let (tx, rx): (Sender<Outcome>, Receiver<Outcome>) = crossbeam_channel::bounded(1);
        let completion = Completion::new(move |outcome| {
            // Receiver may be gone; the caller stopped caring.
            let _ = tx.send(outcome);
        });
        (completion, rx)
    }

    /// A completion that only logs the outcome.
    pub fn log_only(code: RequestCode) -> Self {
        Completion::new(move |outcome| match outcome {
            Ok(response) => debug!(request = %code, response = %response.summary(), "completed"),
            Err(e) => warn!(request = %code, error = %e, "failed"),
        })
    }

    /// Deliver the outcome. A panicking callback is logged and contained.
    fn deliver(self, outcome: Outcome) {
        if catch_unwind(AssertUnwindSafe(move || (self.0)(outcome))).is_err() {
            error!("completion callback panicked");
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Completion")
    }
}

/// A request awaiting its response.
#[derive(Debug)]
pub struct PendingRequest {
    serial: i32,
    code: RequestCode,
    payload: Vec<u8>,
    completion: Option<Completion>,
}

impl PendingRequest {
    /// Create a pending request.
    pub fn new(serial: i32, code: RequestCode, completion: Completion, payload: Vec<u8>) -> Self {
        Self {
            serial,
            code,
            payload,
            completion: Some(completion),
        }
    }

    /// Request serial.
    pub fn serial(&self) -> i32 {
        self.serial
    }

    /// Request code.
    pub fn code(&self) -> RequestCode {
        self.code
    }

    /// The encoded request as sent.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Deliver the request's outcome, consuming it.
    pub fn complete(mut self, outcome: Outcome) {
        if let Some(completion) = self.completion.take() {
            completion.deliver(outcome);
        }
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        if let Some(completion) = self.completion.take() {
            debug!(serial = self.serial, request = %self.code, "pending request dropped");
            completion.deliver(Err(RequestError::Cancelled(
                "request dropped without a response".to_string(),
            )));
        }
    }
}

/// Table of outstanding requests keyed by serial.
///
/// Completions always run after the table lock is released.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    pending: Mutex<HashMap<i32, PendingRequest>>,
}

impl RequestRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request.
    ///
    /// A duplicate serial fails, and the rejected completion is completed
    /// with the same error so it still gets exactly one outcome.
    pub fn register(
        &self,
        serial: i32,
        code: RequestCode,
        completion: Completion,
        payload: Vec<u8>,
    ) -> Result<(), RegistryError> {
        let request = PendingRequest::new(serial, code, completion, payload);
        let rejected = {
            let mut pending = self.pending.lock();
            if pending.contains_key(&serial) {
                Some(request)
            } else {
                pending.insert(serial, request);
                None
            }
        };

        match rejected {
            Some(request) => {
                warn!(serial, request = %code, "duplicate serial");
                request.complete(Err(RequestError::Registry(RegistryError::DuplicateSerial(
                    serial,
                ))));
                Err(RegistryError::DuplicateSerial(serial))
            }
            None => Ok(()),
        }
    }

    /// Remove and return the request with this serial.
    pub fn take_by_serial(&self, serial: i32) -> Result<PendingRequest, RegistryError> {
        self.pending
            .lock()
            .remove(&serial)
            .ok_or(RegistryError::NotFound(serial))
    }

    /// Request code of a pending request, without removing it.
    pub fn peek_code(&self, serial: i32) -> Option<RequestCode> {
        self.pending.lock().get(&serial).map(|r| r.code)
    }

    /// Whether a request with this serial is pending.
    pub fn contains(&self, serial: i32) -> bool {
        self.pending.lock().contains_key(&serial)
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Remove every pending request and complete each with a cancellation.
    /// Returns how many were cancelled.
    pub fn cancel_all(&self, reason: &str) -> usize {
        let drained: Vec<PendingRequest> = {
            let mut pending = self.pending.lock();
            pending.drain().map(|(_, r)| r).collect()
        };

        let count = drained.len();
        for request in drained {
            debug!(serial = request.serial, request = %request.code, reason, "cancelling");
            request.complete(Err(RequestError::Cancelled(reason.to_string())));
        }
        count
    }
}

impl Drop for RequestRegistry {
    fn drop(&mut self) {
        let count = self.cancel_all("registry shut down");
        if count > 0 {
            debug!(count, "cancelled pending requests on shutdown");
        }
    }
}
