//! Notification fan-out for unsolicited events and decoder side effects.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use ril_metrics::{metric_defs, MetricLabels};
use ril_protocol::SignalStrength;
use tracing::{error, trace};

/// Events published by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RilEvent {
    /// The modem connected and reported its protocol version.
    RilConnected {
        /// Protocol version.
        version: i32,
    },
    /// Call state changed; the call list should be re-queried.
    CallStateChanged,
    /// Voice network registration changed.
    VoiceNetworkStateChanged,
    /// New signal strength measurement.
    SignalStrength(SignalStrength),
    /// A call entry reported voice privacy on.
    VoicePrivacyOn,
    /// A call entry reported voice privacy off.
    VoicePrivacyOff,
    /// An emergency test call ended; the phone is in callback mode.
    EmergencyCallbackMode,
    /// The modem reported a handover.
    HandoverNotice,
    /// Wideband audio was switched on or off.
    WidebandAudio {
        /// New state.
        enabled: bool,
    },
}

impl RilEvent {
    /// Event name for logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            RilEvent::RilConnected { .. } => "ril_connected",
            RilEvent::CallStateChanged => "call_state_changed",
            RilEvent::VoiceNetworkStateChanged => "voice_network_state_changed",
            RilEvent::SignalStrength(_) => "signal_strength",
            RilEvent::VoicePrivacyOn => "voice_privacy_on",
            RilEvent::VoicePrivacyOff => "voice_privacy_off",
            RilEvent::EmergencyCallbackMode => "emergency_callback_mode",
            RilEvent::HandoverNotice => "handover",
            RilEvent::WidebandAudio { .. } => "wideband_audio",
        }
    }
}

/// Handle returned by [`NotificationBus::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&RilEvent) + Send + Sync>;

/// Synchronous, best-effort event fan-out.
///
/// Callback listeners run on the publishing thread. A panicking listener is
/// logged and skipped; the remaining listeners still see the event. Channel
/// subscribers get a clone of each event and are pruned once their receiver
/// is dropped.
pub struct NotificationBus {
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    subscribers: Mutex<Vec<Sender<RilEvent>>>,
    next_id: AtomicU64,
    labels: MetricLabels,
}

impl NotificationBus {
    /// Create a bus whose metrics carry the given labels.
    pub fn new(labels: MetricLabels) -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            labels,
        }
    }

    /// Register a callback listener.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&RilEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Remove a callback listener. Returns whether it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Subscribe through an unbounded channel.
    pub fn subscribe(&self) -> Receiver<RilEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Number of callback listeners plus live subscribers.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len() + self.subscribers.lock().len()
    }

    /// Publish an event to every listener and subscriber.
    pub fn publish(&self, event: RilEvent) {
        trace!(event = event.name(), "publish");

        // Snapshot so listeners may add or remove listeners while running.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                error!(event = event.name(), "listener panicked");
                let labels = self.labels.to_labels();
                metrics::counter!(metric_defs::LISTENER_FAILURES.name, &labels).increment(1);
            }
        }

        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("listeners", &self.listeners.read().len())
            .field("subscribers", &self.subscribers.lock().len())
            .finish()
    }
}
