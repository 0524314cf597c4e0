//! Metrics for the radio interface layer engine.
//!
//! Every metric the engine records is declared once here as a const
//! [`Metric`] carrying its name, kind, description, unit and label keys, so
//! call sites never spell a metric name by hand. The `metrics` crate is
//! re-exported for convenience.
//!
//! # Example
//!
//! ```rust,ignore
//! use ril_metrics::{describe_metrics, metric_defs, MetricLabels};
//!
//! // Once at startup, after installing a recorder
//! describe_metrics();
//!
//! let labels = MetricLabels::new("ril0", "kslte");
//! metrics::counter!(
//!     metric_defs::REQUESTS_SENT.name,
//!     &labels.with(&[("request", "DIAL".to_string())])
//! )
//! .increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// Counter, gauge or histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Only ever incremented.
    Counter,
    /// Set to the current value.
    Gauge,
    /// Records a distribution of samples.
    Histogram,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        })
    }
}

/// Declaration of one engine metric.
///
/// Built in const context so every definition lives in [`metric_defs`]:
///
/// ```rust
/// use ril_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const RESPONSES: Metric = Metric::counter("ril.example.responses")
///     .with_description("Responses seen")
///     .with_unit(Unit::Count)
///     .with_labels(&["instance"]);
///
/// assert_eq!(RESPONSES.kind, MetricKind::Counter);
/// assert_eq!(RESPONSES.kind.to_string(), "counter");
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// Dotted metric name, e.g. `ril.request.sent`.
    pub name: &'static str,
    /// Counter, gauge or histogram.
    pub kind: MetricKind,
    /// Text handed to the recorder by [`Metric::describe`].
    pub description: &'static str,
    /// Unit, when the value has one.
    pub unit: Option<Unit>,
    /// Label keys call sites attach.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Declare a counter.
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    /// Declare a gauge.
    pub const fn gauge(name: &'static str) -> Self {
        Self::new(name, MetricKind::Gauge)
    }

    /// Declare a histogram.
    pub const fn histogram(name: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram)
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Hand name, unit and description to the installed recorder.
    pub fn describe(&self) {
        let (name, text) = (self.name, self.description);
        match (self.kind, self.unit) {
            (MetricKind::Counter, None) => describe_counter!(name, text),
            (MetricKind::Counter, Some(unit)) => describe_counter!(name, unit, text),
            (MetricKind::Gauge, None) => describe_gauge!(name, text),
            (MetricKind::Gauge, Some(unit)) => describe_gauge!(name, unit, text),
            (MetricKind::Histogram, None) => describe_histogram!(name, text),
            (MetricKind::Histogram, Some(unit)) => describe_histogram!(name, unit, text),
        }
    }
}

/// All metric definitions for the engine.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Labels present on every engine metric.
    pub const STANDARD_LABELS: &[&str] = &["instance", "profile"];

    // ========================================================================
    // Requests
    // ========================================================================

    /// Requests handed to the transport.
    ///
    /// Labels: instance, profile, request
    pub const REQUESTS_SENT: Metric = Metric::counter("ril.request.sent")
        .with_description("Requests encoded and handed to the transport")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile", "request"]);

    /// Requests the transport refused.
    pub const REQUESTS_SEND_FAILED: Metric = Metric::counter("ril.request.send_failed")
        .with_description("Requests the transport failed to send")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile", "request"]);

    /// Requests completed with a cancellation.
    pub const REQUESTS_CANCELLED: Metric = Metric::counter("ril.request.cancelled")
        .with_description("Requests completed by forced cancellation")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile"]);

    /// Requests awaiting a response.
    pub const REQUESTS_PENDING: Metric = Metric::gauge("ril.request.pending")
        .with_description("Requests registered and awaiting a response")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile"]);

    // ========================================================================
    // Solicited Responses
    // ========================================================================

    /// Solicited responses delivered to a caller.
    ///
    /// Labels: instance, profile, request, outcome (ok|error|decode_failure|unrecognized)
    pub const SOLICITED_RESPONSES: Metric = Metric::counter("ril.solicited.responses")
        .with_description("Solicited responses delivered to their caller")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile", "request", "outcome"]);

    /// Solicited responses with no matching pending request.
    pub const SOLICITED_STALE: Metric = Metric::counter("ril.solicited.stale")
        .with_description("Solicited responses dropped for lack of a pending request")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile"]);

    /// Size of solicited response bodies.
    pub const SOLICITED_BODY_SIZE: Metric = Metric::histogram("ril.solicited.body_size_bytes")
        .with_description("Bytes following the solicited response header")
        .with_unit(Unit::Bytes)
        .with_labels(&["instance", "profile", "request"]);

    // ========================================================================
    // Unsolicited Notifications
    // ========================================================================

    /// Unsolicited notifications handled by a layer.
    ///
    /// Labels: instance, profile, event, layer
    pub const UNSOLICITED_EVENTS: Metric = Metric::counter("ril.unsolicited.events")
        .with_description("Unsolicited notifications handled")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile", "event", "layer"]);

    /// Unsolicited notifications no layer recognized.
    pub const UNSOLICITED_UNRECOGNIZED: Metric = Metric::counter("ril.unsolicited.unrecognized")
        .with_description("Unsolicited notifications dropped as unrecognized")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile", "event"]);

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Buffers a layer declined and passed down the chain.
    ///
    /// Labels: instance, profile, layer, path (solicited|unsolicited)
    pub const DISPATCH_DECLINED: Metric = Metric::counter("ril.dispatch.declined")
        .with_description("Buffers declined by a dispatch layer")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile", "layer", "path"]);

    /// Buffers dropped because dispatch failed.
    pub const DISPATCH_ERRORS: Metric = Metric::counter("ril.dispatch.errors")
        .with_description("Buffers dropped after a dispatch error")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile", "path"]);

    /// Listener callbacks that panicked.
    pub const LISTENER_FAILURES: Metric = Metric::counter("ril.bus.listener_failures")
        .with_description("Notification listeners that panicked during delivery")
        .with_unit(Unit::Count)
        .with_labels(&["instance", "profile"]);

    /// Returns a slice of all defined metrics.
    pub const ALL: &[&Metric] = &[
        &REQUESTS_SENT,
        &REQUESTS_SEND_FAILED,
        &REQUESTS_CANCELLED,
        &REQUESTS_PENDING,
        &SOLICITED_RESPONSES,
        &SOLICITED_STALE,
        &SOLICITED_BODY_SIZE,
        &UNSOLICITED_EVENTS,
        &UNSOLICITED_UNRECOGNIZED,
        &DISPATCH_DECLINED,
        &DISPATCH_ERRORS,
        &LISTENER_FAILURES,
    ];
}

/// Labels identifying one engine instance.
///
/// ```rust
/// use ril_metrics::MetricLabels;
///
/// let labels = MetricLabels::new("ril0", "kslte");
/// assert_eq!(labels.to_labels().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MetricLabels {
    /// Engine instance identifier.
    pub instance: String,
    /// Vendor profile name.
    pub profile: String,
}

impl MetricLabels {
    /// Creates labels for an instance running the given profile.
    pub fn new(instance: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            profile: profile.into(),
        }
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("instance", self.instance.clone()),
            ("profile", self.profile.clone()),
        ]
    }

    /// Returns labels with additional key-value pairs.
    pub fn with(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.extend_from_slice(extra);
        labels
    }
}

/// Describes all metrics used by the engine.
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
