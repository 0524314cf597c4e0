//! # ril-engine
//!
//! Runtime core of the radio interface layer: correlates solicited
//! responses with pending requests, routes every inbound buffer through an
//! ordered chain of dispatch layers, and fans unsolicited events out to
//! listeners.
//!
//! ## Architecture
//!
//! - [`RequestSender`] allocates serials, registers each request in the
//!   [`RequestRegistry`], then hands the encoded request to a [`Transport`].
//! - [`DispatchEngine`] tries each [`DispatchLayer`] in order. The
//!   [`VendorLayer`] claims the codes its [`VendorProfile`] names and
//!   declines the rest; the [`BaselineLayer`] handles everything else.
//! - [`NotificationBus`] delivers [`RilEvent`]s to callbacks and channel
//!   subscribers.
//!
//! Every registered request receives exactly one outcome. A malformed or
//! unexpected buffer fails at most the one request it answers; the engine
//! keeps running.

mod baseline;
mod bus;
mod collaborators;
mod config;
mod context;
mod decoders;
mod dispatch;
mod error;
mod registry;
mod ril;
mod sender;
mod vendor;

pub use baseline::*;
pub use bus::*;
pub use collaborators::*;
pub use config::*;
pub use context::*;
pub use decoders::*;
pub use dispatch::*;
pub use error::*;
pub use registry::*;
pub use ril::*;
pub use sender::*;
pub use vendor::*;
