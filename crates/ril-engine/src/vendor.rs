//! LTE-A vendor override layer.
//!
//! Owns the normalized data registration response and four vendor
//! notifications: connection established, command string, handover notice
//! and wideband audio capability. Event codes come from the
//! [`VendorProfile`]. Everything else is declined untouched.

use ril_protocol::{decode_ints, decode_string, decode_void, EventCode, Request, WireCursor};
use tracing::{debug, error, info, warn};

use crate::baseline::{read_connected_version, read_solicited_header};
use crate::bus::RilEvent;
use crate::config::VendorProfile;
use crate::context::RilContext;
use crate::decoders::DecoderTable;
use crate::dispatch::{DispatchLayer, Handling};
use crate::error::DispatchError;

/// Audio parameter toggled by the wideband audio notification.
pub const WIDEBAND_AUDIO_PARAMETER: &str = "wide_voice_enable";

/// Command the vendor command string is passed to.
pub const VENDOR_COMMAND: &str = "am";

/// Vendor override layer.
#[derive(Debug, Clone)]
pub struct VendorLayer {
    profile: VendorProfile,
    overrides: DecoderTable,
}

impl VendorLayer {
    /// Layer for a profile with the normalized data registration decoder.
    pub fn new(profile: VendorProfile) -> Self {
        Self::with_overrides(profile, DecoderTable::normalized_data_registration())
    }

    /// Layer owning exactly the request codes in `overrides`.
    pub fn with_overrides(profile: VendorProfile, overrides: DecoderTable) -> Self {
        Self { profile, overrides }
    }

    /// The profile this layer was built from.
    pub fn profile(&self) -> &VendorProfile {
        &self.profile
    }

    fn on_connected(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<RilEvent, DispatchError> {
        let version = read_connected_version(cursor)?;
        ctx.state().set_ril_version(version);
        info!(version, "modem connected, restoring radio settings");

        let config = ctx.config();
        let mut followups = vec![
            Request::RadioPower { on: false },
            Request::SetPreferredNetworkType {
                network_type: config.preferred_network_type,
            },
            Request::CdmaSetSubscriptionSource {
                source: config.cdma_subscription,
            },
        ];
        if version >= self.profile.cell_info_rate_min_version {
            followups.push(Request::SetUnsolCellInfoListRate {
                rate_ms: self.profile.cell_info_rate,
            });
        }

        for request in &followups {
            if let Err(e) = ctx.sender().send_and_forget(request) {
                warn!(request = %request.code(), error = %e, "follow-up request not sent");
            }
        }

        Ok(RilEvent::RilConnected { version })
    }

    fn on_command_string(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<(), DispatchError> {
        let Some(args) = decode_string(cursor)? else {
            warn!("vendor command notification without a command");
            return Ok(());
        };

        let command = format!("{} {}", VENDOR_COMMAND, args);
        match ctx.executor().execute(&command) {
            Ok(()) => debug!(command = %command, "vendor command executed"),
            Err(e) => error!(command = %command, error = %e, "vendor command failed"),
        }
        Ok(())
    }

    fn on_wideband_audio(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<Option<RilEvent>, DispatchError> {
        let values = decode_ints(cursor)?;
        let enabled = match values.first().copied() {
            Some(1) => true,
            Some(0) => false,
            other => {
                debug!(value = ?other, "ignoring wideband audio state");
                return Ok(None);
            }
        };
        ctx.audio()
            .set_parameter(WIDEBAND_AUDIO_PARAMETER, if enabled { "true" } else { "false" });
        Ok(Some(RilEvent::WidebandAudio { enabled }))
    }
}

impl DispatchLayer for VendorLayer {
    fn name(&self) -> &'static str {
        "vendor"
    }

    fn try_solicited(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<Handling, DispatchError> {
        let checkpoint = cursor.checkpoint();
        let owned = read_solicited_header(cursor).ok().and_then(|(serial, error)| {
            let code = ctx.registry().peek_code(serial)?;
            self.overrides.get(code).map(|decoder| (serial, error, decoder))
        });

        let Some((serial, error, decoder)) = owned else {
            cursor.restore(checkpoint);
            return Ok(Handling::Declined);
        };

        let request = ctx.registry().take_by_serial(serial)?;
        ctx.complete_solicited(request, error, cursor, decoder);
        Ok(Handling::Handled)
    }

    fn try_unsolicited(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<Handling, DispatchError> {
        let checkpoint = cursor.checkpoint();
        let code = match cursor.read_i32() {
            Ok(code) => code,
            Err(_) => {
                cursor.restore(checkpoint);
                return Ok(Handling::Declined);
            }
        };

        let published = if code == self.profile.ril_connected_event {
            Some(self.on_connected(cursor, ctx)?)
        } else if code == self.profile.am_event {
            self.on_command_string(cursor, ctx)?;
            None
        } else if code == self.profile.handover_event {
            decode_void(cursor)?;
            debug!("handover notice");
            Some(RilEvent::HandoverNotice)
        } else if code == self.profile.wb_amr_event {
            self.on_wideband_audio(cursor, ctx)?
        } else {
            cursor.restore(checkpoint);
            return Ok(Handling::Declined);
        };

        ctx.record_event(EventCode(code), self.name());
        if let Some(event) = published {
            ctx.bus().publish(event);
        }
        Ok(Handling::Handled)
    }
}
