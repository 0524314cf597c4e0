//! Terminal dispatch layer.

use ril_protocol::{
    decode_ints, decode_signal_strength, decode_void, EventCode, ProtocolError, ProtocolResult,
    WireCursor,
};
use tracing::info;

use crate::bus::RilEvent;
use crate::context::RilContext;
use crate::decoders::DecoderTable;
use crate::dispatch::{DispatchLayer, Handling};
use crate::error::DispatchError;

/// Read the `[serial][error]` header of a solicited response.
pub fn read_solicited_header(cursor: &mut WireCursor<'_>) -> ProtocolResult<(i32, i32)> {
    let serial = cursor.read_i32()?;
    let error = cursor.read_i32()?;
    Ok((serial, error))
}

/// Protocol version carried by a connection-established notification.
pub fn read_connected_version(cursor: &mut WireCursor<'_>) -> ProtocolResult<i32> {
    decode_ints(cursor)?
        .first()
        .copied()
        .ok_or_else(|| ProtocolError::Malformed("connection notification has no version".into()))
}

/// Handles every solicited code in its decoder table and the standard
/// unsolicited events. Anything else is reported, never declined.
#[derive(Debug, Clone)]
pub struct BaselineLayer {
    decoders: DecoderTable,
}

impl BaselineLayer {
    /// Baseline with the given decoders.
    pub fn new(decoders: DecoderTable) -> Self {
        Self { decoders }
    }

    /// Baseline with [`DecoderTable::standard`].
    pub fn standard() -> Self {
        Self::new(DecoderTable::standard())
    }

    /// The decoders this layer consults.
    pub fn decoders(&self) -> &DecoderTable {
        &self.decoders
    }
}

impl Default for BaselineLayer {
    fn default() -> Self {
        Self::standard()
    }
}

impl DispatchLayer for BaselineLayer {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn try_solicited(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<Handling, DispatchError> {
        let (serial, error) = read_solicited_header(cursor)?;
        let request = ctx.registry().take_by_serial(serial)?;
        let code = request.code();

        match self.decoders.get(code) {
            Some(decoder) => {
                ctx.complete_solicited(request, error, cursor, decoder);
                Ok(Handling::Handled)
            }
            None => {
                ctx.fail_unrecognized(request);
                Err(DispatchError::UnrecognizedRequest { serial, code })
            }
        }
    }

    fn try_unsolicited(
        &self,
        cursor: &mut WireCursor<'_>,
        ctx: &RilContext,
    ) -> Result<Handling, DispatchError> {
        let event = EventCode(cursor.read_i32()?);

        let published = match event {
            EventCode::CALL_STATE_CHANGED => {
                decode_void(cursor)?;
                RilEvent::CallStateChanged
            }
            EventCode::VOICE_NETWORK_STATE_CHANGED => {
                decode_void(cursor)?;
                RilEvent::VoiceNetworkStateChanged
            }
            EventCode::SIGNAL_STRENGTH => RilEvent::SignalStrength(decode_signal_strength(cursor)?),
            EventCode::RIL_CONNECTED => {
                let version = read_connected_version(cursor)?;
                ctx.state().set_ril_version(version);
                info!(version, "modem connected");
                RilEvent::RilConnected { version }
            }
            other => return Err(DispatchError::UnrecognizedEvent(other)),
        };

        ctx.record_event(event, self.name());
        ctx.bus().publish(published);
        Ok(Handling::Handled)
    }
}
