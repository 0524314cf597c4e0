//! Request code to record decoder mapping.

use std::collections::HashMap;

use ril_protocol::{
    decode_card_status, decode_call_list, decode_networks, decode_registration_state,
    decode_signal_strength, decode_strings, decode_void, CallListHooks, ProtocolResult,
    RequestCode, Response, WireCursor,
};

/// What a decoder may need beyond the cursor.
pub struct DecodeContext<'a> {
    /// Observers for the call list decoder.
    pub hooks: &'a dyn CallListHooks,
    /// Strings per available-networks record.
    pub qan_elements: usize,
}

/// Decodes one response body.
pub type DecodeFn = fn(&mut WireCursor<'_>, &DecodeContext<'_>) -> ProtocolResult<Response>;

/// Decoders keyed by request code.
#[derive(Clone, Default)]
pub struct DecoderTable {
    decoders: HashMap<RequestCode, DecodeFn>,
}

impl DecoderTable {
    /// A table with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decoders for every request the engine can send.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.insert(RequestCode::GET_SIM_STATUS, |c, _| {
            decode_card_status(c).map(Response::CardStatus)
        });
        table.insert(RequestCode::GET_CURRENT_CALLS, |c, ctx| {
            decode_call_list(c, ctx.hooks).map(Response::CallList)
        });
        table.insert(RequestCode::SIGNAL_STRENGTH, |c, _| {
            decode_signal_strength(c).map(Response::SignalStrength)
        });
        table.insert(RequestCode::VOICE_REGISTRATION_STATE, decode_string_vector);
        table.insert(RequestCode::DATA_REGISTRATION_STATE, decode_string_vector);
        table.insert(RequestCode::OPERATOR, decode_string_vector);
        table.insert(RequestCode::QUERY_AVAILABLE_NETWORKS, |c, ctx| {
            decode_networks(c, ctx.qan_elements).map(Response::Networks)
        });
        for code in [
            RequestCode::DIAL,
            RequestCode::DIAL_EMERGENCY,
            RequestCode::HANGUP,
            RequestCode::RADIO_POWER,
            RequestCode::SET_PREFERRED_NETWORK_TYPE,
            RequestCode::CDMA_SET_SUBSCRIPTION_SOURCE,
            RequestCode::SET_UNSOL_CELL_INFO_LIST_RATE,
        ] {
            table.insert(code, decode_empty);
        }
        table
    }

    /// Data registration decoder that normalizes the radio technology field.
    pub fn normalized_data_registration() -> Self {
        let mut table = Self::empty();
        table.insert(RequestCode::DATA_REGISTRATION_STATE, |c, _| {
            decode_registration_state(c).map(Response::Strings)
        });
        table
    }

    /// Add or replace a decoder, returning the one it replaced.
    pub fn insert(&mut self, code: RequestCode, decoder: DecodeFn) -> Option<DecodeFn> {
        self.decoders.insert(code, decoder)
    }

    /// Decoder for a request code.
    pub fn get(&self, code: RequestCode) -> Option<DecodeFn> {
        self.decoders.get(&code).copied()
    }

    /// Whether the table has a decoder for this code.
    pub fn contains(&self, code: RequestCode) -> bool {
        self.decoders.contains_key(&code)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl std::fmt::Debug for DecoderTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut codes: Vec<RequestCode> = self.decoders.keys().copied().collect();
        codes.sort();
        f.debug_struct("DecoderTable").field("codes", &codes).finish()
    }
}

fn decode_string_vector(
    cursor: &mut WireCursor<'_>,
    _ctx: &DecodeContext<'_>,
) -> ProtocolResult<Response> {
    decode_strings(cursor).map(Response::Strings)
}

fn decode_empty(cursor: &mut WireCursor<'_>, _ctx: &DecodeContext<'_>) -> ProtocolResult<Response> {
    decode_void(cursor).map(|()| Response::Void)
}
