//! Requests that can be sent to the modem.

use crate::constants::*;
use crate::parcel::ParcelWriter;
use crate::types::UusInfo;

/// Requests that can be sent to the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Query card status.
    GetSimStatus,

    /// Query the current call list.
    GetCurrentCalls,

    /// Place a voice call.
    Dial {
        /// Number to dial, sent as given.
        address: String,
        /// Caller-id restriction mode.
        clir_mode: i32,
        /// Optional UUS block.
        uus: Option<UusInfo>,
    },

    /// Place an emergency call. The address is sent with
    /// [`EMERGENCY_ADDRESS_MARKER`] appended and no UUS block.
    DialEmergency {
        /// Emergency number.
        address: String,
        /// Caller-id restriction mode.
        clir_mode: i32,
    },

    /// Hang up the call with the given index.
    Hangup {
        /// Call index.
        index: i32,
    },

    /// Query signal strength.
    SignalStrength,

    /// Query voice registration state.
    VoiceRegistrationState,

    /// Query data registration state.
    DataRegistrationState,

    /// Query operator names.
    Operator,

    /// Turn the radio on or off.
    RadioPower {
        /// Desired power state.
        on: bool,
    },

    /// Scan for available networks.
    QueryAvailableNetworks,

    /// Set the preferred network type.
    SetPreferredNetworkType {
        /// Network type code.
        network_type: i32,
    },

    /// Set the CDMA subscription source.
    CdmaSetSubscriptionSource {
        /// Subscription source code.
        source: i32,
    },

    /// Set the unsolicited cell info reporting rate.
    SetUnsolCellInfoListRate {
        /// Minimum interval in milliseconds.
        rate_ms: i32,
    },
}

impl Request {
    /// The request code for this request.
    pub fn code(&self) -> RequestCode {
        match self {
            Request::GetSimStatus => RequestCode::GET_SIM_STATUS,
            Request::GetCurrentCalls => RequestCode::GET_CURRENT_CALLS,
            Request::Dial { .. } => RequestCode::DIAL,
            Request::DialEmergency { .. } => RequestCode::DIAL_EMERGENCY,
            Request::Hangup { .. } => RequestCode::HANGUP,
            Request::SignalStrength => RequestCode::SIGNAL_STRENGTH,
            Request::VoiceRegistrationState => RequestCode::VOICE_REGISTRATION_STATE,
            Request::DataRegistrationState => RequestCode::DATA_REGISTRATION_STATE,
            Request::Operator => RequestCode::OPERATOR,
            Request::RadioPower { .. } => RequestCode::RADIO_POWER,
            Request::QueryAvailableNetworks => RequestCode::QUERY_AVAILABLE_NETWORKS,
            Request::SetPreferredNetworkType { .. } => RequestCode::SET_PREFERRED_NETWORK_TYPE,
            Request::CdmaSetSubscriptionSource { .. } => RequestCode::CDMA_SET_SUBSCRIPTION_SOURCE,
            Request::SetUnsolCellInfoListRate { .. } => RequestCode::SET_UNSOL_CELL_INFO_LIST_RATE,
        }
    }

    /// Append this request's body to `w`.
    pub fn encode_body(&self, w: &mut ParcelWriter) {
        match self {
            Request::Dial {
                address,
                clir_mode,
                uus,
            } => {
                w.write_str(address)
                    .write_i32(*clir_mode)
                    .write_i32(0)
                    .write_i32(1)
                    .write_str("");
                match uus {
                    Some(info) => {
                        w.write_i32(1)
                            .write_i32(info.uus_type)
                            .write_i32(info.dcs)
                            .write_byte_array(Some(&info.user_data));
                    }
                    None => {
                        w.write_i32(0);
                    }
                }
            }
            Request::DialEmergency { address, clir_mode } => {
                w.write_str(&format!("{}{}", address, EMERGENCY_ADDRESS_MARKER))
                    .write_i32(*clir_mode)
                    .write_i32(0); // UUS absent
            }
            Request::Hangup { index } => {
                w.write_ints(&[*index]);
            }
            Request::RadioPower { on } => {
                w.write_ints(&[i32::from(*on)]);
            }
            Request::SetPreferredNetworkType { network_type } => {
                w.write_ints(&[*network_type]);
            }
            Request::CdmaSetSubscriptionSource { source } => {
                w.write_ints(&[*source]);
            }
            Request::SetUnsolCellInfoListRate { rate_ms } => {
                w.write_ints(&[*rate_ms]);
            }
            Request::GetSimStatus
            | Request::GetCurrentCalls
            | Request::SignalStrength
            | Request::VoiceRegistrationState
            | Request::DataRegistrationState
            | Request::Operator
            | Request::QueryAvailableNetworks => {}
        }
    }

    /// Encode the complete outgoing parcel: `[code][serial]<body>`.
    pub fn encode(&self, serial: i32) -> Vec<u8> {
        let mut w = ParcelWriter::new();
        w.write_i32(self.code().0).write_i32(serial);
        self.encode_body(&mut w);
        w.into_vec()
    }
}
