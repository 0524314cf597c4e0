//! Protocol constants
//!
//! Request codes, unsolicited event codes, error codes and the fixed limits
//! used while decoding. Vendor codes live alongside the standard ones; which
//! of them a given dispatch layer claims is decided by its profile, not here.

use std::fmt;

// ============================================================================
// Response Types
// ============================================================================

/// Leading discriminator of a solicited response buffer.
pub const RESPONSE_SOLICITED: i32 = 0;
/// Leading discriminator of an unsolicited notification buffer.
pub const RESPONSE_UNSOLICITED: i32 = 1;

// ============================================================================
// Limits and Markers
// ============================================================================

/// Maximum number of applications kept from a card status response.
pub const CARD_MAX_APPS: usize = 8;

/// Number of integers in a signal strength record.
pub const SIGNAL_STRENGTH_INTS: usize = 12;

/// Type-of-address value for international numbers.
pub const TOA_INTERNATIONAL: i32 = 0x91;

/// Suffix appended to the address of an emergency dial.
pub const EMERGENCY_ADDRESS_MARKER: &str = "/";

/// Registration technology used when the wire value does not parse.
pub const DEFAULT_RADIO_TECH: &str = "2";

/// Offset the modem adds to a roaming-adjusted registration technology.
pub const RADIO_TECH_ROAMING_OFFSET: i32 = 100;

/// Cell info reporting rate meaning "never report".
pub const CELL_INFO_RATE_UNBOUNDED: i32 = i32::MAX;

// ============================================================================
// Request Codes (host → modem)
// ============================================================================

/// Numeric request code carried in every outgoing request and used to pick
/// the decoder for its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestCode(pub i32);

impl RequestCode {
    /// Card (SIM) status.
    pub const GET_SIM_STATUS: RequestCode = RequestCode(1);
    /// List of current calls.
    pub const GET_CURRENT_CALLS: RequestCode = RequestCode(9);
    /// Place a voice call.
    pub const DIAL: RequestCode = RequestCode(10);
    /// Hang up a call by index.
    pub const HANGUP: RequestCode = RequestCode(12);
    /// Current signal strength.
    pub const SIGNAL_STRENGTH: RequestCode = RequestCode(19);
    /// Voice registration state.
    pub const VOICE_REGISTRATION_STATE: RequestCode = RequestCode(20);
    /// Data registration state.
    pub const DATA_REGISTRATION_STATE: RequestCode = RequestCode(21);
    /// Current operator names.
    pub const OPERATOR: RequestCode = RequestCode(22);
    /// Turn the radio on or off.
    pub const RADIO_POWER: RequestCode = RequestCode(23);
    /// Scan for available networks.
    pub const QUERY_AVAILABLE_NETWORKS: RequestCode = RequestCode(48);
    /// Set the preferred network type.
    pub const SET_PREFERRED_NETWORK_TYPE: RequestCode = RequestCode(73);
    /// Set the CDMA subscription source.
    pub const CDMA_SET_SUBSCRIPTION_SOURCE: RequestCode = RequestCode(77);
    /// Set the unsolicited cell info reporting rate.
    pub const SET_UNSOL_CELL_INFO_LIST_RATE: RequestCode = RequestCode(110);
    /// Vendor emergency dial.
    pub const DIAL_EMERGENCY: RequestCode = RequestCode(10016);

    /// Human-readable name for logging.
    pub fn name(&self) -> &'static str {
        match *self {
            RequestCode::GET_SIM_STATUS => "GET_SIM_STATUS",
            RequestCode::GET_CURRENT_CALLS => "GET_CURRENT_CALLS",
            RequestCode::DIAL => "DIAL",
            RequestCode::HANGUP => "HANGUP",
            RequestCode::SIGNAL_STRENGTH => "SIGNAL_STRENGTH",
            RequestCode::VOICE_REGISTRATION_STATE => "VOICE_REGISTRATION_STATE",
            RequestCode::DATA_REGISTRATION_STATE => "DATA_REGISTRATION_STATE",
            RequestCode::OPERATOR => "OPERATOR",
            RequestCode::RADIO_POWER => "RADIO_POWER",
            RequestCode::QUERY_AVAILABLE_NETWORKS => "QUERY_AVAILABLE_NETWORKS",
            RequestCode::SET_PREFERRED_NETWORK_TYPE => "SET_PREFERRED_NETWORK_TYPE",
            RequestCode::CDMA_SET_SUBSCRIPTION_SOURCE => "CDMA_SET_SUBSCRIPTION_SOURCE",
            RequestCode::SET_UNSOL_CELL_INFO_LIST_RATE => "SET_UNSOL_CELL_INFO_LIST_RATE",
            RequestCode::DIAL_EMERGENCY => "DIAL_EMERGENCY",
            _ => "<unknown request>",
        }
    }
}

impl fmt::Display for RequestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

// ============================================================================
// Unsolicited Event Codes (modem → host)
// ============================================================================

/// Numeric code leading every unsolicited notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventCode(pub i32);

impl EventCode {
    /// Call state changed; fetch the call list to see what.
    pub const CALL_STATE_CHANGED: EventCode = EventCode(1001);
    /// Voice network state changed.
    pub const VOICE_NETWORK_STATE_CHANGED: EventCode = EventCode(1002);
    /// Periodic signal strength report.
    pub const SIGNAL_STRENGTH: EventCode = EventCode(1009);
    /// The modem process connected; payload carries its protocol version.
    pub const RIL_CONNECTED: EventCode = EventCode(1034);
    /// Vendor: command string to run on the host.
    pub const VENDOR_AM: EventCode = EventCode(11010);
    /// Vendor: wideband AMR capability changed.
    pub const VENDOR_WB_AMR_STATE: EventCode = EventCode(11017);
    /// Vendor: handover notice.
    pub const VENDOR_RESPONSE_HANDOVER: EventCode = EventCode(11021);

    /// Human-readable name for logging.
    pub fn name(&self) -> &'static str {
        match *self {
            EventCode::CALL_STATE_CHANGED => "UNSOL_CALL_STATE_CHANGED",
            EventCode::VOICE_NETWORK_STATE_CHANGED => "UNSOL_VOICE_NETWORK_STATE_CHANGED",
            EventCode::SIGNAL_STRENGTH => "UNSOL_SIGNAL_STRENGTH",
            EventCode::RIL_CONNECTED => "UNSOL_RIL_CONNECTED",
            EventCode::VENDOR_AM => "UNSOL_AM",
            EventCode::VENDOR_WB_AMR_STATE => "UNSOL_WB_AMR_STATE",
            EventCode::VENDOR_RESPONSE_HANDOVER => "UNSOL_RESPONSE_HANDOVER",
            _ => "<unknown event>",
        }
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Error code carried in the header of a solicited response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RilErrorCode {
    /// Request completed.
    Success,
    /// Radio is off or unreachable.
    RadioNotAvailable,
    /// Unspecified failure.
    GenericFailure,
    /// Wrong password.
    PasswordIncorrect,
    /// PIN2 required.
    SimPin2,
    /// PUK2 required.
    SimPuk2,
    /// Modem does not implement the request.
    RequestNotSupported,
    /// Request was cancelled.
    Cancelled,
    /// Any code without a dedicated variant.
    Other(i32),
}

impl RilErrorCode {
    /// Whether this is the success code.
    pub fn is_success(&self) -> bool {
        matches!(self, RilErrorCode::Success)
    }
}

impl From<i32> for RilErrorCode {
    fn from(code: i32) -> Self {
        match code {
            0 => RilErrorCode::Success,
            1 => RilErrorCode::RadioNotAvailable,
            2 => RilErrorCode::GenericFailure,
            3 => RilErrorCode::PasswordIncorrect,
            4 => RilErrorCode::SimPin2,
            5 => RilErrorCode::SimPuk2,
            6 => RilErrorCode::RequestNotSupported,
            7 => RilErrorCode::Cancelled,
            other => RilErrorCode::Other(other),
        }
    }
}

impl From<RilErrorCode> for i32 {
    fn from(code: RilErrorCode) -> Self {
        match code {
            RilErrorCode::Success => 0,
            RilErrorCode::RadioNotAvailable => 1,
            RilErrorCode::GenericFailure => 2,
            RilErrorCode::PasswordIncorrect => 3,
            RilErrorCode::SimPin2 => 4,
            RilErrorCode::SimPuk2 => 5,
            RilErrorCode::RequestNotSupported => 6,
            RilErrorCode::Cancelled => 7,
            RilErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for RilErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RilErrorCode::Success => write!(f, "success"),
            RilErrorCode::RadioNotAvailable => write!(f, "radio not available"),
            RilErrorCode::GenericFailure => write!(f, "generic failure"),
            RilErrorCode::PasswordIncorrect => write!(f, "password incorrect"),
            RilErrorCode::SimPin2 => write!(f, "SIM PIN2 required"),
            RilErrorCode::SimPuk2 => write!(f, "SIM PUK2 required"),
            RilErrorCode::RequestNotSupported => write!(f, "request not supported"),
            RilErrorCode::Cancelled => write!(f, "cancelled"),
            RilErrorCode::Other(code) => write!(f, "error {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        for raw in [0, 1, 2, 3, 4, 5, 6, 7, 42, -1] {
            let code = RilErrorCode::from(raw);
            assert_eq!(i32::from(code), raw);
        }
        assert!(RilErrorCode::from(0).is_success());
        assert_eq!(RilErrorCode::from(99), RilErrorCode::Other(99));
    }

    #[test]
    fn test_code_display() {
        assert_eq!(RequestCode::DIAL.to_string(), "DIAL(10)");
        assert_eq!(RequestCode(555).name(), "<unknown request>");
        assert_eq!(EventCode::VENDOR_AM.to_string(), "UNSOL_AM(11010)");
    }
}
