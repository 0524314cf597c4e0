//! Domain records produced by the decoders.

use std::fmt;

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};

// ============================================================================
// Card Status
// ============================================================================

/// Physical state of the card slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardState {
    /// No card inserted.
    Absent,
    /// Card present.
    Present,
    /// Card present but unreadable.
    Error,
    /// Card present but access is restricted.
    Restricted,
}

impl CardState {
    /// Map the wire value. Unknown values are a decode failure.
    pub fn from_ril(value: i32) -> ProtocolResult<Self> {
        match value {
            0 => Ok(CardState::Absent),
            1 => Ok(CardState::Present),
            2 => Ok(CardState::Error),
            3 => Ok(CardState::Restricted),
            _ => Err(ProtocolError::InvalidDiscriminant {
                field: "card state",
                value,
            }),
        }
    }
}

/// PIN verification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinState {
    /// State not known.
    Unknown,
    /// PIN enabled, not yet entered.
    EnabledNotVerified,
    /// PIN enabled and entered.
    EnabledVerified,
    /// PIN disabled.
    Disabled,
    /// PIN blocked; PUK required.
    EnabledBlocked,
    /// PUK blocked.
    EnabledPermBlocked,
}

impl PinState {
    /// Map the wire value. Unknown values are a decode failure.
    pub fn from_ril(value: i32) -> ProtocolResult<Self> {
        match value {
            0 => Ok(PinState::Unknown),
            1 => Ok(PinState::EnabledNotVerified),
            2 => Ok(PinState::EnabledVerified),
            3 => Ok(PinState::Disabled),
            4 => Ok(PinState::EnabledBlocked),
            5 => Ok(PinState::EnabledPermBlocked),
            _ => Err(ProtocolError::InvalidDiscriminant {
                field: "pin state",
                value,
            }),
        }
    }
}

/// Kind of card application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppType {
    /// Unknown application.
    Unknown,
    /// GSM SIM.
    Sim,
    /// UMTS USIM.
    Usim,
    /// CDMA RUIM.
    Ruim,
    /// CDMA CSIM.
    Csim,
    /// IMS ISIM.
    Isim,
}

impl AppType {
    /// Map the wire value. Unknown values degrade to [`AppType::Unknown`].
    pub fn from_ril(value: i32) -> Self {
        match value {
            0 => AppType::Unknown,
            1 => AppType::Sim,
            2 => AppType::Usim,
            3 => AppType::Ruim,
            4 => AppType::Csim,
            5 => AppType::Isim,
            _ => {
                log::warn!("unrecognized app type {}", value);
                AppType::Unknown
            }
        }
    }
}

/// Lifecycle state of a card application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppState {
    /// State not known.
    Unknown,
    /// Application detected, not yet usable.
    Detected,
    /// Waiting for PIN.
    Pin,
    /// Waiting for PUK.
    Puk,
    /// Waiting for a personalization code.
    SubscriptionPerso,
    /// Ready for use.
    Ready,
}

impl AppState {
    /// Map the wire value. Unknown values degrade to [`AppState::Unknown`].
    pub fn from_ril(value: i32) -> Self {
        match value {
            0 => AppState::Unknown,
            1 => AppState::Detected,
            2 => AppState::Pin,
            3 => AppState::Puk,
            4 => AppState::SubscriptionPerso,
            5 => AppState::Ready,
            _ => {
                log::warn!("unrecognized app state {}", value);
                AppState::Unknown
            }
        }
    }
}

/// Personalization (network lock) substate of an application.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersoSubstate {
    Unknown,
    InProgress,
    Ready,
    SimNetwork,
    SimNetworkSubset,
    SimCorporate,
    SimServiceProvider,
    SimSim,
    SimNetworkPuk,
    SimNetworkSubsetPuk,
    SimCorporatePuk,
    SimServiceProviderPuk,
    SimSimPuk,
    RuimNetwork1,
    RuimNetwork2,
    RuimHrpd,
    RuimCorporate,
    RuimServiceProvider,
    RuimRuim,
    RuimNetwork1Puk,
    RuimNetwork2Puk,
    RuimHrpdPuk,
    RuimCorporatePuk,
    RuimServiceProviderPuk,
    RuimRuimPuk,
}

/// Wire value `n` maps to entry `n`.
const PERSO_SUBSTATES: [PersoSubstate; 25] = [
    PersoSubstate::Unknown,
    PersoSubstate::InProgress,
    PersoSubstate::Ready,
    PersoSubstate::SimNetwork,
    PersoSubstate::SimNetworkSubset,
    PersoSubstate::SimCorporate,
    PersoSubstate::SimServiceProvider,
    PersoSubstate::SimSim,
    PersoSubstate::SimNetworkPuk,
    PersoSubstate::SimNetworkSubsetPuk,
    PersoSubstate::SimCorporatePuk,
    PersoSubstate::SimServiceProviderPuk,
    PersoSubstate::SimSimPuk,
    PersoSubstate::RuimNetwork1,
    PersoSubstate::RuimNetwork2,
    PersoSubstate::RuimHrpd,
    PersoSubstate::RuimCorporate,
    PersoSubstate::RuimServiceProvider,
    PersoSubstate::RuimRuim,
    PersoSubstate::RuimNetwork1Puk,
    PersoSubstate::RuimNetwork2Puk,
    PersoSubstate::RuimHrpdPuk,
    PersoSubstate::RuimCorporatePuk,
    PersoSubstate::RuimServiceProviderPuk,
    PersoSubstate::RuimRuimPuk,
];

impl PersoSubstate {
    /// Map the wire value. Unknown values degrade to [`PersoSubstate::Unknown`].
    pub fn from_ril(value: i32) -> Self {
        match usize::try_from(value).ok().and_then(|i| PERSO_SUBSTATES.get(i)) {
            Some(substate) => *substate,
            None => {
                log::warn!("unrecognized perso substate {}", value);
                PersoSubstate::Unknown
            }
        }
    }
}

/// One application on the card.
///
/// The wire record also carries five retry counters (PIN1, PUK1, PIN2, PUK2,
/// perso unblock). They are consumed by the decoder and not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStatus {
    /// Application type.
    pub app_type: AppType,
    /// Application state.
    pub app_state: AppState,
    /// Personalization substate.
    pub perso_substate: PersoSubstate,
    /// Application identifier.
    pub aid: Option<String>,
    /// Application label.
    pub label: Option<String>,
    /// Non-zero if the universal PIN replaces PIN1.
    pub pin1_replaced: i32,
    /// PIN1 state.
    pub pin1: PinState,
    /// PIN2 state.
    pub pin2: PinState,
}

/// Application indices for each subscription type (`-1` when none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubscriptionAppIndices {
    /// GSM/UMTS subscription application index.
    pub gsm_umts: i32,
    /// CDMA subscription application index.
    pub cdma: i32,
    /// IMS subscription application index.
    pub ims: i32,
}

/// Card status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardStatus {
    /// Slot state.
    pub card_state: CardState,
    /// Universal PIN state.
    pub universal_pin_state: PinState,
    /// Subscription application indices.
    pub subscription_app_indices: SubscriptionAppIndices,
    /// Applications, at most [`CARD_MAX_APPS`].
    pub applications: Vec<AppStatus>,
}

// ============================================================================
// Signal Strength
// ============================================================================

/// Signal strength measurement across radio technologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalStrength {
    /// GSM signal strength (0-31, 99), low byte only.
    pub gsm_signal_strength: i32,
    /// GSM bit error rate.
    pub gsm_bit_error_rate: i32,
    /// CDMA RSSI in dBm, reduced modulo 255.
    pub cdma_dbm: i32,
    /// CDMA Ec/Io.
    pub cdma_ecio: i32,
    /// EVDO RSSI in dBm, reduced modulo 255.
    pub evdo_dbm: i32,
    /// EVDO Ec/Io.
    pub evdo_ecio: i32,
    /// EVDO signal-to-noise ratio.
    pub evdo_snr: i32,
    /// LTE signal strength, low byte only.
    pub lte_signal_strength: i32,
    /// LTE RSRP.
    pub lte_rsrp: i32,
    /// LTE RSRQ.
    pub lte_rsrq: i32,
    /// LTE RS-SNR.
    pub lte_rssnr: i32,
    /// LTE CQI.
    pub lte_cqi: i32,
    /// Marks a GSM/LTE-capable measurement.
    pub is_gsm: bool,
}

// ============================================================================
// Calls
// ============================================================================

/// State of a call as reported by the modem.
///
/// Variant order is the sort order of the call list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallState {
    /// Connected.
    Active,
    /// On hold.
    Holding,
    /// Outgoing, not yet ringing.
    Dialing,
    /// Outgoing, remote ringing.
    Alerting,
    /// Incoming, ringing.
    Incoming,
    /// Incoming while another call is active.
    Waiting,
}

impl CallState {
    /// Map a CLCC state value. Unknown values are a decode failure.
    pub fn from_clcc(value: i32) -> ProtocolResult<Self> {
        match value {
            0 => Ok(CallState::Active),
            1 => Ok(CallState::Holding),
            2 => Ok(CallState::Dialing),
            3 => Ok(CallState::Alerting),
            4 => Ok(CallState::Incoming),
            5 => Ok(CallState::Waiting),
            _ => Err(ProtocolError::InvalidDiscriminant {
                field: "call state",
                value,
            }),
        }
    }
}

/// Caller-id presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Presentation {
    /// Number may be shown.
    Allowed,
    /// Caller withheld the number.
    Restricted,
    /// Number not available.
    Unknown,
    /// Payphone.
    Payphone,
}

impl Presentation {
    /// Map a CLIP presentation value. Unknown values are a decode failure.
    pub fn from_clip(value: i32) -> ProtocolResult<Self> {
        match value {
            0 => Ok(Presentation::Allowed),
            1 => Ok(Presentation::Restricted),
            2 => Ok(Presentation::Unknown),
            3 => Ok(Presentation::Payphone),
            _ => Err(ProtocolError::InvalidDiscriminant {
                field: "presentation",
                value,
            }),
        }
    }
}

/// User-to-User Signaling block attached to a call.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UusInfo {
    /// UUS type.
    pub uus_type: i32,
    /// Data coding scheme.
    pub dcs: i32,
    /// Raw user data.
    pub user_data: Vec<u8>,
}

/// One entry of the current call list.
///
/// Field order defines the derived total order: state first, then index,
/// then every remaining field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverCall {
    /// Call state.
    pub state: CallState,
    /// Call index, low byte only.
    pub index: i32,
    /// Type of address.
    pub toa: i32,
    /// Part of a conference.
    pub is_multiparty: bool,
    /// Mobile terminated (incoming).
    pub is_mt: bool,
    /// Line id (ALS).
    pub als: i32,
    /// Voice rather than data.
    pub is_voice: bool,
    /// Voice privacy active.
    pub is_voice_privacy: bool,
    /// Remote number, `+`-prefixed when international.
    pub number: Option<String>,
    /// Number presentation.
    pub number_presentation: Presentation,
    /// Remote name.
    pub name: Option<String>,
    /// Raw name presentation value.
    pub name_presentation: i32,
    /// Optional UUS block.
    pub uus_info: Option<UusInfo>,
}

impl fmt::Display for DriverCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={},{:?},toa={},{},{},{}",
            self.index,
            self.state,
            self.toa,
            if self.is_multiparty { "conf" } else { "norm" },
            if self.is_mt { "mt" } else { "mo" },
            if self.is_voice { "voc" } else { "nonvoc" },
        )
    }
}

/// Reapply the leading `+` to an international number.
pub fn number_from_toa(number: Option<String>, toa: i32) -> Option<String> {
    match number {
        Some(n) if toa == TOA_INTERNATIONAL && !n.is_empty() && !n.starts_with('+') => {
            Some(format!("+{}", n))
        }
        other => other,
    }
}

// ============================================================================
// Networks
// ============================================================================

/// One record of an available-networks scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkInfo {
    /// Long alphanumeric operator name.
    pub operator_alpha_long: Option<String>,
    /// Short alphanumeric operator name.
    pub operator_alpha_short: Option<String>,
    /// Numeric operator id (MCC+MNC).
    pub operator_numeric: Option<String>,
    /// Availability state string.
    pub state: Option<String>,
    /// Vendor fields past the standard four.
    pub extra: Vec<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_tables_reject_unknown() {
        assert!(CardState::from_ril(4).is_err());
        assert!(PinState::from_ril(6).is_err());
        assert!(CallState::from_clcc(-1).is_err());
        assert!(Presentation::from_clip(4).is_err());
    }

    #[test]
    fn test_lenient_tables_degrade() {
        assert_eq!(AppType::from_ril(9), AppType::Unknown);
        assert_eq!(AppState::from_ril(-3), AppState::Unknown);
        assert_eq!(PersoSubstate::from_ril(24), PersoSubstate::RuimRuimPuk);
        assert_eq!(PersoSubstate::from_ril(25), PersoSubstate::Unknown);
    }

    #[test]
    fn test_number_from_toa() {
        assert_eq!(
            number_from_toa(Some("15551234".into()), TOA_INTERNATIONAL).as_deref(),
            Some("+15551234")
        );
        assert_eq!(
            number_from_toa(Some("+15551234".into()), TOA_INTERNATIONAL).as_deref(),
            Some("+15551234")
        );
        assert_eq!(
            number_from_toa(Some("5551234".into()), 129).as_deref(),
            Some("5551234")
        );
        assert_eq!(number_from_toa(Some(String::new()), TOA_INTERNATIONAL).as_deref(), Some(""));
        assert_eq!(number_from_toa(None, TOA_INTERNATIONAL), None);
    }
}
