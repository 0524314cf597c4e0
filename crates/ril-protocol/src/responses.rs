//! Record decoders for response and notification bodies.
//!
//! Each decoder expects a [`WireCursor`] positioned at the start of a message
//! body (past the serial/error or event-code header) and reads its fields
//! strictly in declared order. Fields the host does not keep are still
//! consumed so the cursor stays aligned with the wire layout.

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};
use crate::parcel::{WireCursor, INT_SIZE};
use crate::types::*;

/// Smallest possible encoding of a call list entry: 14 integers plus three
/// string length prefixes, with no UUS block.
const CALL_RECORD_MIN_SIZE: usize = 17 * INT_SIZE;

/// A decoded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// No payload.
    Void,
    /// Count-prefixed integer vector.
    Ints(Vec<i32>),
    /// A single string.
    String(Option<String>),
    /// Count-prefixed string vector.
    Strings(Vec<Option<String>>),
    /// Card status.
    CardStatus(CardStatus),
    /// Signal strength.
    SignalStrength(SignalStrength),
    /// Current calls, sorted.
    CallList(Vec<DriverCall>),
    /// Available networks.
    Networks(Vec<NetworkInfo>),
}

impl Response {
    /// Short description used in log lines.
    pub fn summary(&self) -> String {
        match self {
            Response::Void => "void".to_string(),
            Response::Ints(v) => format!("{:?}", v),
            Response::String(s) => format!("{:?}", s),
            Response::Strings(v) => format!("{:?}", v),
            Response::CardStatus(cs) => format!(
                "card_state={:?} apps={}",
                cs.card_state,
                cs.applications.len()
            ),
            Response::SignalStrength(ss) => format!("{:?}", ss),
            Response::CallList(calls) => {
                let items: Vec<String> = calls.iter().map(|c| format!("[{}]", c)).collect();
                format!("{{{}}}", items.join(" "))
            }
            Response::Networks(n) => format!("{} networks", n.len()),
        }
    }
}

/// Observers the call list decoder notifies while it runs.
///
/// The call list decoder is the only decoder with side effects: voice
/// privacy must be reported for every update, not only from the final list,
/// and an emergency test call ending must raise callback mode.
pub trait CallListHooks {
    /// A decoded entry carries the given voice privacy flag.
    fn voice_privacy_changed(&self, enabled: bool);

    /// Clear the emergency test latch, returning whether it was set.
    fn take_emergency_test_latch(&self) -> bool;

    /// An emergency test call ended; enter callback mode.
    fn emergency_callback_mode(&self);
}

/// Hooks that ignore every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallListHooks;

impl CallListHooks for NoCallListHooks {
    fn voice_privacy_changed(&self, _enabled: bool) {}

    fn take_emergency_test_latch(&self) -> bool {
        false
    }

    fn emergency_callback_mode(&self) {}
}

// ============================================================================
// Generic Shapes
// ============================================================================

/// Decode an empty body. Any trailing bytes are left unread.
pub fn decode_void(_cursor: &mut WireCursor<'_>) -> ProtocolResult<()> {
    Ok(())
}

/// Decode a count-prefixed integer vector.
pub fn decode_ints(cursor: &mut WireCursor<'_>) -> ProtocolResult<Vec<i32>> {
    let count = cursor.read_count(INT_SIZE)?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(cursor.read_i32()?);
    }
    Ok(values)
}

/// Decode a single string.
pub fn decode_string(cursor: &mut WireCursor<'_>) -> ProtocolResult<Option<String>> {
    cursor.read_string()
}

/// Decode a count-prefixed string vector.
pub fn decode_strings(cursor: &mut WireCursor<'_>) -> ProtocolResult<Vec<Option<String>>> {
    let count = cursor.read_count(INT_SIZE)?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(cursor.read_string()?);
    }
    Ok(values)
}

// ============================================================================
// Card Status
// ============================================================================

/// Decode a card status report.
///
/// The application count is clamped to [`CARD_MAX_APPS`]; records past the
/// limit are neither read nor reported.
pub fn decode_card_status(cursor: &mut WireCursor<'_>) -> ProtocolResult<CardStatus> {
    let card_state = CardState::from_ril(cursor.read_i32()?)?;
    let universal_pin_state = PinState::from_ril(cursor.read_i32()?)?;
    let subscription_app_indices = SubscriptionAppIndices {
        gsm_umts: cursor.read_i32()?,
        cdma: cursor.read_i32()?,
        ims: cursor.read_i32()?,
    };

    let offset = cursor.position();
    let declared = cursor.read_i32()?;
    if declared < 0 {
        return Err(ProtocolError::InvalidLength {
            offset,
            length: declared,
        });
    }
    let num_apps = (declared as usize).min(CARD_MAX_APPS);
    if num_apps < declared as usize {
        log::debug!(
            "card reports {} applications, keeping {}",
            declared,
            CARD_MAX_APPS
        );
    }

    let mut applications = Vec::with_capacity(num_apps);
    for _ in 0..num_apps {
        applications.push(decode_app_status(cursor)?);
    }

    Ok(CardStatus {
        card_state,
        universal_pin_state,
        subscription_app_indices,
        applications,
    })
}

fn decode_app_status(cursor: &mut WireCursor<'_>) -> ProtocolResult<AppStatus> {
    let app_type = AppType::from_ril(cursor.read_i32()?);
    let app_state = AppState::from_ril(cursor.read_i32()?);
    let perso_substate = PersoSubstate::from_ril(cursor.read_i32()?);
    let aid = cursor.read_string()?;
    let label = cursor.read_string()?;
    let pin1_replaced = cursor.read_i32()?;
    let pin1 = PinState::from_ril(cursor.read_i32()?)?;
    let pin2 = PinState::from_ril(cursor.read_i32()?)?;
    // PIN1, PUK1, PIN2, PUK2 and perso unblock retry counters
    cursor.skip_ints(5)?;

    Ok(AppStatus {
        app_type,
        app_state,
        perso_substate,
        aid,
        label,
        pin1_replaced,
        pin1,
        pin2,
    })
}

// ============================================================================
// Signal Strength
// ============================================================================

/// Decode a twelve-integer signal strength record.
///
/// Indices 0 and 7 keep only their low byte; indices 2 and 4 are reduced
/// modulo 255.
pub fn decode_signal_strength(cursor: &mut WireCursor<'_>) -> ProtocolResult<SignalStrength> {
    let mut raw = [0i32; SIGNAL_STRENGTH_INTS];
    for value in raw.iter_mut() {
        *value = cursor.read_i32()?;
    }

    raw[0] &= 0xff;
    raw[2] %= 0xff;
    raw[4] %= 0xff;
    raw[7] &= 0xff;

    Ok(SignalStrength {
        gsm_signal_strength: raw[0],
        gsm_bit_error_rate: raw[1],
        cdma_dbm: raw[2],
        cdma_ecio: raw[3],
        evdo_dbm: raw[4],
        evdo_ecio: raw[5],
        evdo_snr: raw[6],
        lte_signal_strength: raw[7],
        lte_rsrp: raw[8],
        lte_rsrq: raw[9],
        lte_rssnr: raw[10],
        lte_cqi: raw[11],
        is_gsm: true,
    })
}

// ============================================================================
// Call List
// ============================================================================

/// Decode the current call list.
///
/// `hooks` is told the voice privacy flag of every entry as it is decoded.
/// When the list is empty and the emergency test latch was set, the latch is
/// cleared and callback mode is raised. The returned list is sorted.
pub fn decode_call_list(
    cursor: &mut WireCursor<'_>,
    hooks: &dyn CallListHooks,
) -> ProtocolResult<Vec<DriverCall>> {
    let num = cursor.read_count(CALL_RECORD_MIN_SIZE)?;
    let mut calls = Vec::with_capacity(num);

    for _ in 0..num {
        let call = decode_driver_call(cursor)?;
        let privacy = call.is_voice_privacy;
        calls.push(call);

        hooks.voice_privacy_changed(privacy);
        log::debug!(
            "in-call voice privacy is {}",
            if privacy { "enabled" } else { "disabled" }
        );
    }

    calls.sort();

    if num == 0 && hooks.take_emergency_test_latch() {
        log::debug!("call ended, testing emergency call, entering callback mode");
        hooks.emergency_callback_mode();
    }

    Ok(calls)
}

fn decode_driver_call(cursor: &mut WireCursor<'_>) -> ProtocolResult<DriverCall> {
    let state = CallState::from_clcc(cursor.read_i32()?)?;
    let index = cursor.read_i32()? & 0xff;
    let toa = cursor.read_i32()?;
    let is_multiparty = cursor.read_bool()?;
    let is_mt = cursor.read_bool()?;
    let als = cursor.read_i32()?;
    let is_voice = cursor.read_bool()?;
    // Vendor video flag, call type, call domain and CSV token
    cursor.skip_ints(3)?;
    cursor.skip_string()?;
    let is_voice_privacy = cursor.read_bool()?;
    let number = cursor.read_string()?;
    let number_presentation = Presentation::from_clip(cursor.read_i32()?)?;
    let name = cursor.read_string()?;
    let name_presentation = cursor.read_i32()?;
    let uus_info = decode_uus_info(cursor)?;

    Ok(DriverCall {
        state,
        index,
        toa,
        is_multiparty,
        is_mt,
        als,
        is_voice,
        is_voice_privacy,
        number: number_from_toa(number, toa),
        number_presentation,
        name,
        name_presentation,
        uus_info,
    })
}

fn decode_uus_info(cursor: &mut WireCursor<'_>) -> ProtocolResult<Option<UusInfo>> {
    if cursor.read_i32()? != 1 {
        log::trace!("incoming UUS: not present");
        return Ok(None);
    }

    let uus_type = cursor.read_i32()?;
    let dcs = cursor.read_i32()?;
    let user_data = cursor.read_byte_array()?.unwrap_or_default();
    log::trace!(
        "incoming UUS: type={}, dcs={}, length={}, data={}",
        uus_type,
        dcs,
        user_data.len(),
        hex::encode(&user_data)
    );

    Ok(Some(UusInfo {
        uus_type,
        dcs,
        user_data,
    }))
}

// ============================================================================
// Registration State
// ============================================================================

/// Index of the radio technology field in a registration state response.
const RADIO_TECH_INDEX: usize = 3;

/// Decode a data registration state response and normalize its radio
/// technology field.
pub fn decode_registration_state(
    cursor: &mut WireCursor<'_>,
) -> ProtocolResult<Vec<Option<String>>> {
    let mut fields = decode_strings(cursor)?;
    normalize_radio_tech(&mut fields)?;
    Ok(fields)
}

/// Rewrite field 3 of a registration state response.
///
/// A value of 100 or more has the roaming offset removed. A value that does
/// not parse (including a null field) becomes [`DEFAULT_RADIO_TECH`].
pub fn normalize_radio_tech(fields: &mut [Option<String>]) -> ProtocolResult<()> {
    let len = fields.len();
    let slot = fields.get_mut(RADIO_TECH_INDEX).ok_or_else(|| {
        ProtocolError::Malformed(format!(
            "registration state has {} fields, radio technology is field {}",
            len, RADIO_TECH_INDEX
        ))
    })?;

    let normalized = match slot.as_deref().map(str::parse::<i32>) {
        Some(Ok(tech)) if tech >= RADIO_TECH_ROAMING_OFFSET => {
            (tech - RADIO_TECH_ROAMING_OFFSET).to_string()
        }
        Some(Ok(tech)) => tech.to_string(),
        _ => DEFAULT_RADIO_TECH.to_string(),
    };
    *slot = Some(normalized);
    Ok(())
}

// ============================================================================
// Available Networks
// ============================================================================

/// Decode an available-networks response whose records are
/// `elements_per_network` strings each.
pub fn decode_networks(
    cursor: &mut WireCursor<'_>,
    elements_per_network: usize,
) -> ProtocolResult<Vec<NetworkInfo>> {
    let strings = decode_strings(cursor)?;
    if elements_per_network < 4 || strings.len() % elements_per_network != 0 {
        return Err(ProtocolError::Malformed(format!(
            "{} network strings cannot be split into records of {}",
            strings.len(),
            elements_per_network
        )));
    }

    Ok(strings
        .chunks(elements_per_network)
        .map(|record| NetworkInfo {
            operator_alpha_long: record[0].clone(),
            operator_alpha_short: record[1].clone(),
            operator_numeric: record[2].clone(),
            state: record[3].clone(),
            extra: record[4..].to_vec(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parcel::ParcelWriter;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingHooks {
        privacy: RefCell<Vec<bool>>,
        latch: Cell<bool>,
        ecm_count: Cell<u32>,
    }

    impl CallListHooks for RecordingHooks {
        fn voice_privacy_changed(&self, enabled: bool) {
            self.privacy.borrow_mut().push(enabled);
        }

        fn take_emergency_test_latch(&self) -> bool {
            self.latch.replace(false)
        }

        fn emergency_callback_mode(&self) {
            self.ecm_count.set(self.ecm_count.get() + 1);
        }
    }

    struct CallSpec<'a> {
        state: i32,
        index: i32,
        toa: i32,
        privacy: bool,
        number: &'a str,
        uus: Option<(i32, i32, &'a [u8])>,
    }

    fn write_call(w: &mut ParcelWriter, c: &CallSpec<'_>) {
        w.write_i32(c.state)
            .write_i32(c.index)
            .write_i32(c.toa)
            .write_bool(false) // multiparty
            .write_bool(true) // mt
            .write_i32(0) // als
            .write_bool(true) // voice
            .write_i32(1) // video (vendor)
            .write_i32(9) // call type (vendor)
            .write_i32(3) // call domain (vendor)
            .write_str("csv-token")
            .write_bool(c.privacy)
            .write_str(c.number)
            .write_i32(0) // presentation allowed
            .write_str("Alice")
            .write_i32(2);
        match c.uus {
            Some((t, dcs, data)) => {
                w.write_i32(1).write_i32(t).write_i32(dcs).write_byte_array(Some(data));
            }
            None => {
                w.write_i32(0);
            }
        }
    }

    fn write_app(w: &mut ParcelWriter, app_type: i32, aid: &str) {
        w.write_i32(app_type)
            .write_i32(5) // ready
            .write_i32(2) // perso ready
            .write_str(aid)
            .write_str("label")
            .write_i32(0)
            .write_i32(2) // pin1 verified
            .write_i32(3); // pin2 disabled
        for retries in [3, 10, 3, 10, 5] {
            w.write_i32(retries);
        }
    }

    fn card_status_header(w: &mut ParcelWriter, num_apps: i32) {
        w.write_i32(1).write_i32(0).write_i32(0).write_i32(-1).write_i32(1);
        w.write_i32(num_apps);
    }

    #[test]
    fn test_card_status_fields() {
        let mut w = ParcelWriter::new();
        card_status_header(&mut w, 2);
        write_app(&mut w, 2, "a0000000871002");
        write_app(&mut w, 5, "a0000000871004");
        let data = w.into_vec();

        let mut c = WireCursor::new(&data);
        let status = decode_card_status(&mut c).unwrap();
        assert!(!c.has_remaining());
        assert_eq!(status.card_state, CardState::Present);
        assert_eq!(status.universal_pin_state, PinState::Unknown);
        assert_eq!(
            status.subscription_app_indices,
            SubscriptionAppIndices {
                gsm_umts: 0,
                cdma: -1,
                ims: 1
            }
        );
        assert_eq!(status.applications.len(), 2);
        let usim = &status.applications[0];
        assert_eq!(usim.app_type, AppType::Usim);
        assert_eq!(usim.app_state, AppState::Ready);
        assert_eq!(usim.perso_substate, PersoSubstate::Ready);
        assert_eq!(usim.aid.as_deref(), Some("a0000000871002"));
        assert_eq!(usim.label.as_deref(), Some("label"));
        assert_eq!(usim.pin1, PinState::EnabledVerified);
        assert_eq!(usim.pin2, PinState::Disabled);
        assert_eq!(status.applications[1].app_type, AppType::Isim);
    }

    #[test]
    fn test_card_status_clamps_applications() {
        let mut w = ParcelWriter::new();
        card_status_header(&mut w, 11);
        for _ in 0..11 {
            write_app(&mut w, 1, "aid");
        }
        let data = w.into_vec();
        let per_app = {
            let mut one = ParcelWriter::new();
            write_app(&mut one, 1, "aid");
            one.len()
        };

        let mut c = WireCursor::new(&data);
        let status = decode_card_status(&mut c).unwrap();
        assert_eq!(status.applications.len(), CARD_MAX_APPS);
        // Exactly the clamped number of records was consumed.
        assert_eq!(c.remaining(), 3 * per_app);
    }

    #[test]
    fn test_card_status_negative_count() {
        let mut w = ParcelWriter::new();
        card_status_header(&mut w, -2);
        let data = w.into_vec();
        let mut c = WireCursor::new(&data);
        assert!(matches!(
            decode_card_status(&mut c),
            Err(ProtocolError::InvalidLength { length: -2, .. })
        ));
    }

    #[test]
    fn test_card_status_truncated_app() {
        let mut w = ParcelWriter::new();
        card_status_header(&mut w, 1);
        w.write_i32(1).write_i32(5);
        let data = w.into_vec();
        let mut c = WireCursor::new(&data);
        assert!(matches!(
            decode_card_status(&mut c),
            Err(ProtocolError::Underrun { .. })
        ));
    }

    #[test]
    fn test_signal_strength_masking() {
        let raw = [0x1_23, 99, 600, -90, -256, -100, 8, 0x7_1f, -95, -8, 120, 15];
        let mut w = ParcelWriter::new();
        for v in raw {
            w.write_i32(v);
        }
        let data = w.into_vec();

        let ss = decode_signal_strength(&mut WireCursor::new(&data)).unwrap();
        assert_eq!(ss.gsm_signal_strength, 0x23);
        assert_eq!(ss.gsm_bit_error_rate, 99);
        assert_eq!(ss.cdma_dbm, 600 % 255);
        assert_eq!(ss.cdma_ecio, -90);
        assert_eq!(ss.evdo_dbm, -256 % 255);
        assert_eq!(ss.lte_signal_strength, 0x1f);
        assert_eq!(ss.lte_rsrp, -95);
        assert_eq!(ss.lte_cqi, 15);
        assert!(ss.is_gsm);

        for (input, output) in [(raw[0], ss.gsm_signal_strength), (raw[7], ss.lte_signal_strength)] {
            assert_eq!(input.rem_euclid(256), output.rem_euclid(256));
        }
        for (input, output) in [(raw[2], ss.cdma_dbm), (raw[4], ss.evdo_dbm)] {
            assert_eq!(input.rem_euclid(255), output.rem_euclid(255));
        }
    }

    #[test]
    fn test_signal_strength_short_buffer() {
        let mut w = ParcelWriter::new();
        for v in 0..11 {
            w.write_i32(v);
        }
        let data = w.into_vec();
        assert!(decode_signal_strength(&mut WireCursor::new(&data)).is_err());
    }

    #[test]
    fn test_call_list_sorted_and_normalized() {
        let mut w = ParcelWriter::new();
        w.write_i32(3);
        write_call(
            &mut w,
            &CallSpec { state: 4, index: 3, toa: 129, privacy: false, number: "5550003", uus: None },
        );
        write_call(
            &mut w,
            &CallSpec { state: 0, index: 0x102, toa: TOA_INTERNATIONAL, privacy: true, number: "15550002", uus: None },
        );
        write_call(
            &mut w,
            &CallSpec { state: 1, index: 1, toa: 129, privacy: false, number: "5550001", uus: None },
        );
        let data = w.into_vec();

        let hooks = RecordingHooks::default();
        let mut c = WireCursor::new(&data);
        let calls = decode_call_list(&mut c, &hooks).unwrap();
        assert!(!c.has_remaining());

        let states: Vec<CallState> = calls.iter().map(|c| c.state).collect();
        assert_eq!(states, vec![CallState::Active, CallState::Holding, CallState::Incoming]);
        assert_eq!(calls[0].index, 2);
        assert_eq!(calls[0].number.as_deref(), Some("+15550002"));
        assert_eq!(calls[0].name.as_deref(), Some("Alice"));
        assert_eq!(calls[0].name_presentation, 2);
        assert_eq!(calls[0].number_presentation, Presentation::Allowed);
        assert!(calls[0].is_mt && calls[0].is_voice && !calls[0].is_multiparty);
        assert_eq!(calls[1].number.as_deref(), Some("5550001"));

        // Notified per entry, in wire order.
        assert_eq!(*hooks.privacy.borrow(), vec![false, true, false]);
        assert_eq!(hooks.ecm_count.get(), 0);
    }

    #[test]
    fn test_call_list_sort_is_permutation_independent() {
        let specs = [
            CallSpec { state: 5, index: 4, toa: 129, privacy: false, number: "4", uus: None },
            CallSpec { state: 0, index: 2, toa: 129, privacy: false, number: "2", uus: None },
            CallSpec { state: 0, index: 1, toa: 129, privacy: false, number: "1", uus: None },
            CallSpec { state: 2, index: 3, toa: 129, privacy: false, number: "3", uus: None },
        ];
        let orders: [[usize; 4]; 3] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1]];

        let mut results = Vec::new();
        for order in orders {
            let mut w = ParcelWriter::new();
            w.write_i32(4);
            for i in order {
                write_call(&mut w, &specs[i]);
            }
            let data = w.into_vec();
            let calls = decode_call_list(&mut WireCursor::new(&data), &NoCallListHooks).unwrap();
            assert!(calls.windows(2).all(|pair| pair[0] <= pair[1]));
            results.push(calls);
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
        let indices: Vec<i32> = results[0].iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_call_list_uus_presence() {
        let mut w = ParcelWriter::new();
        w.write_i32(2);
        write_call(
            &mut w,
            &CallSpec { state: 0, index: 1, toa: 129, privacy: false, number: "1", uus: None },
        );
        write_call(
            &mut w,
            &CallSpec { state: 0, index: 2, toa: 129, privacy: false, number: "2", uus: Some((3, 1, b"hi\x00")) },
        );
        let data = w.into_vec();

        let calls = decode_call_list(&mut WireCursor::new(&data), &NoCallListHooks).unwrap();
        assert_eq!(calls[0].uus_info, None);
        assert_eq!(
            calls[1].uus_info,
            Some(UusInfo {
                uus_type: 3,
                dcs: 1,
                user_data: b"hi\x00".to_vec()
            })
        );
    }

    #[test]
    fn test_empty_call_list_fires_emergency_callback_once() {
        let mut w = ParcelWriter::new();
        w.write_i32(0);
        let data = w.into_vec();

        let hooks = RecordingHooks::default();
        hooks.latch.set(true);
        let calls = decode_call_list(&mut WireCursor::new(&data), &hooks).unwrap();
        assert!(calls.is_empty());
        assert_eq!(hooks.ecm_count.get(), 1);
        assert!(!hooks.latch.get());

        decode_call_list(&mut WireCursor::new(&data), &hooks).unwrap();
        assert_eq!(hooks.ecm_count.get(), 1);
    }

    #[test]
    fn test_non_empty_call_list_keeps_latch() {
        let mut w = ParcelWriter::new();
        w.write_i32(1);
        write_call(
            &mut w,
            &CallSpec { state: 0, index: 1, toa: 129, privacy: false, number: "1", uus: None },
        );
        let data = w.into_vec();

        let hooks = RecordingHooks::default();
        hooks.latch.set(true);
        decode_call_list(&mut WireCursor::new(&data), &hooks).unwrap();
        assert!(hooks.latch.get());
        assert_eq!(hooks.ecm_count.get(), 0);
    }

    #[test]
    fn test_call_list_invalid_state() {
        let mut w = ParcelWriter::new();
        w.write_i32(1);
        write_call(
            &mut w,
            &CallSpec { state: 9, index: 1, toa: 129, privacy: false, number: "1", uus: None },
        );
        let data = w.into_vec();
        assert_eq!(
            decode_call_list(&mut WireCursor::new(&data), &NoCallListHooks),
            Err(ProtocolError::InvalidDiscriminant {
                field: "call state",
                value: 9
            })
        );
    }

    fn registration(tech: Option<&str>) -> Vec<u8> {
        let mut w = ParcelWriter::new();
        w.write_strings(&[Some("1"), Some("00a1"), Some("0001b2c3"), tech, Some("extra")]);
        w.into_vec()
    }

    #[test]
    fn test_registration_state_normalization() {
        let cases = [
            (Some("150"), "50"),
            (Some("100"), "0"),
            (Some("40"), "40"),
            (Some("LTE"), "2"),
            (None, "2"),
        ];
        for (input, expected) in cases {
            let data = registration(input);
            let fields = decode_registration_state(&mut WireCursor::new(&data)).unwrap();
            assert_eq!(fields[3].as_deref(), Some(expected), "input {:?}", input);
            assert_eq!(fields[4].as_deref(), Some("extra"));
        }
    }

    #[test]
    fn test_registration_state_too_short() {
        let mut w = ParcelWriter::new();
        w.write_strings(&[Some("1"), Some("2")]);
        let data = w.into_vec();
        assert!(matches!(
            decode_registration_state(&mut WireCursor::new(&data)),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_networks_grouping() {
        let mut w = ParcelWriter::new();
        w.write_strings(&[
            Some("Carrier One"), Some("C1"), Some("310260"), Some("available"), Some("14"), None,
            Some("Carrier Two"), Some("C2"), Some("310410"), Some("forbidden"), Some("3"), None,
        ]);
        let data = w.into_vec();

        let networks = decode_networks(&mut WireCursor::new(&data), 6).unwrap();
        assert_eq!(networks.len(), 2);
        assert_eq!(networks[1].operator_numeric.as_deref(), Some("310410"));
        assert_eq!(networks[1].state.as_deref(), Some("forbidden"));
        assert_eq!(networks[0].extra, vec![Some("14".to_string()), None]);

        assert!(decode_networks(&mut WireCursor::new(&data), 5).is_err());
    }

    #[test]
    fn test_ints_count_beyond_buffer() {
        let mut w = ParcelWriter::new();
        w.write_i32(1_000_000).write_i32(1);
        let data = w.into_vec();
        assert!(matches!(
            decode_ints(&mut WireCursor::new(&data)),
            Err(ProtocolError::InvalidLength { .. })
        ));
    }
}
