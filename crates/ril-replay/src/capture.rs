//! Capture file parsing.
//!
//! One entry per line:
//!
//! ```text
//! # comment
//! < GET_SIM_STATUS              request to submit
//! < HANGUP 1                    request with an argument
//! > 00000000 01000000 00000000  inbound buffer, hex, response-type prefixed
//! ```
//!
//! Whitespace inside hex is ignored.

use ril_protocol::Request;
use thiserror::Error;

/// Capture parse failures.
#[derive(Debug, Error, PartialEq)]
pub enum CaptureError {
    /// Line does not start with `<`, `>` or `#`.
    #[error("line {line}: expected '<', '>' or '#'")]
    UnknownDirection {
        /// 1-based line number.
        line: usize,
    },

    /// Request name not known.
    #[error("line {line}: unknown request `{name}`")]
    UnknownRequest {
        /// 1-based line number.
        line: usize,
        /// The name as written.
        name: String,
    },

    /// Request argument missing or invalid.
    #[error("line {line}: {message}")]
    BadArgument {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// Hex payload did not decode.
    #[error("line {line}: invalid hex: {source}")]
    Hex {
        /// 1-based line number.
        line: usize,
        /// Decoder error.
        source: hex::FromHexError,
    },
}

/// One capture entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEntry {
    /// Submit a request.
    Send(Request),
    /// Hand a buffer to the engine.
    Inbound(Vec<u8>),
}

/// Parse a whole capture, skipping blank lines and comments.
pub fn parse_capture(text: &str) -> Result<Vec<(usize, CaptureEntry)>, CaptureError> {
    let mut entries = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        entries.push((line, parse_line(line, trimmed)?));
    }
    Ok(entries)
}

fn parse_line(line: usize, text: &str) -> Result<CaptureEntry, CaptureError> {
    if let Some(rest) = text.strip_prefix('<') {
        return parse_request(line, rest.trim()).map(CaptureEntry::Send);
    }
    if let Some(rest) = text.strip_prefix('>') {
        let digits: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
        return hex::decode(digits)
            .map(CaptureEntry::Inbound)
            .map_err(|source| CaptureError::Hex { line, source });
    }
    Err(CaptureError::UnknownDirection { line })
}

fn parse_request(line: usize, text: &str) -> Result<Request, CaptureError> {
    let mut parts = text.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let int_arg = |idx: usize| -> Result<i32, CaptureError> {
        let arg = args.get(idx).ok_or_else(|| CaptureError::BadArgument {
            line,
            message: format!("{} needs argument {}", name, idx + 1),
        })?;
        arg.parse().map_err(|_| CaptureError::BadArgument {
            line,
            message: format!("`{}` is not an integer", arg),
        })
    };
    let str_arg = |idx: usize| -> Result<String, CaptureError> {
        args.get(idx)
            .map(|s| s.to_string())
            .ok_or_else(|| CaptureError::BadArgument {
                line,
                message: format!("{} needs an address", name),
            })
    };

    let request = match name.to_ascii_uppercase().as_str() {
        "GET_SIM_STATUS" => Request::GetSimStatus,
        "GET_CURRENT_CALLS" => Request::GetCurrentCalls,
        "DIAL" => Request::Dial {
            address: str_arg(0)?,
            clir_mode: if args.len() > 1 { int_arg(1)? } else { 0 },
            uus: None,
        },
        "DIAL_EMERGENCY" => Request::DialEmergency {
            address: str_arg(0)?,
            clir_mode: if args.len() > 1 { int_arg(1)? } else { 0 },
        },
        "HANGUP" => Request::Hangup { index: int_arg(0)? },
        "SIGNAL_STRENGTH" => Request::SignalStrength,
        "VOICE_REGISTRATION_STATE" => Request::VoiceRegistrationState,
        "DATA_REGISTRATION_STATE" => Request::DataRegistrationState,
        "OPERATOR" => Request::Operator,
        "RADIO_POWER" => Request::RadioPower {
            on: int_arg(0)? != 0,
        },
        "QUERY_AVAILABLE_NETWORKS" => Request::QueryAvailableNetworks,
        "SET_PREFERRED_NETWORK_TYPE" => Request::SetPreferredNetworkType {
            network_type: int_arg(0)?,
        },
        "CDMA_SET_SUBSCRIPTION_SOURCE" => Request::CdmaSetSubscriptionSource {
            source: int_arg(0)?,
        },
        "SET_UNSOL_CELL_INFO_LIST_RATE" => Request::SetUnsolCellInfoListRate {
            rate_ms: int_arg(0)?,
        },
        _ => {
            return Err(CaptureError::UnknownRequest {
                line,
                name: name.to_string(),
            })
        }
    };
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capture() {
        let text = "\
# boot
< GET_SIM_STATUS
< hangup 2

> 01000000 E9030000
";
        let entries = parse_capture(text).unwrap();
        assert_eq!(
            entries,
            vec![
                (2, CaptureEntry::Send(Request::GetSimStatus)),
                (3, CaptureEntry::Send(Request::Hangup { index: 2 })),
                (5, CaptureEntry::Inbound(vec![1, 0, 0, 0, 0xe9, 3, 0, 0])),
            ]
        );
    }

    #[test]
    fn test_dial_arguments() {
        let entries = parse_capture("< DIAL 5551234 1\n< DIAL_EMERGENCY 911").unwrap();
        assert_eq!(
            entries[0].1,
            CaptureEntry::Send(Request::Dial {
                address: "5551234".to_string(),
                clir_mode: 1,
                uus: None,
            })
        );
        assert_eq!(
            entries[1].1,
            CaptureEntry::Send(Request::DialEmergency {
                address: "911".to_string(),
                clir_mode: 0,
            })
        );
    }

    #[test]
    fn test_demo_capture_parses() {
        let entries = parse_capture(include_str!("../../../demos/boot.cap")).unwrap();
        let sends = entries
            .iter()
            .filter(|(_, e)| matches!(e, CaptureEntry::Send(_)))
            .count();
        assert_eq!(sends, 3);
        assert_eq!(entries.len(), 12);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse_capture("# ok\n< REBOOT").unwrap_err(),
            CaptureError::UnknownRequest {
                line: 2,
                name: "REBOOT".to_string()
            }
        );
        assert!(matches!(
            parse_capture("< HANGUP x").unwrap_err(),
            CaptureError::BadArgument { line: 1, .. }
        ));
        assert!(matches!(
            parse_capture("> 0g").unwrap_err(),
            CaptureError::Hex { line: 1, .. }
        ));
        assert_eq!(
            parse_capture("= 00").unwrap_err(),
            CaptureError::UnknownDirection { line: 1 }
        );
    }
}
