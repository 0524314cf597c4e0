//! Engine configuration.
//!
//! Loaded from YAML. Every field is optional; missing values fall back to the
//! LTE-A vendor profile the engine ships with.

use std::path::Path;

use ril_protocol::{EventCode, CELL_INFO_RATE_UNBOUNDED};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Strings per record in the default available-networks response.
pub const DEFAULT_QAN_ELEMENTS: usize = 6;

/// Minimum protocol version that accepts a cell info rate request.
pub const DEFAULT_CELL_INFO_RATE_MIN_VERSION: i32 = 8;

/// Top level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RilConfig {
    /// Instance identifier used in logs and metric labels.
    pub instance_id: String,
    /// Network type restored after the modem connects.
    pub preferred_network_type: i32,
    /// CDMA subscription source restored after the modem connects.
    pub cdma_subscription: i32,
    /// Vendor overrides.
    pub vendor: VendorProfile,
}

impl Default for RilConfig {
    fn default() -> Self {
        Self {
            instance_id: "ril0".to_string(),
            preferred_network_type: 0,
            cdma_subscription: 0,
            vendor: VendorProfile::default(),
        }
    }
}

impl RilConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: RilConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instance_id.is_empty() {
            return Err(ConfigError::Invalid("instance_id is empty".to_string()));
        }
        self.vendor.validate()
    }
}

/// Vendor-specific event codes and tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VendorProfile {
    /// Profile name, used in logs and metric labels.
    pub name: String,
    /// Connection-established event.
    pub ril_connected_event: i32,
    /// Command-string event.
    pub am_event: i32,
    /// Wideband audio capability event.
    pub wb_amr_event: i32,
    /// Handover notice event.
    pub handover_event: i32,
    /// Versions at or above this get an unbounded cell info rate on connect.
    pub cell_info_rate_min_version: i32,
    /// Rate sent in the cell info rate request.
    pub cell_info_rate: i32,
    /// Strings per available-networks record.
    pub qan_elements: usize,
}

impl Default for VendorProfile {
    fn default() -> Self {
        Self {
            name: "kslte".to_string(),
            ril_connected_event: EventCode::RIL_CONNECTED.0,
            am_event: EventCode::VENDOR_AM.0,
            wb_amr_event: EventCode::VENDOR_WB_AMR_STATE.0,
            handover_event: EventCode::VENDOR_RESPONSE_HANDOVER.0,
            cell_info_rate_min_version: DEFAULT_CELL_INFO_RATE_MIN_VERSION,
            cell_info_rate: CELL_INFO_RATE_UNBOUNDED,
            qan_elements: DEFAULT_QAN_ELEMENTS,
        }
    }
}

impl VendorProfile {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.qan_elements < 4 {
            return Err(ConfigError::Invalid(format!(
                "vendor.qan_elements must be at least 4, got {}",
                self.qan_elements
            )));
        }
        let codes = [
            self.ril_connected_event,
            self.am_event,
            self.wb_amr_event,
            self.handover_event,
        ];
        for (i, code) in codes.iter().enumerate() {
            if codes[i + 1..].contains(code) {
                return Err(ConfigError::Invalid(format!(
                    "vendor event code {} is assigned twice",
                    code
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = RilConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, RilConfig::default());
        assert_eq!(config.vendor.am_event, 11010);
        assert_eq!(config.vendor.qan_elements, 6);
        assert_eq!(config.vendor.cell_info_rate, i32::MAX);
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
instance_id: modem1
preferred_network_type: 9
vendor:
  name: custom
  qan_elements: 4
"#;
        let config = RilConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.instance_id, "modem1");
        assert_eq!(config.preferred_network_type, 9);
        assert_eq!(config.cdma_subscription, 0);
        assert_eq!(config.vendor.name, "custom");
        assert_eq!(config.vendor.qan_elements, 4);
        assert_eq!(config.vendor.wb_amr_event, 11017);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = RilConfig::from_yaml_str("bogus: 1");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_small_qan_elements_rejected() {
        let result = RilConfig::from_yaml_str("vendor:\n  qan_elements: 3\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_duplicate_event_codes_rejected() {
        let yaml = "vendor:\n  am_event: 11017\n";
        assert!(matches!(
            RilConfig::from_yaml_str(yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RilConfig::load("/nonexistent/ril.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
