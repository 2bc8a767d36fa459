//! Detection thresholds, the eligibility allow-list and the band plan.
//!
//! Every field has a default reproducing the survey's fixed constants, so a
//! JSON override only needs to name what it changes:
//!
//! ```json
//! { "gsm": { "min_separation_db": 10.0 } }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::tables::ReferenceTables;

/// Which traces are worth scanning at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// Required "Trace Mode" value.
    pub trace_mode: String,
    /// Sweep centre frequencies (Hz) matching a known band plan.
    pub center_frequencies_hz: Vec<u64>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        EligibilityConfig {
            trace_mode: "Max Hold".to_string(),
            center_frequencies_hz: vec![
                806_000_000,
                939_000_000,
                1_842_500_000,
                2_140_000_000,
                2_655_000_000,
                3_500_000_000,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LteConfig {
    /// Share of each half-channel that is averaged; skips the roll-off shoulders.
    pub focus_factor: f64,
    /// Required mean level above the noise floor, dB.
    pub min_average_separation_db: f64,
    /// Level above the noise floor for a record to count as occupied, dB.
    pub min_record_separation_db: f64,
    /// Occupied records needed, as a fraction of the channel width in records.
    pub coverage_ratio: f64,
}

impl Default for LteConfig {
    fn default() -> Self {
        LteConfig {
            focus_factor: 0.9,
            min_average_separation_db: 3.0,
            min_record_separation_db: 2.0,
            coverage_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GsmConfig {
    pub channel_width_mhz: f64,
    /// Multiplier on the half-channel when blanking a peak, to take the sidelobes too.
    pub smear_factor: f64,
    pub min_separation_db: f64,
}

impl Default for GsmConfig {
    fn default() -> Self {
        GsmConfig {
            channel_width_mhz: 0.2,
            smear_factor: 10.0,
            min_separation_db: 6.0,
        }
    }
}

/// Everything the detectors read. Passed explicitly, never global.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub eligibility: EligibilityConfig,
    pub lte: LteConfig,
    pub gsm: GsmConfig,
    pub tables: ReferenceTables,
}

impl DetectionConfig {
    /// Load a JSON override file; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: DetectionConfig =
            serde_json::from_str(r#"{ "gsm": { "min_separation_db": 10.0 } }"#).unwrap();
        assert_eq!(config.gsm.min_separation_db, 10.0);
        assert_eq!(config.gsm.smear_factor, 10.0);
        assert_eq!(config.lte, LteConfig::default());
        assert_eq!(config.tables, ReferenceTables::default());
    }

    #[test]
    fn test_substituted_tables() {
        let json = r#"{
            "tables": {
                "band_classes": [
                    { "carrier": "Test", "bandwidth_mhz": 5.0, "center_frequencies_mhz": [100.0] }
                ]
            }
        }"#;
        let config: DetectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.tables.band_classes.len(), 1);
        assert_eq!(config.tables.gsm_sub_bands.len(), 6);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "eligibility": { "trace_mode": "Average" } }"#).unwrap();

        let config = DetectionConfig::load(&path).unwrap();
        assert_eq!(config.eligibility.trace_mode, "Average");
        assert_eq!(config.eligibility.center_frequencies_hz.len(), 6);
    }
}
