use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reference data: where each carrier transmits
// ---------------------------------------------------------------------------

pub const TELEKOM: &str = "Telekom";
pub const VODAFONE: &str = "Vodafone";
pub const TELEFONICA: &str = "Telefonica";

/// A carrier's LTE channels of one bandwidth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandClass {
    pub carrier: String,
    pub bandwidth_mhz: f64,
    /// Downlink centre frequencies, scanned in this order.
    pub center_frequencies_mhz: Vec<f64>,
}

impl BandClass {
    pub fn new(carrier: &str, bandwidth_mhz: f64, center_frequencies_mhz: &[f64]) -> Self {
        BandClass {
            carrier: carrier.to_string(),
            bandwidth_mhz,
            center_frequencies_mhz: center_frequencies_mhz.to_vec(),
        }
    }
}

/// A carrier's GSM downlink allocation, bounds inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GsmSubBand {
    pub carrier: String,
    pub low_mhz: f64,
    pub high_mhz: f64,
}

impl GsmSubBand {
    pub fn new(carrier: &str, low_mhz: f64, high_mhz: f64) -> Self {
        GsmSubBand {
            carrier: carrier.to_string(),
            low_mhz,
            high_mhz,
        }
    }

    pub fn contains(&self, frequency_mhz: f64) -> bool {
        frequency_mhz >= self.low_mhz && frequency_mhz <= self.high_mhz
    }
}

/// The band plan handed to the detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    /// LTE band classes in scan order, widest first.
    pub band_classes: Vec<BandClass>,
    pub gsm_sub_bands: Vec<GsmSubBand>,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        ReferenceTables {
            band_classes: default_band_classes(),
            gsm_sub_bands: default_gsm_sub_bands(),
        }
    }
}

impl ReferenceTables {
    /// Carrier owning the GSM sub-band that contains `frequency_mhz`.
    ///
    /// Shared edges (935, 1835, 1855 MHz) go to the sub-band listed first.
    pub fn gsm_carrier(&self, frequency_mhz: f64) -> Option<&str> {
        self.gsm_sub_bands
            .iter()
            .find(|band| band.contains(frequency_mhz))
            .map(|band| band.carrier.as_str())
    }

    /// Every carrier named anywhere in the tables, in first-seen order.
    pub fn carriers(&self) -> Vec<String> {
        let mut carriers: Vec<String> = Vec::new();
        let names = self
            .band_classes
            .iter()
            .map(|b| &b.carrier)
            .chain(self.gsm_sub_bands.iter().map(|b| &b.carrier));
        for name in names {
            if !carriers.contains(name) {
                carriers.push(name.clone());
            }
        }
        carriers
    }
}

fn default_band_classes() -> Vec<BandClass> {
    vec![
        // 20 MHz: L-band SDL, 1800, 2100, 2600
        BandClass::new(TELEKOM, 20.0, &[1482.0, 1815.0, 2160.0, 2670.0]),
        BandClass::new(VODAFONE, 20.0, &[1462.0, 1865.0, 2140.0, 2650.0]),
        BandClass::new(TELEFONICA, 20.0, &[1845.0, 2120.0, 2630.0]),
        // 10 MHz: 800, 900, 1800, 2600
        BandClass::new(TELEKOM, 10.0, &[816.0, 950.0, 1830.0]),
        BandClass::new(VODAFONE, 10.0, &[806.0, 940.0]),
        BandClass::new(TELEFONICA, 10.0, &[796.0, 930.0, 2685.0]),
        // 5 MHz
        BandClass::new(TELEKOM, 5.0, &[957.5]),
        BandClass::new(VODAFONE, 5.0, &[1875.5]),
    ]
}

fn default_gsm_sub_bands() -> Vec<GsmSubBand> {
    vec![
        GsmSubBand::new(TELEFONICA, 925.0, 935.0),
        GsmSubBand::new(VODAFONE, 935.0, 945.0),
        GsmSubBand::new(TELEKOM, 945.0, 960.0),
        GsmSubBand::new(TELEKOM, 1805.0, 1835.0),
        GsmSubBand::new(TELEFONICA, 1835.0, 1855.0),
        GsmSubBand::new(VODAFONE, 1855.0, 1880.0),
    ]
}
