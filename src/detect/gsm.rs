//! Blind GSM detection by iterative peak stripping.
//!
//! GSM carriers are narrow (200 kHz) and may sit anywhere on the channel
//! grid, so instead of probing known frequencies the detector repeatedly
//! takes the strongest remaining record, snaps it to the grid, attributes it
//! to a carrier by sub-band and blanks it. Every pass sets at least the
//! current peak to the noise floor, where it can never qualify again, so the
//! loop ends after at most one pass per record.

use log::{debug, trace};

use crate::config::GsmConfig;
use crate::data::model::DetectedSignal;
use crate::tables::ReferenceTables;

use super::extrema::peak_index;
use super::sweep::WorkingSweep;

/// What a GSM scan found and how many peaks it had to strip to get there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GsmScan {
    pub signals: Vec<DetectedSignal>,
    /// Peaks blanked, attributed or not.
    pub peaks_stripped: usize,
}

pub fn detect_gsm(
    sweep: &mut WorkingSweep,
    tables: &ReferenceTables,
    config: &GsmConfig,
) -> GsmScan {
    let mut scan = GsmScan::default();

    let channel_hz = config.channel_width_mhz * 1e6;
    let half_width = (sweep.width_in_steps(config.channel_width_mhz) / 2.0).floor();
    let reach = (half_width * config.smear_factor).floor() as i64;

    for _ in 0..sweep.records.len() {
        let Some(index) = peak_index(&sweep.records) else {
            break;
        };
        let peak = sweep.records[index];
        let separation = sweep.separation(&peak);
        if separation.is_nan() || separation < config.min_separation_db {
            break;
        }

        let channel_mhz = (peak.frequency as f64 / channel_hz).round() * channel_hz / 1e6;
        match tables.gsm_carrier(channel_mhz) {
            Some(carrier) => {
                debug!("{carrier} GSM {channel_mhz} MHz, {separation:.1} dB above floor");
                scan.signals.push(DetectedSignal::gsm(carrier, channel_mhz));
            }
            None => trace!("peak at {channel_mhz} MHz outside every carrier sub-band"),
        }

        let index = index as i64;
        sweep.suppress(index - reach, index + reach);
        scan.peaks_stripped += 1;
    }

    scan
}
