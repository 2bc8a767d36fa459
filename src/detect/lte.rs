//! LTE detection at known carrier centre frequencies.
//!
//! An LTE downlink shows up in a max-hold sweep as a flat-topped plateau one
//! channel wide. For each reference frequency of a band class the detector
//! averages the plateau's central part, then checks that most of the
//! channel sits clearly above the noise floor. Confirmed channels are
//! blanked so a narrower band class scanned later cannot claim the same
//! spectrum again.

use log::{debug, trace};

use crate::config::LteConfig;
use crate::data::model::DetectedSignal;
use crate::tables::BandClass;

use super::sweep::WorkingSweep;

/// Scan every reference frequency of `band` in its listed order.
pub fn detect_lte(
    sweep: &mut WorkingSweep,
    band: &BandClass,
    config: &LteConfig,
) -> Vec<DetectedSignal> {
    let mut signals = Vec::new();

    for &center_mhz in &band.center_frequencies_mhz {
        let target_hz = center_mhz * 1e6;
        if !sweep.covers(target_hz) {
            trace!("{center_mhz} MHz outside sweep, skipped");
            continue;
        }
        let Some(center) = sweep.index_near(target_hz) else {
            continue;
        };
        let center = center as i64;

        let width_in_steps = sweep.width_in_steps(band.bandwidth_mhz);
        let half_width = (width_in_steps / 2.0).floor();
        let reach = (half_width * config.focus_factor).floor() as i64;

        let Some(window) = sweep.window(center - reach, center + reach) else {
            continue;
        };
        let levels = &sweep.records[window];
        let mean = levels.iter().map(|r| r.amplitude).sum::<f64>() / levels.len() as f64;
        let separation = mean - sweep.noise_floor;
        if separation <= config.min_average_separation_db {
            continue;
        }

        let occupied = levels
            .iter()
            .filter(|r| sweep.separation(r) > config.min_record_separation_db)
            .count();
        if occupied as f64 <= config.coverage_ratio * width_in_steps {
            debug!(
                "{} {center_mhz} MHz: {separation:.1} dB average but only {occupied} occupied records",
                band.carrier
            );
            continue;
        }

        debug!(
            "{} LTE {center_mhz} MHz / {} MHz confirmed, {separation:.1} dB above floor",
            band.carrier, band.bandwidth_mhz
        );
        signals.push(DetectedSignal::lte(
            &band.carrier,
            center_mhz,
            band.bandwidth_mhz,
        ));

        let blank = (width_in_steps / 2.0).ceil() as i64;
        sweep.suppress(center - blank, center + blank + 1);
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ParamValue, Parameter, Record, Trace};
    use crate::detect::sweep::SPAN;
    use crate::tables::TELEKOM;

    const STEP: u64 = 50_000;
    const START: u64 = 1_795_000_000;

    /// 800 records, 1795..1835 MHz, flat at `floor` with a plateau of
    /// `width` records centred on 1815 MHz.
    fn sweep_with_plateau(floor: f64, level: f64, width: usize) -> WorkingSweep {
        let center = 400usize;
        let half = width / 2;
        let records = (0..800)
            .map(|i| {
                let amplitude = if i + half >= center && i <= center + half {
                    level
                } else {
                    floor
                };
                Record::new(START + i as u64 * STEP, amplitude)
            })
            .collect();
        let mut trace = Trace::new(
            vec![Parameter::new(SPAN, ParamValue::Number(40e6), "Hz")],
            records,
        );
        WorkingSweep::from_trace(&mut trace).unwrap()
    }

    fn telekom(bandwidth: f64, centers: &[f64]) -> BandClass {
        BandClass::new(TELEKOM, bandwidth, centers)
    }

    #[test]
    fn test_full_channel_plateau_detected_and_flattened() {
        let mut sweep = sweep_with_plateau(-90.0, -60.0, 401);
        let signals = detect_lte(&mut sweep, &telekom(20.0, &[1815.0]), &LteConfig::default());

        assert_eq!(signals, vec![DetectedSignal::lte(TELEKOM, 1815.0, 20.0)]);
        assert!(sweep.records.iter().all(|r| r.amplitude == -90.0));
    }

    #[test]
    fn test_weak_plateau_ignored() {
        let mut sweep = sweep_with_plateau(-90.0, -91.5, 41);
        let before = sweep.records.clone();
        let signals = detect_lte(&mut sweep, &telekom(20.0, &[1815.0]), &LteConfig::default());

        assert!(signals.is_empty());
        assert_eq!(sweep.records, before);
    }

    #[test]
    fn test_narrow_spike_fails_coverage() {
        // Average clears 3 dB but far fewer than 80% of the channel is occupied.
        let mut sweep = sweep_with_plateau(-90.0, -60.0, 41);
        let before = sweep.records.clone();
        let signals = detect_lte(&mut sweep, &telekom(20.0, &[1815.0]), &LteConfig::default());

        assert!(signals.is_empty());
        assert_eq!(sweep.records, before);
    }

    #[test]
    fn test_out_of_span_reference_skipped() {
        let mut sweep = sweep_with_plateau(-90.0, -60.0, 401);
        let signals = detect_lte(
            &mut sweep,
            &telekom(20.0, &[1750.0, 1815.0, 1900.0]),
            &LteConfig::default(),
        );
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].frequency_mhz, 1815.0);
    }

    #[test]
    fn test_flat_trace_untouched() {
        let mut sweep = sweep_with_plateau(-90.0, -90.0, 0);
        let before = sweep.records.clone();
        let signals = detect_lte(
            &mut sweep,
            &telekom(10.0, &[1800.0, 1815.0, 1830.0]),
            &LteConfig::default(),
        );
        assert!(signals.is_empty());
        assert_eq!(sweep.records, before);
    }

    #[test]
    fn test_wide_class_first_prevents_double_count() {
        let config = LteConfig::default();
        let wide = telekom(20.0, &[1815.0]);
        let narrow = telekom(10.0, &[1810.0, 1820.0]);

        let mut ordered = sweep_with_plateau(-90.0, -60.0, 401);
        let mut found = detect_lte(&mut ordered, &wide, &config);
        found.extend(detect_lte(&mut ordered, &narrow, &config));
        assert_eq!(found.len(), 1);

        let mut misordered = sweep_with_plateau(-90.0, -60.0, 401);
        let found = detect_lte(&mut misordered, &narrow, &config);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| s.bandwidth_mhz == Some(10.0)));
    }
}
