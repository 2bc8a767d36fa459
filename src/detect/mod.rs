/// Detection layer: noise floor, LTE probing and GSM peak stripping.
///
/// Per eligible trace:
/// ```text
///   raw records ──► extrema (noise floor, fixed)
///        │ copy
///        ▼
///   WorkingSweep ──► lte × band classes (widest first) ──► gsm
///        │
///        ▼
///   trace.detected_signals, trace.residual ──► point.detected_signals
/// ```
pub mod extrema;
pub mod gsm;
pub mod lte;
pub mod sweep;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::DetectionConfig;
use crate::data::filter::is_eligible;
use crate::data::model::{Point, Site, Trace};
use crate::error::DetectionError;

pub use gsm::{GsmScan, detect_gsm};
pub use lte::detect_lte;
pub use sweep::WorkingSweep;

/// How a single trace fared.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceOutcome {
    /// Failed the eligibility gate; nothing computed.
    Skipped,
    /// Scanned; carries the number of signals found.
    Scanned(usize),
}

/// Run the full detection sequence on one trace.
///
/// The raw records are left as captured. Signals are only stored on the
/// trace once every stage has run, so a failure leaves it empty.
pub fn detect_trace(
    trace: &mut Trace,
    config: &DetectionConfig,
) -> Result<TraceOutcome, DetectionError> {
    if !is_eligible(trace, &config.eligibility) {
        return Ok(TraceOutcome::Skipped);
    }

    let mut sweep = WorkingSweep::from_trace(trace)?;

    let mut signals = Vec::new();
    for band in &config.tables.band_classes {
        signals.extend(detect_lte(&mut sweep, band, &config.lte));
    }
    let gsm = detect_gsm(&mut sweep, &config.tables, &config.gsm);
    debug!(
        "GSM scan stripped {} peaks, {} attributed",
        gsm.peaks_stripped,
        gsm.signals.len()
    );
    signals.extend(gsm.signals);
    for signal in &signals {
        debug!("  {signal}");
    }

    let found = signals.len();
    trace.detected_signals = signals;
    trace.residual = Some(sweep.records);
    Ok(TraceOutcome::Scanned(found))
}

/// Tally of trace outcomes for one point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointSummary {
    pub scanned: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Scan every trace of a point in snapshot order, then hoist the signals.
pub fn analyze_point(point: &mut Point, config: &DetectionConfig) -> PointSummary {
    let mut summary = PointSummary::default();

    for snapshot in &mut point.snapshots {
        for (i, trace) in snapshot.traces.iter_mut().enumerate() {
            match detect_trace(trace, config) {
                Ok(TraceOutcome::Skipped) => {
                    debug!("{} trace {i}: not eligible", snapshot.reference);
                    summary.skipped += 1;
                }
                Ok(TraceOutcome::Scanned(found)) => {
                    debug!("{} trace {i}: {found} signals", snapshot.reference);
                    summary.scanned += 1;
                }
                Err(err) => {
                    warn!("{} trace {i}: {err}", snapshot.reference);
                    trace.detected_signals.clear();
                    summary.failed += 1;
                }
            }
        }
    }

    point.hoist_signals();
    info!(
        "Point {}: {} traces scanned, {} skipped, {} failed, {} signals",
        point.reference,
        summary.scanned,
        summary.skipped,
        summary.failed,
        point.detected_signals.len()
    );
    summary
}

/// Analyze all points of a site. Points share nothing mutable, so they run
/// in parallel.
pub fn analyze_site(site: &mut Site, config: &DetectionConfig) -> Vec<PointSummary> {
    site.points
        .par_iter_mut()
        .map(|point| analyze_point(point, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{CENTER_FREQUENCY, TRACE_MODE};
    use crate::data::model::{DetectedSignal, ParamValue, Parameter, Record, SignalKind, Snapshot};
    use crate::detect::sweep::SPAN;
    use crate::tables::{TELEKOM, VODAFONE};

    const STEP: u64 = 50_000;

    /// A 939 MHz max-hold sweep (919..959 MHz) with an LTE plateau at
    /// 940 MHz and a GSM carrier at 950.2 MHz.
    fn survey_trace(mode: &str) -> Trace {
        let start = 919_000_000u64;
        let records = (0..800u64)
            .map(|i| {
                let f = start + i * STEP;
                let amplitude = if (935_000_000..=945_000_000).contains(&f) {
                    -65.0
                } else if f == 950_200_000 {
                    -55.0
                } else {
                    -97.0
                };
                Record::new(f, amplitude)
            })
            .collect();
        Trace::new(
            vec![
                Parameter::new(TRACE_MODE, ParamValue::guess(mode), ""),
                Parameter::new(CENTER_FREQUENCY, ParamValue::Number(939e6), "Hz"),
                Parameter::new(SPAN, ParamValue::Number(40e6), "Hz"),
            ],
            records,
        )
    }

    #[test]
    fn test_trace_lte_then_gsm() {
        let mut trace = survey_trace("Max Hold");
        let raw = trace.records.clone();
        let outcome = detect_trace(&mut trace, &DetectionConfig::default()).unwrap();

        assert_eq!(outcome, TraceOutcome::Scanned(2));
        assert_eq!(
            trace.detected_signals,
            vec![
                DetectedSignal::lte(VODAFONE, 940.0, 10.0),
                DetectedSignal::gsm(TELEKOM, 950.2),
            ]
        );
        assert_eq!(trace.records, raw);
        assert_eq!(trace.min_amplitude(), Some(-97.0));
        assert_eq!(trace.max_amplitude(), Some(-55.0));
        let residual = trace.residual.as_ref().unwrap();
        assert!(residual.iter().all(|r| r.amplitude == -97.0));
    }

    #[test]
    fn test_clear_write_skipped() {
        let mut trace = survey_trace("Clear Write");
        let outcome = detect_trace(&mut trace, &DetectionConfig::default()).unwrap();
        assert_eq!(outcome, TraceOutcome::Skipped);
        assert!(trace.detected_signals.is_empty());
        assert!(trace.min_amplitude().is_none());
        assert!(trace.residual.is_none());
    }

    #[test]
    fn test_missing_span_fails_trace_only() {
        let mut broken = survey_trace("Max Hold");
        broken.parameters.retain(|p| p.title != SPAN);

        let mut point = Point::new("7");
        point.snapshots = vec![Snapshot {
            reference: "SPE0001.csv".into(),
            traces: vec![broken, survey_trace("Max Hold"), survey_trace("Clear Write")],
        }];
        let summary = analyze_point(&mut point, &DetectionConfig::default());

        assert_eq!(
            summary,
            PointSummary {
                scanned: 1,
                skipped: 1,
                failed: 1
            }
        );
        assert!(point.snapshots[0].traces[0].detected_signals.is_empty());
        assert_eq!(point.detected_signals.len(), 2);
    }

    #[test]
    fn test_empty_trace_degenerate() {
        let mut trace = survey_trace("Max Hold");
        trace.records.clear();
        assert_eq!(
            detect_trace(&mut trace, &DetectionConfig::default()),
            Err(DetectionError::DegenerateTrace)
        );
    }

    #[test]
    fn test_non_finite_amplitude_fails_trace_cleanly() {
        for bad in [f64::NAN, f64::NEG_INFINITY] {
            let mut trace = survey_trace("Max Hold");
            trace.records[0].amplitude = bad;
            assert!(matches!(
                detect_trace(&mut trace, &DetectionConfig::default()),
                Err(DetectionError::NonFiniteAmplitude { index: 0, .. })
            ));
            assert!(trace.detected_signals.is_empty());
            assert!(trace.residual.is_none());
        }
    }

    #[test]
    fn test_site_points_analyzed_independently() {
        let mut site = Site::new("test", Vec::new());
        for name in ["1", "2", "3"] {
            let mut point = Point::new(name);
            point.snapshots.push(Snapshot {
                reference: "SPE0001.csv".into(),
                traces: vec![survey_trace("Max Hold")],
            });
            site.points.push(point);
        }
        let summaries = analyze_site(&mut site, &DetectionConfig::default());

        assert_eq!(summaries.len(), 3);
        for point in &site.points {
            let kinds: Vec<SignalKind> = point.detected_signals.iter().map(|s| s.kind).collect();
            assert_eq!(kinds, vec![SignalKind::Lte, SignalKind::Gsm]);
        }
        assert!(site
            .points
            .iter()
            .all(|p| p.detected_signals[0].carrier.as_deref() == Some(VODAFONE)));
    }
}
