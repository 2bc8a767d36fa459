use crate::config::EligibilityConfig;

use super::model::{ParamValue, Trace};

// ---------------------------------------------------------------------------
// Eligibility gate: which traces go to the detectors
// ---------------------------------------------------------------------------

pub const TRACE_MODE: &str = "Trace Mode";
pub const CENTER_FREQUENCY: &str = "Center Frequency";

/// Whether a trace qualifies for detection.
///
/// A trace passes when:
/// * its "Trace Mode" is exactly the configured mode (Max Hold). Clear Write
///   sweeps are single-shot and too noisy for fixed dB thresholds.
/// * its "Center Frequency" in Hz is exactly one of the allow-listed sweep
///   centres.
pub fn is_eligible(trace: &Trace, config: &EligibilityConfig) -> bool {
    let mode_ok = match trace.parameter(TRACE_MODE).map(|p| &p.value) {
        Some(ParamValue::Text(mode)) => *mode == config.trace_mode,
        _ => false,
    };
    if !mode_ok {
        return false;
    }

    let Some(center) = trace
        .parameter(CENTER_FREQUENCY)
        .and_then(|p| p.value.as_f64())
    else {
        return false;
    };
    if center.fract() != 0.0 || center < 0.0 {
        return false;
    }
    config.center_frequencies_hz.contains(&(center as u64))
}

/// Indices of the traces in `traces` that pass the gate.
pub fn eligible_indices(traces: &[Trace], config: &EligibilityConfig) -> Vec<usize> {
    traces
        .iter()
        .enumerate()
        .filter(|(_, t)| is_eligible(t, config))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Parameter, Record};

    fn trace(mode: &str, center: &str) -> Trace {
        Trace::new(
            vec![
                Parameter::new(TRACE_MODE, ParamValue::guess(mode), ""),
                Parameter::new(CENTER_FREQUENCY, ParamValue::guess(center), "Hz"),
            ],
            vec![Record::new(939_000_000, -90.0)],
        )
    }

    #[test]
    fn test_max_hold_on_allowed_center() {
        let config = EligibilityConfig::default();
        assert!(is_eligible(&trace("Max Hold", "939000000"), &config));
        assert!(is_eligible(&trace("Max Hold", "1842500000"), &config));
    }

    #[test]
    fn test_clear_write_rejected() {
        let config = EligibilityConfig::default();
        assert!(!is_eligible(&trace("Clear Write", "939000000"), &config));
        assert!(!is_eligible(&trace("Clear Write", "2000000001"), &config));
    }

    #[test]
    fn test_center_must_match_exactly() {
        let config = EligibilityConfig::default();
        assert!(!is_eligible(&trace("Max Hold", "2000000001"), &config));
        assert!(!is_eligible(&trace("Max Hold", "939000000.5"), &config));
        assert!(!is_eligible(&trace("Max Hold", "n/a"), &config));
    }

    #[test]
    fn test_missing_parameters_rejected() {
        let config = EligibilityConfig::default();
        assert!(!is_eligible(&Trace::default(), &config));
    }

    #[test]
    fn test_gate_is_pure() {
        let config = EligibilityConfig::default();
        let t = trace("Max Hold", "806000000");
        assert_eq!(is_eligible(&t, &config), is_eligible(&t, &config));
        assert_eq!(eligible_indices(&[t.clone(), trace("Clear Write", "806000000"), t], &config), vec![0, 2]);
    }
}
