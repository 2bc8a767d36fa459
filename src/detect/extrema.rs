//! Noise floor and peak of a sweep.

use crate::data::model::{Extrema, Record};
use crate::error::DetectionError;

/// Lowest and highest amplitude in one pass.
///
/// The lowest level is the detection baseline (noise floor), so a NaN or
/// infinite amplitude anywhere fails the trace.
pub fn compute_extrema(records: &[Record]) -> Result<Extrema, DetectionError> {
    if let Some((index, record)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| !r.amplitude.is_finite())
    {
        return Err(DetectionError::NonFiniteAmplitude {
            index,
            amplitude: record.amplitude,
        });
    }
    let (first, rest) = records
        .split_first()
        .ok_or(DetectionError::DegenerateTrace)?;

    let mut extrema = Extrema {
        min: first.amplitude,
        max: first.amplitude,
    };
    for record in rest {
        if record.amplitude < extrema.min {
            extrema.min = record.amplitude;
        }
        if record.amplitude > extrema.max {
            extrema.max = record.amplitude;
        }
    }
    Ok(extrema)
}

/// Index of the strongest record; the lowest index wins a tie.
pub fn peak_index(records: &[Record]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, record) in records.iter().enumerate() {
        match best {
            Some(b) if record.amplitude <= records[b].amplitude => {}
            _ if record.amplitude.is_nan() => {}
            _ => best = Some(i),
        }
    }
    best
}
