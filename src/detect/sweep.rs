use std::ops::RangeInclusive;

use crate::data::model::{Record, Trace};
use crate::error::DetectionError;

pub const SPAN: &str = "Span";

/// The mutable copy of a trace's records that the detectors strip signals from.
///
/// The noise floor is taken from the raw records once and stays fixed, so
/// regions blanked by an earlier pass read back exactly as noise.
#[derive(Debug, Clone)]
pub struct WorkingSweep {
    pub records: Vec<Record>,
    /// Hz per record: Span / record count.
    pub step_size: f64,
    pub noise_floor: f64,
}

impl WorkingSweep {
    pub fn from_trace(trace: &mut Trace) -> Result<Self, DetectionError> {
        let extrema = trace.extrema()?;
        let span = trace.numeric_parameter(SPAN)?;
        if !span.is_finite() || span <= 0.0 {
            return Err(DetectionError::InvalidParameter {
                title: SPAN.to_string(),
                value: span.to_string(),
            });
        }
        Ok(WorkingSweep {
            step_size: span / trace.records.len() as f64,
            records: trace.records.clone(),
            noise_floor: extrema.min,
        })
    }

    /// Whether `frequency_hz` lies within the first and last record.
    pub fn covers(&self, frequency_hz: f64) -> bool {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => {
                frequency_hz >= first.frequency as f64 && frequency_hz <= last.frequency as f64
            }
            _ => false,
        }
    }

    /// First record closer than one step to `frequency_hz`.
    pub fn index_near(&self, frequency_hz: f64) -> Option<usize> {
        self.records
            .iter()
            .position(|r| (r.frequency as f64 - frequency_hz).abs() < self.step_size)
    }

    /// Clip `[start, end]` to valid indices; `None` when nothing is left.
    pub fn window(&self, start: i64, end: i64) -> Option<RangeInclusive<usize>> {
        let last = self.records.len() as i64 - 1;
        let start = start.max(0);
        let end = end.min(last);
        (start <= end).then(|| start as usize..=end as usize)
    }

    /// Level of `record` above the noise floor.
    pub fn separation(&self, record: &Record) -> f64 {
        record.amplitude - self.noise_floor
    }

    /// Overwrite `[start, end]` with the noise floor, skipping out-of-range
    /// indices. Returns how many records were touched.
    pub fn suppress(&mut self, start: i64, end: i64) -> usize {
        let Some(range) = self.window(start, end) else {
            return 0;
        };
        let floor = self.noise_floor;
        let touched = range.clone().count();
        for record in &mut self.records[range] {
            record.amplitude = floor;
        }
        touched
    }

    /// Channel width expressed in records.
    pub fn width_in_steps(&self, bandwidth_mhz: f64) -> f64 {
        bandwidth_mhz * 1e6 / self.step_size
    }
}
