use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::DetectionError;

// ---------------------------------------------------------------------------
// ParamValue – the value cell of a trace header line
// ---------------------------------------------------------------------------

/// A header value as exported by the analyzer: either a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Classify a raw cell: anything that parses as a float is numeric.
    pub fn guess(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if !trimmed.is_empty() => ParamValue::Number(v),
            _ => ParamValue::Text(trimmed.to_string()),
        }
    }

    /// Numeric interpretation, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One `title,value,unit` line of a trace header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub title: String,
    pub value: ParamValue,
    pub unit: String,
}

impl Parameter {
    pub fn new(title: impl Into<String>, value: ParamValue, unit: impl Into<String>) -> Self {
        Parameter {
            title: title.into(),
            value,
            unit: unit.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record / Trace – one sweep curve
// ---------------------------------------------------------------------------

/// A single frequency bin of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Record {
    /// Bin frequency in Hz.
    pub frequency: u64,
    /// Level in dBm.
    pub amplitude: f64,
}

impl Record {
    pub fn new(frequency: u64, amplitude: f64) -> Self {
        Record {
            frequency,
            amplitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Lte,
    Gsm,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Lte => write!(f, "LTE"),
            SignalKind::Gsm => write!(f, "GSM"),
        }
    }
}

/// A signal found in a trace, attributed to a carrier where possible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedSignal {
    pub kind: SignalKind,
    pub carrier: Option<String>,
    /// Reference (LTE) or channel-aligned (GSM) frequency in MHz.
    pub frequency_mhz: f64,
    /// Channel bandwidth in MHz, LTE only.
    pub bandwidth_mhz: Option<f64>,
}

impl DetectedSignal {
    pub fn lte(carrier: &str, frequency_mhz: f64, bandwidth_mhz: f64) -> Self {
        DetectedSignal {
            kind: SignalKind::Lte,
            carrier: Some(carrier.to_string()),
            frequency_mhz,
            bandwidth_mhz: Some(bandwidth_mhz),
        }
    }

    pub fn gsm(carrier: &str, frequency_mhz: f64) -> Self {
        DetectedSignal {
            kind: SignalKind::Gsm,
            carrier: Some(carrier.to_string()),
            frequency_mhz,
            bandwidth_mhz: None,
        }
    }
}

impl fmt::Display for DetectedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let carrier = self.carrier.as_deref().unwrap_or("unknown");
        match self.bandwidth_mhz {
            Some(bw) => write!(
                f,
                "{} {carrier} @ {} MHz ({bw} MHz)",
                self.kind, self.frequency_mhz
            ),
            None => write!(f, "{} {carrier} @ {} MHz", self.kind, self.frequency_mhz),
        }
    }
}

/// Lowest and highest amplitude of a record sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

/// One amplitude-vs-frequency sweep as captured by the analyzer.
///
/// `records` always holds the raw capture. Detection works on a copy and
/// leaves what it did not suppress in `residual`.
///
/// The extrema are memoized against `records`; replace the capture through
/// [`Trace::set_records`] rather than editing the field in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    pub parameters: Vec<Parameter>,
    pub records: Vec<Record>,
    pub detected_signals: Vec<DetectedSignal>,
    /// Working records after suppression, present once detection ran.
    #[serde(skip)]
    pub residual: Option<Vec<Record>>,
    #[serde(skip)]
    extrema: Option<Extrema>,
}

impl Trace {
    pub fn new(parameters: Vec<Parameter>, records: Vec<Record>) -> Self {
        Trace {
            parameters,
            records,
            ..Default::default()
        }
    }

    /// Look up a header parameter by title. Later duplicates win.
    pub fn parameter(&self, title: &str) -> Option<&Parameter> {
        self.parameters.iter().rev().find(|p| p.title == title)
    }

    /// Numeric value of a required parameter.
    pub fn numeric_parameter(&self, title: &str) -> Result<f64, DetectionError> {
        let param = self
            .parameter(title)
            .ok_or_else(|| DetectionError::MissingParameter {
                title: title.to_string(),
            })?;
        param
            .value
            .as_f64()
            .ok_or_else(|| DetectionError::InvalidParameter {
                title: title.to_string(),
                value: param.value.to_string(),
            })
    }

    /// Swap in a new capture, dropping everything derived from the old one.
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.extrema = None;
        self.residual = None;
        self.detected_signals.clear();
    }

    /// Minimum and maximum amplitude of the raw records, computed on first use.
    pub fn extrema(&mut self) -> Result<Extrema, DetectionError> {
        if let Some(extrema) = self.extrema {
            return Ok(extrema);
        }
        let extrema = crate::detect::extrema::compute_extrema(&self.records)?;
        self.extrema = Some(extrema);
        Ok(extrema)
    }

    pub fn min_amplitude(&self) -> Option<f64> {
        self.extrema.map(|e| e.min)
    }

    pub fn max_amplitude(&self) -> Option<f64> {
        self.extrema.map(|e| e.max)
    }
}

// ---------------------------------------------------------------------------
// Snapshot / Point / Site – the survey hierarchy
// ---------------------------------------------------------------------------

/// One analyzer export file, usually holding two traces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub reference: String,
    pub traces: Vec<Trace>,
}

/// One Wi-Fi scan row: column name → raw cell.
pub type Network = BTreeMap<String, String>;

/// All measurement activity at one physical location.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Point {
    pub reference: String,
    pub snapshots: Vec<Snapshot>,
    #[serde(skip)]
    pub networks: Vec<Network>,
    /// Every trace's detections, in snapshot-then-trace order.
    pub detected_signals: Vec<DetectedSignal>,
}

impl Point {
    pub fn new(reference: impl Into<String>) -> Self {
        Point {
            reference: reference.into(),
            ..Default::default()
        }
    }

    /// Flatten the traces' detections onto the point.
    pub fn hoist_signals(&mut self) {
        self.detected_signals = self
            .snapshots
            .iter()
            .flat_map(|s| s.traces.iter())
            .flat_map(|t| t.detected_signals.iter().cloned())
            .collect();
    }

    pub fn trace_count(&self) -> usize {
        self.snapshots.iter().map(|s| s.traces.len()).sum()
    }
}

/// The whole surveyed site.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Site {
    pub reference: String,
    pub points: Vec<Point>,
}

impl Site {
    pub fn new(reference: impl Into<String>, points: Vec<Point>) -> Self {
        Site {
            reference: reference.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
