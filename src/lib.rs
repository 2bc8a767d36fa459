//! Carrier presence detection for indoor radio surveys.
//!
//! Spectrum-analyzer sweeps taken at survey points are scanned for LTE
//! channels at known carrier frequencies and for GSM carriers anywhere in
//! the band; each detection is attributed to a carrier and collected per
//! point.

pub mod config;
pub mod data;
pub mod detect;
pub mod error;
pub mod report;
pub mod survey;
pub mod tables;
pub mod wifi;

pub use config::DetectionConfig;
pub use data::model::{DetectedSignal, Point, Record, SignalKind, Site, Trace};
pub use error::DetectionError;
pub use survey::Survey;
