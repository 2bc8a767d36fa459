use thiserror::Error;

/// Structural problems that stop detection for a single trace.
///
/// None of these abort a survey run; the orchestrator logs them and moves
/// on to the next trace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("trace has no records")]
    DegenerateTrace,

    #[error("record {index} has non-finite amplitude {amplitude}")]
    NonFiniteAmplitude { index: usize, amplitude: f64 },

    #[error("required parameter '{title}' is missing")]
    MissingParameter { title: String },

    #[error("parameter '{title}' has unusable value '{value}'")]
    InvalidParameter { title: String, value: String },
}
