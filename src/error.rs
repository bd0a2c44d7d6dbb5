use thiserror::Error;

/// Errors surfaced by herd construction and editing.
///
/// Evaluation never fails on numeric grounds; the only evaluation error is
/// asking for a herd whose leader does not exist.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HerdError {
    #[error("invalid configuration: {field} = {value} is outside [{min}, {max}]")]
    InvalidConfiguration {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("no leader exists for this herd")]
    MissingLeader,
    #[error("cannot {operation} while the herd is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    #[error("no agent registered at index {0}")]
    UnknownAgent(usize),
    #[error("unable to seed jitter from OS entropy: {0}")]
    Entropy(String),
    #[error("malformed herd configuration: {0}")]
    ConfigFormat(String),
}
