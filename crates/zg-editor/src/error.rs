use crate::modes::StateId;
use thiserror::Error;
use zg_core::SceneError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("no state `{id}` is registered in the active mode")]
    InvalidStateTransition { id: StateId },

    #[error("no mode named `{0}`")]
    UnknownMode(String),

    #[error("invalid key combination `{combo}`: {reason}")]
    InvalidShortcut { combo: String, reason: String },

    #[error("invalid property key `{0}`, expected `<node id>.<property>`")]
    InvalidPropertyKey(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failed to parse editor config: {0}")]
    Parse(String),

    #[error("failed to serialize editor config: {0}")]
    Serialize(String),

    #[error(
        "invalid zoom: min {min} must be positive and below max {max}, step {step} must exceed 1"
    )]
    InvalidZoom { min: f32, max: f32, step: f32 },

    #[error("invalid color `{0}`")]
    InvalidColor(String),
}
