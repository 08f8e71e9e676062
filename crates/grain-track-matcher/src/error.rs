use grain_track_core::{MapError, OrientationError};

/// Errors returned by the sequential matcher.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("need at least two frames to link (got {got})")]
    InsufficientFrames { got: usize },
    #[error("invalid matcher parameters: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Orientation(#[from] OrientationError),
}
