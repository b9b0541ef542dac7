use thiserror::Error;

/// Errors originating from view-state transforms.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid zoom factor: {0} (must lie in (0, 1))")]
    InvalidZoomFactor(f64),

    #[error("invalid movement factor: {0} (must be positive and finite)")]
    InvalidMovementFactor(f64),

    #[error("degenerate drag rectangle: {dx}×{dy} pixels")]
    DegenerateDragRect { dx: f64, dy: f64 },

    #[error("invalid screen height: {0} (must be >= 1)")]
    InvalidScreenHeight(u32),

    #[error("invalid view state: {reason}")]
    InvalidViewState { reason: String },
}
