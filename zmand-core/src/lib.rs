pub mod error;
pub mod escape;
pub mod view;

// Re-export primary types for convenience.
pub use error::CoreError;
pub use escape::{iterate, max_iterations, precision, smooth_value, Escape, ESCAPE_RADIUS_SQ};
pub use view::{Direction, ScreenPoint, ViewState};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
