use thiserror::Error;

use zmand_core::CoreError;
use zmand_render::RenderError;

/// Errors surfaced by the controller and the command-line front end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unrecognised command `{0}`")]
    UnknownCommand(String),

    #[error("malformed argument for `{command}`: {reason}")]
    BadArgument { command: String, reason: String },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
