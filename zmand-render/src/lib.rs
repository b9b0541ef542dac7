pub mod band;
pub mod blur;
pub mod buffer;
pub mod error;
pub mod export;
pub mod palette;
pub mod renderer;

pub use band::{partition_rows, RowBand};
pub use blur::apply_blur;
pub use buffer::{pack_rgba, unpack_rgba, PixelBuffer};
pub use error::RenderError;
pub use export::{export_png, ExportMetadata};
pub use palette::{builtin_schemes, lerp_color, Channel, ColorScheme, Palette, Rgb, SchemeTable, PALETTE_SIZE};
pub use renderer::{render, RenderResult};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
