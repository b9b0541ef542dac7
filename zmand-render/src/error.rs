use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid worker count: {0} (must be >= 1)")]
    InvalidWorkerCount(usize),

    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid row pitch: {pitch} bytes for {width} pixels per row")]
    InvalidPitch { pitch: usize, width: u32 },

    #[error("unknown color scheme {index} (have {count})")]
    UnknownScheme { index: usize, count: usize },

    #[error("pixel buffer cannot hold {width}×{height} pixels")]
    Allocation { width: u32, height: u32 },

    #[error("interpolation parameter out of range: {t}")]
    Interpolation { t: f64 },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error(transparent)]
    Core(#[from] zmand_core::CoreError),
}
