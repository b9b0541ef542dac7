use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use zmand_core::{iterate, ViewState};

use crate::band::{partition_rows, RowBand};
use crate::buffer::{pack_rgba, PixelBuffer};
use crate::error::RenderError;
use crate::palette::{ColorScheme, PALETTE_SIZE};

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Summary of a completed render pass. The pixels themselves are in the
/// caller's buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub precision: f64,
    pub bands: usize,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Full-frame render
// ---------------------------------------------------------------------------

/// Render `view` into the top-left `width`×`height` region of `out`.
///
/// The rows are split into `workers` bands (see [`partition_rows`]) and each
/// band is colored by a pool of `workers` threads built for this call. The
/// call returns once every band is finished.
///
/// Bands are colored into their own staging rows and only copied into `out`
/// once the whole pass succeeded, so on any error `out` is left exactly as
/// it was.
pub fn render(
    view: &ViewState,
    scheme: &ColorScheme,
    workers: usize,
    width: u32,
    height: u32,
    out: &mut PixelBuffer,
) -> Result<RenderResult, RenderError> {
    if workers == 0 {
        return Err(RenderError::InvalidWorkerCount(workers));
    }
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    if !out.can_hold(width, height) {
        return Err(RenderError::Allocation { width, height });
    }
    view.validate()?;
    render_bands(view, scheme, workers, width, height, out)
}

/// The pass itself, for arguments that were already checked.
fn render_bands(
    view: &ViewState,
    scheme: &ColorScheme,
    workers: usize,
    width: u32,
    height: u32,
    out: &mut PixelBuffer,
) -> Result<RenderResult, RenderError> {
    let start = Instant::now();
    let view = *view;
    let precision = view.precision();
    let max_iterations = view.max_iterations(PALETTE_SIZE);

    let bands = partition_rows(width, height, workers)?;
    debug!(
        bands = bands.len(),
        width,
        height,
        max_iterations,
        "Starting row-band render"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("zmand-band-{i}"))
        .build()?;

    let abort = AtomicBool::new(false);
    let ctx = BandContext {
        view: &view,
        scheme,
        max_iterations,
        scale: view.plane_scale(height),
        abort: &abort,
    };
    let staged: Vec<Vec<u32>> = pool.install(|| {
        bands
            .par_iter()
            .map(|band| ctx.render_band(band))
            .collect::<Result<_, _>>()
    })?;

    // Every band succeeded: publish the rows.
    let stride = out.stride();
    let w = width as usize;
    let mut rest = &mut out.pixels_mut()[..stride * height as usize];
    for (band, rows) in bands.iter().zip(&staged) {
        let (dst, tail) = std::mem::take(&mut rest).split_at_mut(band.row_count() as usize * stride);
        for (dst_row, src_row) in dst.chunks_mut(stride).zip(rows.chunks(w)) {
            dst_row[..w].copy_from_slice(src_row);
        }
        rest = tail;
    }

    let elapsed = start.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        max_iterations,
        precision,
        workers,
        "Render complete"
    );

    Ok(RenderResult {
        width,
        height,
        max_iterations,
        precision,
        bands: bands.len(),
        elapsed,
    })
}

/// Per-pass state shared read-only by every band.
struct BandContext<'a> {
    view: &'a ViewState,
    scheme: &'a ColorScheme,
    max_iterations: u32,
    /// Plane units per pixel.
    scale: f64,
    abort: &'a AtomicBool,
}

impl BandContext<'_> {
    /// Color every row of `band` into a packed `width × row_count` block.
    fn render_band(&self, band: &RowBand) -> Result<Vec<u32>, RenderError> {
        let width = band.image_width as usize;
        let mut rows = vec![0u32; band.row_count() as usize * width];
        for (y, line) in band.rows().zip(rows.chunks_mut(width)) {
            if self.abort.load(Ordering::Relaxed) {
                break;
            }
            if let Err(e) = self.render_row(y, line) {
                self.abort.store(true, Ordering::Relaxed);
                return Err(e);
            }
        }
        Ok(rows)
    }

    fn render_row(&self, y: u32, line: &mut [u32]) -> Result<(), RenderError> {
        let v = self.view.min_y + y as f64 * self.scale;
        for (x, pixel) in line.iter_mut().enumerate() {
            let u = self.view.min_x + x as f64 * self.scale;
            let rgb = self.scheme.color(iterate(u, v, self.max_iterations))?;
            *pixel = pack_rgba(rgb);
        }
        Ok(())
    }
}
