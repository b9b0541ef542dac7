//! Separable two-tap box blur applied in place on a packed RGBA raster.
//!
//! Each pass replaces a pixel with the mean of itself and its right
//! (horizontal pass) or lower (vertical pass) neighbour. The outermost ring
//! of pixels is left as is. Output pixels are opaque.

use rayon::prelude::*;
use tracing::debug;

use crate::buffer::{pack_rgba, required_len, unpack_rgba, PixelBuffer};
use crate::error::RenderError;

/// Blur a raw pixel slice described by `width`, `height` and `pitch` (bytes).
pub fn apply_blur(pixels: &mut [u32], width: u32, height: u32, pitch: usize) -> Result<(), RenderError> {
    let len = required_len(width, height, pitch)?;
    if pixels.len() < len {
        return Err(RenderError::Allocation { width, height });
    }
    let (w, h, stride) = (width as usize, height as usize, pitch / 4);
    if w < 3 || h < 3 {
        return Ok(());
    }
    let pixels = &mut pixels[..len];

    // Horizontal: rows are independent.
    pixels
        .par_chunks_mut(stride)
        .enumerate()
        .filter(|(y, _)| *y > 0 && *y < h - 1)
        .for_each(|(_, row)| {
            // Left to right, so `row[x + 1]` still holds its input value.
            for x in 1..w - 1 {
                row[x] = average(row[x], row[x + 1]);
            }
        });

    // Vertical: top to bottom, so the row below is still unblurred.
    for y in 1..h - 1 {
        let (upper, lower) = pixels.split_at_mut((y + 1) * stride);
        let row = &mut upper[y * stride..];
        let below = &lower[..stride];
        for x in 1..w - 1 {
            row[x] = average(row[x], below[x]);
        }
    }

    debug!(width, height, "Applied blur");
    Ok(())
}

impl PixelBuffer {
    /// Blur the whole buffer in place. See [`apply_blur`].
    pub fn blur(&mut self) -> Result<(), RenderError> {
        let (width, height, pitch) = (self.width(), self.height(), self.pitch());
        apply_blur(self.pixels_mut(), width, height, pitch)
    }
}

#[inline]
fn average(a: u32, b: u32) -> u32 {
    let a = unpack_rgba(a);
    let b = unpack_rgba(b);
    let mean = |i: usize| ((a[i] as u16 + b[i] as u16) / 2) as u8;
    pack_rgba([mean(0), mean(1), mean(2)])
}
