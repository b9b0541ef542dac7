use crate::error::RenderError;
use crate::palette::Rgb;

/// Pack an opaque color as 32-bit RGBA (`0xRRGGBBAA`).
#[inline]
pub fn pack_rgba(rgb: Rgb) -> u32 {
    u32::from_be_bytes([rgb[0], rgb[1], rgb[2], 0xFF])
}

/// Split a packed pixel into `[r, g, b, a]`.
#[inline]
pub fn unpack_rgba(pixel: u32) -> [u8; 4] {
    pixel.to_be_bytes()
}

/// A caller-owned raster of packed RGBA pixels, row-major.
///
/// Rows may be padded: `pitch` is the row length in bytes and can exceed
/// `width * 4`. Pixel `(x, y)` lives at index `y * (pitch / 4) + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pitch: usize,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Allocate an unpadded, zeroed buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        Self::with_pitch(width, height, width as usize * 4)
    }

    /// Allocate a zeroed buffer with `pitch` bytes per row.
    ///
    /// Fails with [`RenderError::Allocation`] instead of aborting when the
    /// memory cannot be reserved.
    pub fn with_pitch(width: u32, height: u32, pitch: usize) -> Result<Self, RenderError> {
        let len = required_len(width, height, pitch)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| RenderError::Allocation { width, height })?;
        pixels.resize(len, 0);
        Ok(Self {
            width,
            height,
            pitch,
            pixels,
        })
    }

    /// Wrap existing pixel storage, e.g. a locked texture copied out by the
    /// display layer.
    pub fn from_raw(width: u32, height: u32, pitch: usize, pixels: Vec<u32>) -> Result<Self, RenderError> {
        let len = required_len(width, height, pitch)?;
        if pixels.len() < len {
            return Err(RenderError::Allocation { width, height });
        }
        Ok(Self {
            width,
            height,
            pitch,
            pixels,
        })
    }

    pub fn into_raw(self) -> Vec<u32> {
        self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row length in bytes.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Row length in pixels.
    #[inline]
    pub fn stride(&self) -> usize {
        self.pitch / 4
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Whether a `width`×`height` frame fits without reallocation.
    pub fn can_hold(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.stride() + x as usize).copied()
    }

    /// The visible pixels of row `y` (padding excluded).
    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.stride();
        &self.pixels[start..start + self.width as usize]
    }

    /// Fill every visible pixel with one color.
    pub fn fill(&mut self, rgb: Rgb) {
        let packed = pack_rgba(rgb);
        let (width, stride) = (self.width as usize, self.stride());
        for row in self.pixels.chunks_mut(stride).take(self.height as usize) {
            row[..width].fill(packed);
        }
    }

    /// Tightly packed `R, G, B, A` bytes, padding dropped.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for &pixel in self.row(y) {
                bytes.extend_from_slice(&unpack_rgba(pixel));
            }
        }
        bytes
    }
}

/// Number of `u32` slots a buffer with this geometry needs.
pub(crate) fn required_len(width: u32, height: u32, pitch: usize) -> Result<usize, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    if pitch % 4 != 0 || pitch / 4 < width as usize {
        return Err(RenderError::InvalidPitch { pitch, width });
    }
    (pitch / 4)
        .checked_mul(height as usize)
        .ok_or(RenderError::Allocation { width, height })
}
