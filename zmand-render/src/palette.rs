use zmand_core::Escape;

use crate::error::RenderError;

/// Entries per color ramp. Also the base of the iteration budget.
pub const PALETTE_SIZE: usize = 256;

/// Ramps are built from four segments of this many entries.
const SEGMENT: usize = PALETTE_SIZE / 4;

pub type Rgb = [u8; 3];

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Channel selector for palettes synthesized from the ramp index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    /// All three channels at equal intensity.
    Grey,
}

impl Channel {
    #[inline]
    fn color(self, intensity: u8) -> Rgb {
        match self {
            Self::Red => [intensity, 0, 0],
            Self::Green => [0, intensity, 0],
            Self::Blue => [0, 0, intensity],
            Self::Grey => [intensity, intensity, intensity],
        }
    }
}

/// A ring of [`PALETTE_SIZE`] colors, either stored or computed on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum Palette {
    Tabulated(Box<[Rgb; PALETTE_SIZE]>),
    SingleChannel(Channel),
}

impl Palette {
    /// Color at ring position `k` (taken modulo [`PALETTE_SIZE`]).
    #[inline]
    pub fn entry(&self, k: usize) -> Rgb {
        let k = k % PALETTE_SIZE;
        match self {
            Self::Tabulated(colors) => colors[k],
            // k < 256, so the cast is lossless.
            Self::SingleChannel(channel) => channel.color(k as u8),
        }
    }

    /// Blend entries `k` and `k + 1` (wrapping) with parameter `t`.
    #[inline]
    pub fn resolve(&self, k: usize, t: f64) -> Result<Rgb, RenderError> {
        lerp_color(self.entry(k), self.entry(k + 1), t)
    }
}

// ---------------------------------------------------------------------------
// Color scheme
// ---------------------------------------------------------------------------

/// A palette plus the color used for points that never escape.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    pub name: &'static str,
    palette: Palette,
    inside: Rgb,
}

impl ColorScheme {
    pub fn new(name: &'static str, palette: Palette, inside: Rgb) -> Self {
        Self {
            name,
            palette,
            inside,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Color for non-escaping points.
    pub fn inside(&self) -> Rgb {
        self.inside
    }

    /// Map a smooth escape value to a color.
    ///
    /// `floor(ν)` picks the ring position (Euclidean modulo, so negative `ν`
    /// wraps too) and the fractional part blends towards the next entry.
    #[inline]
    pub fn resolve(&self, nu: f64) -> Result<Rgb, RenderError> {
        let whole = nu.floor();
        let t = nu - whole;
        let k = (whole as i64).rem_euclid(PALETTE_SIZE as i64) as usize;
        self.palette.resolve(k, t)
    }

    /// Color for a kernel result.
    #[inline]
    pub fn color(&self, escape: Escape) -> Result<Rgb, RenderError> {
        match escape.smooth() {
            Some(nu) => self.resolve(nu),
            None => Ok(self.inside),
        }
    }
}

/// Linear interpolation `(1 − t)·c1 + t·c2` per channel.
///
/// `t` outside `[0, 1]` (or NaN) is a caller bug and is reported rather
/// than producing a color.
#[inline]
pub fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Result<Rgb, RenderError> {
    if !(0.0..=1.0).contains(&t) {
        return Err(RenderError::Interpolation { t });
    }
    let inv = 1.0 - t;
    Ok([
        (inv * c1[0] as f64 + t * c2[0] as f64) as u8,
        (inv * c1[1] as f64 + t * c2[1] as f64) as u8,
        (inv * c1[2] as f64 + t * c2[2] as f64) as u8,
    ])
}

// ---------------------------------------------------------------------------
// Scheme table
// ---------------------------------------------------------------------------

/// The fixed set of color schemes, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct SchemeTable {
    schemes: Vec<ColorScheme>,
}

impl SchemeTable {
    pub fn builtin() -> Self {
        Self {
            schemes: builtin_schemes(),
        }
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Scheme at `index`; out-of-range indices are rejected.
    pub fn get(&self, index: usize) -> Result<&ColorScheme, RenderError> {
        self.schemes.get(index).ok_or(RenderError::UnknownScheme {
            index,
            count: self.schemes.len(),
        })
    }

    /// Index after `index`, wrapping to 0.
    pub fn next_index(&self, index: usize) -> usize {
        if self.schemes.is_empty() {
            return 0;
        }
        (index + 1) % self.schemes.len()
    }

    /// Index before `index`, wrapping to the last scheme.
    pub fn prev_index(&self, index: usize) -> usize {
        match index.checked_sub(1) {
            Some(prev) if prev < self.schemes.len() => prev,
            _ => self.schemes.len().saturating_sub(1),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorScheme> {
        self.schemes.iter()
    }
}

impl Default for SchemeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Builtin schemes
// ---------------------------------------------------------------------------

pub fn builtin_schemes() -> Vec<ColorScheme> {
    vec![
        ColorScheme::new("Spectrum", Palette::Tabulated(spectrum()), [0x00, 0x00, 0x00]),
        ColorScheme::new("Ember", Palette::Tabulated(ember()), [0x00, 0x00, 0x00]),
        ColorScheme::new("Glacier", Palette::Tabulated(glacier()), [0xFF, 0xFF, 0xFF]),
        ColorScheme::new("Red", Palette::SingleChannel(Channel::Red), [0x44, 0x00, 0x00]),
        ColorScheme::new("Green", Palette::SingleChannel(Channel::Green), [0x00, 0x44, 0x00]),
        ColorScheme::new("Blue", Palette::SingleChannel(Channel::Blue), [0x00, 0x00, 0x44]),
        ColorScheme::new("Grey", Palette::SingleChannel(Channel::Grey), [0x44, 0x44, 0x44]),
    ]
}

/// Fill a ramp from four 64-entry segments, each a linear function of the
/// position `i` inside the segment.
fn segmented(segments: [fn(i32) -> [i32; 3]; 4]) -> Box<[Rgb; PALETTE_SIZE]> {
    let mut colors = Box::new([[0u8; 3]; PALETTE_SIZE]);
    for (s, segment) in segments.iter().enumerate() {
        for i in 0..SEGMENT {
            let [r, g, b] = segment(i as i32);
            colors[s * SEGMENT + i] = [r as u8, g as u8, b as u8];
        }
    }
    colors
}

fn spectrum() -> Box<[Rgb; PALETTE_SIZE]> {
    segmented([
        |i| [4 * i, 128 - 2 * i, 255 - 4 * i],
        |i| [255, 4 * i, 0],
        |i| [128 - 2 * i, 255, 4 * i],
        |i| [0, 255 - 4 * i, 4 * i],
    ])
}

fn ember() -> Box<[Rgb; PALETTE_SIZE]> {
    segmented([
        |i| [128 - 2 * i, 255 - 4 * i, 0],
        |i| [4 * i, 0, 0],
        |i| [255, 4 * i, 0],
        |i| [255 - 4 * i, 4 * i, 0],
    ])
}

fn glacier() -> Box<[Rgb; PALETTE_SIZE]> {
    segmented([
        |i| [128 + 2 * i, 4 * i, 255],
        |i| [255 - 4 * i, 255, 255],
        |i| [0, 255 - 4 * i, 255],
        |i| [4 * i, 255 - 4 * i, 255],
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_shape() {
        let table = SchemeTable::builtin();
        assert_eq!(table.len(), 7);
        assert!(table.iter().filter(|s| matches!(s.palette(), Palette::Tabulated(_))).count() >= 3);
        assert_eq!(table.get(0).unwrap().inside(), [0, 0, 0]);
        assert_eq!(table.get(2).unwrap().inside(), [0xFF, 0xFF, 0xFF]);
        assert_eq!(table.get(6).unwrap().inside(), [0x44, 0x44, 0x44]);
    }

    #[test]
    fn tabulated_ramp_values() {
        let spectrum = SchemeTable::builtin().get(0).unwrap().palette().clone();
        assert_eq!(spectrum.entry(0), [0, 128, 255]);
        assert_eq!(spectrum.entry(63), [252, 2, 3]);
        assert_eq!(spectrum.entry(64), [255, 0, 0]);
        assert_eq!(spectrum.entry(255), [0, 3, 252]);
        // Ring wraps.
        assert_eq!(spectrum.entry(256), spectrum.entry(0));
    }

    #[test]
    fn single_channel_synthesizes_from_index() {
        assert_eq!(Palette::SingleChannel(Channel::Red).entry(7), [7, 0, 0]);
        assert_eq!(Palette::SingleChannel(Channel::Green).entry(255), [0, 255, 0]);
        assert_eq!(Palette::SingleChannel(Channel::Blue).entry(256), [0, 0, 0]);
        assert_eq!(Palette::SingleChannel(Channel::Grey).entry(9), [9, 9, 9]);
    }

    #[test]
    fn lerp_endpoints_are_exact() {
        let c1 = [10, 200, 33];
        let c2 = [250, 1, 128];
        assert_eq!(lerp_color(c1, c2, 0.0).unwrap(), c1);
        assert_eq!(lerp_color(c1, c2, 1.0).unwrap(), c2);
        assert_eq!(lerp_color([0, 0, 0], [200, 100, 50], 0.5).unwrap(), [100, 50, 25]);
    }

    #[test]
    fn lerp_rejects_out_of_range() {
        for t in [-0.001, 1.0001, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                lerp_color([0; 3], [255; 3], t),
                Err(RenderError::Interpolation { .. })
            ));
        }
    }

    #[test]
    fn resolve_wraps_last_entry_to_first() {
        let grey = ColorScheme::new("g", Palette::SingleChannel(Channel::Grey), [0; 3]);
        // k = 255, k + 1 wraps to 0; halfway is 127.5 → 127.
        assert_eq!(grey.resolve(255.5).unwrap(), [127, 127, 127]);
        assert_eq!(grey.resolve(256.0).unwrap(), [0, 0, 0]);
        assert_eq!(grey.resolve(513.0).unwrap(), [1, 1, 1]);
    }

    #[test]
    fn resolve_negative_smooth_value() {
        let red = ColorScheme::new("r", Palette::SingleChannel(Channel::Red), [0; 3]);
        // floor(-0.75) = -1 → 255, blending 25 % of the way to entry 0.
        assert_eq!(red.resolve(-0.75).unwrap(), [191, 0, 0]);
    }

    #[test]
    fn resolve_rejects_non_finite() {
        let table = SchemeTable::builtin();
        assert!(table.get(0).unwrap().resolve(f64::NAN).is_err());
        assert!(table.get(0).unwrap().resolve(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn inside_points_use_inside_color() {
        for scheme in SchemeTable::builtin().iter() {
            assert_eq!(scheme.color(Escape::Inside).unwrap(), scheme.inside());
        }
    }

    #[test]
    fn unknown_scheme_rejected() {
        let table = SchemeTable::builtin();
        assert!(matches!(
            table.get(7),
            Err(RenderError::UnknownScheme { index: 7, count: 7 })
        ));
    }

    #[test]
    fn scheme_cycling_wraps() {
        let table = SchemeTable::builtin();
        assert_eq!(table.next_index(5), 6);
        assert_eq!(table.next_index(6), 0);
        assert_eq!(table.prev_index(0), 6);
        assert_eq!(table.prev_index(3), 2);
        assert_eq!(table.prev_index(99), 6);
    }
}
