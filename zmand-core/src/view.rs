use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::escape;

/// Pan direction on screen. Up moves the view towards smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A pixel position on the target raster, `(0, 0)` at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The visible rectangle of the complex plane.
///
/// `span` is the height of the rectangle in plane units; its width is
/// `span * aspect_ratio`. Screen coordinates map onto the plane with the
/// screen *height* as the scaling reference for both axes, which keeps
/// pixels square:
///
/// ```text
/// plane = min + screen * span / screen_height
/// ```
///
/// The state is `Copy` so a render call can snapshot it before dispatching
/// workers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub min_x: f64,
    pub min_y: f64,
    pub span: f64,
    pub aspect_ratio: f64,
}

impl ViewState {
    pub const INITIAL_MIN_X: f64 = -2.4;
    pub const INITIAL_MIN_Y: f64 = -1.5;
    pub const INITIAL_SPAN: f64 = 3.0;
    /// 500×400 start-up frame.
    pub const DEFAULT_ASPECT_RATIO: f64 = 1.25;
    /// A pan moves the view by `1 / MOVEMENT_FACTOR` of its extent.
    pub const MOVEMENT_FACTOR: f64 = 8.0;
    pub const ZOOM_FACTOR: f64 = 0.2;
    /// Largest coordinate magnitude a view may reach. Beyond roughly 1.3e154
    /// `|c|²` overflows and the smooth value is no longer finite.
    pub const MAX_EXTENT: f64 = 1e150;

    /// Initial view for a frame with the given aspect ratio.
    pub fn new(aspect_ratio: f64) -> crate::Result<Self> {
        Self::with_bounds(
            Self::INITIAL_MIN_X,
            Self::INITIAL_MIN_Y,
            Self::INITIAL_SPAN,
            aspect_ratio,
        )
    }

    /// Initial view sized for a `width`×`height` frame.
    pub fn for_frame(width: u32, height: u32) -> crate::Result<Self> {
        Self::new(frame_aspect(width, height)?)
    }

    /// Create a view with explicit bounds.
    pub fn with_bounds(min_x: f64, min_y: f64, span: f64, aspect_ratio: f64) -> crate::Result<Self> {
        let view = Self {
            min_x,
            min_y,
            span,
            aspect_ratio,
        };
        view.validate()?;
        Ok(view)
    }

    /// Check the `span > 0` / `aspect_ratio > 0` invariants and that every
    /// edge lies within [`MAX_EXTENT`](Self::MAX_EXTENT).
    ///
    /// Useful for states that bypassed the constructors, e.g. deserialized ones.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.min_x.is_finite() || !self.min_y.is_finite() {
            return Err(CoreError::InvalidViewState {
                reason: format!("origin must be finite, got ({}, {})", self.min_x, self.min_y),
            });
        }
        check_span(self.span)?;
        if self.aspect_ratio <= 0.0 || !self.aspect_ratio.is_finite() {
            return Err(CoreError::InvalidViewState {
                reason: format!("aspect ratio must be positive and finite, got {}", self.aspect_ratio),
            });
        }
        let edges = [self.min_x, self.max_x(), self.min_y, self.max_y()];
        if edges.iter().any(|e| !(e.abs() <= Self::MAX_EXTENT)) {
            return Err(CoreError::InvalidViewState {
                reason: format!(
                    "view ({}, {}) to ({}, {}) exceeds ±{:e}",
                    self.min_x,
                    self.min_y,
                    self.max_x(),
                    self.max_y(),
                    Self::MAX_EXTENT
                ),
            });
        }
        Ok(())
    }

    /// Width of the visible rectangle in plane units.
    #[inline]
    pub fn width_extent(&self) -> f64 {
        self.span * self.aspect_ratio
    }

    /// Right edge of the visible rectangle.
    pub fn max_x(&self) -> f64 {
        self.min_x + self.width_extent()
    }

    /// Bottom edge of the visible rectangle.
    pub fn max_y(&self) -> f64 {
        self.min_y + self.span
    }

    /// Magnification relative to the initial view.
    pub fn zoom(&self) -> f64 {
        Self::INITIAL_SPAN / self.span
    }

    /// See [`escape::precision`].
    pub fn precision(&self) -> f64 {
        escape::precision(self.span)
    }

    /// See [`escape::max_iterations`].
    pub fn max_iterations(&self, palette_size: usize) -> u32 {
        escape::max_iterations(palette_size, self.precision())
    }

    /// Plane units per pixel on a raster `screen_height` pixels tall.
    #[inline]
    pub fn plane_scale(&self, screen_height: u32) -> f64 {
        self.span / screen_height as f64
    }

    /// Map a (possibly fractional) screen coordinate to the plane.
    #[inline]
    pub fn screen_to_plane(&self, sx: f64, sy: f64, screen_height: u32) -> (f64, f64) {
        let scale = self.plane_scale(screen_height);
        (self.min_x + sx * scale, self.min_y + sy * scale)
    }

    /// Recompute the aspect ratio after the frame was resized.
    pub fn set_frame(&mut self, width: u32, height: u32) -> crate::Result<()> {
        self.commit(Self {
            aspect_ratio: frame_aspect(width, height)?,
            ..*self
        })
    }

    /// Replace `self` with `next` if it is a valid view.
    fn commit(&mut self, next: Self) -> crate::Result<()> {
        next.validate()?;
        *self = next;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transforms
    // -----------------------------------------------------------------------

    /// Pan by the default movement factor.
    pub fn pan(&mut self, direction: Direction) -> crate::Result<()> {
        self.pan_by(direction, Self::MOVEMENT_FACTOR)
    }

    /// Shift the view by `extent / movement_factor` in `direction`.
    pub fn pan_by(&mut self, direction: Direction, movement_factor: f64) -> crate::Result<()> {
        if movement_factor <= 0.0 || !movement_factor.is_finite() {
            return Err(CoreError::InvalidMovementFactor(movement_factor));
        }
        let mut next = *self;
        match direction {
            Direction::Up => next.min_y -= self.span / movement_factor,
            Direction::Down => next.min_y += self.span / movement_factor,
            Direction::Left => next.min_x -= self.width_extent() / movement_factor,
            Direction::Right => next.min_x += self.width_extent() / movement_factor,
        }
        self.commit(next)
    }

    /// Zoom towards the centre, scaling `span` by `factor ∈ (0, 1)`.
    pub fn zoom_in(&mut self, factor: f64) -> crate::Result<()> {
        check_zoom_factor(factor)?;
        // Recentering offsets use the pre-scale span.
        self.commit(Self {
            min_x: self.min_x + (1.0 - factor) * self.width_extent() / 2.0,
            min_y: self.min_y + (1.0 - factor) * self.span / 2.0,
            span: self.span * factor,
            ..*self
        })
    }

    /// Inverse of [`zoom_in`](Self::zoom_in) for the same `factor`.
    ///
    /// Fails with [`CoreError::InvalidViewState`] once the view would leave
    /// the renderable region (see [`MAX_EXTENT`](Self::MAX_EXTENT)).
    pub fn zoom_out(&mut self, factor: f64) -> crate::Result<()> {
        check_zoom_factor(factor)?;
        self.commit(Self {
            min_x: self.min_x + self.width_extent() * (1.0 - 1.0 / factor) / 2.0,
            min_y: self.min_y + self.span * (1.0 - 1.0 / factor) / 2.0,
            span: self.span / factor,
            ..*self
        })
    }

    /// Zoom onto the rectangle with opposite corners `a` and `b`.
    ///
    /// The shorter side (after normalising by the aspect ratio) is expanded
    /// around the rectangle centre so the new view keeps `aspect_ratio`.
    pub fn drag_zoom(&mut self, a: ScreenPoint, b: ScreenPoint, screen_height: u32) -> crate::Result<()> {
        check_screen_height(screen_height)?;
        let dx = (b.x as f64 - a.x as f64).abs();
        let dy = (b.y as f64 - a.y as f64).abs();
        if dx == 0.0 || dy == 0.0 {
            return Err(CoreError::DegenerateDragRect { dx, dy });
        }

        let height_px = dy.max(dx / self.aspect_ratio);
        let width_px = height_px * self.aspect_ratio;
        let cx = (a.x as f64 + b.x as f64) / 2.0;
        let cy = (a.y as f64 + b.y as f64) / 2.0;

        self.zoom_to_pixels(cx - width_px / 2.0, cy - height_px / 2.0, height_px, screen_height)
    }

    /// Zoom onto a rectangle centred on `center` whose half-height is the
    /// vertical distance to `edge`.
    pub fn drag_zoom_centered(
        &mut self,
        center: ScreenPoint,
        edge: ScreenPoint,
        screen_height: u32,
    ) -> crate::Result<()> {
        check_screen_height(screen_height)?;
        let half_h = (edge.y as f64 - center.y as f64).abs();
        if half_h == 0.0 {
            return Err(CoreError::DegenerateDragRect {
                dx: (edge.x as f64 - center.x as f64).abs() * 2.0,
                dy: 0.0,
            });
        }
        let half_w = half_h * self.aspect_ratio;

        self.zoom_to_pixels(
            center.x as f64 - half_w,
            center.y as f64 - half_h,
            2.0 * half_h,
            screen_height,
        )
    }

    fn zoom_to_pixels(&mut self, left: f64, top: f64, height_px: f64, screen_height: u32) -> crate::Result<()> {
        let scale = self.plane_scale(screen_height);
        self.commit(Self {
            min_x: self.min_x + left * scale,
            min_y: self.min_y + top * scale,
            span: height_px * scale,
            ..*self
        })?;
        debug!(min_x = self.min_x, min_y = self.min_y, span = self.span, "Drag zoom");
        Ok(())
    }

    /// Restore the initial bounds, keeping the current aspect ratio.
    pub fn reset(&mut self) {
        self.min_x = Self::INITIAL_MIN_X;
        self.min_y = Self::INITIAL_MIN_Y;
        self.span = Self::INITIAL_SPAN;
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            min_x: Self::INITIAL_MIN_X,
            min_y: Self::INITIAL_MIN_Y,
            span: Self::INITIAL_SPAN,
            aspect_ratio: Self::DEFAULT_ASPECT_RATIO,
        }
    }
}

fn frame_aspect(width: u32, height: u32) -> crate::Result<f64> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidViewState {
            reason: format!("frame dimensions must be > 0, got {width}×{height}"),
        });
    }
    Ok(width as f64 / height as f64)
}

fn check_span(span: f64) -> crate::Result<()> {
    if span <= 0.0 || !span.is_finite() {
        return Err(CoreError::InvalidViewState {
            reason: format!("span must be positive and finite, got {span}"),
        });
    }
    Ok(())
}

fn check_zoom_factor(factor: f64) -> crate::Result<()> {
    // Written so that NaN is rejected too.
    if !(factor > 0.0 && factor < 1.0) {
        return Err(CoreError::InvalidZoomFactor(factor));
    }
    Ok(())
}

fn check_screen_height(screen_height: u32) -> crate::Result<()> {
    if screen_height == 0 {
        return Err(CoreError::InvalidScreenHeight(screen_height));
    }
    Ok(())
}
