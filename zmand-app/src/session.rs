//! The render context: every piece of state a frame depends on, owned by
//! the controller and threaded through each command and render call.

use tracing::{debug, info};

use zmand_core::{Direction, ViewState};
use zmand_render::{render, ExportMetadata, PixelBuffer, RenderError, RenderResult, SchemeTable};

use crate::command::Command;
use crate::error::AppError;
use crate::preferences::Preferences;

pub struct Session {
    view: ViewState,
    schemes: SchemeTable,
    scheme: usize,
    workers: usize,
    blur: bool,
    movement_factor: f64,
    zoom_factor: f64,
    frame: PixelBuffer,
}

impl Session {
    /// Build a session from preferences. Invalid settings are rejected up
    /// front rather than at the first render.
    pub fn new(prefs: &Preferences) -> Result<Self, AppError> {
        let schemes = SchemeTable::builtin();
        schemes.get(prefs.scheme)?;
        if prefs.workers == 0 {
            return Err(RenderError::InvalidWorkerCount(0).into());
        }

        let mut view = ViewState::for_frame(prefs.width, prefs.height)?;
        if let Some(saved) = prefs.initial_view() {
            view = ViewState::with_bounds(saved.min_x, saved.min_y, saved.span, view.aspect_ratio)?;
        }
        // Probe the factors once so a bad config fails here, not mid-script.
        let mut probe = view;
        probe.pan_by(Direction::Up, prefs.movement_factor)?;
        probe.zoom_in(prefs.zoom_factor)?;

        Ok(Self {
            view,
            schemes,
            scheme: prefs.scheme,
            workers: prefs.workers,
            blur: prefs.blur,
            movement_factor: prefs.movement_factor,
            zoom_factor: prefs.zoom_factor,
            frame: PixelBuffer::new(prefs.width, prefs.height)?,
        })
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn scheme_index(&self) -> usize {
        self.scheme
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn blur(&self) -> bool {
        self.blur
    }

    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    /// Apply one command. On error the session is left unchanged.
    pub fn apply(&mut self, command: Command) -> Result<(), AppError> {
        let height = self.frame.height();
        match command {
            Command::Pan(direction) => self.view.pan_by(direction, self.movement_factor)?,
            Command::ZoomIn => self.view.zoom_in(self.zoom_factor)?,
            Command::ZoomOut => self.view.zoom_out(self.zoom_factor)?,
            Command::ResetView => self.view.reset(),
            Command::NextScheme => self.scheme = self.schemes.next_index(self.scheme),
            Command::PrevScheme => self.scheme = self.schemes.prev_index(self.scheme),
            Command::ResetScheme => self.scheme = 0,
            Command::ToggleBlur => self.blur = !self.blur,
            Command::MoreWorkers => self.workers += 1,
            Command::FewerWorkers => self.workers = self.workers.saturating_sub(1).max(1),
            Command::Drag { a, b } => self.view.drag_zoom(a, b, height)?,
            Command::DragCentered { center, edge } => self.view.drag_zoom_centered(center, edge, height)?,
            Command::Resize { width, height } => self.resize(width, height)?,
        }
        debug!(?command, scheme = self.scheme, workers = self.workers, "Applied command");
        Ok(())
    }

    /// Resize the frame. The view keeps its origin and span; only the
    /// aspect ratio follows the new frame.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), AppError> {
        let frame = PixelBuffer::new(width, height)?;
        self.view.set_frame(width, height)?;
        self.frame = frame;
        Ok(())
    }

    /// Render the current view into the session frame, blurring if enabled.
    pub fn render(&mut self) -> Result<RenderResult, AppError> {
        let scheme = self.schemes.get(self.scheme)?;
        let (width, height) = (self.frame.width(), self.frame.height());
        let result = render(&self.view, scheme, self.workers, width, height, &mut self.frame)?;
        if self.blur {
            self.frame.blur()?;
        }
        Ok(result)
    }

    /// Render the current view at an arbitrary resolution into a fresh
    /// buffer, leaving the session frame alone.
    pub fn screenshot(&self, width: u32, height: u32, blur: bool) -> Result<(PixelBuffer, RenderResult), AppError> {
        let scheme = self.schemes.get(self.scheme)?;
        let mut shot = PixelBuffer::new(width, height)?;
        let result = render(&self.view, scheme, self.workers, width, height, &mut shot)?;
        if blur {
            shot.blur()?;
        }
        Ok((shot, result))
    }

    pub fn export_metadata(&self, result: &RenderResult, blurred: bool) -> ExportMetadata {
        ExportMetadata {
            view: self.view,
            scheme_name: self
                .schemes
                .get(self.scheme)
                .map(|s| s.name.to_string())
                .unwrap_or_default(),
            max_iterations: result.max_iterations,
            precision: result.precision,
            blurred,
        }
    }

    /// Log the corner coordinates, zoom, precision and worker count.
    pub fn log_status(&self, result: &RenderResult) {
        let v = &self.view;
        info!(
            top_left = format!("({:+1.16}, {:+1.16})", v.min_x, v.min_y),
            bottom_right = format!("({:+1.16}, {:+1.16})", v.max_x(), v.max_y()),
            zoom = format!("{:e}", v.zoom()),
            precision = result.precision,
            max_iterations = result.max_iterations,
            threads = self.workers,
            "View"
        );
    }

    /// Write the session state back into `prefs`.
    pub fn store(&self, prefs: &mut Preferences) {
        prefs.width = self.frame.width();
        prefs.height = self.frame.height();
        prefs.workers = self.workers;
        prefs.scheme = self.scheme;
        prefs.blur = self.blur;
        prefs.last_view = Some(self.view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_script;
    use zmand_core::ScreenPoint;
    use zmand_render::pack_rgba;

    fn session() -> Session {
        Session::new(&Preferences {
            width: 40,
            height: 32,
            ..Preferences::default()
        })
        .unwrap()
    }

    #[test]
    fn new_session_uses_initial_view() {
        let s = session();
        assert_eq!(s.view(), &ViewState::default());
        assert_eq!(s.workers(), 1);
        assert_eq!(s.scheme_index(), 0);
    }

    #[test]
    fn rejects_bad_preferences() {
        let bad = [
            Preferences { workers: 0, ..Preferences::default() },
            Preferences { scheme: 7, ..Preferences::default() },
            Preferences { zoom_factor: 1.5, ..Preferences::default() },
            Preferences { movement_factor: 0.0, ..Preferences::default() },
            Preferences { width: 0, ..Preferences::default() },
        ];
        for prefs in bad {
            assert!(Session::new(&prefs).is_err(), "{prefs:?}");
        }
    }

    #[test]
    fn restores_saved_view_with_current_aspect() {
        let saved = ViewState::with_bounds(-0.8, 0.1, 0.05, 2.0).unwrap();
        let s = Session::new(&Preferences {
            last_view: Some(saved),
            ..Preferences::default()
        })
        .unwrap();
        assert_eq!(s.view().span, 0.05);
        assert_eq!(s.view().aspect_ratio, 1.25);
    }

    #[test]
    fn scheme_and_worker_controls() {
        let mut s = session();
        for cmd in parse_script("c c x").unwrap() {
            s.apply(cmd).unwrap();
        }
        assert_eq!(s.scheme_index(), 6);
        s.apply(Command::ResetScheme).unwrap();
        assert_eq!(s.scheme_index(), 0);

        s.apply(Command::FewerWorkers).unwrap();
        assert_eq!(s.workers(), 1);
        s.apply(Command::MoreWorkers).unwrap();
        s.apply(Command::MoreWorkers).unwrap();
        assert_eq!(s.workers(), 3);
    }

    #[test]
    fn navigation_round_trip() {
        let mut s = session();
        for cmd in parse_script("a w q q z z d s").unwrap() {
            s.apply(cmd).unwrap();
        }
        let v = s.view();
        let d = ViewState::default();
        assert!((v.min_x - d.min_x).abs() < 1e-12);
        assert!((v.min_y - d.min_y).abs() < 1e-12);
        assert!((v.span - d.span).abs() < 1e-12);
    }

    #[test]
    fn degenerate_drag_leaves_session_unchanged() {
        let mut s = session();
        let p = ScreenPoint::new(5, 5);
        assert!(s.apply(Command::Drag { a: p, b: p }).is_err());
        assert_eq!(s.view(), &ViewState::default());
    }

    #[test]
    fn zoom_out_limit_keeps_session_renderable() {
        let mut s = session();
        let mut rejected = None;
        for _ in 0..300 {
            if let Err(e) = s.apply(Command::ZoomOut) {
                rejected = Some(e);
                break;
            }
        }
        assert!(matches!(rejected, Some(AppError::Core(_))));
        let view = *s.view();
        s.render().unwrap();
        assert!(s.apply(Command::ZoomOut).is_err());
        assert_eq!(s.view(), &view);
        s.render().unwrap();
    }

    #[test]
    fn resize_updates_frame_and_aspect() {
        let mut s = session();
        s.apply(Command::Resize { width: 64, height: 32 }).unwrap();
        assert_eq!(s.frame().width(), 64);
        assert_eq!(s.view().aspect_ratio, 2.0);
        assert!(s.resize(0, 10).is_err());
        assert_eq!(s.frame().width(), 64);
    }

    #[test]
    fn render_fills_the_frame() {
        let mut s = session();
        s.apply(Command::MoreWorkers).unwrap();
        let result = s.render().unwrap();
        assert_eq!((result.width, result.height), (40, 32));
        assert!(s.frame().pixels().iter().all(|&p| p != 0));

        let inside = pack_rgba([0, 0, 0]);
        assert!(s.frame().pixels().contains(&inside));
    }

    #[test]
    fn blur_toggle_changes_output() {
        let mut plain = session();
        plain.render().unwrap();
        let mut blurred = session();
        blurred.apply(Command::ToggleBlur).unwrap();
        blurred.render().unwrap();
        assert!(blurred.blur());
        assert_ne!(plain.frame(), blurred.frame());
    }

    #[test]
    fn screenshot_uses_requested_size() {
        let s = session();
        let (shot, result) = s.screenshot(16, 9, false).unwrap();
        assert_eq!((shot.width(), shot.height()), (16, 9));
        assert_eq!(result.height, 9);
        assert_eq!(s.frame().width(), 40);
    }

    #[test]
    fn store_writes_back() {
        let mut s = session();
        s.apply(Command::ZoomIn).unwrap();
        let mut prefs = Preferences::default();
        s.store(&mut prefs);
        assert_eq!(prefs.width, 40);
        assert_eq!(prefs.last_view, Some(*s.view()));
    }
}
