use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use zmand_core::ViewState;

/// Persistent controller settings, stored as JSON next to the executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub scheme: usize,
    #[serde(default)]
    pub blur: bool,
    /// A pan moves the view by `1 / movement_factor` of its extent.
    #[serde(default = "default_movement_factor")]
    pub movement_factor: f64,
    /// Span multiplier for one zoom-in step, in `(0, 1)`.
    #[serde(default = "default_zoom_factor")]
    pub zoom_factor: f64,
    #[serde(default = "default_true")]
    pub restore_last_view: bool,
    #[serde(default)]
    pub last_view: Option<ViewState>,
}

fn default_width() -> u32 {
    500
}
fn default_height() -> u32 {
    400
}
fn default_workers() -> usize {
    1
}
fn default_movement_factor() -> f64 {
    ViewState::MOVEMENT_FACTOR
}
fn default_zoom_factor() -> f64 {
    ViewState::ZOOM_FACTOR
}
fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            workers: default_workers(),
            scheme: 0,
            blur: false,
            movement_factor: default_movement_factor(),
            zoom_factor: default_zoom_factor(),
            restore_last_view: true,
            last_view: None,
        }
    }
}

impl Preferences {
    /// Load preferences from beside the executable, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load preferences from `path`. Read or parse failures are logged and
    /// yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("No preferences file at {}", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Preferences>(&json) {
                Ok(prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    return prefs;
                }
                Err(e) => error!("Failed to parse preferences: {e}"),
            },
            Err(e) => error!("Failed to read preferences file: {e}"),
        }
        Self::default()
    }

    /// The view to start from: the saved one if enabled and still valid.
    pub fn initial_view(&self) -> Option<ViewState> {
        if !self.restore_last_view {
            return None;
        }
        self.last_view.filter(|v| match v.validate() {
            Ok(()) => true,
            Err(e) => {
                error!("Ignoring saved view: {e}");
                false
            }
        })
    }

    /// Persist preferences beside the executable.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences to {}", path.display());
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }
}

/// `zmand.json` in the executable's directory, or the working directory
/// when the executable path is unavailable.
fn config_path() -> PathBuf {
    let dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join("zmand.json")
}
