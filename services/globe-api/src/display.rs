//! Headless display detection.
//!
//! Checked once at startup. A missing display never blocks rendering; it only
//! produces an advisory that each session sees once.

use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

const X11_SOCKET_DIR: &str = "/tmp/.X11-unix";

pub const HEADLESS_ADVISORY: &str =
    "No display server detected; scenes are prepared off-screen and previews are software rendered.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Available,
    Headless,
}

impl DisplayStatus {
    /// Inspect `DISPLAY` and the X socket directory.
    pub fn detect() -> Self {
        let status = Self::detect_with(std::env::var("DISPLAY").ok(), Path::new(X11_SOCKET_DIR));
        match status {
            DisplayStatus::Available => info!("Display server available"),
            DisplayStatus::Headless => warn!("Running headless"),
        }
        status
    }

    pub fn detect_with(display_var: Option<String>, socket_dir: &Path) -> Self {
        if display_var.is_some_and(|d| !d.trim().is_empty()) {
            return DisplayStatus::Available;
        }

        let has_socket = std::fs::read_dir(socket_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .any(|e| e.file_name().to_string_lossy().starts_with('X'))
            })
            .unwrap_or(false);

        if has_socket {
            DisplayStatus::Available
        } else {
            DisplayStatus::Headless
        }
    }

    pub fn advisory(&self) -> Option<&'static str> {
        match self {
            DisplayStatus::Available => None,
            DisplayStatus::Headless => Some(HEADLESS_ADVISORY),
        }
    }
}
