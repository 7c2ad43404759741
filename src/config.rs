/// Application settings
///
/// Settings live in a JSON file in the user's config directory:
/// - Linux: ~/.config/room-compare/settings.json
/// - macOS: ~/Library/Application Support/room-compare/settings.json
/// - Windows: %APPDATA%\room-compare\settings.json
///
/// A missing file means defaults. Command line flags override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Size of the frame anomaly coordinates are expressed in
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    pub width: f32,
    pub height: f32,
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Delay before moving to the next room after a classification
    pub auto_advance_ms: u64,
    /// Simulated PDF generation time
    pub pdf_delay_ms: u64,
    /// Simulated e-mail sending time
    pub email_delay_ms: u64,
    /// Data set to open at startup (demo data when unset)
    pub dataset: Option<PathBuf>,
    /// tracing filter directive, e.g. "info" or "room_compare=debug"
    pub log_filter: String,
    /// Pixel frame of anomaly coordinates; `None` means normalized coordinates
    pub overlay_reference: Option<ReferenceFrame>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_advance_ms: 500,
            pdf_delay_ms: 2000,
            email_delay_ms: 1500,
            dataset: None,
            log_filter: "info".to_string(),
            overlay_reference: Some(ReferenceFrame::default()),
        }
    }
}

impl Settings {
    /// Get the path where the settings file is expected
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("room-compare");
        path.push("settings.json");
        Some(path)
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `path`, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_ms)
    }

    pub fn pdf_delay(&self) -> Duration {
        Duration::from_millis(self.pdf_delay_ms)
    }

    pub fn email_delay(&self) -> Duration {
        Duration::from_millis(self.email_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json")).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.auto_advance_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "auto_advance_ms": 250, "overlay_reference": null }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.auto_advance_ms, 250);
        assert_eq!(settings.overlay_reference, None);
        assert_eq!(settings.pdf_delay_ms, 2000);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ auto_advance_ms: ").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
