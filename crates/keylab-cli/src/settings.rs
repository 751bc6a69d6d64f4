//! Session configuration lookup.
//!
//! An explicit `--config` path wins. Otherwise the user config directory is
//! checked for `keylab/session.json`, and built-in defaults apply when that
//! file does not exist.

use anyhow::{Context, Result};
use keylab_synth::SessionConfig;
use log::debug;
use std::path::{Path, PathBuf};

/// File name of the session configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "session.json";

/// Get the default configuration path (XDG-compatible)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("keylab").join(CONFIG_FILE_NAME))
}

/// Loads the session configuration.
///
/// # Arguments
/// * `explicit` - Path given on the command line, which must exist
pub fn load_session_config(explicit: Option<&Path>) -> Result<SessionConfig> {
    if let Some(path) = explicit {
        return load_from(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => load_from(&path),
        _ => {
            debug!("no session config found, using defaults");
            Ok(SessionConfig::default())
        }
    }
}

fn load_from(path: &Path) -> Result<SessionConfig> {
    debug!("loading session config from {}", path.display());
    SessionConfig::load(path)
        .with_context(|| format!("Failed to load session config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_path_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"instrument": "Organ", "octave_shift": -1}"#).unwrap();

        let config = load_session_config(Some(&path)).unwrap();
        assert_eq!(config.instrument, "Organ");
        assert_eq!(config.octave_shift, -1);
        assert_eq!(config.volume, SessionConfig::default().volume);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_session_config(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"volume": 4.0}"#).unwrap();
        assert!(load_session_config(Some(&path)).is_err());
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("keylab/session.json"));
        }
    }
}
