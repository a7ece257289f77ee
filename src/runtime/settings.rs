use std::path::PathBuf;

use crate::config;

/// Load settings, falling back to defaults when the file is unreadable or
/// invalid. The second value is a warning to log once logging is set up.
pub fn load_settings(path: Option<PathBuf>) -> (config::Settings, Option<String>) {
    match config::Settings::load_from(path) {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        // Config is optional; failures should not prevent the player from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}
