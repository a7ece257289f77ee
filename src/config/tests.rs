use super::load::{default_config_path, default_session_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_nmp_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("NMP_CONFIG_PATH", "/tmp/nmp-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/nmp-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("nmp")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("nmp")
            .join("config.toml")
    );
}

#[test]
fn default_session_path_uses_xdg_state_home_then_local_state() {
    let _lock = env_lock();
    {
        let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");
        assert_eq!(
            default_session_path().unwrap(),
            std::path::PathBuf::from("/tmp/xdg-state/nmp/session.toml")
        );
    }
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_session_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/nmp/session.toml")
    );
}

#[test]
fn defaults_match_supported_formats_and_policy() {
    let s = Settings::default();
    assert_eq!(s.library.extensions, vec!["wav", "mp2", "mp3", "m4a"]);
    assert_eq!(s.playback.on_remove_current, RemoveCurrentPolicy::KeepPlaying);
    assert_eq!(s.playback.position_poll_ms, 1000);
    assert!(s.session.persist);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file_and_parse_policy_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 0.5
crossfade_ms = 120
crossfade_steps = 3
quit_fade_out_ms = 0

[library]
extensions = ["mp3", "flac"]
recursive = false
include_hidden = true
follow_links = false
max_depth = 3

[playback]
on_remove_current = "paused"
previous_restart_secs = 2.5
position_poll_ms = 250

[session]
path = "/tmp/nmp-session.toml"
persist = false

[log]
filter = "nmp=debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("NMP_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("NMP__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 0.5);
    assert_eq!(s.audio.crossfade_ms, 120);
    assert_eq!(s.audio.crossfade_steps, 3);
    assert_eq!(s.audio.quit_fade_out_ms, 0);
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "flac".to_string()]);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.max_depth, Some(3));
    assert_eq!(s.playback.on_remove_current, RemoveCurrentPolicy::Pause);
    assert_eq!(s.playback.previous_restart_secs, 2.5);
    assert_eq!(s.playback.position_poll_ms, 250);
    assert_eq!(
        s.session_path(),
        Some(std::path::PathBuf::from("/tmp/nmp-session.toml"))
    );
    assert!(!s.session.persist);
    assert_eq!(s.log.filter, "nmp=debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
position_poll_ms = 1000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("NMP_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("NMP__PLAYBACK__POSITION_POLL_MS", "500");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.position_poll_ms, 500);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.audio.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.position_poll_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.crossfade_steps = 0;
    assert!(s.validate().is_err());
}
