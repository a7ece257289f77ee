use super::*;

fn sample() -> Session {
    Session {
        tracks: vec!["/music/a.mp3".to_string(), "/music/b.wav".to_string()],
        index: Some(1),
    }
}

#[test]
fn toml_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = TomlSessionStore::new(dir.path().join("session.toml"));
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn toml_store_creates_parent_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("nmp").join("session.toml");
    let mut store = TomlSessionStore::new(&path);

    store.save(&sample()).unwrap();
    assert!(path.exists());
    assert_eq!(store.load().unwrap(), Some(sample()));
}

#[test]
fn toml_store_omits_missing_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    let mut store = TomlSessionStore::new(&path);

    let session = Session {
        tracks: vec!["/music/a.mp3".to_string()],
        index: None,
    };
    store.save(&session).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("index"));
    assert_eq!(store.load().unwrap(), Some(session));
}

#[test]
fn toml_store_reports_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    std::fs::write(&path, "tracks = 3").unwrap();

    let err = TomlSessionStore::new(&path).load().unwrap_err();
    assert!(matches!(err, StorageError::Parse(_)));
}

#[test]
fn memory_store_clones_share_state() {
    let store = MemorySessionStore::new();
    let mut writer = store.clone();
    writer.save(&sample()).unwrap();
    assert_eq!(store.saved(), Some(sample()));
}

#[test]
fn null_store_keeps_nothing() {
    let mut store = NullSessionStore;
    store.save(&sample()).unwrap();
    assert_eq!(store.load().unwrap(), None);
}
