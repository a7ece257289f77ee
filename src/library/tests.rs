use super::*;
use crate::config::LibrarySettings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn md(title: Option<&str>, artist: Option<&str>, album: Option<&str>) -> TrackMetadata {
    TrackMetadata {
        title: title.map(Into::into),
        artist: artist.map(Into::into),
        album: album.map(Into::into),
        ..TrackMetadata::default()
    }
}

#[test]
fn label_prefers_artist_dash_title_then_title_then_file_name() {
    let p = Path::new("/music/01 Intro.mp3");
    assert_eq!(
        playlist_label(0, p, &md(Some("Song"), Some("Artist"), None)),
        "1. Artist - Song"
    );
    assert_eq!(playlist_label(4, p, &md(Some("Song"), None, None)), "5. Song");
    assert_eq!(
        playlist_label(9, p, &md(None, Some("Artist"), None)),
        "10. 01 Intro"
    );
}

#[test]
fn details_line_joins_artist_and_album() {
    assert_eq!(details_line(&md(None, Some("A"), Some("B"))), "A - B");
    assert_eq!(details_line(&md(None, Some("A"), None)), "A");
    assert_eq!(details_line(&md(Some("T"), None, Some("B"))), "");
}

#[test]
fn to_hhmmss_pads_minutes_and_seconds() {
    assert_eq!(to_hhmmss(0.0), "00:00");
    assert_eq!(to_hhmmss(f64::NAN), "00:00");
    assert_eq!(to_hhmmss(-3.0), "00:00");
    assert_eq!(to_hhmmss(5.9), "00:05");
    assert_eq!(to_hhmmss(754.0), "12:34");
    assert_eq!(to_hhmmss(3723.0), "1:02:03");
}

#[test]
fn is_audio_file_matches_default_allow_list_case_insensitive() {
    let settings = LibrarySettings::default();
    assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.mp2"), &settings));
    assert!(is_audio_file(Path::new("/tmp/a.m4a"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a.flac"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
    assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
}

#[test]
fn expand_paths_sorts_directory_contents_and_drops_unsupported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("a.wav"), b"not real").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();
    let sub = dir.path().join("disc2");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("c.m4a"), b"not real").unwrap();

    let files = expand_paths(&[dir.path().to_path_buf()], &LibrarySettings::default());
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.wav", "b.mp3", "c.m4a"]);
}

#[test]
fn expand_paths_sorts_files_and_directories_together() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.mp3");
    let b = dir.path().join("b.mp3");
    fs::write(&a, b"x").unwrap();
    fs::write(&b, b"x").unwrap();
    let d1 = dir.path().join("d1");
    let d2 = dir.path().join("d2");
    fs::create_dir_all(&d1).unwrap();
    fs::create_dir_all(&d2).unwrap();
    fs::write(d1.join("x.mp3"), b"x").unwrap();
    fs::write(d2.join("y.mp3"), b"x").unwrap();
    let missing = dir.path().join("gone.mp3");

    let files = expand_paths(&[b, d2, missing, a, d1], &LibrarySettings::default());
    let root = fs::canonicalize(dir.path()).unwrap();
    let relative: Vec<PathBuf> = files
        .iter()
        .map(|p| p.strip_prefix(&root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        relative,
        [
            PathBuf::from("a.mp3"),
            PathBuf::from("b.mp3"),
            PathBuf::from("d1/x.mp3"),
            PathBuf::from("d2/y.mp3"),
        ]
    );
}

#[test]
fn expand_paths_respects_recursive_false_and_hidden() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("root.mp3"), b"x").unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"x").unwrap();

    let settings = LibrarySettings {
        recursive: false,
        ..LibrarySettings::default()
    };
    let files = expand_paths(&[dir.path().to_path_buf()], &settings);
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("root.mp3"));
}

#[test]
fn resolve_locator_requires_existing_supported_file() {
    let dir = tempdir().unwrap();
    let ok = dir.path().join("ok.mp3");
    fs::write(&ok, b"x").unwrap();
    let settings = LibrarySettings::default();

    assert_eq!(resolve_locator(ok.to_str().unwrap(), &settings), Some(ok.clone()));
    assert_eq!(
        resolve_locator(dir.path().join("nope.mp3").to_str().unwrap(), &settings),
        None
    );
    let txt = dir.path().join("x.txt");
    fs::write(&txt, b"x").unwrap();
    assert_eq!(resolve_locator(txt.to_str().unwrap(), &settings), None);
}

#[test]
fn find_cover_art_picks_first_keyword_match_in_name_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("back.jpg"), b"img").unwrap();
    fs::write(dir.path().join("Front.PNG"), b"img").unwrap();
    fs::write(dir.path().join("folder.jpeg"), b"img").unwrap();
    fs::write(dir.path().join("cover.txt"), b"not an image").unwrap();

    let found = find_cover_art(dir.path()).unwrap();
    assert_eq!(found.file_name().unwrap(), "Front.PNG");
}

#[test]
fn find_cover_art_returns_none_without_keyword_images() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("scan.jpg"), b"img").unwrap();
    assert_eq!(find_cover_art(dir.path()), None);
}

#[test]
fn read_metadata_falls_back_to_directory_cover_for_untagged_file() {
    let dir = tempdir().unwrap();
    let track = dir.path().join("song.mp3");
    fs::write(&track, b"not a real mp3").unwrap();
    fs::write(dir.path().join("cover.jpg"), b"img").unwrap();

    let md = read_metadata(&track);
    assert_eq!(md.title, None);
    assert_eq!(md.artist, None);
    assert_eq!(md.artwork, Some(Artwork::File(dir.path().join("cover.jpg"))));
}

#[test]
fn track_ids_are_unique_per_entry_and_same_media_compares_paths() {
    let a = Track::with_metadata(PathBuf::from("/m/a.mp3"), TrackMetadata::default());
    let b = Track::with_metadata(PathBuf::from("/m/a.mp3"), TrackMetadata::default());
    assert_ne!(a.id(), b.id());
    assert_eq!(a.path(), b.path());
    assert_eq!(a.locator(), "/m/a.mp3");
    assert_eq!(a.label(0), "1. a");
}
