use std::path::Path;

use super::model::TrackMetadata;

fn file_display_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Label shown for the playlist entry at 0-based `index`.
///
/// `"<n>. <artist> - <title>"` when both tags exist, `"<n>. <title>"` with only
/// a title, otherwise `"<n>. <file name>"`.
pub fn playlist_label(index: usize, path: &Path, md: &TrackMetadata) -> String {
    let n = index + 1;
    match (md.title.as_deref(), md.artist.as_deref()) {
        (Some(title), Some(artist)) => format!("{n}. {artist} - {title}"),
        (Some(title), None) => format!("{n}. {title}"),
        _ => format!("{n}. {}", file_display_name(path)),
    }
}

/// Secondary line for the now-playing view: `"<artist> - <album>"`.
pub fn details_line(md: &TrackMetadata) -> String {
    match (md.artist.as_deref(), md.album.as_deref()) {
        (Some(artist), Some(album)) => format!("{artist} - {album}"),
        (Some(artist), None) => artist.to_string(),
        _ => String::new(),
    }
}

/// Format seconds as `mm:ss`, or `h:mm:ss` past the hour.
///
/// Zero, negative and non-finite values render as `00:00`.
pub fn to_hhmmss(seconds: f64) -> String {
    if !seconds.is_normal() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total = seconds as u64;
    let h = total / 3600;
    let m = (total / 60) % 60;
    let s = total % 60;

    if h != 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
