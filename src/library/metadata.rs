use std::path::{Path, PathBuf};

use lofty::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use super::model::{Artwork, TrackMetadata};

/// Extensions considered when looking for cover art next to a track.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
/// Case-insensitive substrings that mark an image as cover art.
pub const COVER_ART_KEYWORDS: [&str; 3] = ["cover", "front", "folder"];

fn non_empty(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read embedded tags for `path`. Missing or unreadable tags are not an
/// error; the corresponding fields stay `None`.
///
/// When no embedded picture exists the track's directory is searched for a
/// cover image (see [`find_cover_art`]).
pub fn read_metadata(path: &Path) -> TrackMetadata {
    let mut md = TrackMetadata::default();

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            md.duration = Some(tagged.properties().duration());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                md.title = non_empty(tag.title());
                md.artist = non_empty(tag.artist());
                md.album = non_empty(tag.album());

                if let Some(pic) = tag.pictures().first() {
                    md.artwork = Some(Artwork::Embedded {
                        mime: pic.mime_type().map(|m| m.as_str().to_string()),
                        data: pic.data().to_vec(),
                    });
                }
            }
        }
        Err(e) => debug!(path = %path.display(), error = %e, "no readable tags"),
    }

    if md.artwork.is_none() {
        md.artwork = path.parent().and_then(find_cover_art).map(Artwork::File);
    }

    md
}

fn is_image(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// First image in `dir` (file-name order) whose name contains one of
/// [`COVER_ART_KEYWORDS`], compared case-insensitively.
pub fn find_cover_art(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .find(|e| {
            let name = e.file_name().to_string_lossy();
            if !is_image(&name) {
                return false;
            }
            let lower = name.to_lowercase();
            COVER_ART_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|e| e.into_path())
}
