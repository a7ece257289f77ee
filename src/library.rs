//! Track references and everything the core needs to know about files on
//! disk: metadata, display strings and the filesystem probe.

mod display;
mod metadata;
mod model;
mod scan;

pub use display::{details_line, playlist_label, to_hhmmss};
pub use metadata::{COVER_ART_KEYWORDS, IMAGE_EXTENSIONS, find_cover_art, read_metadata};
pub use model::{Artwork, Track, TrackId, TrackMetadata};
pub use scan::{expand_paths, is_audio_file, resolve_locator};

#[cfg(test)]
mod tests;
