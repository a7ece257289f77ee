//! The user-visible playlist: an ordered, dense list of track references.

mod store;

pub use store::{Edit, PlaylistStore};
