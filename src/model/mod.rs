//! Format-independent data model for mirrored playlists
//!
//! Items arrive as line-delimited JSON from the downloader and are kept
//! alongside their raw serialization so they can be replayed verbatim
//! into a manifest.

mod index;
mod item;
mod snapshot;

pub use index::{IndexEntry, TitleIndex};
pub use item::ItemRecord;
pub use snapshot::Snapshot;
