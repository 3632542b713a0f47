//! External collaborators: title lookup, item enumeration and fetching
//!
//! The reconciler only talks to these traits, so the real downloader can
//! be swapped for an in-memory fake in tests.

mod traits;
mod ytdlp;

pub use traits::{Fetcher, ItemEnumerator, PlaylistSource, TitleResolver};
pub use ytdlp::{YtDlp, DEFAULT_DOWNLOADER};
