//! Collaborator trait definitions

use anyhow::Result;

/// Looks up the display title of a remote playlist
pub trait TitleResolver {
    fn resolve_title(&self, playlist_url: &str) -> Result<String>;
}

/// Lists the items of a remote playlist
pub trait ItemEnumerator {
    /// One JSON record per item, in playlist order
    fn enumerate(&self, playlist_url: &str) -> Result<Vec<String>>;
}

/// Downloads media, thumbnail and metadata for playlist items
///
/// `output_template` is the downloader's output path template, already
/// rooted in the playlist's backup directory.
pub trait Fetcher {
    /// Download every item of the playlist
    fn fetch_playlist(&self, playlist_url: &str, output_template: &str) -> Result<()>;

    /// Download exactly the given item URLs
    fn fetch_items(&self, item_urls: &[String], output_template: &str) -> Result<()>;
}

/// Everything the reconciler needs from the outside world
pub trait PlaylistSource: TitleResolver + ItemEnumerator + Fetcher {}

impl<T: TitleResolver + ItemEnumerator + Fetcher> PlaylistSource for T {}
