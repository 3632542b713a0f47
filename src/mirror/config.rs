//! Mirror configuration

use crate::source::DEFAULT_DOWNLOADER;
use std::path::PathBuf;

/// Configuration for a mirroring run
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Root directory holding one folder per playlist
    pub backup_root: PathBuf,

    /// Downloader executable (name on PATH or full path)
    pub downloader: String,

    /// Diff against the manifest even when the item count has not grown
    pub always_diff: bool,
}

impl MirrorConfig {
    /// Create a new configuration rooted at `backup_root`
    pub fn new(backup_root: PathBuf) -> Self {
        Self {
            backup_root,
            downloader: DEFAULT_DOWNLOADER.to_string(),
            always_diff: false,
        }
    }

    /// Use a specific downloader executable
    pub fn with_downloader(mut self, downloader: impl Into<String>) -> Self {
        self.downloader = downloader.into();
        self
    }

    pub fn with_always_diff(mut self, always_diff: bool) -> Self {
        self.always_diff = always_diff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::new(PathBuf::from("saved-playlists"));
        assert_eq!(config.downloader, "yt-dlp");
        assert!(!config.always_diff);
    }

    #[test]
    fn test_builders() {
        let config = MirrorConfig::new(PathBuf::from("x"))
            .with_downloader("/opt/bin/yt-dlp")
            .with_always_diff(true);
        assert_eq!(config.downloader, "/opt/bin/yt-dlp");
        assert!(config.always_diff);
    }
}
