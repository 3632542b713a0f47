//! Backup directory structure

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix appended to the playlist directory name to form its manifest file
pub const MANIFEST_SUFFIX: &str = "_MASTER.txt";

/// Manages the on-disk layout under a backup root
///
/// ```text
/// <root>/<playlist>/<playlist>_MASTER.txt
/// <root>/<playlist>/<item>/<item>.<ext>
/// <root>/<playlist>/<item>/<item>.info.json
/// ```
#[derive(Debug, Clone)]
pub struct BackupLayout {
    root: PathBuf,
}

impl BackupLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the backup root if needed
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create backup root {:?}", self.root))?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding everything backed up for a playlist
    pub fn playlist_dir(&self, playlist_title: &str) -> PathBuf {
        self.root.join(dir_name(playlist_title))
    }

    /// Path of the manifest for a playlist
    pub fn manifest_path(&self, playlist_title: &str) -> PathBuf {
        manifest_path_in(&self.playlist_dir(playlist_title))
    }

    /// Whether a backup directory exists for this playlist
    pub fn is_backed_up(&self, playlist_title: &str) -> bool {
        self.playlist_dir(playlist_title).is_dir()
    }

    /// Downloader output template placing each item in its own folder
    ///
    /// `%` in the directory part is escaped so the downloader does not
    /// treat it as a template field.
    pub fn output_template(&self, playlist_title: &str) -> String {
        let dir = self
            .playlist_dir(playlist_title)
            .to_string_lossy()
            .replace('%', "%%");

        Path::new(&dir)
            .join("%(title)s")
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned()
    }

    /// All playlist directories directly under the root, sorted by name
    pub fn playlist_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("Failed to read {:?}", self.root))?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

/// Manifest path inside an existing playlist directory
pub fn manifest_path_in(playlist_dir: &Path) -> PathBuf {
    let name = playlist_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    playlist_dir.join(format!("{}{}", name, MANIFEST_SUFFIX))
}

/// Filesystem-safe directory name for a playlist title
///
/// Path separators and control characters become `_`; everything else,
/// including astral characters, is kept. Not injective: titles differing
/// only in those characters or in surrounding whitespace share a directory.
pub fn dir_name(playlist_title: &str) -> String {
    let cleaned: String = playlist_title
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim();
    match trimmed {
        "" | "." | ".." => "_".to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_follow_playlist_title() {
        let layout = BackupLayout::new(PathBuf::from("/backups"));

        assert_eq!(
            layout.playlist_dir("Road Trip"),
            PathBuf::from("/backups/Road Trip")
        );
        assert_eq!(
            layout.manifest_path("Road Trip"),
            PathBuf::from("/backups/Road Trip/Road Trip_MASTER.txt")
        );
    }

    #[test]
    fn test_dir_name_sanitizes_separators() {
        assert_eq!(dir_name("AC/DC live"), "AC_DC live");
        assert_eq!(dir_name("a\\b"), "a_b");
        assert_eq!(dir_name("tab\there"), "tab_here");
        assert_eq!(dir_name(".."), "_");
        assert_eq!(dir_name("   "), "_");
        assert_eq!(dir_name("\u{1F3B8} riffs"), "\u{1F3B8} riffs");
    }

    #[test]
    fn test_dir_name_collapses_similar_titles() {
        assert_eq!(dir_name("A/B"), dir_name("A_B"));
        assert_eq!(dir_name(" Foo"), dir_name("Foo"));
        assert_ne!(dir_name("Foo"), dir_name("foo"));
    }

    #[test]
    fn test_output_template_escapes_percent() {
        let layout = BackupLayout::new(PathBuf::from("/backups"));
        assert_eq!(
            layout.output_template("100% hits"),
            "/backups/100%% hits/%(title)s/%(title)s.%(ext)s"
        );
    }

    #[test]
    fn test_playlist_dirs_lists_only_directories() {
        let temp = TempDir::new().unwrap();
        let layout = BackupLayout::new(temp.path().to_path_buf());

        fs::create_dir(temp.path().join("b")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::write(temp.path().join("playlists.txt"), "").unwrap();

        let dirs = layout.playlist_dirs().unwrap();
        assert_eq!(dirs, vec![temp.path().join("a"), temp.path().join("b")]);
        assert!(layout.is_backed_up("a"));
        assert!(!layout.is_backed_up("c"));
    }
}
