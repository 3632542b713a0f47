//! Manifest vs downloaded metadata check

use crate::manifest::read_records;
use crate::mirror::layout::manifest_path_in;
use crate::mirror::BackupLayout;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const INFO_JSON_SUFFIX: &str = ".info.json";

/// Result of checking one playlist directory
#[derive(Debug, Clone)]
pub struct PlaylistCheck {
    pub dir: PathBuf,

    /// False when the directory has no manifest at all
    pub manifest_found: bool,

    /// Records in the manifest
    pub recorded: usize,

    /// Distinct item ids found in metadata files
    pub downloaded: usize,

    /// Titles recorded in the manifest with no metadata file on disk
    pub missing: Vec<String>,
}

impl PlaylistCheck {
    pub fn is_complete(&self) -> bool {
        self.manifest_found && self.missing.is_empty()
    }
}

#[derive(Deserialize)]
struct InfoId {
    id: String,
}

/// Check every playlist directory under a backup root
pub fn verify_backup(root: &Path) -> Result<Vec<PlaylistCheck>> {
    let layout = BackupLayout::new(root.to_path_buf());
    log::info!("Verifying backups under {:?}", layout.root());

    let mut checks = Vec::new();
    for dir in layout.playlist_dirs()? {
        let check = verify_playlist_dir(&dir)?;
        if !check.manifest_found {
            log::warn!("{:?}: no manifest", dir);
        } else if check.missing.is_empty() {
            log::info!(
                "✅ {:?}: {} recorded, {} downloaded",
                dir,
                check.recorded,
                check.downloaded
            );
        } else {
            log::warn!(
                "❌ {:?}: {} of {} recorded item(s) missing",
                dir,
                check.missing.len(),
                check.recorded
            );
            for title in &check.missing {
                log::warn!("    missing: {}", title);
            }
        }
        checks.push(check);
    }
    Ok(checks)
}

/// Check one playlist directory
pub fn verify_playlist_dir(dir: &Path) -> Result<PlaylistCheck> {
    let manifest_path = manifest_path_in(dir);
    if !manifest_path.is_file() {
        return Ok(PlaylistCheck {
            dir: dir.to_path_buf(),
            manifest_found: false,
            recorded: 0,
            downloaded: 0,
            missing: Vec::new(),
        });
    }

    let file = File::open(&manifest_path)
        .with_context(|| format!("Failed to open manifest {:?}", manifest_path))?;
    let records = read_records(BufReader::new(file))
        .with_context(|| format!("Failed to read manifest {:?}", manifest_path))?;

    let downloaded = downloaded_ids(dir)?;

    let mut seen = HashSet::new();
    let missing = records
        .iter()
        .filter(|r| !downloaded.contains(&r.id) && seen.insert(r.id.as_str()))
        .map(|r| r.title.clone())
        .collect();

    Ok(PlaylistCheck {
        dir: dir.to_path_buf(),
        manifest_found: true,
        recorded: records.len(),
        downloaded: downloaded.len(),
        missing,
    })
}

/// Item ids from every `*.info.json` below a playlist directory
fn downloaded_ids(dir: &Path) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();

    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_info = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(INFO_JSON_SUFFIX));
        if !is_info {
            continue;
        }

        let contents = fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {:?}", entry.path()))?;
        match serde_json::from_str::<InfoId>(&contents) {
            Ok(info) => {
                ids.insert(info.id);
            }
            Err(e) => log::warn!("Skipping unreadable metadata {:?}: {}", entry.path(), e),
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_info(dir: &Path, item: &str, id: &str) {
        let item_dir = dir.join(item);
        fs::create_dir_all(&item_dir).unwrap();
        fs::write(
            item_dir.join(format!("{}.info.json", item)),
            format!(r#"{{"id": "{}", "title": "{}", "ext": "webm"}}"#, id, item),
        )
        .unwrap();
    }

    #[test]
    fn test_complete_playlist() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Mix");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("Mix_MASTER.txt"),
            "{\"title\": \"One\", \"id\": \"1\"}\n{\"title\": \"Two\", \"id\": \"2\"}\n",
        )
        .unwrap();
        write_info(&dir, "One", "1");
        write_info(&dir, "Two", "2");

        let check = verify_playlist_dir(&dir).unwrap();
        assert!(check.is_complete());
        assert_eq!(check.recorded, 2);
        assert_eq!(check.downloaded, 2);
    }

    #[test]
    fn test_missing_item_is_reported() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Mix");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("Mix_MASTER.txt"),
            "{\"title\": \"One\", \"id\": \"1\"}\n{\"title\": \"Two\", \"id\": \"2\"}\n",
        )
        .unwrap();
        write_info(&dir, "One", "1");
        fs::write(dir.join("One").join("broken.info.json"), "{").unwrap();

        let check = verify_playlist_dir(&dir).unwrap();
        assert!(!check.is_complete());
        assert_eq!(check.missing, vec!["Two".to_string()]);
    }

    #[test]
    fn test_backup_root_with_unmanaged_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("stray")).unwrap();

        let checks = verify_backup(temp.path()).unwrap();
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].manifest_found);
        assert!(!checks[0].is_complete());
    }
}
