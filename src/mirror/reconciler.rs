//! Playlist reconciliation: snapshot, diff, append, selective fetch

use super::config::MirrorConfig;
use super::layout::BackupLayout;
use crate::diff::diff;
use crate::error::MirrorError;
use crate::manifest::ManifestStore;
use crate::model::Snapshot;
use crate::source::PlaylistSource;
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// Where a playlist stands relative to its backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupState {
    /// No backup directory or no manifest yet
    NotBackedUp,

    /// Remote item count does not exceed the manifest line count
    UpToDate,

    /// Remote playlist has more items than the manifest
    NeedsUpdate,
}

impl fmt::Display for BackupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackupState::NotBackedUp => "not backed up",
            BackupState::UpToDate => "up to date",
            BackupState::NeedsUpdate => "needs update",
        };
        f.write_str(s)
    }
}

/// Outcome of reconciling one playlist
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    /// Resolved playlist title
    pub title: String,

    /// State decided for this pass
    pub state: BackupState,

    /// Item URLs handed to the fetcher
    pub fetched: Vec<String>,

    /// Records written to the manifest
    pub recorded: usize,
}

impl ReconcileReport {
    fn unchanged(title: String, state: BackupState) -> Self {
        Self {
            title,
            state,
            fetched: Vec::new(),
            recorded: 0,
        }
    }
}

/// Reconciles remote playlists against their local backups
pub struct Reconciler<S: PlaylistSource> {
    config: MirrorConfig,
    layout: BackupLayout,
    manifests: ManifestStore,
    source: S,
}

impl<S: PlaylistSource> Reconciler<S> {
    pub fn new(config: MirrorConfig, source: S) -> Self {
        let layout = BackupLayout::new(config.backup_root.clone());
        let manifests = ManifestStore::new(layout.clone());

        Self {
            config,
            layout,
            manifests,
            source,
        }
    }

    pub fn layout(&self) -> &BackupLayout {
        &self.layout
    }

    pub fn manifests(&self) -> &ManifestStore {
        &self.manifests
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Bring the backup of one playlist up to date
    ///
    /// Title lookup and enumeration failures abort the pass. A manifest
    /// append is not rolled back if the fetch afterwards fails.
    pub fn reconcile(&self, playlist_url: &str) -> Result<ReconcileReport> {
        let title = self
            .source
            .resolve_title(playlist_url)
            .with_context(|| format!("Failed to resolve title of {}", playlist_url))?;
        log::info!("Playlist {:?} ({})", title, playlist_url);

        let snapshot = self.capture_snapshot(playlist_url)?;
        if snapshot.is_empty() {
            log::warn!("{:?} reported no items", title);
        }
        let state = self.assess_state(&title, snapshot.len())?;
        log::info!(
            "{:?}: {} ({} remote item(s))",
            title,
            state,
            snapshot.len()
        );

        match state {
            BackupState::NotBackedUp => self.initial_backup(playlist_url, title, &snapshot),
            BackupState::NeedsUpdate => self.update(title, &snapshot, BackupState::NeedsUpdate),
            BackupState::UpToDate if self.config.always_diff => {
                let report = self.update(title, &snapshot, BackupState::UpToDate)?;
                if report.recorded > 0 {
                    log::info!(
                        "{:?}: count unchanged but {} new title(s) found",
                        report.title,
                        report.recorded
                    );
                }
                Ok(report)
            }
            BackupState::UpToDate => Ok(ReconcileReport::unchanged(title, state)),
        }
    }

    /// Decide the backup state from the remote item count
    ///
    /// Cardinality only: a playlist that lost and gained the same number of
    /// items reads as up to date.
    pub fn assess_state(&self, playlist_title: &str, remote_count: usize) -> Result<BackupState> {
        if !self.layout.is_backed_up(playlist_title) {
            return Ok(BackupState::NotBackedUp);
        }

        match self.manifests.line_count(playlist_title) {
            Ok(recorded) if remote_count > recorded => Ok(BackupState::NeedsUpdate),
            Ok(_) => Ok(BackupState::UpToDate),
            Err(MirrorError::ManifestNotFound { path, .. }) => {
                log::warn!(
                    "Backup directory exists but manifest {:?} is missing, starting over",
                    path
                );
                Ok(BackupState::NotBackedUp)
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read manifest of {:?}", playlist_title)),
        }
    }

    /// Reconcile every playlist in order; one failure does not stop the rest
    pub fn reconcile_all(&self, playlist_urls: &[String]) -> Vec<Result<ReconcileReport>> {
        playlist_urls
            .iter()
            .enumerate()
            .map(|(i, url)| {
                log::info!("[{}/{}] {}", i + 1, playlist_urls.len(), url);
                self.reconcile(url)
            })
            .collect()
    }

    fn capture_snapshot(&self, playlist_url: &str) -> Result<Snapshot> {
        let lines = self
            .source
            .enumerate(playlist_url)
            .with_context(|| format!("Failed to enumerate {}", playlist_url))?;

        Snapshot::from_lines(&lines)
            .with_context(|| format!("Unusable item record from {}", playlist_url))
    }

    /// Full download, then a manifest of every current item
    fn initial_backup(
        &self,
        playlist_url: &str,
        title: String,
        snapshot: &Snapshot,
    ) -> Result<ReconcileReport> {
        self.layout.init()?;
        let dir = self.layout.playlist_dir(&title);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create playlist directory {:?}", dir))?;

        self.source
            .fetch_playlist(playlist_url, &self.layout.output_template(&title))?;

        let recorded = self
            .manifests
            .create(&title, snapshot.raw_lines())
            .with_context(|| format!("Failed to create manifest for {:?}", title))?;

        Ok(ReconcileReport {
            fetched: snapshot.records().iter().map(|r| r.url()).collect(),
            title,
            state: BackupState::NotBackedUp,
            recorded,
        })
    }

    /// Append records for new titles, then fetch exactly those items
    fn update(
        &self,
        title: String,
        snapshot: &Snapshot,
        state: BackupState,
    ) -> Result<ReconcileReport> {
        let current = snapshot.index();
        let master = self
            .manifests
            .load(&title)
            .with_context(|| format!("Failed to load manifest of {:?}", title))?;

        let mut pending = diff(&current, &master);
        if pending.is_empty() {
            log::info!("{:?}: no new titles", title);
            return Ok(ReconcileReport::unchanged(title, state));
        }

        // Snapshot order, one line per new title
        let mut raw_lines = Vec::with_capacity(pending.len());
        let mut urls = Vec::with_capacity(pending.len());
        for record in snapshot.records() {
            if !pending.remove(&record.title) {
                continue;
            }
            if let Some(entry) = current.get(&record.title) {
                log::debug!("New item {:?} -> {}", record.title, entry.url);
                raw_lines.push(entry.raw.clone());
                urls.push(entry.url.clone());
            }
        }

        let recorded = self
            .manifests
            .append(&title, &raw_lines)
            .with_context(|| format!("Failed to append to manifest of {:?}", title))?;

        self.source
            .fetch_items(&urls, &self.layout.output_template(&title))?;

        Ok(ReconcileReport {
            title,
            state: BackupState::NeedsUpdate,
            fetched: urls,
            recorded,
        })
    }
}

/// Read playlist URLs from a text file, one per line
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_playlist_urls(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read playlist list {:?}", path))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
