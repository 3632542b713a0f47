//! Playlist mirroring orchestration and backup directory organization

pub mod config;
pub mod layout;
pub mod reconciler;

pub use config::MirrorConfig;
pub use layout::BackupLayout;
pub use reconciler::{read_playlist_urls, BackupState, ReconcileReport, Reconciler};
