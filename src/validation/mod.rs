//! Validation utilities
//!
//! Cross-checks manifests against the metadata files the downloader left
//! on disk, without touching the network.

mod backup;

pub use backup::{verify_backup, verify_playlist_dir, PlaylistCheck};
