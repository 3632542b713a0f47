//! Playlist Mirror - incremental local backups of remote video playlists
//!
//! The first run against a playlist downloads every item and writes an
//! append-only manifest of their records. Later runs diff a fresh
//! enumeration against that manifest and download only the new titles.

pub mod diff;
pub mod error;
pub mod manifest;
pub mod mirror;
pub mod model;
pub mod source;
pub mod validation;

pub use error::MirrorError;
pub use mirror::config::MirrorConfig;
pub use mirror::reconciler::{BackupState, ReconcileReport, Reconciler};
