//! Append-only manifest of every item captured for a playlist
//!
//! One JSON record per line, written in first-seen order. Lines are only
//! ever appended; existing lines are never rewritten or removed.

use crate::error::{MirrorError, Result};
use crate::mirror::BackupLayout;
use crate::model::{ItemRecord, TitleIndex};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Manifest access keyed by playlist title
#[derive(Debug, Clone)]
pub struct ManifestStore {
    layout: BackupLayout,
}

impl ManifestStore {
    pub fn new(layout: BackupLayout) -> Self {
        Self { layout }
    }

    /// Where the manifest for a playlist lives
    pub fn path(&self, playlist_title: &str) -> PathBuf {
        self.layout.manifest_path(playlist_title)
    }

    /// Replay the manifest into a title-keyed index
    pub fn load(&self, playlist_title: &str) -> Result<TitleIndex> {
        let records = self.records(playlist_title)?;
        Ok(records.iter().collect())
    }

    /// Every record in append order
    pub fn records(&self, playlist_title: &str) -> Result<Vec<ItemRecord>> {
        let file = self.open(playlist_title)?;
        read_records(BufReader::new(file))
    }

    /// Append raw lines unchanged, in the given order
    ///
    /// All lines go out in a single write followed by a sync. An empty
    /// input leaves the file untouched. A last line missing its `\n` is
    /// terminated first so the new records start on their own lines.
    pub fn append<I, S>(&self, playlist_title: &str, raw_lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buf = join_lines(raw_lines);
        if buf.is_empty() {
            return Ok(0);
        }
        let written = buf.matches('\n').count();

        let path = self.path(playlist_title);
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| not_found_or_io(e, playlist_title, &path))?;

        if !ends_with_newline(&mut file)? {
            log::warn!("Manifest {:?} lacks a final newline, terminating it", path);
            buf.insert(0, '\n');
        }

        write_all_synced(&mut file, &buf)?;
        log::debug!("Appended {} line(s) to {:?}", written, path);
        Ok(written)
    }

    /// Write the first manifest for a playlist
    ///
    /// Refuses to touch an existing manifest.
    pub fn create<I, S>(&self, playlist_title: &str, raw_lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = self.path(playlist_title);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(MirrorError::ManifestExists {
                    title: playlist_title.to_string(),
                    path,
                })
            }
            Err(e) => return Err(e.into()),
        };

        let buf = join_lines(raw_lines);
        write_all_synced(&mut file, &buf)?;
        let written = buf.matches('\n').count();
        log::info!("Created manifest {:?} with {} record(s)", path, written);
        Ok(written)
    }

    /// Number of physical lines in the manifest
    pub fn line_count(&self, playlist_title: &str) -> Result<usize> {
        let file = self.open(playlist_title)?;
        let mut count = 0;
        for line in BufReader::new(file).lines() {
            line?;
            count += 1;
        }
        Ok(count)
    }

    fn open(&self, playlist_title: &str) -> Result<File> {
        let path = self.path(playlist_title);
        File::open(&path).map_err(|e| not_found_or_io(e, playlist_title, &path))
    }
}

/// Parse every line of a manifest-shaped reader
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ItemRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let record = ItemRecord::parse(&line).map_err(|e| e.at_line(i + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn join_lines<I, S>(raw_lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buf = String::new();
    for line in raw_lines {
        buf.push_str(line.as_ref());
        buf.push('\n');
    }
    buf
}

/// True for an empty file or one whose last byte is `\n`
fn ends_with_newline(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn write_all_synced(file: &mut File, buf: &str) -> Result<()> {
    file.write_all(buf.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn not_found_or_io(e: std::io::Error, playlist_title: &str, path: &Path) -> MirrorError {
    if e.kind() == ErrorKind::NotFound {
        MirrorError::ManifestNotFound {
            title: playlist_title.to_string(),
            path: path.to_path_buf(),
        }
    } else {
        MirrorError::Io(e)
    }
}
