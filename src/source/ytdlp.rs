//! yt-dlp backed implementation of the collaborators
//!
//! Every invocation goes through `std::process::Command` with an argument
//! array, so titles and URLs are never interpreted by a shell.

use super::traits::{Fetcher, ItemEnumerator, TitleResolver};
use crate::error::MirrorError;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

/// Downloader binary used when none is configured
pub const DEFAULT_DOWNLOADER: &str = "yt-dlp";

/// Flags shared by full and selective fetches
const FETCH_FLAGS: &[&str] = &["--write-thumbnail", "--write-info-json", "--no-overwrites"];

/// Runs the external downloader as a blocking subprocess
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, args: &[OsString]) -> Command {
        log::debug!("Running {} {:?}", self.program, args);
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::null());
        cmd
    }

    /// Run and capture stdout, failing on a non-zero exit
    fn capture(&self, args: &[OsString]) -> Result<String> {
        let output = self
            .command(args)
            .output()
            .with_context(|| format!("Failed to start {}", self.program))?;

        self.check(&output)?;

        String::from_utf8(output.stdout)
            .with_context(|| format!("{} produced non UTF-8 output", self.program))
    }

    /// Run with the downloader's own progress output passed through
    fn run(&self, args: &[OsString]) -> Result<()> {
        let status = self
            .command(args)
            .status()
            .with_context(|| format!("Failed to start {}", self.program))?;

        if !status.success() {
            return Err(MirrorError::ExternalToolStatus {
                tool: self.program.clone(),
                status: status.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn check(&self, output: &Output) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }
        Err(MirrorError::ExternalTool {
            tool: self.program.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into())
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOADER)
    }
}

impl TitleResolver for YtDlp {
    fn resolve_title(&self, playlist_url: &str) -> Result<String> {
        let stdout = self
            .capture(&title_args(playlist_url))
            .with_context(|| format!("Failed to resolve playlist title for {}", playlist_url))?;

        parse_title_output(&stdout)
            .with_context(|| format!("No playlist title reported for {}", playlist_url))
    }
}

impl ItemEnumerator for YtDlp {
    fn enumerate(&self, playlist_url: &str) -> Result<Vec<String>> {
        let stdout = self
            .capture(&enumerate_args(playlist_url))
            .with_context(|| format!("Failed to enumerate playlist {}", playlist_url))?;

        let lines = parse_enumerate_output(&stdout);
        log::debug!("Enumerated {} item(s) from {}", lines.len(), playlist_url);
        Ok(lines)
    }
}

impl Fetcher for YtDlp {
    fn fetch_playlist(&self, playlist_url: &str, output_template: &str) -> Result<()> {
        log::info!("Downloading full playlist {}", playlist_url);
        self.run(&fetch_playlist_args(playlist_url, output_template))
            .with_context(|| format!("Failed to download playlist {}", playlist_url))
    }

    fn fetch_items(&self, item_urls: &[String], output_template: &str) -> Result<()> {
        if item_urls.is_empty() {
            return Ok(());
        }

        // Batch file is removed when `batch` drops at the end of this call
        let mut batch = NamedTempFile::new().context("Failed to create batch URL file")?;
        for url in item_urls {
            writeln!(batch, "{}", url).context("Failed to write batch URL file")?;
        }
        batch.flush().context("Failed to write batch URL file")?;

        log::info!("Downloading {} new item(s)", item_urls.len());
        self.run(&fetch_batch_args(batch.path(), output_template))
            .context("Failed to download new items")
    }
}

fn title_args(playlist_url: &str) -> Vec<OsString> {
    [
        "--flat-playlist",
        "--playlist-items",
        "1",
        "--print",
        "%(playlist_title)s",
        playlist_url,
    ]
    .iter()
    .map(OsString::from)
    .collect()
}

fn enumerate_args(playlist_url: &str) -> Vec<OsString> {
    ["-j", "--flat-playlist", playlist_url]
        .iter()
        .map(OsString::from)
        .collect()
}

fn fetch_playlist_args(playlist_url: &str, output_template: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = FETCH_FLAGS.iter().map(OsString::from).collect();
    args.push("-o".into());
    args.push(output_template.into());
    args.push(playlist_url.into());
    args
}

fn fetch_batch_args(batch_file: &Path, output_template: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = FETCH_FLAGS.iter().map(OsString::from).collect();
    args.push("-o".into());
    args.push(output_template.into());
    args.push("-a".into());
    args.push(batch_file.as_os_str().to_owned());
    args
}

/// First non-empty line of the title lookup
fn parse_title_output(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && *line != "NA")
        .map(str::to_string)
}

/// Non-empty stdout lines, each one JSON record
fn parse_enumerate_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_url_with_shell_metacharacters_is_one_argument() {
        let url = "https://www.youtube.com/playlist?list=PL1&x=$(rm -rf ~)";
        let args = strings(&enumerate_args(url));
        assert_eq!(args, vec!["-j", "--flat-playlist", url]);
    }

    #[test]
    fn test_fetch_playlist_args() {
        let args = strings(&fetch_playlist_args("URL", "/b/p/%(title)s/%(title)s.%(ext)s"));
        assert_eq!(
            args,
            vec![
                "--write-thumbnail",
                "--write-info-json",
                "--no-overwrites",
                "-o",
                "/b/p/%(title)s/%(title)s.%(ext)s",
                "URL",
            ]
        );
    }

    #[test]
    fn test_fetch_batch_args_point_at_file() {
        let args = strings(&fetch_batch_args(Path::new("/tmp/urls.txt"), "T"));
        assert_eq!(args[args.len() - 2..], ["-a", "/tmp/urls.txt"]);
        assert!(args.contains(&"T".to_string()));
    }

    #[test]
    fn test_parse_enumerate_output_skips_blank_lines() {
        let stdout = "{\"title\": \"A\", \"id\": \"1\"}\n\n{\"title\": \"B\", \"id\": \"2\"}\n";
        assert_eq!(parse_enumerate_output(stdout).len(), 2);
        assert!(parse_enumerate_output("").is_empty());
    }

    #[test]
    fn test_parse_title_output() {
        assert_eq!(
            parse_title_output("My \u{1F3A7} Mix\n"),
            Some("My \u{1F3A7} Mix".to_string())
        );
        assert_eq!(parse_title_output("NA\n"), None);
        assert_eq!(parse_title_output("\n"), None);
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let ytdlp = YtDlp::new("definitely-not-a-real-downloader-binary");
        assert!(ytdlp.enumerate("https://example.com/playlist").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_downloader_reports_exit_status() {
        let ytdlp = YtDlp::new("false");

        let err = ytdlp.enumerate("URL").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MirrorError>(),
            Some(MirrorError::ExternalTool { .. })
        ));

        let err = ytdlp.fetch_playlist("URL", "T").unwrap_err();
        match err.downcast_ref::<MirrorError>() {
            Some(MirrorError::ExternalToolStatus { tool, .. }) => assert_eq!(tool, "false"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_nothing_does_not_spawn() {
        let ytdlp = YtDlp::new("definitely-not-a-real-downloader-binary");
        assert!(ytdlp.fetch_items(&[], "T").is_ok());
    }
}
