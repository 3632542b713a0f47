use anyhow::Result;
use clap::Parser;
use playlist_mirror::mirror::read_playlist_urls;
use playlist_mirror::source::{YtDlp, DEFAULT_DOWNLOADER};
use playlist_mirror::validation::verify_backup;
use playlist_mirror::{BackupState, MirrorConfig, Reconciler};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "playlist-mirror")]
#[command(about = "Incrementally back up remote video playlists", long_about = None)]
struct Args {
    /// Text file with one playlist URL per line
    #[arg(required_unless_present = "verify")]
    playlists: Option<String>,

    /// Directory holding one folder per backed up playlist
    #[arg(short = 'o', long, default_value = "./saved-playlists")]
    backup_root: String,

    /// Downloader executable
    #[arg(long, default_value = DEFAULT_DOWNLOADER)]
    downloader: String,

    /// Diff against the manifest even when the item count has not grown
    #[arg(long)]
    always_diff: bool,

    /// Only verify existing backups against their manifests (no downloads)
    #[arg(long)]
    verify: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let backup_root = PathBuf::from(shellexpand::tilde(&args.backup_root).as_ref());

    if args.verify {
        let checks = verify_backup(&backup_root)?;
        let incomplete = checks.iter().filter(|c| !c.is_complete()).count();
        if incomplete > 0 {
            anyhow::bail!("{} of {} backup(s) incomplete", incomplete, checks.len());
        }
        log::info!("✅ All {} backup(s) complete", checks.len());
        return Ok(());
    }

    let Some(playlists) = args.playlists else {
        anyhow::bail!("No playlist file given");
    };
    let playlists_path = PathBuf::from(shellexpand::tilde(&playlists).as_ref());
    let urls = read_playlist_urls(&playlists_path)?;
    log::info!("{} playlist(s) to mirror into {:?}", urls.len(), backup_root);

    let config = MirrorConfig::new(backup_root)
        .with_downloader(args.downloader)
        .with_always_diff(args.always_diff);
    let source = YtDlp::new(config.downloader.clone());
    let reconciler = Reconciler::new(config, source);

    let mut failed = 0;
    for (url, result) in urls.iter().zip(reconciler.reconcile_all(&urls)) {
        match result {
            Ok(report) => match report.state {
                BackupState::NotBackedUp => log::info!(
                    "Backed up {:?}: {} item(s)",
                    report.title,
                    report.recorded
                ),
                _ if report.fetched.is_empty() => {
                    log::info!("{:?} is up to date", report.title)
                }
                _ => log::info!(
                    "Updated {:?}: {} new item(s)",
                    report.title,
                    report.fetched.len()
                ),
            },
            Err(e) => {
                failed += 1;
                log::error!("Failed to mirror {}: {:#}", url, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} playlist(s) failed", failed, urls.len());
    }

    log::info!("Mirroring completed successfully!");
    Ok(())
}
