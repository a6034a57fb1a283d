mod config;

use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use config::{config_path, load_config};
use metadata::LoftyTagReader;
use organizer::{LocalFs, LogFileSink, OrganizerOptions, Pipeline, Tee, TracingSink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Copy audio files into an Artist/Album[/Disc NN]/NN - Title layout built
/// from their tags. Source files are never modified.
#[derive(Parser, Debug)]
#[command(name = "tagsort", version)]
struct Args {
    /// Directory to read audio files from.
    source: PathBuf,

    /// Root of the organized tree.
    destination: PathBuf,

    /// Log file to append to. Defaults to organize-log-<time>.txt in the
    /// destination (or the temp dir for dry runs).
    #[arg(long)]
    log: Option<PathBuf>,

    /// Report what would be copied without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// YAML config file; falls back to $TAGSORT_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only look at files directly inside the source directory.
    #[arg(long)]
    no_recursive: bool,

    /// Extension to include (repeatable). Replaces the configured list.
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config_path = config_path(args.config.as_deref());
    let (config, loaded) = load_config(config_path.as_deref())?;
    if loaded {
        info!("Loaded config from {:?}", config_path);
    }

    if !args.source.is_dir() {
        return Err(format!("source is not a directory: {}", args.source.display()).into());
    }

    let extensions = if args.extensions.is_empty() {
        config.extensions.clone()
    } else {
        args.extensions.clone()
    };
    let mut options = OrganizerOptions::new(args.source.clone(), args.destination.clone())
        .with_extensions(extensions);
    options.dry_run = args.dry_run;
    options.recursive = config.recursive && !args.no_recursive;

    let log_path = args
        .log
        .clone()
        .or_else(|| config.log_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| default_log_path(&args.destination, args.dry_run));
    let log_sink = open_log(&log_path);
    let written_log = log_sink.as_ref().map(|_| log_path.clone());

    if args.dry_run {
        info!("Dry run: nothing will be written to {}", args.destination.display());
    }

    let sink = Tee(TracingSink, log_sink);
    let stats = Pipeline::new(options, LoftyTagReader, LocalFs, sink).run()?;

    println!("{}", stats);
    if let Some(line) = log_line(written_log.as_deref()) {
        println!("{}", line);
    }
    Ok(())
}

fn log_line(written: Option<&Path>) -> Option<String> {
    written.map(|path| format!("Log: {}", path.display()))
}

fn default_log_path(destination: &Path, dry_run: bool) -> PathBuf {
    let name = format!("organize-log-{}.txt", now_secs());
    if dry_run {
        env::temp_dir().join(name)
    } else {
        destination.join(name)
    }
}

fn open_log(path: &Path) -> Option<LogFileSink> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!("Failed to create log directory {:?}: {}", parent, err);
                return None;
            }
        }
    }
    match LogFileSink::create(path) {
        Ok(sink) => Some(sink),
        Err(err) => {
            warn!("Failed to open log file {:?}: {}", path, err);
            None
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::{default_log_path, log_line, open_log, Args};
    use clap::Parser;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn parses_flags_and_repeated_extensions() {
        let args = Args::try_parse_from([
            "tagsort", "/in", "/out", "--dry-run", "--ext", "mp3", "--ext", "FLAC",
        ])
        .unwrap();
        assert!(args.dry_run);
        assert!(!args.no_recursive);
        assert_eq!(args.extensions, vec!["mp3".to_string(), "FLAC".to_string()]);
        assert_eq!(args.source, Path::new("/in"));
    }

    #[test]
    fn destination_is_required() {
        assert!(Args::try_parse_from(["tagsort", "/in"]).is_err());
    }

    #[test]
    fn dry_run_log_stays_out_of_destination() {
        let live = default_log_path(Path::new("/out"), false);
        let dry = default_log_path(Path::new("/out"), true);
        assert!(live.starts_with("/out"));
        assert!(!dry.starts_with("/out"));
    }

    #[test]
    fn log_line_only_when_log_opened() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let unopenable = blocker.join("run.log");
        assert!(open_log(&unopenable).is_none());
        assert_eq!(log_line(None), None);

        let good = dir.path().join("logs/run.log");
        assert!(open_log(&good).is_some());
        assert_eq!(
            log_line(Some(good.as_path())),
            Some(format!("Log: {}", good.display()))
        );
    }
}
