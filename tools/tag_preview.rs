use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use common::{relpath_from, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use metadata::LoftyTagReader;
use organizer::{build_path, LocalFs, OrganizerOptions, Pipeline, TracingSink};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let source = args
        .next()
        .or_else(|| env::var("MUSIC_ROOT").ok())
        .ok_or("MUSIC_ROOT not set and no path argument")?;
    let preview_root = args.next().unwrap_or_else(|| "<dest>".to_string());

    let source = PathBuf::from(source);
    let options = OrganizerOptions::new(source.clone(), PathBuf::from(&preview_root));
    let survey = Pipeline::new(options, LoftyTagReader, LocalFs, TracingSink).survey()?;

    for record in &survey.records {
        let multi_disc = survey.multi_disc.contains(&record.album_key);
        let target = build_path(Path::new(&preview_root), record, multi_disc);
        let rel = relpath_from(&source, &record.source_path)
            .unwrap_or_else(|| record.source_path.display().to_string());
        println!("{} -> {}", rel, target.display());
    }

    let mut listed = HashSet::new();
    for record in &survey.records {
        if survey.multi_disc.contains(&record.album_key) && listed.insert(&record.album_key) {
            println!(
                "Multi-disc: {} / {}",
                record.artist.as_deref().unwrap_or(UNKNOWN_ARTIST),
                record.album.as_deref().unwrap_or(UNKNOWN_ALBUM)
            );
        }
    }

    let stats = &survey.statistics;
    println!(
        "Read {} of {} files, {} multi-disc albums, {} skipped",
        stats.metadata_read, stats.files_scanned, stats.multi_disc_albums, stats.skipped
    );

    Ok(())
}
