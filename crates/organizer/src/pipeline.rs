use std::path::{Path, PathBuf};

use common::{CopyStatus, OperationRecord, RunStatistics, TrackRecord};
use metadata::TagReader;
use tracing::debug;

use crate::config::OrganizerOptions;
use crate::discs::{classify, MultiDiscSet};
use crate::fs::{resolve_path, FileSystem};
use crate::normalize::normalize;
use crate::paths::build_path;
use crate::placement::place;
use crate::report::{Level, ReportSink};
use crate::OrganizerError;

/// Run stages, in the only order they can occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Scanning,
    Analyzing,
    Classifying,
    Organizing,
    Summarizing,
    Done,
}

/// Result of the first pass alone: every readable record plus the albums
/// that need disc folders.
#[derive(Debug)]
pub struct Survey {
    pub records: Vec<TrackRecord>,
    pub multi_disc: MultiDiscSet,
    pub statistics: RunStatistics,
}

/// One organizing run. Consumed by [`Pipeline::run`] or [`Pipeline::survey`].
pub struct Pipeline<R, F, S> {
    options: OrganizerOptions,
    reader: R,
    fs: F,
    sink: S,
    stage: Stage,
    stats: RunStatistics,
}

impl<R: TagReader, F: FileSystem, S: ReportSink> Pipeline<R, F, S> {
    pub fn new(options: OrganizerOptions, reader: R, fs: F, sink: S) -> Self {
        let stats = RunStatistics {
            dry_run: options.dry_run,
            ..RunStatistics::default()
        };
        Self {
            options,
            reader,
            fs,
            sink,
            stage: Stage::Scanning,
            stats,
        }
    }

    /// Both passes. Per-file problems end up in the statistics; only a
    /// missing tag reader or source directory is returned as an error.
    pub fn run(mut self) -> Result<RunStatistics, OrganizerError> {
        let (records, multi_disc) = self.first_pass()?;
        self.organize(&records, &multi_disc);
        Ok(self.summarize())
    }

    /// First pass only; nothing is copied.
    pub fn survey(mut self) -> Result<Survey, OrganizerError> {
        let (records, multi_disc) = self.first_pass()?;
        self.enter(Stage::Done);
        Ok(Survey {
            records,
            multi_disc,
            statistics: self.stats,
        })
    }

    fn first_pass(&mut self) -> Result<(Vec<TrackRecord>, MultiDiscSet), OrganizerError> {
        if let Err(err) = self.reader.check_available(&self.options.extensions) {
            self.sink.event(Level::Error, &err.to_string());
            return Err(OrganizerError::DependencyUnavailable(err.to_string()));
        }
        if !self.fs.is_dir(&self.options.source) {
            return Err(OrganizerError::SourceMissing(self.options.source.clone()));
        }

        let files = self.scan();
        let records = self.analyze(files);
        let multi_disc = self.classify(&records);
        Ok((records, multi_disc))
    }

    fn enter(&mut self, next: Stage) {
        debug_assert!(next >= self.stage, "stage {:?} after {:?}", next, self.stage);
        debug!("Stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn scan(&mut self) -> Vec<PathBuf> {
        self.enter(Stage::Scanning);
        let source = &self.options.source;
        let nested_output = nested_output_dir(source, &self.options.destination);

        let files: Vec<PathBuf> = self
            .fs
            .enumerate_files(source, self.options.recursive)
            .into_iter()
            .filter(|path| self.options.is_supported(path))
            .filter(|path| match &nested_output {
                Some(output) => !path.starts_with(output),
                None => true,
            })
            .collect();

        self.stats.files_scanned = files.len();
        let message = format!("Found {} audio files in {}", files.len(), source.display());
        self.sink.event(Level::Info, &message);
        files
    }

    fn analyze(&mut self, files: Vec<PathBuf>) -> Vec<TrackRecord> {
        self.enter(Stage::Analyzing);
        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let raw = match self.reader.read_tags(&file) {
                Ok(raw) => raw,
                Err(err) => {
                    self.skip(&file, format!("metadata unreadable: {}", err));
                    continue;
                }
            };
            match normalize(&file, &raw) {
                Some(record) => {
                    self.sink.event(
                        Level::Debug,
                        &format!(
                            "Read {}: artist={:?} album={:?} disc={} track={}",
                            file.display(),
                            record.artist,
                            record.album,
                            record.disc_number,
                            record.track_number
                        ),
                    );
                    records.push(record);
                }
                None => self.skip(&file, "source path has no file name".to_string()),
            }
        }
        self.stats.metadata_read = records.len();
        let message = format!("Read metadata for {} files", records.len());
        self.sink.event(Level::Info, &message);
        records
    }

    fn skip(&mut self, source: &Path, reason: String) {
        self.stats.record(CopyStatus::Skipped);
        self.sink.event(
            Level::Warning,
            &format!("Skipping {}: {}", source.display(), reason),
        );
        self.sink.operation(&OperationRecord {
            source: source.to_path_buf(),
            destination: None,
            status: CopyStatus::Skipped,
            detail: Some(reason),
        });
    }

    fn classify(&mut self, records: &[TrackRecord]) -> MultiDiscSet {
        self.enter(Stage::Classifying);
        let multi_disc = classify(records);
        self.stats.multi_disc_albums = multi_disc.len();
        let message = format!("Detected {} multi-disc albums", multi_disc.len());
        self.sink.event(Level::Info, &message);
        multi_disc
    }

    fn organize(&mut self, records: &[TrackRecord], multi_disc: &MultiDiscSet) {
        self.enter(Stage::Organizing);
        for record in records {
            let is_multi_disc = multi_disc.contains(&record.album_key);
            let desired = build_path(&self.options.destination, record, is_multi_disc);
            let placement = place(&self.fs, &record.source_path, &desired, self.options.dry_run);
            self.stats.record(placement.status);

            let (level, message) = match placement.status {
                CopyStatus::Success => (
                    Level::Success,
                    format!(
                        "Copied {} -> {}",
                        record.source_path.display(),
                        placement.destination.display()
                    ),
                ),
                CopyStatus::WouldCopy => (
                    Level::Info,
                    format!(
                        "Would copy {} -> {}",
                        record.source_path.display(),
                        placement.destination.display()
                    ),
                ),
                _ => (
                    Level::Error,
                    format!(
                        "Failed to copy {}: {}",
                        record.source_path.display(),
                        placement.detail.as_deref().unwrap_or("unknown error")
                    ),
                ),
            };
            self.sink.event(level, &message);
            self.sink.operation(&OperationRecord {
                source: record.source_path.clone(),
                destination: Some(placement.destination),
                status: placement.status,
                detail: placement.detail,
            });
        }
    }

    fn summarize(&mut self) -> RunStatistics {
        self.enter(Stage::Summarizing);
        for line in self.stats.to_string().lines() {
            self.sink.event(Level::Info, line);
        }
        self.enter(Stage::Done);
        self.stats.clone()
    }
}

/// The destination as it appears under `source` in enumerated paths, when
/// the destination lies strictly inside the source tree. Both sides are
/// resolved first, so relative, `..` and symlinked spellings still match.
fn nested_output_dir(source: &Path, destination: &Path) -> Option<PathBuf> {
    let source_real = resolve_path(source);
    let destination_real = resolve_path(destination);
    let rest = destination_real.strip_prefix(&source_real).ok()?;
    if rest.as_os_str().is_empty() {
        return None;
    }
    Some(source.join(rest))
}
