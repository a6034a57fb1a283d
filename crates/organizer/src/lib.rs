//! Copies tagged audio files into an `Artist/Album[/Disc NN]/NN - Title.ext`
//! tree.
//!
//! A run makes two passes. The first reads and normalizes every file's tags
//! and decides which albums span several discs; that decision needs every
//! track of an album, so nothing is copied until the first pass is done. The
//! second pass builds each destination path and copies the file next to any
//! existing file of the same name rather than over it.

pub mod config;
pub mod discs;
pub mod fs;
pub mod normalize;
pub mod paths;
pub mod pipeline;
pub mod placement;
pub mod report;

use std::path::PathBuf;

pub use config::{OrganizerOptions, DEFAULT_EXTENSIONS};
pub use discs::{classify, DiscClassifier, MultiDiscSet};
pub use fs::{FileSystem, LocalFs};
pub use normalize::normalize;
pub use paths::build_path;
pub use pipeline::{Pipeline, Survey};
pub use placement::{place, Placement};
pub use report::{Level, LogFileSink, MemorySink, ReportSink, Tee, TracingSink};

#[derive(Debug)]
pub enum OrganizerError {
    SourceMissing(PathBuf),
    DependencyUnavailable(String),
}

impl std::fmt::Display for OrganizerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrganizerError::SourceMissing(path) => {
                write!(f, "source directory not found: {}", path.display())
            }
            OrganizerError::DependencyUnavailable(reason) => {
                write!(f, "tag reading unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for OrganizerError {}
