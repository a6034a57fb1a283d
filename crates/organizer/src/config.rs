use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "ogg", "opus", "wav"];

#[derive(Clone, Debug)]
pub struct OrganizerOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub dry_run: bool,
    pub recursive: bool,
    /// Lower-case, without leading dots.
    pub extensions: Vec<String>,
}

impl OrganizerOptions {
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            dry_run: false,
            recursive: true,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for ext in extensions {
            if let Some(ext) = normalize_extension(ext.as_ref()) {
                if !out.contains(&ext) {
                    out.push(ext);
                }
            }
        }
        self.extensions = out;
        self
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
            None => return false,
        };
        self.extensions.iter().any(|allowed| *allowed == ext)
    }
}

pub fn normalize_extension(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}
