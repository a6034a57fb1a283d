use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Joins the two halves of an [`AlbumKey`]. Components have `\x1f` stripped
/// before joining, so the separator can never appear inside either half.
const KEY_SEP: &str = "\x1f::\x1f";

/// Grouping key for an album: lower-cased, trimmed `artist` and `album`
/// joined by a sentinel. Never shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlbumKey(String);

impl AlbumKey {
    pub fn new(artist: Option<&str>, album: Option<&str>) -> Self {
        let artist = key_component(artist, UNKNOWN_ARTIST);
        let album = key_component(album, UNKNOWN_ALBUM);
        AlbumKey(format!("{}{}{}", artist, KEY_SEP, album))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn key_component(value: Option<&str>, fallback: &str) -> String {
    let value = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback);
    value
        .chars()
        .filter(|ch| *ch != '\x1f')
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Normalized metadata for one successfully tagged source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub source_path: PathBuf,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    /// `0` means unset.
    pub track_number: u32,
    /// `0` means unset; see [`TrackRecord::effective_disc`].
    pub disc_number: u32,
    /// `0` means unset. Anything above `1` marks the album as multi-disc.
    pub disc_count: u32,
    pub album_key: AlbumKey,
    /// Source extension without the leading dot, case preserved. Empty when
    /// the source has none.
    pub extension: String,
}

impl TrackRecord {
    pub fn effective_disc(&self) -> u32 {
        if self.disc_number > 0 {
            self.disc_number
        } else {
            1
        }
    }

    pub fn source_file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyStatus {
    Success,
    Failed,
    Skipped,
    WouldCopy,
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CopyStatus::Success => "success",
            CopyStatus::Failed => "failed",
            CopyStatus::Skipped => "skipped",
            CopyStatus::WouldCopy => "would-copy",
        };
        f.write_str(label)
    }
}

/// One line of the per-file outcome log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub source: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    pub status: CopyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub files_scanned: usize,
    pub metadata_read: usize,
    pub multi_disc_albums: usize,
    pub copied: usize,
    pub would_copy: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: bool,
}

impl RunStatistics {
    pub fn record(&mut self, status: CopyStatus) {
        match status {
            CopyStatus::Success => self.copied += 1,
            CopyStatus::WouldCopy => self.would_copy += 1,
            CopyStatus::Failed => self.failed += 1,
            CopyStatus::Skipped => self.skipped += 1,
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files scanned:        {}", self.files_scanned)?;
        writeln!(f, "Metadata read:        {}", self.metadata_read)?;
        writeln!(f, "Multi-disc albums:    {}", self.multi_disc_albums)?;
        if self.dry_run {
            writeln!(f, "Would copy:           {}", self.would_copy)?;
        } else {
            writeln!(f, "Copied:               {}", self.copied)?;
        }
        writeln!(f, "Failed:               {}", self.failed)?;
        write!(f, "Skipped:              {}", self.skipped)?;
        if self.dry_run {
            write!(f, "\n(dry run: no files were written)")?;
        }
        Ok(())
    }
}

pub fn relpath_from(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(path_to_slash_string(rel))
}

fn path_to_slash_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::{relpath_from, AlbumKey, CopyStatus, RunStatistics};
    use std::path::Path;

    #[test]
    fn album_key_ignores_case_and_whitespace() {
        let first = AlbumKey::new(Some("  Pink Floyd "), Some("The Wall"));
        let second = AlbumKey::new(Some("pink floyd"), Some(" THE WALL  "));
        assert_eq!(first, second);
    }

    #[test]
    fn album_key_uses_fallbacks() {
        let absent = AlbumKey::new(None, None);
        let blank = AlbumKey::new(Some("   "), Some(""));
        let spelled = AlbumKey::new(Some("unknown artist"), Some("unknown album"));
        assert_eq!(absent, blank);
        assert_eq!(absent, spelled);
    }

    #[test]
    fn album_key_separator_does_not_collide() {
        let first = AlbumKey::new(Some("A/B"), Some("C"));
        let second = AlbumKey::new(Some("A"), Some("B/C"));
        assert_ne!(first, second);

        let first = AlbumKey::new(Some("A|B"), Some("C"));
        let second = AlbumKey::new(Some("A"), Some("B|C"));
        assert_ne!(first, second);
    }

    #[test]
    fn album_key_strips_embedded_separator_chars() {
        let sneaky = AlbumKey::new(Some("A\x1f::\x1fB"), Some("C"));
        let plain = AlbumKey::new(Some("A"), Some("B\x1f::\x1fC"));
        assert_ne!(sneaky, plain);
    }

    #[test]
    fn statistics_count_by_status() {
        let mut stats = RunStatistics::default();
        stats.record(CopyStatus::Success);
        stats.record(CopyStatus::Success);
        stats.record(CopyStatus::Failed);
        stats.record(CopyStatus::Skipped);
        stats.record(CopyStatus::WouldCopy);
        assert_eq!(stats.copied, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.would_copy, 1);
    }

    #[test]
    fn copy_status_serializes_kebab_case() {
        assert_eq!(CopyStatus::WouldCopy.to_string(), "would-copy");
    }

    #[test]
    fn relpath_uses_forward_slashes() {
        let rel = relpath_from(Path::new("/music"), Path::new("/music/a/b.mp3"));
        assert_eq!(rel.as_deref(), Some("a/b.mp3"));
        assert!(relpath_from(Path::new("/other"), Path::new("/music/a.mp3")).is_none());
    }
}
