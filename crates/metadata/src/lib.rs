use std::path::Path;

use lofty::error::LoftyError;
use lofty::file::FileType;
use lofty::prelude::{ItemKey, TaggedFileExt};
use tracing::warn;

/// Tag fields as they appear in the file, before any normalization. Every
/// field is optional; numeric fields are kept as text so that `"3/12"` style
/// values survive until the normalizer coerces them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawTags {
    pub album_artist: Option<String>,
    pub performer: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub track: Option<String>,
    pub disc: Option<String>,
    pub disc_count: Option<String>,
}

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
    Unavailable(String),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag error: {}", err),
            MetadataError::Unavailable(reason) => write!(f, "tag reader unavailable: {}", reason),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

pub trait TagReader {
    /// Confirms the reader can handle at least one of `extensions` before any
    /// file is touched. An error here aborts the whole run.
    fn check_available(&self, _extensions: &[String]) -> Result<(), MetadataError> {
        Ok(())
    }

    fn read_tags(&self, path: &Path) -> Result<RawTags, MetadataError>;
}

impl<T: TagReader + ?Sized> TagReader for &T {
    fn check_available(&self, extensions: &[String]) -> Result<(), MetadataError> {
        (**self).check_available(extensions)
    }

    fn read_tags(&self, path: &Path) -> Result<RawTags, MetadataError> {
        (**self).read_tags(path)
    }
}

/// Reads ID3, Vorbis comments, MP4 atoms and the rest through `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn check_available(&self, extensions: &[String]) -> Result<(), MetadataError> {
        let mut supported = 0usize;
        for ext in extensions {
            if FileType::from_ext(ext).is_some() {
                supported += 1;
            } else {
                warn!("No tag support for .{} files; they will be skipped", ext);
            }
        }
        if supported == 0 {
            return Err(MetadataError::Unavailable(format!(
                "none of the configured extensions are readable ({})",
                extensions.join(", ")
            )));
        }
        Ok(())
    }

    fn read_tags(&self, path: &Path) -> Result<RawTags, MetadataError> {
        let tagged_file = lofty::read_from_path(path)?;
        let mut raw = RawTags::default();

        if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            let get = |key: ItemKey| tag.get_string(&key).map(|v| v.to_string());
            raw.album_artist = get(ItemKey::AlbumArtist);
            raw.performer = get(ItemKey::TrackArtist);
            raw.album = get(ItemKey::AlbumTitle);
            raw.title = get(ItemKey::TrackTitle);
            raw.track = get(ItemKey::TrackNumber);
            raw.disc = get(ItemKey::DiscNumber);
            raw.disc_count = get(ItemKey::DiscTotal);
        }

        Ok(raw)
    }
}
