use std::path::Path;

use common::{AlbumKey, TrackRecord};
use metadata::RawTags;

/// Builds the canonical record for one file. Returns `None` only when the
/// source path has no file name to fall back on.
pub fn normalize(source: &Path, raw: &RawTags) -> Option<TrackRecord> {
    source.file_name()?;

    let artist = non_blank(raw.album_artist.as_deref())
        .or_else(|| non_blank(raw.performer.as_deref()));
    let album = non_blank(raw.album.as_deref());
    let title = non_blank(raw.title.as_deref());

    let disc_count = match parse_number(raw.disc_count.as_deref()) {
        0 => parse_total(raw.disc.as_deref()),
        count => count,
    };

    let album_key = AlbumKey::new(artist.as_deref(), album.as_deref());
    let extension = source
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    Some(TrackRecord {
        source_path: source.to_path_buf(),
        artist,
        album,
        title,
        track_number: parse_number(raw.track.as_deref()),
        disc_number: parse_number(raw.disc.as_deref()),
        disc_count,
        album_key,
        extension,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `"3"`, `" 3 "` and `"3/12"` all give 3. Anything unparsable gives 0.
fn parse_number(value: Option<&str>) -> u32 {
    let Some(text) = value else {
        return 0;
    };
    let head = text.split('/').next().unwrap_or(text).trim();
    head.parse().unwrap_or(0)
}

/// Total from the `"1/2"` form of a position tag.
fn parse_total(value: Option<&str>) -> u32 {
    value
        .and_then(|text| text.split_once('/'))
        .and_then(|(_, total)| total.trim().parse().ok())
        .unwrap_or(0)
}
