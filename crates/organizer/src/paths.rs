use std::path::{Path, PathBuf};

use common::{TrackRecord, UNKNOWN_ALBUM, UNKNOWN_ARTIST};

/// Characters rejected in a path component on at least one common
/// filesystem. Control characters are rejected as well.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Destination for `record` under `root`. Pure: no filesystem access.
pub fn build_path(root: &Path, record: &TrackRecord, multi_disc: bool) -> PathBuf {
    let mut out = album_dir(root, record);
    if multi_disc {
        out.push(disc_folder_name(record.effective_disc()));
    }
    out.push(file_name(record));
    out
}

pub fn album_dir(root: &Path, record: &TrackRecord) -> PathBuf {
    let mut out = PathBuf::from(root);
    out.push(component_or(record.artist.as_deref(), UNKNOWN_ARTIST));
    out.push(component_or(record.album.as_deref(), UNKNOWN_ALBUM));
    out
}

pub fn disc_folder_name(disc: u32) -> String {
    format!("Disc {:02}", disc)
}

/// `NN - Title.ext`, `Title.ext` when the track is unset, or the source file
/// name when no usable title is left after sanitizing.
pub fn file_name(record: &TrackRecord) -> String {
    let title = match record.title.as_deref().map(sanitize_component) {
        Some(title) if !title.trim().is_empty() => title,
        _ => return record.source_file_name(),
    };

    let mut name = if record.track_number > 0 {
        format!("{:02} - {}", record.track_number, title)
    } else {
        title
    };
    if !record.extension.is_empty() {
        name.push('.');
        name.push_str(&record.extension);
    }
    name
}

pub fn sanitize_component(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|ch| {
            if ch.is_control() || INVALID_CHARS.contains(&ch) {
                '_'
            } else {
                ch
            }
        })
        .collect();
    replaced
        .trim_matches(|ch: char| ch == ' ' || ch == '.')
        .to_string()
}

fn component_or(value: Option<&str>, fallback: &str) -> String {
    let sanitized = value.map(sanitize_component).unwrap_or_default();
    if sanitized.trim().is_empty() {
        fallback.to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::{build_path, file_name, sanitize_component};
    use common::{AlbumKey, TrackRecord};
    use std::path::{Path, PathBuf};

    fn record(
        artist: Option<&str>,
        album: Option<&str>,
        title: Option<&str>,
        track: u32,
        disc: u32,
        source: &str,
    ) -> TrackRecord {
        let source_path = PathBuf::from(source);
        let extension = source_path
            .extension()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        TrackRecord {
            source_path,
            artist: artist.map(str::to_string),
            album: album.map(str::to_string),
            title: title.map(str::to_string),
            track_number: track,
            disc_number: disc,
            disc_count: 0,
            album_key: AlbumKey::new(artist, album),
            extension,
        }
    }

    #[test]
    fn multi_disc_album_gets_disc_folders() {
        let first = record(
            Some("Pink Floyd"),
            Some("The Wall"),
            Some("In The Flesh"),
            1,
            1,
            "/in/a.flac",
        );
        let second = record(
            Some("Pink Floyd"),
            Some("The Wall"),
            Some("Hey You"),
            1,
            2,
            "/in/b.flac",
        );
        assert_eq!(
            build_path(Path::new("M:"), &first, true),
            PathBuf::from("M:/Pink Floyd/The Wall/Disc 01/01 - In The Flesh.flac")
        );
        assert_eq!(
            build_path(Path::new("M:"), &second, true),
            PathBuf::from("M:/Pink Floyd/The Wall/Disc 02/01 - Hey You.flac")
        );
    }

    #[test]
    fn unset_disc_lands_in_disc_one() {
        let track = record(Some("A"), Some("B"), Some("C"), 3, 0, "/in/c.mp3");
        assert_eq!(
            build_path(Path::new("/out"), &track, true),
            PathBuf::from("/out/A/B/Disc 01/03 - C.mp3")
        );
        assert_eq!(
            build_path(Path::new("/out"), &track, false),
            PathBuf::from("/out/A/B/03 - C.mp3")
        );
    }

    #[test]
    fn untagged_file_keeps_source_name() {
        let track = record(None, None, None, 0, 0, "/in/track7.mp3");
        assert_eq!(
            build_path(Path::new("M:"), &track, false),
            PathBuf::from("M:/Unknown Artist/Unknown Album/track7.mp3")
        );
    }

    #[test]
    fn title_without_track_number() {
        let track = record(Some("A"), Some("B"), Some("Intro"), 0, 0, "/in/x.ogg");
        assert_eq!(file_name(&track), "Intro.ogg");
    }

    #[test]
    fn wide_track_numbers_are_not_truncated() {
        let track = record(Some("A"), Some("B"), Some("Outro"), 104, 0, "/in/x.ogg");
        assert_eq!(file_name(&track), "104 - Outro.ogg");
    }

    #[test]
    fn extension_is_kept_verbatim() {
        let track = record(Some("A"), Some("B"), Some("Song"), 2, 0, "/in/LOUD.MP3");
        assert_eq!(file_name(&track), "02 - Song.MP3");
    }

    #[test]
    fn sanitizes_invalid_characters() {
        assert_eq!(sanitize_component("AC/DC"), "AC_DC");
        assert_eq!(sanitize_component("What?: <Live>"), "What__ _Live_");
        assert_eq!(sanitize_component("tab\there"), "tab_here");
        assert_eq!(sanitize_component("  ..Hidden.. "), "Hidden");
    }

    #[test]
    fn collapsed_components_use_fallbacks() {
        let track = record(Some(" . . "), Some("..."), Some("Song"), 1, 0, "/in/x.flac");
        assert_eq!(
            build_path(Path::new("/out"), &track, false),
            PathBuf::from("/out/Unknown Artist/Unknown Album/01 - Song.flac")
        );
    }

    #[test]
    fn collapsed_title_uses_unsanitized_source_name() {
        let track = record(Some("A"), Some("B"), Some(" .. "), 5, 0, "/in/weird name.flac");
        assert_eq!(file_name(&track), "weird name.flac");
    }

    #[test]
    fn title_left_with_only_whitespace_uses_source_name() {
        let track = record(
            Some("A"),
            Some("B"),
            Some(". \u{a0} ."),
            1,
            0,
            "/in/original.mp3",
        );
        assert_eq!(file_name(&track), "original.mp3");
    }

    #[test]
    fn build_path_is_deterministic() {
        let track = record(Some("A"), Some("B"), Some("C"), 1, 2, "/in/c.flac");
        let first = build_path(Path::new("/out"), &track, true);
        for _ in 0..10 {
            assert_eq!(build_path(Path::new("/out"), &track, true), first);
        }
    }
}
