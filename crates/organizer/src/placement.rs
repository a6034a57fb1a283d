use std::path::{Path, PathBuf};

use common::CopyStatus;

use crate::fs::FileSystem;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub destination: PathBuf,
    pub status: CopyStatus,
    pub detail: Option<String>,
}

/// First of `desired`, `name (1).ext`, `name (2).ext`, ... that does not
/// exist yet. Not atomic: another writer can still claim the name between
/// this check and the copy.
pub fn resolve_collision<F: FileSystem + ?Sized>(fs: &F, desired: &Path) -> PathBuf {
    if !fs.exists(desired) {
        return desired.to_path_buf();
    }

    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = desired
        .extension()
        .map(|s| s.to_string_lossy().to_string());

    let mut counter = 1u32;
    loop {
        let name = match &ext {
            Some(ext) => format!("{} ({}).{}", stem, counter, ext),
            None => format!("{} ({})", stem, counter),
        };
        let candidate = desired.with_file_name(name);
        if !fs.exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Copies `source` to a collision-free variant of `desired`. In dry-run mode
/// the destination is still resolved against the real filesystem but nothing
/// is created.
pub fn place<F: FileSystem + ?Sized>(
    fs: &F,
    source: &Path,
    desired: &Path,
    dry_run: bool,
) -> Placement {
    let destination = resolve_collision(fs, desired);

    if dry_run {
        return Placement {
            destination,
            status: CopyStatus::WouldCopy,
            detail: None,
        };
    }

    if let Some(parent) = destination.parent() {
        if let Err(err) = fs.create_dir_all(parent) {
            let detail = Some(format!("create directory {:?}: {}", parent, err));
            return Placement {
                destination,
                status: CopyStatus::Failed,
                detail,
            };
        }
    }

    match fs.copy_file(source, &destination) {
        Ok(_) => Placement {
            destination,
            status: CopyStatus::Success,
            detail: None,
        },
        Err(err) => Placement {
            destination,
            status: CopyStatus::Failed,
            detail: Some(format!("copy: {}", err)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{place, resolve_collision};
    use crate::fs::LocalFs;
    use common::CopyStatus;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn free_destination_is_used_as_is() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("01 - Song.flac");
        assert_eq!(resolve_collision(&LocalFs, &desired), desired);
    }

    #[test]
    fn collisions_get_counter_suffixes() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("01 - Song.flac");
        fs::write(&desired, b"x").unwrap();
        assert_eq!(
            resolve_collision(&LocalFs, &desired),
            dir.path().join("01 - Song (1).flac")
        );

        fs::write(dir.path().join("01 - Song (1).flac"), b"x").unwrap();
        assert_eq!(
            resolve_collision(&LocalFs, &desired),
            dir.path().join("01 - Song (2).flac")
        );
    }

    #[test]
    fn collision_without_extension() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("README");
        fs::write(&desired, b"x").unwrap();
        assert_eq!(resolve_collision(&LocalFs, &desired), dir.path().join("README (1)"));
    }

    #[test]
    fn two_sources_never_overwrite_each_other() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.mp3");
        let second = dir.path().join("second.mp3");
        fs::write(&first, b"first").unwrap();
        fs::write(&second, b"second").unwrap();
        let desired = dir.path().join("out/A/B/01 - Song.mp3");

        let a = place(&LocalFs, &first, &desired, false);
        let b = place(&LocalFs, &second, &desired, false);

        assert_eq!(a.status, CopyStatus::Success);
        assert_eq!(b.status, CopyStatus::Success);
        assert_eq!(a.destination, desired);
        assert_eq!(b.destination, dir.path().join("out/A/B/01 - Song (1).mp3"));
        assert_eq!(fs::read(&a.destination).unwrap(), b"first");
        assert_eq!(fs::read(&b.destination).unwrap(), b"second");
    }

    #[test]
    fn dry_run_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.mp3");
        fs::write(&source, b"data").unwrap();
        let desired = dir.path().join("out/A/B/01 - Song.mp3");

        let placement = place(&LocalFs, &source, &desired, true);
        assert_eq!(placement.status, CopyStatus::WouldCopy);
        assert_eq!(placement.destination, desired);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn dry_run_still_sees_existing_files() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.mp3");
        fs::write(&source, b"data").unwrap();
        let desired = dir.path().join("01 - Song.mp3");
        fs::write(&desired, b"old").unwrap();

        let placement = place(&LocalFs, &source, &desired, true);
        assert_eq!(placement.destination, dir.path().join("01 - Song (1).mp3"));
        assert_eq!(fs::read(&desired).unwrap(), b"old");
    }

    #[test]
    fn missing_source_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("out/01 - Song.mp3");
        let placement = place(&LocalFs, &dir.path().join("gone.mp3"), &desired, false);
        assert_eq!(placement.status, CopyStatus::Failed);
        assert!(placement.detail.is_some());
    }
}
