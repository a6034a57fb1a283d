use std::fs;
use std::io;
use std::path::{self, Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// Filesystem capabilities the organizer needs. Kept narrow so tests can
/// swap in a provider that fails on demand.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64>;
    /// Regular files under `root`, sorted by path.
    fn enumerate_files(&self, root: &Path, recursive: bool) -> Vec<PathBuf>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        (**self).copy_file(src, dst)
    }

    fn enumerate_files(&self, root: &Path, recursive: bool) -> Vec<PathBuf> {
        (**self).enumerate_files(root, recursive)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        // Broken symlinks still occupy the name.
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        fs::copy(src, dst)
    }

    fn enumerate_files(&self, root: &Path, recursive: bool) -> Vec<PathBuf> {
        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .max_depth(max_depth)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry under {:?}: {}", root, err);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        files
    }
}

/// Absolute, symlink-free spelling of `path`. The longest existing prefix is
/// canonicalized and any not-yet-created remainder is appended unchanged.
pub fn resolve_path(path: &Path) -> PathBuf {
    let absolute = path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut tail = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(real) = fs::canonicalize(current) {
            let mut out = real;
            for part in tail.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                current = parent;
            }
            _ => return absolute,
        }
    }
}
