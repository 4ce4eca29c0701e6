//! Disk-backed document file store.
//!
//! Uploaded files live under a single root directory (`DOCR_UPLOAD_DIR`).
//! The database stores paths *relative* to that root, so the root can move
//! between runs without invalidating existing rows.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Stores uploaded document files under a root directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`, creating the directory if missing.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The root directory files are stored under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a name derived from `filename`, never
    /// overwriting an existing file.
    ///
    /// On collision a `_1`, `_2`, ... suffix is inserted before the
    /// extension until a free name is found.  Returns the chosen name,
    /// relative to the store root.
    pub fn save_unique(&self, filename: &str, bytes: &[u8]) -> io::Result<String> {
        // Drop any directory components a client may have smuggled in.
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin");
        let (stem, ext) = match name.rsplit_once('.') {
            Some((s, e)) if !s.is_empty() => (s, Some(e)),
            _ => (name, None),
        };

        let mut attempt: u32 = 0;
        loop {
            let candidate = match (attempt, ext) {
                (0, Some(ext)) => format!("{stem}.{ext}"),
                (0, None) => stem.to_owned(),
                (n, Some(ext)) => format!("{stem}_{n}.{ext}"),
                (n, None) => format!("{stem}_{n}"),
            };
            let target = self.root.join(&candidate);
            // create_new makes the existence check and the create atomic.
            match OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e),
            }
        }
    }

    /// Absolute path of a stored file given its root-relative name.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Whether the named file currently exists on disk.
    pub fn exists(&self, relative: &str) -> bool {
        self.resolve(relative).is_file()
    }

    /// Delete the named file.  Returns `Ok(false)` when it was already gone.
    pub fn remove(&self, relative: &str) -> io::Result<bool> {
        match fs::remove_file(self.resolve(relative)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
