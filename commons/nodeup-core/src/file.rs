use std::fs::{DirBuilder, Permissions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::client::FileSink;
use crate::error::{Error, Result};

/// Mode for directories created on the way to an artifact.
pub const DIR_MODE: u32 = 0o710;

/// One rendered artifact waiting to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigUnit {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub mode: u32,
}

/// Writes artifacts by renaming a fully written temporary file over the
/// target, so readers only ever see the old or the new content. Targets
/// whose content already matches are left alone.
#[derive(Clone, Debug)]
pub struct AtomicFile {
    root: PathBuf,
    dry_run: bool,
}

impl Default for AtomicFile {
    fn default() -> Self {
        Self::new("/")
    }
}

impl AtomicFile {
    /// Artifact paths are resolved relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }

    /// Only report what would change.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn target(&self, path: &Path) -> PathBuf {
        self.root.join(path.strip_prefix("/").unwrap_or(path))
    }
}

impl FileSink for AtomicFile {
    fn sync(&self, unit: &ConfigUnit) -> Result<bool> {
        let path = self.target(&unit.path);
        let existing = read_existing(&path)?;
        if !needs_write(existing.as_deref(), &unit.content) {
            debug!(path = %path.display(), "file is up to date");
            return Ok(false);
        }

        let old = existing.unwrap_or_default();
        if self.dry_run {
            info!(path = %path.display(), "file would be updated");
            log_changes(&path, &old, &unit.content);
            return Ok(true);
        }
        info!(path = %path.display(), "file will be updated");
        log_changes(&path, &old, &unit.content);
        write_atomic(&path, &unit.content, unit.mode)?;
        Ok(true)
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

fn read_existing(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// A missing file only needs writing when there is something to put in it.
fn needs_write(existing: Option<&[u8]>, content: &[u8]) -> bool {
    match existing {
        Some(old) => old != content,
        None => !content.is_empty(),
    }
}

fn write_atomic(path: &Path, content: &[u8], mode: u32) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("/"));
    DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
        .map_err(|e| Error::io(dir, e))?;

    // same directory as the target so the rename never crosses filesystems
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(path, e))?;
    tmp.write_all(content).map_err(|e| Error::io(path, e))?;
    tmp.as_file()
        .set_permissions(Permissions::from_mode(mode))
        .map_err(|e| Error::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(path, e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

fn log_changes(path: &Path, old: &[u8], new: &[u8]) {
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    for line in line_changes(&old, &new) {
        debug!(path = %path.display(), "{line}");
    }
}

/// Lines only present on one side, `-` for removed and `+` for added.
fn line_changes(old: &str, new: &str) -> Vec<String> {
    let removed = old
        .lines()
        .filter(|l| !new.lines().any(|n| n == *l))
        .map(|l| format!("- {l}"));
    let added = new
        .lines()
        .filter(|l| !old.lines().any(|o| o == *l))
        .map(|l| format!("+ {l}"));
    removed.chain(added).collect()
}
