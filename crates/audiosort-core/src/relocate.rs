//! File moves into the canonical layout, with empty-directory cleanup.
//!
//! The policy that picks a target directory from metadata (year/album vs
//! genre/album) is not decided here; callers hand in the resolved target
//! directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::fstime;

/// Sidecar images are deleted instead of moved.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// File copied to the new location (creation timestamp preserved) and
    /// the source deleted.
    Moved(PathBuf),
    /// Source was an image sidecar; deleted in place.
    DeletedSidecar,
    /// Source and resolved target were the same path; nothing touched.
    AlreadyInPlace,
    /// Source vanished before or during the move; logged, not fatal.
    SourceMissing,
}

fn is_image_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == e)
        })
        .unwrap_or(false)
}

/// Move `source` into `target_dir`, keeping its file name.
pub fn move_into(source: &Path, target_dir: &Path) -> Result<MoveOutcome> {
    if !source.exists() {
        warn!(source = %source.display(), "move skipped, source missing");
        return Ok(MoveOutcome::SourceMissing);
    }
    let source = source.canonicalize()?;
    let file_name = match source.file_name() {
        Some(name) => name.to_os_string(),
        None => {
            warn!(source = %source.display(), "move skipped, source has no file name");
            return Ok(MoveOutcome::SourceMissing);
        }
    };

    let dest = target_dir.join(&file_name);
    if let Ok(resolved_dest) = dest.canonicalize() {
        if resolved_dest == source {
            debug!(path = %source.display(), "already in place");
            return Ok(MoveOutcome::AlreadyInPlace);
        }
    }

    let parent = source.parent().map(Path::to_path_buf);

    if is_image_sidecar(&source) {
        fs::remove_file(&source)?;
        if let Some(parent) = parent {
            remove_dir_if_empty(&parent);
        }
        debug!(path = %source.display(), "deleted image sidecar");
        return Ok(MoveOutcome::DeletedSidecar);
    }

    fs::create_dir_all(target_dir)?;
    let created = fstime::creation_time(&source)?;
    match fs::copy(&source, &dest) {
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(source = %source.display(), "move skipped, source vanished mid-copy");
            return Ok(MoveOutcome::SourceMissing);
        }
        Err(err) => return Err(err.into()),
    }
    fstime::set_creation_time(&dest, created)?;
    fs::remove_file(&source)?;
    if let Some(parent) = parent {
        remove_dir_if_empty(&parent);
    }

    debug!(from = %source.display(), to = %dest.display(), "moved");
    Ok(MoveOutcome::Moved(dest))
}

fn remove_dir_if_empty(dir: &Path) {
    let is_empty = fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if is_empty {
        if let Err(err) = fs::remove_dir(dir) {
            debug!(dir = %dir.display(), %err, "could not remove emptied directory");
        }
    }
}
