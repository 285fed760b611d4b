use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::fstime;
use crate::ledger::AlbumLedger;
use crate::record::FileRecord;

/// A filesystem subtree scanned once. The record list and the
/// empty-directory list are computed lazily and cached; constructing a new
/// `Directory` is the only way to re-scan.
#[derive(Debug)]
pub struct Directory {
    root: PathBuf,
    records: Option<Vec<FileRecord>>,
    empty_dirs: Option<Vec<PathBuf>>,
}

impl Directory {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(Error::NotFound(root));
        }
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }
        Ok(Self {
            root,
            records: None,
            empty_dirs: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// One record per supported file under the root, built on first call and
    /// cached. Traversal is sorted by file name so ledger reconciliation is
    /// deterministic for a given tree.
    pub fn records(&mut self, ledger: &mut AlbumLedger) -> Result<&[FileRecord]> {
        if self.records.is_none() {
            let mut records = Vec::new();
            for entry in WalkDir::new(&self.root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(record) = FileRecord::from_path(entry.path(), ledger)? {
                    records.push(record);
                }
            }
            info!(root = %self.root.display(), files = records.len(), "scanned");
            self.records = Some(records);
        }
        Ok(self.records.as_deref().unwrap_or_default())
    }

    pub fn file_count(&mut self, ledger: &mut AlbumLedger) -> Result<usize> {
        Ok(self.records(ledger)?.len())
    }

    /// Directories under the root containing literally zero entries; the
    /// root itself qualifies when empty. Computed on first call and cached.
    pub fn empty_dirs(&mut self) -> &[PathBuf] {
        if self.empty_dirs.is_none() {
            let empty: Vec<PathBuf> = WalkDir::new(&self.root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_dir())
                .map(|e| e.into_path())
                .filter(|p| {
                    fs::read_dir(p)
                        .map(|mut entries| entries.next().is_none())
                        .unwrap_or(false)
                })
                .collect();
            self.empty_dirs = Some(empty);
        }
        self.empty_dirs.as_deref().unwrap_or_default()
    }

    /// Copy the whole tree to a `<root>_bak` sibling, preserving file
    /// timestamps, and return the backup path.
    pub fn backup(&self) -> Result<PathBuf> {
        let mut name = self
            .root
            .file_name()
            .unwrap_or(self.root.as_os_str())
            .to_os_string();
        name.push("_bak");
        let dest = self.root.with_file_name(name);

        debug!(from = %self.root.display(), to = %dest.display(), "backing up");
        copy_tree(&self.root, &dest)?;
        info!(to = %dest.display(), "backup created");
        Ok(dest)
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let source = entry.path();
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&source, &dest)?;
        } else {
            fs::copy(&source, &dest)?;
            fstime::set_creation_time(&dest, fstime::creation_time(&source)?)?;
        }
    }
    Ok(())
}
