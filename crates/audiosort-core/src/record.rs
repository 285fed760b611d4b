use std::path::{Path, PathBuf};

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fstime;
use crate::ledger::{AlbumArtist, AlbumLedger};
use crate::media_info;
use crate::origin::{self, Origin};
use crate::relocate::{self, MoveOutcome};

/// Display defaults substituted at this boundary; the raw tag layer keeps
/// absence as `None`.
pub const NO_TITLE: &str = "No Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Metadata record for one physical audio file. Immutable once constructed,
/// except for `path`, which changes exactly once on a successful move.
#[derive(Debug, Clone, Serialize)]
pub struct AudioRecord {
    pub file_name: String,
    pub path: PathBuf,
    pub download_year: i32,
    pub download_month: u32,
    pub title: String,
    pub album: String,
    pub artist: String,
    /// Always the ledger's reconciled value for this album, never per-file.
    pub album_artist: AlbumArtist,
    pub release_year: Option<i32>,
    pub duration_secs: u64,
    pub comment: Option<String>,
    pub origin: Origin,
    pub bit_rate: Option<u32>,
    /// Genre tags from the external catalog, when a lookup was performed.
    pub tags: Option<Vec<String>>,
    pub catalog_uri: String,
}

impl AudioRecord {
    /// Build a record from a file on disk, reconciling album-level facts
    /// through `ledger`.
    ///
    /// Fails with [`Error::NotFound`] for a missing path and
    /// [`Error::MetadataExtraction`] when the file carries no readable tag
    /// block.
    pub fn from_path(path: &Path, ledger: &mut AlbumLedger) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let path = path.canonicalize()?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let info = media_info::probe(&path)?;

        let title = info.title.unwrap_or_else(|| NO_TITLE.to_string());
        let album = info.album.unwrap_or_else(|| title.clone());
        let artist = info.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let (year, month) = fstime::creation_date(&path)?;
        let (download_year, download_month) = ledger.reconcile_date(&album, year, month);

        // The album-artist tag is the better reconciliation input when a
        // file carries one; most don't, and fall back to the track artist.
        let attribution = info.album_artist.unwrap_or_else(|| artist.clone());
        let album_artist = ledger.reconcile_artist(&album, &attribution);

        let comment = merge_comments(info.comment, info.legacy_comment);
        let origin = origin::classify(comment.as_deref().unwrap_or(""));

        let catalog_uri = local_file_uri(&path);
        debug!(file = %file_name, %album_artist, %origin, "built record");

        Ok(Self {
            file_name,
            path,
            download_year,
            download_month,
            title,
            album,
            artist,
            album_artist,
            release_year: info.year,
            duration_secs: info.duration_secs,
            comment,
            origin,
            bit_rate: info.bit_rate,
            tags: None,
            catalog_uri,
        })
    }

    /// Attach catalog genre tags at construction time.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Move the underlying file into `target_dir`, updating `path` when the
    /// move actually happened.
    pub fn relocate(&mut self, target_dir: &Path) -> Result<MoveOutcome> {
        let outcome = relocate::move_into(&self.path, target_dir)?;
        if let MoveOutcome::Moved(ref dest) = outcome {
            self.path = dest.clone();
        }
        Ok(outcome)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Both comment fields feed provenance classification; when a legacy tag
/// block carries a different comment the two are merged.
fn merge_comments(primary: Option<String>, legacy: Option<String>) -> Option<String> {
    match (primary, legacy) {
        (Some(a), Some(b)) if a != b => Some(format!("{a} {b}")),
        (Some(a), _) => Some(a),
        (None, b) => b,
    }
}

/// Percent-encode everything outside alphanumerics, the URI path characters
/// `/ . - _ ~`, and the site's safe set `:()!,+$#@`.
const URI_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'(')
    .remove(b')')
    .remove(b'!')
    .remove(b',')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#')
    .remove(b'@');

/// Canonical local-file URI for an absolute path, with percent escapes
/// lower-cased for normalization.
pub fn local_file_uri(path: &Path) -> String {
    let encoded = percent_encode(path.to_string_lossy().as_bytes(), URI_SAFE).to_string();
    format!("file://localhost{}", lowercase_escapes(&encoded))
}

fn lowercase_escapes(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = String::with_capacity(encoded.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            out.push('%');
            out.push(bytes[i + 1].to_ascii_lowercase() as char);
            out.push(bytes[i + 2].to_ascii_lowercase() as char);
            i += 3;
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

/// Extensions recognized as audio. Adding a new media kind means a new
/// [`FileRecord`] variant plus its extension here.
const AUDIO_EXTENSIONS: &[&str] = &["mp3"];

pub fn is_audio_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            AUDIO_EXTENSIONS.iter().any(|known| *known == e)
        })
        .unwrap_or(false)
}

/// A scanned file, tagged by media kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FileRecord {
    Audio(AudioRecord),
}

impl FileRecord {
    /// Build a record for a supported file, or `None` for a kind the scanner
    /// does not handle.
    pub fn from_path(path: &Path, ledger: &mut AlbumLedger) -> Result<Option<Self>> {
        if is_audio_path(path) {
            return Ok(Some(FileRecord::Audio(AudioRecord::from_path(path, ledger)?)));
        }
        Ok(None)
    }

    pub fn file_name(&self) -> &str {
        match self {
            FileRecord::Audio(record) => &record.file_name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileRecord::Audio(record) => &record.path,
        }
    }

    pub fn as_audio(&self) -> &AudioRecord {
        match self {
            FileRecord::Audio(record) => record,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
