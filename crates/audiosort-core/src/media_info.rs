//! Thin adapter over lofty: one probe call per file, returning the raw tag
//! fields the rest of the pipeline works from. Absence stays `None` here;
//! display defaults are applied at the record boundary.

use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::{Accessor, ItemKey};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub year: Option<i32>,
    /// Comment from the primary tag block.
    pub comment: Option<String>,
    /// Comment from any secondary tag block (e.g. an ID3v1 remnant).
    pub legacy_comment: Option<String>,
    pub duration_secs: u64,
    /// Audio bit rate in kbps, when the container reports one.
    pub bit_rate: Option<u32>,
}

pub fn probe(path: &Path) -> Result<MediaInfo> {
    let tagged = lofty::read_from_path(path).map_err(|source| Error::MetadataExtraction {
        path: path.to_path_buf(),
        source: Some(source),
    })?;

    let properties = tagged.properties();
    let duration_secs = properties.duration().as_secs();
    let bit_rate = properties.audio_bitrate();

    let tag = tagged
        .primary_tag()
        .or_else(|| tagged.first_tag())
        .ok_or_else(|| Error::MetadataExtraction {
            path: path.to_path_buf(),
            source: None,
        })?;

    let year = tag.year().map(|y| y as i32).or_else(|| {
        non_empty(tag.get_string(&ItemKey::RecordingDate))
            .and_then(|date| date.get(..4).and_then(|y| y.parse().ok()))
    });

    let legacy_comment = tagged
        .tags()
        .iter()
        .filter(|t| t.tag_type() != tag.tag_type())
        .find_map(|t| non_empty(t.get_string(&ItemKey::Comment)));

    Ok(MediaInfo {
        title: non_empty(tag.get_string(&ItemKey::TrackTitle)),
        album: non_empty(tag.get_string(&ItemKey::AlbumTitle)),
        artist: non_empty(tag.get_string(&ItemKey::TrackArtist)),
        album_artist: non_empty(tag.get_string(&ItemKey::AlbumArtist)),
        year,
        comment: non_empty(tag.get_string(&ItemKey::Comment)),
        legacy_comment,
        duration_secs,
        bit_rate,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
