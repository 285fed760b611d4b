use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// Album-level artist attribution agreed across all tracks of an album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumArtist {
    Artist(String),
    Various,
}

impl AlbumArtist {
    pub fn as_str(&self) -> &str {
        match self {
            AlbumArtist::Artist(name) => name,
            AlbumArtist::Various => VARIOUS_ARTISTS,
        }
    }
}

impl fmt::Display for AlbumArtist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AlbumArtist {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct AlbumEntry {
    date: Option<(i32, u32)>,
    artist: Option<AlbumArtist>,
}

/// Reconciliation table mapping album titles to agreed-upon cross-track
/// facts. Scoped to one scan: create it alongside the scan and drop it when
/// the scan is done.
///
/// Reconciliation is first-seen-wins and therefore order-dependent: the scan
/// traversal order decides which file's values become authoritative. Album
/// keys are matched exactly, case-sensitive, with no normalization.
#[derive(Debug, Default)]
pub struct AlbumLedger {
    entries: HashMap<String, AlbumEntry>,
}

impl AlbumLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first (year, month) recorded for an album is authoritative; later
    /// calls return the stored pair unchanged.
    pub fn reconcile_date(&mut self, album: &str, year: i32, month: u32) -> (i32, u32) {
        let entry = self.entries.entry(album.to_string()).or_default();
        *entry.date.get_or_insert((year, month))
    }

    /// The first artist seen for an album assigns the attribution. Any later
    /// file with a different artist permanently flips the album to
    /// [`AlbumArtist::Various`]; the flip never reverts, even if a later file
    /// matches the original artist again.
    pub fn reconcile_artist(&mut self, album: &str, artist: &str) -> AlbumArtist {
        let entry = self.entries.entry(album.to_string()).or_default();
        let reconciled = match entry.artist.take() {
            None => AlbumArtist::Artist(artist.to_string()),
            Some(AlbumArtist::Various) => AlbumArtist::Various,
            Some(AlbumArtist::Artist(current)) if current == artist => {
                AlbumArtist::Artist(current)
            }
            Some(AlbumArtist::Artist(_)) => AlbumArtist::Various,
        };
        entry.artist = Some(reconciled.clone());
        reconciled
    }

    /// Number of distinct album keys seen so far.
    pub fn albums(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_artist_is_returned_verbatim() {
        let mut ledger = AlbumLedger::new();
        let got = ledger.reconcile_artist("Night Drive", "Kavinsky");
        assert_eq!(got, AlbumArtist::Artist("Kavinsky".to_string()));
    }

    #[test]
    fn conflicting_artist_flips_to_various_permanently() {
        let mut ledger = AlbumLedger::new();
        ledger.reconcile_artist("Compilation Vol. 1", "Artist A");
        let got = ledger.reconcile_artist("Compilation Vol. 1", "Artist B");
        assert_eq!(got, AlbumArtist::Various);

        // A later file matching the original artist does not revert the flip.
        let got = ledger.reconcile_artist("Compilation Vol. 1", "Artist A");
        assert_eq!(got, AlbumArtist::Various);
        assert_eq!(got.as_str(), VARIOUS_ARTISTS);
    }

    #[test]
    fn matching_artist_keeps_attribution() {
        let mut ledger = AlbumLedger::new();
        ledger.reconcile_artist("Discovery", "Daft Punk");
        let got = ledger.reconcile_artist("Discovery", "Daft Punk");
        assert_eq!(got, AlbumArtist::Artist("Daft Punk".to_string()));
    }

    #[test]
    fn first_date_wins() {
        let mut ledger = AlbumLedger::new();
        assert_eq!(ledger.reconcile_date("X", 2020, 3), (2020, 3));
        assert_eq!(ledger.reconcile_date("X", 2021, 7), (2020, 3));
    }

    #[test]
    fn album_keys_are_independent_and_case_sensitive() {
        let mut ledger = AlbumLedger::new();
        ledger.reconcile_artist("Homework", "Daft Punk");
        let got = ledger.reconcile_artist("homework", "Someone Else");
        assert_eq!(got, AlbumArtist::Artist("Someone Else".to_string()));
        assert_eq!(ledger.albums(), 2);
    }
}
