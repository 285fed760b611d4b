//! Creation-time get/set over the platform file-time APIs.
//!
//! Creation time is not settable on most Unix filesystems, so the setter
//! writes the modification time instead; that is the timestamp the rest of
//! the pipeline preserves across moves.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{Datelike, Local, TimeZone};
use filetime::FileTime;

pub fn creation_time(path: &Path) -> io::Result<FileTime> {
    let meta = fs::metadata(path)?;
    match meta.created() {
        Ok(created) => Ok(FileTime::from_system_time(created)),
        Err(_) => Ok(FileTime::from_last_modification_time(&meta)),
    }
}

pub fn set_creation_time(path: &Path, time: FileTime) -> io::Result<()> {
    filetime::set_file_mtime(path, time)
}

/// Creation time as a local (year, month) pair.
pub fn creation_date(path: &Path) -> io::Result<(i32, u32)> {
    let time = creation_time(path)?;
    let date = Local
        .timestamp_opt(time.unix_seconds(), 0)
        .single()
        .map(|dt| (dt.year(), dt.month()))
        .unwrap_or((1970, 1));
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn set_then_get_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        File::create(&path).unwrap();

        // 2020-03-15 00:00:00 UTC
        let stamp = FileTime::from_unix_time(1_584_230_400, 0);
        set_creation_time(&path, stamp).unwrap();

        let meta = fs::metadata(&path).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), stamp);
    }

    #[test]
    fn creation_date_is_a_plausible_year() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("b.txt");
        File::create(&path).unwrap();

        let (year, month) = creation_date(&path).unwrap();
        assert!(year >= 2020);
        assert!((1..=12).contains(&month));
    }
}
