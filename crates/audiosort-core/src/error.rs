use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The file has no readable tag block, or the container itself could not
    /// be parsed. The underlying parser error is kept as the source instead
    /// of falling back to empty tags.
    #[error("could not extract metadata from {}", path.display())]
    MetadataExtraction {
        path: PathBuf,
        #[source]
        source: Option<lofty::error::LoftyError>,
    },

    /// HTTP-level failure from the catalog site. Retried once against the
    /// alternate listing page before degrading to an empty tag list.
    #[error("catalog page returned HTTP {status}: {url}")]
    TransientFetch { url: String, status: u16 },

    #[error(transparent)]
    Http(Box<ureq::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
