pub mod catalog;
pub mod error;
pub mod fstime;
pub mod ledger;
pub mod media_info;
pub mod origin;
pub mod record;
pub mod relocate;
pub mod scan;

pub use error::{Error, Result};
pub use ledger::{AlbumArtist, AlbumLedger};
pub use origin::Origin;
pub use record::{AudioRecord, FileRecord};
pub use relocate::MoveOutcome;
pub use scan::Directory;
