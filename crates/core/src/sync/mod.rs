pub mod ports;
pub mod runner;

pub use ports::{FetchError, ListingSource, ListingStore, StoreError};
pub use runner::{SyncError, SyncOptions, SyncReport, SyncRunner};

/// Page size requested from the remote source; a page shorter than this
/// signals the end of the data set.
pub const DEFAULT_PAGE_SIZE: usize = 50;
