pub mod extract;
pub mod model;

pub use extract::ExtractError;
pub use model::ListingRecord;
