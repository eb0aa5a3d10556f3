pub mod domus;
pub mod listing;
pub mod store;
pub mod sync;
