pub mod client;

pub use client::{DomusClient, DomusConfig};
