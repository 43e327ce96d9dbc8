//! Twitter/X keyword search: wire types, normalization, pagination.

pub mod canon;
pub mod client;
pub mod harvest;
pub mod types;

pub use canon::{normalize, CanonicalPost};
pub use client::SearchApi;
pub use harvest::Harvester;
