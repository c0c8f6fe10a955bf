// Adapters layer: concrete implementations of the domain ports.

pub mod artnet;
pub mod reddit;
pub mod storage;
pub mod vader;

pub use artnet::ArtnetListingSource;
pub use reddit::{RedditConfig, RedditSearch};
pub use storage::LocalStorage;
pub use vader::VaderScorer;
