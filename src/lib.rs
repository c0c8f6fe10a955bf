pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{ArtnetListingSource, LocalStorage, RedditConfig, RedditSearch, VaderScorer};
pub use core::{etl::EtlEngine, pipeline::AuctionPipeline};
pub use utils::error::{EtlError, Result};
