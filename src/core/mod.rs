pub mod etl;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod table;

pub use crate::domain::model::{RawListingFragment, TransformResult};
pub use crate::domain::ports::{
    ConfigProvider, DiscussionSearch, ListingSource, Pipeline, SentimentScorer, Storage,
};
pub use crate::utils::error::Result;
