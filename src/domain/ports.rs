use crate::domain::model::{Comment, PolarityScores, RawListingFragment, Thread, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn page_depth(&self) -> u32;
    fn output_path(&self) -> &str;
    fn bid_threshold(&self) -> f64;
    fn output_formats(&self) -> &[String];
    /// Archive name when exports are bundled into a ZIP.
    fn compress_output(&self) -> Option<&str>;
}

/// Source of raw auction listings, one page at a time.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// `page_index` is 1-based.
    async fn fetch_page(&self, page_index: u32) -> Result<Vec<RawListingFragment>>;
}

/// Searchable discussion corpus.
#[async_trait]
pub trait DiscussionSearch: Send + Sync {
    /// Threads matching `query`, most relevant first.
    async fn search(&self, query: &str) -> Result<Vec<Thread>>;

    /// Every top-level comment of `thread`, with all "load more" placeholders
    /// expanded.
    async fn top_level_comments(&self, thread: &Thread) -> Result<Vec<Comment>>;
}

pub trait SentimentScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> Result<PolarityScores>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawListingFragment>>;
    async fn transform(&self, data: Vec<RawListingFragment>) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<String>;
}
