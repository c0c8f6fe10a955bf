use crate::core::merge::merge;
use crate::core::normalize::normalize_all;
use crate::core::report;
use crate::core::sentiment::SentimentAggregator;
use crate::core::table::ListingTable;
use crate::core::{
    ConfigProvider, DiscussionSearch, ListingSource, Pipeline, RawListingFragment,
    SentimentScorer, Storage, TransformResult,
};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Listings → normalized table → per-artist sentiment → recommendations.
pub struct AuctionPipeline<L, D, T, S, C>
where
    L: ListingSource,
    D: DiscussionSearch,
    T: SentimentScorer,
    S: Storage,
    C: ConfigProvider,
{
    source: L,
    aggregator: SentimentAggregator<D, T>,
    storage: S,
    config: C,
}

impl<L, D, T, S, C> AuctionPipeline<L, D, T, S, C>
where
    L: ListingSource,
    D: DiscussionSearch,
    T: SentimentScorer,
    S: Storage,
    C: ConfigProvider,
{
    pub fn new(source: L, search: D, scorer: T, storage: S, config: C) -> Self {
        Self {
            source,
            aggregator: SentimentAggregator::new(search, scorer),
            storage,
            config,
        }
    }

    /// Export files in the configured formats, as `(file name, contents)`.
    fn render_exports(&self, result: &TransformResult) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();
        for format in self.config.output_formats() {
            let data = match format.as_str() {
                "csv" => report::to_delimited(&result.rows, b',')?,
                "tsv" => report::to_delimited(&result.rows, b'\t')?,
                "json" => report::to_json(result, chrono::Utc::now())?,
                other => {
                    tracing::warn!("Skipping unsupported output format '{}'", other);
                    continue;
                }
            };
            files.push((format!("recommendations.{}", format), data));
        }
        Ok(files)
    }
}

#[async_trait::async_trait]
impl<L, D, T, S, C> Pipeline for AuctionPipeline<L, D, T, S, C>
where
    L: ListingSource,
    D: DiscussionSearch,
    T: SentimentScorer,
    S: Storage,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<Vec<RawListingFragment>> {
        let mut fragments = Vec::new();
        for page in 1..=self.config.page_depth() {
            fragments.extend(self.source.fetch_page(page).await?);
        }
        Ok(fragments)
    }

    async fn transform(&self, data: Vec<RawListingFragment>) -> Result<TransformResult> {
        let normalized = normalize_all(&data);
        if normalized.dropped > 0 {
            tracing::warn!(
                "⚠️ Dropped {} of {} listings",
                normalized.dropped,
                data.len()
            );
        }

        let table = ListingTable::build(normalized.records);
        let artists = table.unique_artists();
        tracing::info!(
            "🎨 {} listings from {} distinct artists",
            table.len(),
            artists.len()
        );

        let sentiments = self.aggregator.aggregate_all(&artists).await?;
        let rows = merge(&table, &sentiments, self.config.bid_threshold());

        Ok(TransformResult {
            rows,
            sentiments,
            dropped_listings: normalized.dropped,
        })
    }

    async fn load(&self, result: &TransformResult) -> Result<String> {
        let files = self.render_exports(result)?;

        let Some(archive_name) = self.config.compress_output() else {
            for (name, data) in &files {
                tracing::debug!("Writing {} ({} bytes)", name, data.len());
                self.storage.write_file(name, data).await?;
            }
            return Ok(self.config.output_path().to_string());
        };

        tracing::debug!("Creating ZIP file with {} files", files.len());
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &files {
                zip.start_file(name.as_str(), SimpleFileOptions::default())?;
                zip.write_all(data)?;
            }
            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(format!("{}/{}", self.config.output_path(), archive_name))
    }
}
