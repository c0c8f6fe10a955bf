use crate::domain::model::ArtistSentiment;
use crate::domain::ports::{DiscussionSearch, SentimentScorer};
use crate::utils::error::Result;

/// Scores each artist by the mean compound polarity of the top-level
/// comments in discussion threads that mention them.
pub struct SentimentAggregator<D: DiscussionSearch, S: SentimentScorer> {
    search: D,
    scorer: S,
}

impl<D: DiscussionSearch, S: SentimentScorer> SentimentAggregator<D, S> {
    pub fn new(search: D, scorer: S) -> Self {
        Self { search, scorer }
    }

    /// Lower-cased bodies of every present top-level comment across all
    /// threads matching `artist`.
    pub async fn collect_comments(&self, artist: &str) -> Result<Vec<String>> {
        let query = artist.to_lowercase();
        let threads = self.search.search(&query).await?;
        tracing::debug!("🔎 '{}' matched {} threads", query, threads.len());

        let mut texts = Vec::new();
        for thread in &threads {
            let comments = self.search.top_level_comments(thread).await?;
            texts.extend(
                comments
                    .into_iter()
                    .filter_map(|c| c.body)
                    .filter(|body| !body.is_empty())
                    .map(|body| body.to_lowercase()),
            );
        }

        Ok(texts)
    }

    pub async fn aggregate(&self, artist: &str) -> Result<ArtistSentiment> {
        let texts = self.collect_comments(artist).await?;

        let mut total = 0.0;
        for text in &texts {
            total += self.scorer.polarity_scores(text)?.compound;
        }

        // No comments scores as exactly neutral
        let sentiment_score = if texts.is_empty() {
            0.0
        } else {
            total / texts.len() as f64
        };

        tracing::info!(
            "💬 {}: {} comments, sentiment {:.3}",
            artist,
            texts.len(),
            sentiment_score
        );

        Ok(ArtistSentiment {
            artist: artist.to_string(),
            sentiment_score,
            comment_count: texts.len(),
        })
    }

    /// Aggregates artists one after another. The first failure aborts.
    pub async fn aggregate_all(&self, artists: &[String]) -> Result<Vec<ArtistSentiment>> {
        let mut sentiments = Vec::with_capacity(artists.len());
        for artist in artists {
            sentiments.push(self.aggregate(artist).await?);
        }
        Ok(sentiments)
    }
}
