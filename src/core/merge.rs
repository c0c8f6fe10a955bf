use crate::core::table::ListingTable;
use crate::domain::model::{ArtistSentiment, BidAction, RecommendationRow};
use std::collections::HashMap;

pub const DEFAULT_BID_THRESHOLD: f64 = 0.1;

/// `BidHigher` only when a score exists and is strictly above `threshold`.
pub fn bid_action(sentiment_score: Option<f64>, threshold: f64) -> BidAction {
    match sentiment_score {
        Some(score) if score > threshold => BidAction::BidHigher,
        _ => BidAction::DoNotBid,
    }
}

/// Left-joins every listing with its artist's sentiment.
///
/// Artists are matched case-insensitively; the listing keeps its own
/// spelling. Listings whose artist has no sentiment row get `None`.
pub fn merge(
    table: &ListingTable,
    sentiments: &[ArtistSentiment],
    threshold: f64,
) -> Vec<RecommendationRow> {
    let mut scores: HashMap<String, f64> = HashMap::with_capacity(sentiments.len());
    for sentiment in sentiments {
        // First entry wins if two names only differ in case
        scores
            .entry(sentiment.artist.to_lowercase())
            .or_insert(sentiment.sentiment_score);
    }

    table
        .rows()
        .iter()
        .map(|listing| {
            let sentiment_score = scores.get(&listing.artist.to_lowercase()).copied();
            if sentiment_score.is_none() {
                tracing::debug!("No sentiment for {}", listing.artist);
            }
            RecommendationRow {
                listing: listing.clone(),
                sentiment_score,
                bid_action: bid_action(sentiment_score, threshold),
            }
        })
        .collect()
}
