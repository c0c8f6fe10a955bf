use serde::{Deserialize, Serialize};
use std::fmt;

/// One auction listing as mapped out of the listing page, before any parsing.
///
/// Every field is optional because the page markup is not a stable schema;
/// the normalizer decides which absences are fatal for the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListingFragment {
    pub artist: Option<String>,
    pub piece_name: Option<String>,
    pub price_text: Option<String>,
    pub remaining_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub artist: String,
    pub piece_name: String,
    pub current_price: f64,
    pub currency: String,
    pub num_bids: u32,
    /// `None` when the remaining-time text was missing or unreadable.
    pub days_left: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistSentiment {
    pub artist: String,
    pub sentiment_score: f64,
    pub comment_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidAction {
    BidHigher,
    DoNotBid,
}

impl BidAction {
    pub fn label(&self) -> &'static str {
        match self {
            BidAction::BidHigher => "Bid Higher",
            BidAction::DoNotBid => "Do Not Bid",
        }
    }
}

impl fmt::Display for BidAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRow {
    #[serde(flatten)]
    pub listing: ListingRecord,
    pub sentiment_score: Option<f64>,
    pub bid_action: BidAction,
}

/// A discussion thread returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
}

/// A top-level comment. Deleted or removed comments have no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub body: Option<String>,
}

impl Comment {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
        }
    }

    pub fn absent() -> Self {
        Self { body: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// Everything the load stage writes out.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub rows: Vec<RecommendationRow>,
    pub sentiments: Vec<ArtistSentiment>,
    pub dropped_listings: usize,
}
