use crate::domain::model::ListingRecord;
use std::collections::HashSet;

/// Listings ordered by days remaining, soonest first.
///
/// Ties keep extraction order. Listings without a days-remaining value sort
/// after every dated listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingTable {
    rows: Vec<ListingRecord>,
}

impl ListingTable {
    pub fn build(mut records: Vec<ListingRecord>) -> Self {
        // sort_by_key is stable
        records.sort_by_key(|r| (r.days_left.is_none(), r.days_left));
        Self { rows: records }
    }

    pub fn rows(&self) -> &[ListingRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct artist names in order of first appearance in the table.
    pub fn unique_artists(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut artists = Vec::new();
        for row in &self.rows {
            if seen.insert(row.artist.as_str()) {
                artists.push(row.artist.clone());
            }
        }
        artists
    }
}
