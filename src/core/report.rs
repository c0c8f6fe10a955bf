use crate::domain::model::{ArtistSentiment, RecommendationRow, TransformResult};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const HEADERS: [&str; 8] = [
    "Artist",
    "Name of Piece",
    "Current Price",
    "Currency",
    "Num of Bids",
    "Days Left",
    "Sentiment Score",
    "Bid Action",
];

/// Row cells as shown to the operator and written to CSV/TSV.
/// Missing values render as empty cells.
fn cells(row: &RecommendationRow) -> [String; 8] {
    let listing = &row.listing;
    [
        listing.artist.clone(),
        listing.piece_name.clone(),
        format!("{:.2}", listing.current_price),
        listing.currency.clone(),
        listing.num_bids.to_string(),
        listing.days_left.map(|d| d.to_string()).unwrap_or_default(),
        row.sentiment_score
            .map(|s| format!("{:.4}", s))
            .unwrap_or_default(),
        row.bid_action.label().to_string(),
    ]
}

pub fn to_delimited(rows: &[RecommendationRow], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(cells(row))?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("flushing report: {}", e),
    })
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    dropped_listings: usize,
    artists: &'a [ArtistSentiment],
    recommendations: &'a [RecommendationRow],
}

pub fn to_json(result: &TransformResult, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let report = JsonReport {
        generated_at,
        dropped_listings: result.dropped_listings,
        artists: &result.sentiments,
        recommendations: &result.rows,
    };
    Ok(serde_json::to_vec_pretty(&report)?)
}

/// Plain-text table with left-aligned text columns and right-aligned numbers.
pub fn render_table(rows: &[RecommendationRow]) -> String {
    let body: Vec<[String; 8]> = rows.iter().map(cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let numeric = [false, false, true, false, true, true, true, false];
    let format_line = |line: &[String]| {
        line.iter()
            .enumerate()
            .map(|(i, cell)| {
                if numeric[i] {
                    format!("{:>width$}", cell, width = widths[i])
                } else {
                    format!("{:<width$}", cell, width = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let mut out = vec![format_line(&header)];
    out.extend(body.iter().map(|row| format_line(row)));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BidAction, ListingRecord};
    use chrono::TimeZone;

    fn rows() -> Vec<RecommendationRow> {
        vec![
            RecommendationRow {
                listing: ListingRecord {
                    artist: "Yayoi Kusama".to_string(),
                    piece_name: "Pumpkin, Yellow".to_string(),
                    current_price: 12000.0,
                    currency: "USD".to_string(),
                    num_bids: 4,
                    days_left: Some(2),
                },
                sentiment_score: Some(0.42),
                bid_action: BidAction::BidHigher,
            },
            RecommendationRow {
                listing: ListingRecord {
                    artist: "Unknown".to_string(),
                    piece_name: "Study".to_string(),
                    current_price: 150.5,
                    currency: "EUR".to_string(),
                    num_bids: 0,
                    days_left: None,
                },
                sentiment_score: None,
                bid_action: BidAction::DoNotBid,
            },
        ]
    }

    #[test]
    fn test_csv_quotes_and_blanks() {
        let csv = String::from_utf8(to_delimited(&rows(), b',').unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Artist,Name of Piece,Current Price,Currency,Num of Bids,Days Left,Sentiment Score,Bid Action"
        );
        assert_eq!(
            lines[1],
            "Yayoi Kusama,\"Pumpkin, Yellow\",12000.00,USD,4,2,0.4200,Bid Higher"
        );
        assert_eq!(lines[2], "Unknown,Study,150.50,EUR,0,,,Do Not Bid");
    }

    #[test]
    fn test_tsv() {
        let tsv = String::from_utf8(to_delimited(&rows(), b'\t').unwrap()).unwrap();
        assert!(tsv.lines().nth(1).unwrap().starts_with("Yayoi Kusama\tPumpkin, Yellow\t"));
    }

    #[test]
    fn test_json_report() {
        let result = TransformResult {
            rows: rows(),
            sentiments: vec![ArtistSentiment {
                artist: "Yayoi Kusama".to_string(),
                sentiment_score: 0.42,
                comment_count: 12,
            }],
            dropped_listings: 3,
        };
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&to_json(&result, at).unwrap()).unwrap();

        assert_eq!(json["generated_at"], "2026-10-16T09:30:00Z");
        assert_eq!(json["dropped_listings"], 3);
        assert_eq!(json["artists"][0]["comment_count"], 12);
        assert_eq!(json["recommendations"][0]["artist"], "Yayoi Kusama");
        assert_eq!(json["recommendations"][0]["bid_action"], "BidHigher");
        assert!(json["recommendations"][1]["sentiment_score"].is_null());
        assert!(json["recommendations"][1]["days_left"].is_null());
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(&rows());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Artist        Name of Piece"));
        assert!(lines[1].contains("12000.00"));
        assert!(lines[2].ends_with("Do Not Bid"));

        let bid_col = lines[0].find("Bid Action").unwrap();
        assert_eq!(lines[1].find("Bid Higher").unwrap(), bid_col);
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let csv = String::from_utf8(to_delimited(&[], b',').unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert_eq!(render_table(&[]).lines().count(), 1);
    }
}
