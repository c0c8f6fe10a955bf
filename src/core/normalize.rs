use crate::domain::model::{ListingRecord, RawListingFragment};
use std::fmt;

/// Why a fragment did not become a listing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    MissingArtist,
    MissingPieceName,
    MissingPrice,
    UnrecognizedPriceFormat(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingArtist => f.write_str("missing artist name"),
            DropReason::MissingPieceName => f.write_str("missing piece name"),
            DropReason::MissingPrice => f.write_str("missing price text"),
            DropReason::UnrecognizedPriceFormat(text) => {
                write!(f, "unrecognized price format '{}'", text)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPrice {
    pub price: f64,
    pub currency: String,
    pub num_bids: u32,
}

/// Normalized records in input order plus how many fragments were dropped.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    pub records: Vec<ListingRecord>,
    pub dropped: usize,
}

fn is_range_dash(c: char) -> bool {
    c == '—' || c == '–'
}

fn required_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parses an amount such as `1,250` or `800.50`.
fn parse_amount(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().replace(',', "").parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// `<price> <currency>`, exactly two tokens.
fn parse_price_and_currency(raw: &str) -> Option<(f64, String)> {
    let mut tokens = raw.split_whitespace();
    let price = parse_amount(tokens.next()?)?;
    let currency = tokens.next()?.to_string();
    if tokens.next().is_some() {
        return None;
    }
    Some((price, currency))
}

/// Parses the price/bid status line of a listing.
///
/// Three shapes are recognized, told apart by content:
///
/// * `1,000 USD (3 Bids)`: current price and bid count.
/// * `450 EUR (1 Bid)`: current price, one bid.
/// * `500—1,500 USD`: estimate range of an unbid lot, priced at the midpoint.
///
/// The `Bids` check must run before `Bid` since one contains the other.
pub fn parse_price(text: &str) -> Option<ParsedPrice> {
    let text = text.trim();

    if text.contains("Bids") {
        let (price_part, bid_part) = text.split_once(" (")?;
        let (price, currency) = parse_price_and_currency(price_part)?;
        let num_bids = bid_part
            .trim_end_matches(')')
            .trim()
            .strip_suffix("Bids")?
            .trim()
            .replace(',', "")
            .parse()
            .ok()?;
        Some(ParsedPrice {
            price,
            currency,
            num_bids,
        })
    } else if text.contains("Bid") {
        // The singular form only ever reads "(1 Bid)"
        let (price_part, _) = text.split_once(" (")?;
        let (price, currency) = parse_price_and_currency(price_part)?;
        Some(ParsedPrice {
            price,
            currency,
            num_bids: 1,
        })
    } else {
        let (low, rest) = text.split_once(is_range_dash)?;
        let mut tokens = rest.split_whitespace();
        let high = parse_amount(tokens.next()?)?;
        let currency = tokens.next()?.to_string();
        if tokens.next().is_some() {
            return None;
        }
        let low = parse_amount(low)?;
        Some(ParsedPrice {
            price: (low + high) / 2.0,
            currency,
            num_bids: 0,
        })
    }
}

/// Parses `"<N> days remaining"`. `N` may be zero or negative for lots that
/// have closed. Lots counting down in hours, minutes or seconds close today
/// and report `0`.
pub fn parse_days_left(text: &str) -> Option<i64> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [count, unit, _] = tokens.as_slice() else {
        return None;
    };
    let count: i64 = count.parse().ok()?;
    let unit = unit.to_ascii_lowercase();
    if unit.starts_with("day") {
        Some(count)
    } else if ["hour", "hr", "min", "sec"].iter().any(|u| unit.starts_with(u)) {
        Some(0)
    } else {
        None
    }
}

pub fn normalize(fragment: &RawListingFragment) -> Result<ListingRecord, DropReason> {
    let artist = required_text(&fragment.artist).ok_or(DropReason::MissingArtist)?;
    let piece_name = required_text(&fragment.piece_name).ok_or(DropReason::MissingPieceName)?;
    let price_text = required_text(&fragment.price_text).ok_or(DropReason::MissingPrice)?;

    let parsed = parse_price(price_text)
        .ok_or_else(|| DropReason::UnrecognizedPriceFormat(price_text.to_string()))?;

    let days_left = required_text(&fragment.remaining_text).and_then(parse_days_left);
    if days_left.is_none() {
        tracing::debug!(
            "No days remaining for '{}' by {} ({:?})",
            piece_name,
            artist,
            fragment.remaining_text
        );
    }

    Ok(ListingRecord {
        artist: artist.to_string(),
        piece_name: piece_name.to_string(),
        current_price: parsed.price,
        currency: parsed.currency,
        num_bids: parsed.num_bids,
        days_left,
    })
}

/// Normalizes every fragment, keeping input order. Dropped fragments are
/// logged and counted; they never stop the scan.
pub fn normalize_all(fragments: &[RawListingFragment]) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    for (index, fragment) in fragments.iter().enumerate() {
        match normalize(fragment) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                tracing::warn!("⚠️ Dropping listing #{}: {}", index + 1, reason);
                report.dropped += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(artist: &str, piece: &str, price: &str, remaining: &str) -> RawListingFragment {
        RawListingFragment {
            artist: Some(artist.to_string()),
            piece_name: Some(piece.to_string()),
            price_text: Some(price.to_string()),
            remaining_text: Some(remaining.to_string()),
        }
    }

    #[test]
    fn test_multi_bid_price() {
        let parsed = parse_price("1,000 USD (3 Bids)").unwrap();
        assert_eq!(parsed.price, 1000.0);
        assert_eq!(parsed.currency, "USD");
        assert_eq!(parsed.num_bids, 3);

        let parsed = parse_price("12,750.50 EUR (14 Bids)").unwrap();
        assert_eq!(parsed.price, 12750.5);
        assert_eq!(parsed.currency, "EUR");
        assert_eq!(parsed.num_bids, 14);
    }

    #[test]
    fn test_single_bid_is_always_one() {
        let parsed = parse_price("2,400 GBP (1 Bid)").unwrap();
        assert_eq!(parsed.price, 2400.0);
        assert_eq!(parsed.currency, "GBP");
        assert_eq!(parsed.num_bids, 1);

        // The count is not read back out of the singular form
        let parsed = parse_price("999 USD (7 Bid)").unwrap();
        assert_eq!(parsed.num_bids, 1);
    }

    #[test]
    fn test_estimate_range_uses_midpoint() {
        let parsed = parse_price("500—1,500 USD").unwrap();
        assert_eq!(parsed.price, 1000.0);
        assert_eq!(parsed.currency, "USD");
        assert_eq!(parsed.num_bids, 0);

        let parsed = parse_price("1,000—2,001 CHF").unwrap();
        assert_eq!(parsed.price, 1500.5);
    }

    #[test]
    fn test_unrecognized_prices() {
        assert_eq!(parse_price("Estimate on request"), None);
        assert_eq!(parse_price("1,000 USD"), None);
        assert_eq!(parse_price("abc USD (3 Bids)"), None);
        assert_eq!(parse_price("1,000 USD (many Bids)"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_parse_days_left() {
        assert_eq!(parse_days_left("3 days remaining"), Some(3));
        assert_eq!(parse_days_left("1 day remaining"), Some(1));
        assert_eq!(parse_days_left("0 days remaining"), Some(0));
        assert_eq!(parse_days_left("-2 days remaining"), Some(-2));
        assert_eq!(parse_days_left("Closing soon"), None);
        assert_eq!(parse_days_left("3 days"), None);
        assert_eq!(parse_days_left("5 hours remaining"), Some(0));
        assert_eq!(parse_days_left("1 hour remaining"), Some(0));
        assert_eq!(parse_days_left("42 minutes remaining"), Some(0));
        assert_eq!(parse_days_left("2 weeks remaining"), None);
    }

    #[test]
    fn test_normalize_full_record() {
        let record = normalize(&fragment(
            "Yayoi Kusama",
            "Pumpkin",
            "1,000 USD (3 Bids)",
            "5 days remaining",
        ))
        .unwrap();

        assert_eq!(record.artist, "Yayoi Kusama");
        assert_eq!(record.piece_name, "Pumpkin");
        assert_eq!(record.current_price, 1000.0);
        assert_eq!(record.currency, "USD");
        assert_eq!(record.num_bids, 3);
        assert_eq!(record.days_left, Some(5));
    }

    #[test]
    fn test_normalize_missing_fields_drop() {
        let mut missing_artist = fragment("", "Untitled", "100 USD (2 Bids)", "1 days remaining");
        missing_artist.artist = None;
        assert_eq!(normalize(&missing_artist), Err(DropReason::MissingArtist));

        let blank_piece = fragment("Banksy", "   ", "100 USD (2 Bids)", "1 days remaining");
        assert_eq!(normalize(&blank_piece), Err(DropReason::MissingPieceName));

        let bad_price = fragment("Banksy", "Girl with Balloon", "POA", "1 days remaining");
        assert_eq!(
            normalize(&bad_price),
            Err(DropReason::UnrecognizedPriceFormat("POA".to_string()))
        );
    }

    #[test]
    fn test_normalize_without_expiration_keeps_record() {
        let mut f = fragment("Banksy", "Rat", "100—300 USD", "");
        f.remaining_text = None;
        let record = normalize(&f).unwrap();
        assert_eq!(record.days_left, None);
        assert_eq!(record.current_price, 200.0);
    }

    #[test]
    fn test_normalize_all_keeps_order_and_counts_drops() {
        let fragments = vec![
            fragment("A", "One", "10 USD (2 Bids)", "4 days remaining"),
            fragment("B", "Two", "not a price", "1 days remaining"),
            fragment("C", "Three", "5—15 USD", "2 days remaining"),
        ];

        let report = normalize_all(&fragments);
        assert_eq!(report.dropped, 1);
        let artists: Vec<&str> = report.records.iter().map(|r| r.artist.as_str()).collect();
        assert_eq!(artists, vec!["A", "C"]);
    }
}
