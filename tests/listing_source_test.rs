use anyhow::Result;
use art_bid_etl::core::normalize::normalize_all;
use art_bid_etl::domain::ports::ListingSource;
use art_bid_etl::adapters::artnet::WebDriverPageFetcher;
use art_bid_etl::{ArtnetListingSource, EtlError};
use httpmock::prelude::*;
use serde_json::json;
use std::time::{Duration, Instant};

const PAGE_ONE: &str = r#"
<html><body><div class="grid">
  <div class="details"><ul>
    <li class="ng-binding">Damien Hirst</li>
    <li><em class="ng-binding">Spot Print</em></li>
    <li class="ng-binding ng-scope">8,500 USD (6 Bids)</li>
    <li ng-class="{'red' : brick.Remaining.Days <= 0}">4 days remaining</li>
  </ul></div>
  <div class="details"><ul>
    <li><em class="ng-binding">Untitled</em></li>
    <li class="ng-binding ng-scope">100 USD (1 Bid)</li>
  </ul></div>
</div></body></html>
"#;

const PAGE_TWO: &str = r#"
<html><body>
  <div class="details"><ul>
    <li class="ng-binding">Yayoi Kusama</li>
    <li><em class="ng-binding">Pumpkin</em></li>
    <li class="ng-binding ng-scope">20,000—30,000 USD</li>
    <li ng-class="{'red' : brick.Remaining.Days <= 0}">0 days remaining</li>
  </ul></div>
</body></html>
"#;

fn template(server: &MockServer) -> String {
    format!("{}/auctions/all-artworks/{{page}}", server.base_url())
}

#[tokio::test]
async fn test_fetch_page_maps_and_normalizes() -> Result<()> {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/auctions/all-artworks/1")
            .header_exists("user-agent");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(PAGE_ONE);
    });

    let source = ArtnetListingSource::new(template(&server), Duration::ZERO)?;
    let fragments = source.fetch_page(1).await?;

    page_mock.assert();
    assert_eq!(fragments.len(), 2);

    // The second card has no artist and is dropped during normalization
    let report = normalize_all(&fragments);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.artist, "Damien Hirst");
    assert_eq!(record.piece_name, "Spot Print");
    assert_eq!(record.current_price, 8500.0);
    assert_eq!(record.num_bids, 6);
    assert_eq!(record.days_left, Some(4));
    Ok(())
}

#[tokio::test]
async fn test_delay_applies_between_pages() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/auctions/all-artworks/1");
        then.status(200).body(PAGE_ONE);
    });
    server.mock(|when, then| {
        when.method(GET).path("/auctions/all-artworks/2");
        then.status(200).body(PAGE_TWO);
    });

    let source = ArtnetListingSource::new(template(&server), Duration::from_millis(150))?;

    source.fetch_page(1).await?;
    let started = Instant::now();
    let fragments = source.fetch_page(2).await?;

    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].price_text.as_deref(), Some("20,000—30,000 USD"));
    Ok(())
}

#[tokio::test]
async fn test_http_error_aborts() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/auctions/all-artworks/1");
        then.status(403).body("blocked");
    });

    let source = ArtnetListingSource::new(template(&server), Duration::ZERO)?;
    let err = source.fetch_page(1).await.unwrap_err();

    assert!(matches!(err, EtlError::ExternalServiceError { .. }));
    assert!(err.to_string().contains("403"));
    Ok(())
}

#[tokio::test]
async fn test_unrendered_template_is_an_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/auctions/all-artworks/1");
        then.status(200).body(
            r#"<html ng-app="artnet"><body>
              <div class="details" ng-repeat="brick in bricks"><ul>
                <li>{{brick.ArtistName}}</li>
                <li><em>{{brick.LotTitle}}</em></li>
              </ul></div>
            </body></html>"#,
        );
    });

    let source = ArtnetListingSource::new(template(&server), Duration::ZERO)?;
    let err = source.fetch_page(1).await.unwrap_err();

    assert!(matches!(err, EtlError::ExternalServiceError { .. }));
    assert!(err.to_string().contains("webdriver_url"));
    Ok(())
}

#[tokio::test]
async fn test_webdriver_renders_page_in_browser_session() -> Result<()> {
    let webdriver = MockServer::start();
    let session = webdriver.mock(|when, then| {
        when.method(POST)
            .path("/session")
            .body_contains("--headless=new")
            .body_contains("--user-agent=Mozilla/5.0 (Windows NT 10.0");
        then.status(200).header("content-type", "application/json").json_body(json!({
            "value": {"sessionId": "s1", "capabilities": {"browserName": "chrome"}}
        }));
    });
    webdriver.mock(|when, then| {
        when.method(GET).path("/session/s1/url");
        then.status(200).header("content-type", "application/json").json_body(json!({"value": "about:blank"}));
    });
    let navigate = webdriver.mock(|when, then| {
        when.method(POST)
            .path("/session/s1/url")
            .body_contains("https://listings.test/auctions/all-artworks/1");
        then.status(200).header("content-type", "application/json").json_body(json!({"value": null}));
    });
    webdriver.mock(|when, then| {
        when.method(GET).path("/session/s1/source");
        then.status(200).header("content-type", "application/json").json_body(json!({"value": PAGE_ONE}));
    });
    let close = webdriver.mock(|when, then| {
        when.method(DELETE).path("/session/s1");
        then.status(200).header("content-type", "application/json").json_body(json!({"value": null}));
    });

    let source = ArtnetListingSource::with_fetcher(
        "https://listings.test/auctions/all-artworks/{page}",
        Duration::ZERO,
        WebDriverPageFetcher::new(webdriver.base_url()),
    )?;
    let fragments = source.fetch_page(1).await?;

    session.assert();
    navigate.assert();
    close.assert();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].artist.as_deref(), Some("Damien Hirst"));
    Ok(())
}
