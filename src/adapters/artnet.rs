use crate::domain::model::RawListingFragment;
use crate::domain::ports::ListingSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use fantoccini::ClientBuilder;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_LISTING_URL: &str = "https://www.artnet.com/auctions/all-artworks/{page}";

// Rotated per page
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.90 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.150 Safari/537.36",
];

/// CSS selectors mapping one listing card onto a `RawListingFragment`.
struct ListingSelectors {
    card: Selector,
    artist: Selector,
    piece_name: Selector,
    price: Selector,
    remaining: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| EtlError::ProcessingError {
                message: format!("invalid selector '{}': {}", css, e),
            })
        };

        Ok(Self {
            card: parse("div.details")?,
            // Price and remaining-time items are bound too
            artist: parse("li.ng-binding:not(.ng-scope):not([ng-class])")?,
            piece_name: parse("em.ng-binding")?,
            price: parse(r#"li[class="ng-binding ng-scope"]"#)?,
            remaining: parse(r#"li[ng-class*="Remaining"]"#)?,
        })
    }
}

/// Text content with runs of whitespace collapsed; `None` when blank.
fn first_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn parse_with(selectors: &ListingSelectors, html: &str) -> Vec<RawListingFragment> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.card)
        .map(|card| RawListingFragment {
            artist: first_text(&card, &selectors.artist),
            piece_name: first_text(&card, &selectors.piece_name),
            price_text: first_text(&card, &selectors.price),
            remaining_text: first_text(&card, &selectors.remaining),
        })
        .collect()
}

/// Maps every listing card of a rendered listing page into a fragment.
pub fn parse_listing_page(html: &str) -> Result<Vec<RawListingFragment>> {
    Ok(parse_with(&ListingSelectors::new()?, html))
}

/// The listing grid is filled in client-side by AngularJS; before that the
/// markup only holds `{{brick.*}}` bindings.
fn is_unrendered(html: &str, fragments: &[RawListingFragment]) -> bool {
    let has_binding = |text: &Option<String>| text.as_deref().is_some_and(|t| t.contains("{{"));
    let cards_unbound = fragments.iter().any(|f| {
        has_binding(&f.artist)
            || has_binding(&f.piece_name)
            || has_binding(&f.price_text)
            || has_binding(&f.remaining_text)
    });
    cards_unbound || (html.contains("{{brick.") && fragments.iter().all(|f| f.artist.is_none()))
}

/// Retrieves the HTML of one listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str, user_agent: &str) -> Result<String>;
}

/// Plain GET of the page source. Only useful when the server returns the
/// listing grid already rendered.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_html(&self, url: &str, user_agent: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::external(
                "listing site",
                format!("GET {} returned {}", url, status),
            ));
        }
        Ok(response.text().await?)
    }
}

/// Renders each page in a headless Chrome session driven over WebDriver
/// (e.g. a local `chromedriver`), so the Angular bindings are resolved.
///
/// One browser session per page, each with that page's user-agent.
pub struct WebDriverPageFetcher {
    webdriver_url: String,
}

impl WebDriverPageFetcher {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }
}

fn webdriver_error(e: impl std::fmt::Display) -> EtlError {
    EtlError::external("webdriver", e.to_string())
}

#[async_trait]
impl PageFetcher for WebDriverPageFetcher {
    async fn fetch_html(&self, url: &str, user_agent: &str) -> Result<String> {
        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", format!("--user-agent={}", user_agent)] }),
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);
        let client = builder
            .connect(&self.webdriver_url)
            .await
            .map_err(webdriver_error)?;

        let rendered = async {
            client.goto(url).await?;
            Ok::<_, fantoccini::error::CmdError>(client.source().await?)
        }
        .await;
        let closed = client.close().await;

        let html = rendered.map_err(webdriver_error)?;
        closed.map_err(webdriver_error)?;
        Ok(html)
    }
}

/// Fetches auction listing pages and maps their cards into fragments.
///
/// Pages are requested one at a time with `page_delay` between them, and
/// the user-agent is rotated on every page.
pub struct ArtnetListingSource {
    fetcher: Box<dyn PageFetcher>,
    url_template: String,
    page_delay: Duration,
    selectors: ListingSelectors,
}

impl ArtnetListingSource {
    /// Fetches pages with a plain HTTP GET.
    ///
    /// `url_template` must contain a `{page}` placeholder.
    pub fn new(url_template: impl Into<String>, page_delay: Duration) -> Result<Self> {
        Self::with_fetcher(url_template, page_delay, HttpPageFetcher::new())
    }

    pub fn with_fetcher(
        url_template: impl Into<String>,
        page_delay: Duration,
        fetcher: impl PageFetcher + 'static,
    ) -> Result<Self> {
        let url_template = url_template.into();
        if !url_template.contains("{page}") {
            return Err(EtlError::InvalidConfigValueError {
                field: "listings.url_template".to_string(),
                value: url_template,
                reason: "Template must contain a {page} placeholder".to_string(),
            });
        }

        Ok(Self {
            fetcher: Box::new(fetcher),
            url_template,
            page_delay,
            selectors: ListingSelectors::new()?,
        })
    }

    pub fn page_url(&self, page_index: u32) -> String {
        self.url_template.replace("{page}", &page_index.to_string())
    }

    fn user_agent(page_index: u32) -> &'static str {
        USER_AGENTS[page_index.saturating_sub(1) as usize % USER_AGENTS.len()]
    }
}

#[async_trait]
impl ListingSource for ArtnetListingSource {
    async fn fetch_page(&self, page_index: u32) -> Result<Vec<RawListingFragment>> {
        if page_index > 1 && !self.page_delay.is_zero() {
            tracing::debug!("Waiting {:?} before page {}", self.page_delay, page_index);
            tokio::time::sleep(self.page_delay).await;
        }

        let url = self.page_url(page_index);
        tracing::debug!("Fetching listing page: {}", url);

        let html = self
            .fetcher
            .fetch_html(&url, Self::user_agent(page_index))
            .await?;
        let fragments = parse_with(&self.selectors, &html);

        if is_unrendered(&html, &fragments) {
            return Err(EtlError::external(
                "listing site",
                format!(
                    "page {} was served as an unrendered template; set listings.webdriver_url to render it in a browser",
                    page_index
                ),
            ));
        }
        if fragments.is_empty() {
            tracing::warn!("⚠️ Page {} has no listing cards", page_index);
        }
        tracing::info!("📄 Page {}: {} listings", page_index, fragments.len());

        Ok(fragments)
    }
}
