use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "art-bid-etl")]
#[command(about = "Scrape art auction listings and recommend bids from discussion sentiment")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of listing pages to fetch
    #[arg(short, long)]
    pub page_depth: Option<u32>,

    /// Listing page URL with a {page} placeholder
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Delay between listing page requests
    #[arg(long)]
    pub page_delay_ms: Option<u64>,

    /// Render listing pages through this WebDriver endpoint
    #[arg(long)]
    pub webdriver_url: Option<String>,

    #[arg(long)]
    pub subreddit: Option<String>,

    /// Sentiment above which a listing is marked "Bid Higher"
    #[arg(long, allow_hyphen_values = true)]
    pub threshold: Option<f64>,

    #[arg(short, long)]
    pub output_path: Option<String>,

    /// Comma-separated export formats (csv, tsv, json)
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Write export files individually instead of a ZIP archive
    #[arg(long)]
    pub no_zip: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines on stderr")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    /// Show the resolved configuration without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// Loads the config file (or defaults), fills Reddit credentials from the
    /// environment when the file has none, then applies command-line
    /// overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if config.discussion.is_none() {
            config.discussion = Some(TomlConfig::discussion_from_env()?);
        }

        if let Some(page_depth) = self.page_depth {
            config.listings.page_depth = page_depth;
        }
        if let Some(url) = &self.listing_url {
            config.listings.url_template = url.clone();
        }
        if let Some(delay) = self.page_delay_ms {
            config.listings.page_delay_ms = delay;
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.listings.webdriver_url = Some(webdriver_url.clone());
        }
        if let (Some(subreddit), Some(discussion)) = (&self.subreddit, config.discussion.as_mut()) {
            discussion.subreddit = subreddit.clone();
        }
        if let Some(threshold) = self.threshold {
            config.scoring.bid_threshold = threshold;
        }
        if let Some(path) = &self.output_path {
            config.output.path = path.clone();
        }
        if !self.formats.is_empty() {
            config.output.formats = self.formats.clone();
        }
        if self.no_zip {
            config.output.compress = false;
        }

        Ok(config)
    }
}
