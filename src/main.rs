use art_bid_etl::adapters::artnet::WebDriverPageFetcher;
use art_bid_etl::core::report;
use art_bid_etl::utils::error::ErrorSeverity;
use art_bid_etl::utils::{logger, validation::Validate};
use art_bid_etl::{
    ArtnetListingSource, AuctionPipeline, CliConfig, EtlEngine, EtlError, LocalStorage,
    RedditSearch, TomlConfig, VaderScorer,
};
use clap::Parser;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting art-bid-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    display_config_summary(&config);
    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched");
        return Ok(());
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(&config, cli.monitor).await {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &TomlConfig, monitor: bool) -> Result<(), EtlError> {
    let template = config.listings.url_template.clone();
    let delay = Duration::from_millis(config.listings.page_delay_ms);
    let source = match &config.listings.webdriver_url {
        Some(webdriver_url) => ArtnetListingSource::with_fetcher(
            template,
            delay,
            WebDriverPageFetcher::new(webdriver_url.clone()),
        )?,
        None => ArtnetListingSource::new(template, delay)?,
    };
    let search = RedditSearch::new(config.discussion()?.clone());
    let scorer = VaderScorer::new();
    let storage = LocalStorage::new(config.output.path.clone());

    let pipeline = AuctionPipeline::new(source, search, scorer, storage, config.clone());
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor);

    let outcome = engine.run().await?;

    println!("{}", report::render_table(&outcome.result.rows));
    println!();
    if outcome.result.dropped_listings > 0 {
        println!(
            "⚠️ {} listings were skipped (see warnings above)",
            outcome.result.dropped_listings
        );
    }
    println!("✅ Scan completed successfully!");
    println!("📁 Output saved to: {}", outcome.output_path);

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!("  Listings: {}", config.listings.url_template);
    println!("  Page Depth: {}", config.listings.page_depth);
    println!("  Page Delay: {}ms", config.listings.page_delay_ms);
    match &config.listings.webdriver_url {
        Some(url) => println!("  Rendering: WebDriver at {}", url),
        None => println!("  Rendering: plain HTTP"),
    }
    if let Some(discussion) = &config.discussion {
        println!("  Subreddit: r/{}", discussion.subreddit);
    }
    println!("  Bid Threshold: {}", config.scoring.bid_threshold);
    println!("  Output: {}", config.output.path);
    println!("  Formats: {}", config.output.formats.join(", "));
    if config.output.compress {
        println!("  Archive: {}", config.output.archive_name);
    }
    println!();
}
