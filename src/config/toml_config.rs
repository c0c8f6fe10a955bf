use crate::adapters::artnet::DEFAULT_LISTING_URL;
use crate::adapters::reddit::{
    RedditConfig, DEFAULT_API_BASE, DEFAULT_AUTH_BASE, DEFAULT_SEARCH_LIMIT, DEFAULT_SUBREDDIT,
};
use crate::core::merge::DEFAULT_BID_THRESHOLD;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const VALID_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub listings: ListingsConfig,
    pub discussion: Option<RedditConfig>,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingsConfig {
    pub url_template: String,
    pub page_depth: u32,
    pub page_delay_ms: u64,
    /// WebDriver endpoint (e.g. `http://localhost:9515` for chromedriver)
    /// used to render pages; plain HTTP when unset.
    pub webdriver_url: Option<String>,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_LISTING_URL.to_string(),
            page_depth: 1,
            page_delay_ms: 4000,
            webdriver_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub bid_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            bid_threshold: DEFAULT_BID_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
    /// Bundle the exported files into one ZIP archive.
    pub compress: bool,
    pub archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            formats: VALID_FORMATS.iter().map(|f| f.to_string()).collect(),
            compress: true,
            archive_name: "recommendations.zip".to_string(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left
    /// in place so validation can name them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Reddit credentials from `REDDIT_*` environment variables, for runs
    /// without a `[discussion]` section.
    pub fn discussion_from_env() -> Result<RedditConfig> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| EtlError::MissingConfigError {
                field: format!("discussion (environment variable {})", name),
            })
        };

        Ok(RedditConfig {
            client_id: var("REDDIT_CLIENT_ID")?,
            client_secret: var("REDDIT_CLIENT_SECRET")?,
            username: var("REDDIT_USERNAME")?,
            password: var("REDDIT_PASSWORD")?,
            user_agent: var("REDDIT_USER_AGENT")?,
            subreddit: DEFAULT_SUBREDDIT.to_string(),
            auth_base: DEFAULT_AUTH_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        })
    }

    pub fn discussion(&self) -> Result<&RedditConfig> {
        validation::validate_required_field("discussion", &self.discussion)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("listings.url_template", &self.listings.url_template)?;
        validation::validate_positive_number(
            "listings.page_depth",
            self.listings.page_depth as usize,
            1,
        )?;
        if let Some(webdriver_url) = &self.listings.webdriver_url {
            validation::validate_url("listings.webdriver_url", webdriver_url)?;
        }

        let discussion = self.discussion()?;
        validation::validate_non_empty_string("discussion.client_id", &discussion.client_id)?;
        validation::validate_non_empty_string(
            "discussion.client_secret",
            &discussion.client_secret,
        )?;
        validation::validate_non_empty_string("discussion.username", &discussion.username)?;
        validation::validate_non_empty_string("discussion.password", &discussion.password)?;
        validation::validate_non_empty_string("discussion.user_agent", &discussion.user_agent)?;
        validation::validate_non_empty_string("discussion.subreddit", &discussion.subreddit)?;
        validation::validate_url("discussion.auth_base", &discussion.auth_base)?;
        validation::validate_url("discussion.api_base", &discussion.api_base)?;
        validation::validate_positive_number(
            "discussion.search_limit",
            discussion.search_limit as usize,
            1,
        )?;

        validation::validate_range("scoring.bid_threshold", self.scoring.bid_threshold, -1.0, 1.0)?;
        validation::validate_path("output.path", &self.output.path)?;

        if self.output.formats.is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: String::new(),
                reason: "At least one output format is required".to_string(),
            });
        }
        for format in &self.output.formats {
            if !VALID_FORMATS.contains(&format.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "output.formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        VALID_FORMATS.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn page_depth(&self) -> u32 {
        self.listings.page_depth
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn bid_threshold(&self) -> f64 {
        self.scoring.bid_threshold
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn compress_output(&self) -> Option<&str> {
        self.output
            .compress
            .then_some(self.output.archive_name.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
