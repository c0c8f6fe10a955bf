use crate::domain::model::{Comment, Thread};
use crate::domain::ports::DiscussionSearch;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
pub const DEFAULT_SUBREDDIT: &str = "Art";
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;

/// The morechildren endpoint accepts at most this many ids per call.
const MORE_CHILDREN_BATCH: usize = 100;

/// Tokens are renewed this long before Reddit says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token response carries no `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

const SERVICE: &str = "reddit";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    #[serde(default = "default_subreddit")]
    pub subreddit: String,
    #[serde(default = "default_auth_base")]
    pub auth_base: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

fn default_subreddit() -> String {
    DEFAULT_SUBREDDIT.to_string()
}

fn default_auth_base() -> String {
    DEFAULT_AUTH_BASE.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

/// Reddit wraps every object as `{kind, data}`.
#[derive(Deserialize)]
struct Thing {
    kind: String,
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct LinkData {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct CommentData {
    body: Option<String>,
    parent_id: Option<String>,
}

#[derive(Deserialize)]
struct MoreData {
    #[serde(default)]
    children: Vec<String>,
    parent_id: Option<String>,
}

#[derive(Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    data: Option<MoreChildrenData>,
}

#[derive(Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<Thing>,
}

/// Deleted and removed comments keep a placeholder body.
fn present_body(body: Option<String>) -> Option<String> {
    body.filter(|b| {
        let b = b.trim();
        !b.is_empty() && b != "[deleted]" && b != "[removed]"
    })
}

/// Splits a batch of things into top-level comments of `link_fullname` and the
/// ids still hidden behind "load more" placeholders.
fn collect_top_level(
    things: Vec<Thing>,
    link_fullname: &str,
    comments: &mut Vec<Comment>,
    pending: &mut VecDeque<String>,
) -> Result<()> {
    for thing in things {
        match thing.kind.as_str() {
            "t1" => {
                let data: CommentData = serde_json::from_value(thing.data)?;
                if data.parent_id.as_deref() == Some(link_fullname) {
                    comments.push(Comment {
                        body: present_body(data.body),
                    });
                }
            }
            "more" => {
                let data: MoreData = serde_json::from_value(thing.data)?;
                if data.parent_id.as_deref() == Some(link_fullname) {
                    pending.extend(data.children);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// How long to hold off once Reddit reports the request quota as used up.
///
/// Reddit sends `X-Ratelimit-Remaining` as a float and `X-Ratelimit-Reset` as
/// whole seconds until the window resets.
fn rate_limit_pause(headers: &HeaderMap) -> Option<Duration> {
    let header = |name: &str| -> Option<f64> { headers.get(name)?.to_str().ok()?.trim().parse().ok() };

    let remaining = header("x-ratelimit-remaining")?;
    if remaining >= 1.0 {
        return None;
    }
    let reset = header("x-ratelimit-reset")?;
    Some(Duration::from_secs_f64(reset.max(0.0)))
}

/// Searches one subreddit through the Reddit OAuth API.
///
/// The access token is requested with the password grant and renewed shortly
/// before it expires. When a response says the request quota is exhausted,
/// the next request waits for the window to reset.
pub struct RedditSearch {
    client: Client,
    config: RedditConfig,
    token: Mutex<Option<AccessToken>>,
    resume_at: Mutex<Option<Instant>>,
}

impl RedditSearch {
    pub fn new(config: RedditConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            token: Mutex::new(None),
            resume_at: Mutex::new(None),
        }
    }

    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(current.value.clone());
        }

        let url = format!("{}/api/v1/access_token", self.config.auth_base);
        tracing::debug!("Requesting Reddit access token for {}", self.config.username);

        let requested_at = Instant::now();
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(USER_AGENT, &self.config.user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?;

        let granted: TokenResponse = Self::decode(response).await?;
        let lifetime = granted.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        *token = Some(AccessToken {
            value: granted.access_token.clone(),
            expires_at: requested_at + Duration::from_secs(lifetime),
        });
        Ok(granted.access_token)
    }

    async fn wait_for_quota(&self) {
        let resume_at = *self.resume_at.lock().await;
        if let Some(at) = resume_at.filter(|at| *at > Instant::now()) {
            tracing::info!(
                "⏳ Reddit rate limit reached, waiting {:.1}s",
                at.saturating_duration_since(Instant::now()).as_secs_f64()
            );
            tokio::time::sleep_until(at).await;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.wait_for_quota().await;
        let token = self.access_token().await?;
        let url = format!("{}{}", self.config.api_base, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(USER_AGENT, &self.config.user_agent)
            .query(query)
            .send()
            .await?;

        if let Some(pause) = rate_limit_pause(response.headers()) {
            *self.resume_at.lock().await = Some(Instant::now() + pause);
        }

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let url = response.url().path().to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::external(
                SERVICE,
                format!("{} returned {}: {}", url, status, body.trim()),
            ));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn more_children(&self, link_fullname: &str, ids: &[String]) -> Result<Vec<Thing>> {
        let response: MoreChildrenResponse = self
            .get_json(
                "/api/morechildren",
                &[
                    ("api_type", "json".to_string()),
                    ("link_id", link_fullname.to_string()),
                    ("children", ids.join(",")),
                    ("limit_children", "false".to_string()),
                    ("raw_json", "1".to_string()),
                ],
            )
            .await?;

        let MoreChildrenJson { errors, data } = response.json;
        if !errors.is_empty() {
            return Err(EtlError::external(
                SERVICE,
                format!(
                    "morechildren for {} failed: {}",
                    link_fullname,
                    serde_json::Value::Array(errors)
                ),
            ));
        }
        let Some(data) = data else {
            return Err(EtlError::external(
                SERVICE,
                format!("morechildren for {} returned no data", link_fullname),
            ));
        };
        Ok(data.things)
    }
}

#[async_trait]
impl DiscussionSearch for RedditSearch {
    async fn search(&self, query: &str) -> Result<Vec<Thread>> {
        let path = format!("/r/{}/search", self.config.subreddit);
        let listing: Listing = self
            .get_json(
                &path,
                &[
                    ("q", query.to_string()),
                    ("restrict_sr", "1".to_string()),
                    ("sort", "relevance".to_string()),
                    ("limit", self.config.search_limit.to_string()),
                    ("raw_json", "1".to_string()),
                ],
            )
            .await?;

        let mut threads = Vec::new();
        for thing in listing.data.children {
            if thing.kind == "t3" {
                let link: LinkData = serde_json::from_value(thing.data)?;
                threads.push(Thread {
                    id: link.id,
                    title: link.title,
                });
            }
        }
        Ok(threads)
    }

    async fn top_level_comments(&self, thread: &Thread) -> Result<Vec<Comment>> {
        let path = format!("/r/{}/comments/{}", self.config.subreddit, thread.id);
        let link_fullname = format!("t3_{}", thread.id);

        // [submission listing, comment listing]
        let listings: Vec<Listing> = self
            .get_json(
                &path,
                &[
                    ("limit", "500".to_string()),
                    ("depth", "1".to_string()),
                    ("raw_json", "1".to_string()),
                ],
            )
            .await?;
        let Some(comment_listing) = listings.into_iter().nth(1) else {
            return Err(EtlError::external(
                SERVICE,
                format!("no comment listing for thread {}", thread.id),
            ));
        };

        let mut comments = Vec::new();
        let mut pending = VecDeque::new();
        collect_top_level(
            comment_listing.data.children,
            &link_fullname,
            &mut comments,
            &mut pending,
        )?;

        while !pending.is_empty() {
            let take = pending.len().min(MORE_CHILDREN_BATCH);
            let batch: Vec<String> = pending.drain(..take).collect();
            tracing::debug!("Expanding {} more comments in {}", batch.len(), thread.id);
            let things = self.more_children(&link_fullname, &batch).await?;
            collect_top_level(things, &link_fullname, &mut comments, &mut pending)?;
        }

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_present_body_filters_placeholders() {
        assert_eq!(present_body(Some("Lovely".to_string())), Some("Lovely".to_string()));
        assert_eq!(present_body(Some("[deleted]".to_string())), None);
        assert_eq!(present_body(Some("[removed]".to_string())), None);
        assert_eq!(present_body(Some("  ".to_string())), None);
        assert_eq!(present_body(None), None);
    }

    #[test]
    fn test_collect_top_level_skips_replies_and_queues_more() {
        let things: Vec<Thing> = serde_json::from_value(json!([
            {"kind": "t1", "data": {"body": "top", "parent_id": "t3_abc"}},
            {"kind": "t1", "data": {"body": "reply", "parent_id": "t1_xyz"}},
            {"kind": "t1", "data": {"body": "[removed]", "parent_id": "t3_abc"}},
            {"kind": "more", "data": {"children": ["c1", "c2"], "parent_id": "t3_abc"}},
            {"kind": "more", "data": {"children": ["deep"], "parent_id": "t1_xyz"}}
        ]))
        .unwrap();

        let mut comments = Vec::new();
        let mut pending = VecDeque::new();
        collect_top_level(things, "t3_abc", &mut comments, &mut pending).unwrap();

        assert_eq!(comments, vec![Comment::new("top"), Comment::absent()]);
        assert_eq!(pending, VecDeque::from(vec!["c1".to_string(), "c2".to_string()]));
    }

    #[test]
    fn test_rate_limit_pause_only_when_exhausted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "42.0".parse().unwrap());
        headers.insert("x-ratelimit-reset", "30".parse().unwrap());
        assert_eq!(rate_limit_pause(&headers), None);

        headers.insert("x-ratelimit-remaining", "0.0".parse().unwrap());
        assert_eq!(rate_limit_pause(&headers), Some(Duration::from_secs(30)));

        headers.remove("x-ratelimit-reset");
        assert_eq!(rate_limit_pause(&headers), None);
        assert_eq!(rate_limit_pause(&HeaderMap::new()), None);
    }

    #[test]
    fn test_token_freshness_margin() {
        let now = Instant::now();
        let token = AccessToken {
            value: "tok".to_string(),
            expires_at: now + Duration::from_secs(3600),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::from_secs(3550)));
    }

    #[test]
    fn test_config_defaults() {
        let config: RedditConfig = serde_json::from_value(json!({
            "client_id": "id",
            "client_secret": "secret",
            "username": "collector",
            "password": "pw",
            "user_agent": "art-bid-etl/0.1"
        }))
        .unwrap();

        assert_eq!(config.subreddit, "Art");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.search_limit, 100);
    }
}
