//! Read-only GitHub API access
//!
//! [`GitHubClient`] issues single unauthenticated GET requests and hands the
//! raw status and body back to the caller. The only response it interprets
//! itself is quota exhaustion, which aborts the run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GitHubConfig;
use crate::error::{Result, SyncError};

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Status code and raw body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Decode the body into a typed record
    pub fn json<T: DeserializeOwned>(&self, what: impl Into<String>) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| SyncError::decode(what, e))
    }
}

/// Something that can answer read-only API queries
///
/// `path` is relative to the API endpoint, e.g. `users/octocat/starred`.
#[async_trait]
pub trait ApiQuery: Send + Sync {
    async fn query(&self, path: &str) -> Result<ApiResponse>;
}

/// Rate limit information carried by a single response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub remaining: Option<u64>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitStatus {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let remaining = headers
            .get(RATE_LIMIT_REMAINING_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let reset_at = headers
            .get(RATE_LIMIT_RESET_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|epoch| DateTime::from_timestamp(epoch, 0));

        Self {
            remaining,
            reset_at,
        }
    }

    /// Whole minutes until the quota window resets, never negative
    pub fn wait_minutes(&self, now: DateTime<Utc>) -> i64 {
        self.reset_at
            .map(|reset| (reset - now).num_seconds() / 60)
            .unwrap_or(0)
            .max(0)
    }

    /// Fail when `status` signals that the quota is used up
    pub fn check(&self, status: u16, now: DateTime<Utc>) -> Result<()> {
        if status == 403 && self.remaining == Some(0) {
            return Err(SyncError::RateLimitExhausted {
                wait_minutes: self.wait_minutes(now),
                reset_at: self.reset_at,
            });
        }
        Ok(())
    }
}

/// One entry of the starred repositories listing
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StarredRepo {
    pub full_name: String,
}

/// The latest published release of a repository
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
}

pub fn starred_path(account: &str) -> String {
    format!("users/{}/starred", account)
}

pub fn latest_release_path(full_name: &str) -> String {
    format!("repos/{}/releases/latest", full_name)
}

/// reqwest-backed client for the GitHub REST API
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout_duration() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|source| SyncError::Transport {
            url: config.api_endpoint.clone(),
            source,
        })?;

        Ok(Self {
            http,
            endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ApiQuery for GitHubClient {
    async fn query(&self, path: &str) -> Result<ApiResponse> {
        let url = self.url_for(path);

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let rate_limit = RateLimitStatus::from_headers(response.headers());
        debug!(
            "GET {} -> {} (remaining quota: {:?})",
            url, status, rate_limit.remaining
        );

        if let Err(e) = rate_limit.check(status, Utc::now()) {
            warn!("Rate limit exhausted while requesting {}", url);
            return Err(e);
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| SyncError::Transport {
                url: url.clone(),
                source,
            })?
            .to_vec();

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    fn headers(remaining: &'static str, reset: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from_static(remaining));
        headers.insert(RATE_LIMIT_RESET_HEADER, HeaderValue::from_static(reset));
        headers
    }

    fn at(epoch: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(epoch, 0).unwrap()
    }

    #[test]
    fn test_rate_limit_headers_parsed() {
        let status = RateLimitStatus::from_headers(&headers("42", "1700000600"));
        assert_eq!(status.remaining, Some(42));
        assert_eq!(status.reset_at, Some(at(1_700_000_600)));
    }

    #[test]
    fn test_rate_limit_exhausted_reports_wait() {
        let status = RateLimitStatus::from_headers(&headers("0", "1700000600"));
        let err = status.check(403, at(1_700_000_000)).unwrap_err();
        assert_matches!(err, SyncError::RateLimitExhausted { wait_minutes: 10, .. });
    }

    #[test]
    fn test_wait_truncates_to_whole_minutes() {
        let status = RateLimitStatus::from_headers(&headers("0", "1700000119"));
        assert_eq!(status.wait_minutes(at(1_700_000_000)), 1);
    }

    #[test]
    fn test_wait_never_negative() {
        let status = RateLimitStatus::from_headers(&headers("0", "1700000000"));
        assert_eq!(status.wait_minutes(at(1_700_000_900)), 0);
    }

    #[test]
    fn test_forbidden_with_quota_left_is_passed_through() {
        let status = RateLimitStatus::from_headers(&headers("12", "1700000600"));
        assert!(status.check(403, at(1_700_000_000)).is_ok());
    }

    #[test]
    fn test_zero_quota_without_forbidden_is_passed_through() {
        let status = RateLimitStatus::from_headers(&headers("0", "1700000600"));
        assert!(status.check(200, at(1_700_000_000)).is_ok());
        assert!(status.check(404, at(1_700_000_000)).is_ok());
    }

    #[test]
    fn test_missing_headers() {
        let status = RateLimitStatus::from_headers(&HeaderMap::new());
        assert_eq!(status, RateLimitStatus::default());
        assert!(status.check(403, Utc::now()).is_ok());
    }

    #[test]
    fn test_url_join() {
        let mut config = GitHubConfig::default();
        config.api_endpoint = "http://localhost:9000/".to_string();
        let client = GitHubClient::new(&config).unwrap();

        assert_eq!(client.endpoint(), "http://localhost:9000");
        assert_eq!(
            client.url_for("users/octocat/starred"),
            "http://localhost:9000/users/octocat/starred"
        );
        assert_eq!(
            client.url_for("/repos/a/b/releases/latest"),
            "http://localhost:9000/repos/a/b/releases/latest"
        );
    }

    #[test]
    fn test_release_decoding() {
        let response = ApiResponse::new(
            200,
            r#"{"tag_name":"v1.1","html_url":"https://example.com/r","body":null,"id":7}"#,
        );
        let release: Release = response.json("release").unwrap();
        assert_eq!(release.tag_name, "v1.1");
        assert_eq!(release.html_url, "https://example.com/r");
        assert_eq!(release.body, None);
    }

    #[test]
    fn test_release_without_tag_is_decode_error() {
        let response = ApiResponse::new(500, r#"{"message":"Server Error"}"#);
        let err = response.json::<Release>("release").unwrap_err();
        assert_matches!(err, SyncError::Decode { .. });
    }

    #[test]
    fn test_paths() {
        assert_eq!(starred_path("tomplus"), "users/tomplus/starred");
        assert_eq!(
            latest_release_path("rust-lang/rust"),
            "repos/rust-lang/rust/releases/latest"
        );
    }
}
