use crate::config::Config;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sends per request, the first one included.
const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateMeta {
    pub remaining: Option<i32>,
    pub used: Option<i32>,
    pub reset_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    pub retriable: bool,
}

#[derive(Debug, Clone)]
pub struct RestResponse<T> {
    pub value: Option<T>,
    pub rate: Option<RateMeta>,
    pub error: Option<ErrorInfo>,
    pub status: StatusCode,
    pub headers: Option<HeaderMap>,
}

impl<T> RestResponse<T> {
    fn failed(
        status: StatusCode,
        rate: Option<RateMeta>,
        headers: Option<HeaderMap>,
        error: ErrorInfo,
    ) -> Self {
        Self {
            value: None,
            rate,
            error: Some(error),
            status,
            headers,
        }
    }

    /// True when the response carried a `Link` header with `rel="next"`.
    pub fn has_next_page(&self) -> bool {
        self.headers
            .as_ref()
            .map(has_next_page_from_link)
            .unwrap_or(false)
    }

    pub fn into_result(self) -> Result<T, ErrorInfo> {
        match (self.value, self.error) {
            (Some(v), None) => Ok(v),
            (_, Some(e)) => Err(e),
            (None, None) => Err(ErrorInfo {
                code: "server_error".into(),
                message: "empty response".into(),
                retriable: false,
            }),
        }
    }
}

pub fn build_client(cfg: &Config) -> reqwest::Result<Client> {
    let mut default_headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(&cfg.user_agent) {
        default_headers.insert(USER_AGENT, ua);
    }
    // Authorization header is injected per request; the token is collected after the client config.
    Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()
}

fn auth_header(token: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {}", token)).ok()
}

pub fn map_status_to_error(status: StatusCode, message: String) -> ErrorInfo {
    let (code, retriable) = match status {
        StatusCode::BAD_REQUEST => ("bad_request", false),
        StatusCode::UNAUTHORIZED => ("unauthorized", false),
        StatusCode::FORBIDDEN => ("forbidden", false),
        StatusCode::NOT_FOUND => ("not_found", false),
        StatusCode::CONFLICT => ("conflict", false),
        StatusCode::TOO_MANY_REQUESTS => ("rate_limited", true),
        s if s.is_server_error() => ("upstream_error", true),
        _ => ("server_error", false),
    };
    ErrorInfo {
        code: code.to_string(),
        message,
        retriable,
    }
}

pub fn extract_rate_from_rest(headers: &HeaderMap) -> RateMeta {
    let remaining = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i32>().ok());
    let used = headers
        .get("x-ratelimit-used")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i32>().ok());
    let reset_at = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|epoch| chrono::DateTime::<chrono::Utc>::from_timestamp(epoch, 0))
        .map(|dt| dt.to_rfc3339());
    RateMeta {
        remaining,
        used,
        reset_at,
    }
}

fn compute_backoff(attempt: u32, retry_after: Option<Duration>) -> Duration {
    if let Some(d) = retry_after {
        return d;
    }
    // Exponential backoff with jitter: base 200ms * 2^attempt, max 5s.
    let base = 200u64.saturating_mul(1u64 << attempt.min(5));
    let max = 5_000u64.min(base);
    let jitter = fastrand::u64(0..=max / 2);
    Duration::from_millis(max / 2 + jitter)
}

pub async fn rest_get_json<T: for<'de> Deserialize<'de>>(
    client: &Client,
    cfg: &Config,
    token: &str,
    path: &str,
) -> RestResponse<T> {
    let url = format!("{}{}", cfg.api_url, path);
    let mut attempt: u32 = 0;
    loop {
        let mut req = client
            .get(&url)
            .header("X-GitHub-Api-Version", &cfg.api_version)
            .header(
                ACCEPT,
                HeaderValue::from_static("application/vnd.github+json"),
            );
        if let Some(auth) = auth_header(token) {
            req = req.header(AUTHORIZATION, auth);
        }
        debug!("REST GET {} (attempt {})", url, attempt + 1);

        let res = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("REST GET error sending request: {}", e);
                if attempt + 1 < MAX_ATTEMPTS {
                    tokio::time::sleep(compute_backoff(attempt, None)).await;
                    attempt += 1;
                    continue;
                }
                return RestResponse::failed(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    None,
                    ErrorInfo {
                        code: "upstream_error".into(),
                        message: e.to_string(),
                        retriable: true,
                    },
                );
            }
        };

        let status = res.status();
        let headers = res.headers().clone();
        let rate = extract_rate_from_rest(&headers);
        if let Some(remaining) = rate.remaining {
            debug!("rate limit remaining={} reset_at={:?}", remaining, rate.reset_at);
        }
        let retry_after = headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        if status.is_success() {
            return match res.json::<T>().await {
                Ok(val) => RestResponse {
                    value: Some(val),
                    rate: Some(rate),
                    error: None,
                    status,
                    headers: Some(headers),
                },
                Err(e) => RestResponse::failed(
                    status,
                    Some(rate),
                    Some(headers),
                    ErrorInfo {
                        code: "server_error".into(),
                        message: e.to_string(),
                        retriable: false,
                    },
                ),
            };
        }

        // Retry on 429/5xx
        if (status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error())
            && attempt + 1 < MAX_ATTEMPTS
        {
            let backoff = compute_backoff(attempt, retry_after);
            warn!(
                "REST GET {} retrying (status {}), backoff {:?}",
                url, status, backoff
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
            continue;
        }
        let text = res.text().await.unwrap_or_default();
        let err = map_status_to_error(status, text);
        return RestResponse::failed(status, Some(rate), Some(headers), err);
    }
}

pub fn has_next_page_from_link(headers: &HeaderMap) -> bool {
    headers
        .get_all("link")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|link| link.split(','))
        .any(|part| part.contains("rel=\"next\""))
}

pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
