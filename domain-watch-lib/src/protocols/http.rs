//! HTTP transport shared by RDAP queries and IANA downloads.
//!
//! Three request profiles with different latency budgets sit behind the
//! [`HttpFetch`] trait so discovery, the resolver and the import pipeline can
//! be driven by test doubles.

use crate::error::DomainWatchError;
use crate::types::WatchConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

/// Media type requested from RDAP servers.
pub const RDAP_MEDIA_TYPE: &str = "application/rdap+json";

/// Which latency/retry budget a request runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestProfile {
    /// Domain RDAP queries: single attempt, RDAP `Accept` header
    Rdap,
    /// IANA data downloads (bootstrap JSON, TLD list, RDAP self-lookups):
    /// bounded retries with fixed backoff
    Data,
    /// IANA HTML pages: single attempt, short timeouts
    Html,
}

/// Status, content type and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpReply {
    pub fn new<B: Into<String>>(status: u16, body: B) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type<C: Into<String>>(mut self, content_type: C) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the body is an HTML page (error pages served where JSON was expected).
    pub fn looks_like_html(&self) -> bool {
        let declared = self
            .content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);
        let head: String = self
            .body
            .trim_start()
            .chars()
            .take(15)
            .collect::<String>()
            .to_ascii_lowercase();
        declared || head.starts_with("<!doctype") || head.starts_with("<html")
    }

    /// Decode the body as JSON, rejecting HTML bodies.
    pub fn json(&self) -> Result<serde_json::Value, DomainWatchError> {
        if self.looks_like_html() {
            return Err(DomainWatchError::ParseError {
                message: "Expected JSON but received an HTML page".to_string(),
                content: Some(self.body.chars().take(200).collect()),
            });
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP GET seam.
///
/// Implementations return `Ok` for any completed exchange regardless of
/// status code; `Err` is reserved for transport failures.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str, profile: RequestProfile) -> Result<HttpReply, DomainWatchError>;
}

/// [`HttpFetch`] over reqwest with one client per profile.
#[derive(Clone)]
pub struct ReqwestFetcher {
    rdap_client: reqwest::Client,
    data_client: reqwest::Client,
    html_client: reqwest::Client,
    data_retries: u32,
    retry_backoff: Duration,
}

impl ReqwestFetcher {
    /// Build the three clients from configuration.
    ///
    /// TLS verification stays on and redirects are followed (reqwest default
    /// policy) for every profile.
    pub fn from_config(config: &WatchConfig) -> Result<Self, DomainWatchError> {
        let build = |connect: Duration, total: Duration, what: &str| {
            reqwest::Client::builder()
                .connect_timeout(connect)
                .timeout(total)
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| {
                    DomainWatchError::network_with_source(
                        format!("Failed to create {} HTTP client", what),
                        e.to_string(),
                    )
                })
        };

        Ok(Self {
            rdap_client: build(config.rdap_timeout, config.rdap_timeout, "RDAP")?,
            data_client: build(config.data_connect_timeout, config.data_timeout, "data")?,
            html_client: build(config.html_connect_timeout, config.html_timeout, "HTML")?,
            data_retries: config.data_retries,
            retry_backoff: config.retry_backoff,
        })
    }

    async fn send_once(
        client: &reqwest::Client,
        url: &str,
        accept: &str,
    ) -> Result<HttpReply, DomainWatchError> {
        let response = client.get(url).header(ACCEPT, accept).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await?;

        Ok(HttpReply {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str, profile: RequestProfile) -> Result<HttpReply, DomainWatchError> {
        match profile {
            RequestProfile::Rdap => Self::send_once(&self.rdap_client, url, RDAP_MEDIA_TYPE).await,
            RequestProfile::Html => Self::send_once(&self.html_client, url, "text/html").await,
            RequestProfile::Data => {
                let accept = "application/json, application/rdap+json;q=0.9, text/plain;q=0.8";
                let mut attempt = 0;
                loop {
                    let result = Self::send_once(&self.data_client, url, accept).await;
                    let retry = match &result {
                        Ok(reply) => reply.status >= 500 || reply.status == 429,
                        Err(e) => e.is_retryable(),
                    };

                    if !retry || attempt >= self.data_retries {
                        return result;
                    }

                    attempt += 1;
                    tracing::debug!(
                        url = %url,
                        attempt,
                        backoff_ms = self.retry_backoff.as_millis() as u64,
                        "Retrying IANA data request"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `statuses` in order (the last one repeats), one per connection.
    async fn serve_statuses(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/data", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let status = statuses[n.min(statuses.len() - 1)];

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(read) => request.extend_from_slice(&buf[..read]),
                    }
                }

                let body = if status == 200 { "ok" } else { "busy" };
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (url, hits)
    }

    fn fast_retry_config() -> WatchConfig {
        WatchConfig {
            data_retries: 2,
            retry_backoff: Duration::from_millis(10),
            ..WatchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_data_profile_retries_server_errors() {
        let (url, hits) = serve_statuses(vec![503, 200]).await;
        let fetcher = ReqwestFetcher::from_config(&fast_retry_config()).unwrap();

        let reply = fetcher.get(&url, RequestProfile::Data).await.unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "ok");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_data_profile_gives_up_after_retries() {
        let (url, hits) = serve_statuses(vec![503]).await;
        let fetcher = ReqwestFetcher::from_config(&fast_retry_config()).unwrap();

        let reply = fetcher.get(&url, RequestProfile::Data).await.unwrap();
        assert_eq!(reply.status, 503);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_html_and_rdap_profiles_are_single_attempt() {
        for profile in [RequestProfile::Html, RequestProfile::Rdap] {
            let (url, hits) = serve_statuses(vec![503, 200]).await;
            let fetcher = ReqwestFetcher::from_config(&fast_retry_config()).unwrap();

            let reply = fetcher.get(&url, profile).await.unwrap();
            assert_eq!(reply.status, 503, "{:?}", profile);
            assert_eq!(hits.load(Ordering::SeqCst), 1, "{:?}", profile);
        }
    }

    #[test]
    fn test_fetcher_builds_from_default_config() {
        let fetcher = ReqwestFetcher::from_config(&WatchConfig::default());
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_html_detection() {
        let html = HttpReply::new(200, "<!DOCTYPE html><html><body>Oops</body></html>");
        assert!(html.looks_like_html());
        assert!(html.json().is_err());

        let declared = HttpReply::new(200, "{}").with_content_type("text/html; charset=utf-8");
        assert!(declared.looks_like_html());

        let json = HttpReply::new(200, r#"{"objectClassName":"domain"}"#)
            .with_content_type(RDAP_MEDIA_TYPE);
        assert!(!json.looks_like_html());
        assert_eq!(json.json().unwrap()["objectClassName"], "domain");
    }

    #[test]
    fn test_undecodable_body_is_parse_error() {
        let reply = HttpReply::new(200, "not json");
        assert!(matches!(
            reply.json(),
            Err(DomainWatchError::ParseError { .. })
        ));
    }
}
