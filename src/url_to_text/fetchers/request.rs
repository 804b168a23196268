use std::error::Error as _;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::Client;

use super::{FailureKind, FetchOutcome, FetchProfile, FetchedPage};
use crate::config::FetchConfig;

/// Phrases that show up on bot-wall and rate-limit pages
const BLOCKING_INDICATORS: &[&str] = &[
    "access denied",
    "forbidden",
    "you are being blocked",
    "bot detected",
    "security check required",
    "rate limit exceeded",
    "temporarily unavailable",
];

const ACCEPTED_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml", "text/plain"];

/// Sends a single GET request shaped by one [`FetchProfile`]
pub struct RequestFetcher {
    config: FetchConfig,
}

impl RequestFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Runs one profile against the URL.
    ///
    /// A TLS failure is retried once with certificate verification disabled
    /// before the attempt is reported as failed.
    pub async fn attempt(&self, url: &str, profile: &FetchProfile) -> FetchOutcome {
        let outcome = self.send(url, profile, profile.accept_invalid_certs).await;

        if retries_insecurely(&outcome, profile) {
            debug!(
                "Profile '{}' hit a TLS error, retrying without certificate verification",
                profile.name
            );
            return self.send(url, profile, true).await;
        }

        outcome
    }

    async fn send(&self, url: &str, profile: &FetchProfile, insecure: bool) -> FetchOutcome {
        let client = match build_client(profile, insecure) {
            Ok(client) => client,
            Err(e) => {
                debug!("Failed to build HTTP client for '{}': {}", profile.name, e);
                return FetchOutcome::Terminal(FailureKind::Rejected(format!(
                    "client error: {e}"
                )));
            }
        };

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Retryable(classify_error(&e)),
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_lowercase);

        debug!("Profile '{}' got status {}", profile.name, status);

        if !profile.accepts_status(status) {
            return FetchOutcome::Retryable(FailureKind::Http(status));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Retryable(classify_error(&e)),
        };

        let major = self.config.is_major_site(&final_url) || self.config.is_major_site(url);
        let min_len = profile.min_body_len(major);

        match screen_body(&body, content_type.as_deref(), major, min_len) {
            Ok(()) => FetchOutcome::Success(FetchedPage {
                url: final_url,
                status,
                body,
            }),
            Err(reason) => {
                debug!("Profile '{}' response screened out: {}", profile.name, reason);
                FetchOutcome::Retryable(FailureKind::Rejected(reason))
            }
        }
    }
}

/// True when a TLS failure came from a profile that still verifies certificates
fn retries_insecurely(outcome: &FetchOutcome, profile: &FetchProfile) -> bool {
    *outcome == FetchOutcome::Retryable(FailureKind::Tls) && !profile.accept_invalid_certs
}

fn build_client(profile: &FetchProfile, insecure: bool) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in profile.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    let mut builder = Client::builder()
        .timeout(profile.timeout)
        .default_headers(headers)
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(insecure);

    if let Some(user_agent) = profile.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder.build()
}

/// Maps a reqwest error onto the cascade's failure categories
fn classify_error(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        return FailureKind::Timeout;
    }
    if let Some(status) = error.status() {
        return FailureKind::Http(status.as_u16());
    }

    let mut chain = error.to_string().to_lowercase();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(" | ");
        chain.push_str(&cause.to_string().to_lowercase());
        source = cause.source();
    }

    if ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|marker| chain.contains(marker))
    {
        FailureKind::Tls
    } else {
        FailureKind::Connection
    }
}

/// Checks a response body before it is handed to the pipeline.
///
/// A body with a blocking-page phrase near the top is still accepted when it
/// is substantial: over 1000 bytes on a major recipe site, over 5000 elsewhere.
pub(crate) fn screen_body(
    body: &str,
    content_type: Option<&str>,
    major_site: bool,
    min_len: usize,
) -> Result<(), String> {
    if body.len() < min_len {
        return Err(format!("body too short ({} < {})", body.len(), min_len));
    }

    if let Some(content_type) = content_type.filter(|ct| !ct.is_empty()) {
        if !ACCEPTED_CONTENT_TYPES
            .iter()
            .any(|accepted| content_type.contains(accepted))
        {
            return Err(format!("unexpected content type {content_type}"));
        }
    }

    let head: String = body.chars().take(1000).collect::<String>().to_lowercase();
    if let Some(indicator) = BLOCKING_INDICATORS.iter().find(|i| head.contains(*i)) {
        let needed = if major_site { 1000 } else { 5000 };
        if body.len() <= needed {
            return Err(format!("blocking indicator '{indicator}'"));
        }
        debug!(
            "Blocking indicator '{}' ignored for a {} byte body",
            indicator,
            body.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn test_profile(accept_invalid_certs: bool) -> FetchProfile {
        FetchProfile {
            name: "test",
            user_agent: Some("test-agent"),
            headers: &[],
            timeout: Duration::from_secs(5),
            pre_delay: Duration::ZERO,
            accept_invalid_certs,
            accepted_statuses: &[200],
            min_body_len: None,
        }
    }

    /// Accepts connections and answers every TLS handshake with plain HTTP
    fn plain_http_listener() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n");
                // Drain until the client hangs up so the socket closes cleanly
                while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
            }
        });

        (format!("https://127.0.0.1:{port}/recipe"), connections)
    }

    #[test]
    fn test_retry_decision() {
        let tls = FetchOutcome::Retryable(FailureKind::Tls);
        assert!(retries_insecurely(&tls, &test_profile(false)));
        assert!(!retries_insecurely(&tls, &test_profile(true)));
        assert!(!retries_insecurely(
            &FetchOutcome::Retryable(FailureKind::Http(403)),
            &test_profile(false)
        ));
        assert!(!retries_insecurely(
            &FetchOutcome::Retryable(FailureKind::Connection),
            &test_profile(false)
        ));
    }

    #[tokio::test]
    async fn test_handshake_failure_is_retried_once_without_verification() {
        let (url, connections) = plain_http_listener();
        let fetcher = RequestFetcher::new(FetchConfig::default());

        let outcome = fetcher.attempt(&url, &test_profile(false)).await;

        assert_eq!(outcome, FetchOutcome::Retryable(FailureKind::Tls));
        assert_eq!(connections.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_insecure_profile_is_not_retried() {
        let (url, connections) = plain_http_listener();
        let fetcher = RequestFetcher::new(FetchConfig::default());

        let outcome = fetcher.attempt(&url, &test_profile(true)).await;

        assert_eq!(outcome, FetchOutcome::Retryable(FailureKind::Tls));
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let fetcher = RequestFetcher::new(FetchConfig::default());
        let outcome = fetcher
            .attempt("http://127.0.0.1:1/recipe", &test_profile(false))
            .await;
        assert_eq!(outcome, FetchOutcome::Retryable(FailureKind::Connection));
    }

    #[test]
    fn test_screen_short_body() {
        assert!(screen_body("tiny", Some("text/html"), false, 100).is_err());
        assert!(screen_body(&"x".repeat(60), Some("text/html"), true, 50).is_ok());
    }

    #[test]
    fn test_screen_content_type() {
        let body = "<html>".repeat(50);
        assert!(screen_body(&body, Some("application/json"), false, 100).is_err());
        assert!(screen_body(&body, Some("text/html; charset=utf-8"), false, 100).is_ok());
        assert!(screen_body(&body, None, false, 100).is_ok());
    }

    #[test]
    fn test_screen_blocking_indicator() {
        let blocked = format!("<h1>Access Denied</h1>{}", "a".repeat(2000));
        assert!(screen_body(&blocked, Some("text/html"), false, 100).is_err());
        // Major sites only need a kilobyte of content to proceed
        assert!(screen_body(&blocked, Some("text/html"), true, 50).is_ok());

        let substantial = format!("<h1>Access Denied</h1>{}", "a".repeat(6000));
        assert!(screen_body(&substantial, Some("text/html"), false, 100).is_ok());
    }
}
