//! Page retrieval for a note's source URL.

mod cascade;
mod probe;
mod profiles;
mod request;

use std::fmt;

use async_trait::async_trait;

pub use cascade::FetchCascade;
pub use probe::probe;
pub use profiles::{standard_profiles, FetchProfile};
pub use request::RequestFetcher;

/// A page that passed a profile's status and body checks
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// Why a fetch attempt did not produce a usable page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Tls,
    Http(u16),
    Connection,
    /// The response arrived but was screened out
    Rejected(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Tls => write!(f, "TLS failure"),
            FailureKind::Http(status) => write!(f, "HTTP {status}"),
            FailureKind::Connection => write!(f, "connection failure"),
            FailureKind::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

/// Result of one cascade attempt.
///
/// `Retryable` moves the cascade on to the next profile; `Terminal` ends it.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(FetchedPage),
    Retryable(FailureKind),
    Terminal(FailureKind),
}

/// Retrieves the raw page behind a URL, or nothing.
///
/// The pipeline is generic over this trait so scenarios can run against
/// stubs; [`FetchCascade`] is the network implementation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Option<FetchedPage>;
}
