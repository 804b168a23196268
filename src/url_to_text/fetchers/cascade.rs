use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::time::sleep;

use super::{
    probe, standard_profiles, FailureKind, FetchOutcome, FetchProfile, FetchedPage, PageFetcher,
    RequestFetcher,
};
use crate::config::FetchConfig;
use crate::source::UrlCleaner;

/// Tries a URL with increasingly permissive request profiles until one of
/// them returns an acceptable page.
pub struct FetchCascade {
    config: FetchConfig,
    profiles: Vec<FetchProfile>,
    cleaner: UrlCleaner,
    requests: RequestFetcher,
}

impl FetchCascade {
    pub fn new(config: &FetchConfig) -> Self {
        Self::with_profiles(config, standard_profiles())
    }

    pub fn with_profiles(config: &FetchConfig, profiles: Vec<FetchProfile>) -> Self {
        Self {
            config: config.clone(),
            profiles,
            cleaner: UrlCleaner::standard(),
            requests: RequestFetcher::new(config.clone()),
        }
    }

    pub fn profiles(&self) -> &[FetchProfile] {
        &self.profiles
    }

    /// Runs the whole cascade and reports the last failure when nothing worked
    pub async fn run(&self, url: &str) -> Result<FetchedPage, FailureKind> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FailureKind::Rejected("not an HTTP(S) URL".to_string()));
        }

        let url = self.cleaner.clean(url);
        debug!("Fetching recipe page {}", url);

        probe(&url, Duration::from_secs(self.config.probe_timeout_secs)).await?;

        let major = self.config.is_major_site(&url);
        let mut last_failure = FailureKind::Connection;

        for (index, profile) in self.profiles.iter().enumerate() {
            if self.config.politeness_delays && !profile.pre_delay.is_zero() {
                sleep(profile.pre_delay).await;
            }

            debug!(
                "Trying profile {} ({}) for {}",
                index + 1,
                profile.name,
                url
            );

            match self.requests.attempt(&url, profile).await {
                FetchOutcome::Success(page) => {
                    info!(
                        "Fetched {} with profile '{}' ({} bytes)",
                        url,
                        profile.name,
                        page.body.len()
                    );
                    return Ok(page);
                }
                FetchOutcome::Retryable(kind) => {
                    debug!("Profile '{}' failed: {}", profile.name, kind);
                    if major && self.config.politeness_delays {
                        if let Some(delay) = back_off(&kind) {
                            debug!("Backing off {:?} before the next profile", delay);
                            sleep(delay).await;
                        }
                    }
                    last_failure = kind;
                }
                FetchOutcome::Terminal(kind) => {
                    warn!("Giving up on {} after profile '{}': {}", url, profile.name, kind);
                    return Err(kind);
                }
            }
        }

        warn!("All {} fetch profiles failed for {}", self.profiles.len(), url);
        Err(last_failure)
    }
}

/// Pause inserted between profiles on major sites
fn back_off(kind: &FailureKind) -> Option<Duration> {
    match kind {
        FailureKind::Http(403 | 429) => Some(Duration::from_secs(2)),
        FailureKind::Timeout => Some(Duration::from_secs(1)),
        _ => None,
    }
}

#[async_trait]
impl PageFetcher for FetchCascade {
    async fn fetch_page(&self, url: &str) -> Option<FetchedPage> {
        match self.run(url).await {
            Ok(page) => Some(page),
            Err(kind) => {
                debug!("No page for {}: {}", url, kind);
                None
            }
        }
    }
}
