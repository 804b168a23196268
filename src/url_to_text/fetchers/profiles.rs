use std::time::Duration;

/// One named combination of headers, TLS posture, timeout and acceptance rules
#[derive(Debug, Clone)]
pub struct FetchProfile {
    pub name: &'static str,
    /// `None` sends reqwest's default (no User-Agent header)
    pub user_agent: Option<&'static str>,
    pub headers: &'static [(&'static str, &'static str)],
    pub timeout: Duration,
    /// Politeness delay before the request is sent
    pub pre_delay: Duration,
    pub accept_invalid_certs: bool,
    pub accepted_statuses: &'static [u16],
    /// Overrides the default minimum body length (100, or 50 on major sites)
    pub min_body_len: Option<usize>,
}

impl FetchProfile {
    pub fn accepts_status(&self, status: u16) -> bool {
        self.accepted_statuses.contains(&status)
    }

    pub fn min_body_len(&self, major_site: bool) -> usize {
        self.min_body_len
            .unwrap_or(if major_site { 50 } else { 100 })
    }
}

const OK_ONLY: &[u16] = &[200];
const REDIRECT_TOLERANT: &[u16] = &[200, 301, 302, 304];
const BLOCK_TOLERANT: &[u16] = &[200, 301, 302, 304, 403, 429];
const ERROR_TOLERANT: &[u16] = &[200, 301, 302, 304, 403, 429, 500, 503];

const CHROME_MAC_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
    ("Cache-Control", "max-age=0"),
];

/// The standard cascade, least to most permissive
pub fn standard_profiles() -> Vec<FetchProfile> {
    vec![
        FetchProfile {
            name: "simple",
            user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"),
            headers: &[("Accept", HTML_ACCEPT), ("Accept-Language", "en-US,en;q=0.5")],
            timeout: Duration::from_secs(10),
            pre_delay: Duration::ZERO,
            accept_invalid_certs: false,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "curl",
            user_agent: Some("curl/8.4.0"),
            headers: &[("Accept", "*/*")],
            timeout: Duration::from_secs(15),
            pre_delay: Duration::ZERO,
            accept_invalid_certs: false,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "basic",
            user_agent: None,
            headers: &[],
            timeout: Duration::from_secs(15),
            pre_delay: Duration::ZERO,
            accept_invalid_certs: false,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "modern browser",
            user_agent: Some(CHROME_MAC_UA),
            headers: BROWSER_HEADERS,
            timeout: Duration::from_secs(15),
            pre_delay: Duration::ZERO,
            accept_invalid_certs: false,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "minimal",
            user_agent: Some("python-requests/2.31.0"),
            headers: &[("Accept", "text/html,application/xhtml+xml,*/*")],
            timeout: Duration::from_secs(10),
            pre_delay: Duration::ZERO,
            accept_invalid_certs: false,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "bare session",
            user_agent: None,
            headers: &[],
            timeout: Duration::from_secs(20),
            pre_delay: Duration::from_millis(500),
            accept_invalid_certs: false,
            accepted_statuses: REDIRECT_TOLERANT,
            min_body_len: Some(20),
        },
        FetchProfile {
            name: "chrome",
            user_agent: Some(CHROME_MAC_UA),
            headers: BROWSER_HEADERS,
            timeout: Duration::from_secs(20),
            pre_delay: Duration::ZERO,
            accept_invalid_certs: false,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "safari",
            user_agent: Some("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15"),
            headers: &[
                ("Accept", HTML_ACCEPT),
                ("Accept-Language", "en-US,en;q=0.9"),
                ("Upgrade-Insecure-Requests", "1"),
            ],
            timeout: Duration::from_secs(25),
            pre_delay: Duration::from_secs(2),
            accept_invalid_certs: false,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "firefox",
            user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0"),
            headers: &[
                (
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
                ),
                ("Accept-Language", "en-US,en;q=0.5"),
                ("DNT", "1"),
                ("Upgrade-Insecure-Requests", "1"),
            ],
            timeout: Duration::from_secs(25),
            pre_delay: Duration::from_secs(2),
            accept_invalid_certs: true,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "edge",
            user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0"),
            headers: BROWSER_HEADERS,
            timeout: Duration::from_secs(25),
            pre_delay: Duration::from_secs(2),
            accept_invalid_certs: true,
            accepted_statuses: OK_ONLY,
            min_body_len: None,
        },
        FetchProfile {
            name: "extended timeout",
            user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"),
            headers: &[
                ("Accept", HTML_ACCEPT),
                ("Accept-Language", "en-US,en;q=0.5"),
                ("Referer", "https://www.google.com/"),
                ("Cache-Control", "no-cache"),
                ("Pragma", "no-cache"),
            ],
            timeout: Duration::from_secs(60),
            pre_delay: Duration::from_secs(5),
            accept_invalid_certs: true,
            accepted_statuses: BLOCK_TOLERANT,
            min_body_len: Some(100),
        },
        FetchProfile {
            name: "no ssl verification",
            user_agent: Some("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"),
            headers: &[
                ("Accept", HTML_ACCEPT),
                ("Accept-Language", "en-US,en;q=0.9"),
                ("Sec-Fetch-Site", "cross-site"),
                ("Referer", "https://www.google.com/"),
            ],
            timeout: Duration::from_secs(90),
            pre_delay: Duration::from_secs(7),
            accept_invalid_certs: true,
            accepted_statuses: ERROR_TOLERANT,
            min_body_len: Some(100),
        },
    ]
}
