//! Picks the one URL a note most likely came from.
//!
//! Candidates are taken in priority order: the note's source-url metadata,
//! then an explicit source tag inside the markup, then every other URL in the
//! text or in a link target, filtered and scored. No network access happens here.

pub mod clean;

use std::collections::HashSet;
use std::sync::LazyLock;

use html_escape::decode_html_entities;
use log::debug;
use regex::Regex;
use url::Url;

pub use clean::{
    DropTrackingParams, StripFragment, TrimTrailingPunctuation, TruncateUnwantedSegment,
    UrlCleaner, UrlCleaningRule,
};

/// Hosts that never carry a recipe: schema/namespace hosts, social sharing, shorteners
const BLOCKED_DOMAINS: &[&str] = &[
    "evernote.com",
    "w3.org",
    "schema.org",
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "pinterest.com",
    "linkedin.com",
    "youtube.com",
    "youtu.be",
    "whatsapp.com",
    "wa.me",
    "t.co",
    "bit.ly",
    "tinyurl.com",
];

/// Placeholder hosts that only show up in boilerplate
const PLACEHOLDER_HOSTS: &[&str] = &["example.com", "localhost", "127.0.0.1"];

const BLOCKED_EXTENSIONS: &[&str] = &[
    ".dtd", ".xsd", ".xml", ".css", ".js", ".png", ".jpg", ".jpeg", ".gif",
];

const SHARING_PARAMS: &[&str] = &["text=", "url=", "smid=", "utm_source=", "utm_medium="];

const RECIPE_SITES: &[&str] = &[
    "allrecipes.com",
    "foodnetwork.com",
    "epicurious.com",
    "bonappetit.com",
    "seriouseats.com",
    "food52.com",
    "tasteofhome.com",
];

const RECIPE_KEYWORDS: &[&str] = &[
    "recipe", "food", "cooking", "kitchen", "chef", "cuisine", "dish", "allrecipes",
    "foodnetwork", "epicurious", "bonappetit", "seriouseats", "tasteofhome", "delish",
    "food52", "yummly", "budget", "meal", "ingredient", "bake", "cook", "serious", "eats",
    "blog", "soup", "foodie", "vegan",
];

const BLOG_MARKERS: &[&str] = &["foodie", "blog", "kitchen", "recipe"];

const DISH_MARKERS: &[&str] = &[
    "soup", "salad", "chicken", "beef", "pasta", "bread", "cake", "cookie", "vegan",
    "vegetarian", "healthy", "easy", "quick",
];

const UNWANTED_PARTS: &[&str] = &[
    "/print", "/comment", "/respond", "/feed", "/rss", "/trackback", "/amp", "/mobile",
];

static SOURCE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<source-url>\s*(https?://[^<>"']+?)\s*</source-url>"#)
        .expect("source tag regex")
});

static CLIPPED_SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)--en-clipped-source-url:\s*(https?://[^\s<>"']+)"#)
        .expect("clipped source regex")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s<>"']+"#).expect("url regex"));

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*["']\s*(https?://[^"'\s]+)"#).expect("href regex")
});

static TITLE_CLEAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("title clean regex"));

/// A URL found in a note together with its relevance score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    pub score: i32,
}

/// What the resolver looks at for one note
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceInput<'a> {
    pub title: &'a str,
    /// Raw note markup, searched for explicit source tags and link targets
    pub markup: &'a str,
    /// Normalized plain text, searched for free-standing URLs
    pub text: &'a str,
    /// Source URL from the note's metadata
    pub metadata_url: Option<&'a str>,
}

pub struct SourceResolver {
    cleaner: UrlCleaner,
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceResolver {
    pub fn new() -> Self {
        Self::with_cleaner(UrlCleaner::standard())
    }

    pub fn with_cleaner(cleaner: UrlCleaner) -> Self {
        Self { cleaner }
    }

    /// Returns the authoritative source URL for a note, if any
    pub fn resolve(&self, input: &SourceInput) -> Option<String> {
        if let Some(url) = input.metadata_url.and_then(explicit_url) {
            debug!("Using source URL from note metadata: {}", url);
            return Some(url);
        }

        if let Some(url) = self.inline_source_tag(input.markup) {
            debug!("Using inline source URL: {}", url);
            return Some(url);
        }

        let mut searched = input.text.to_string();
        for href in link_targets(input.markup) {
            searched.push('\n');
            searched.push_str(&href);
        }

        let candidates = self.candidates(&searched, input.title);
        for other in candidates.iter().skip(1).take(2) {
            debug!("Other candidate (score {}): {}", other.score, other.url);
        }

        candidates.into_iter().next().map(|best| {
            debug!("Selected URL (score {}): {}", best.score, best.url);
            trim_trailing(&best.url)
        })
    }

    fn inline_source_tag(&self, markup: &str) -> Option<String> {
        let decoded = decode_html_entities(markup);

        [&*SOURCE_TAG_RE, &*CLIPPED_SOURCE_RE]
            .iter()
            .flat_map(|re| {
                re.captures_iter(&decoded)
                    .map(|caps| caps[1].to_string())
                    .collect::<Vec<_>>()
            })
            .find_map(|url| {
                let url = trim_trailing(&url);
                if is_blocked(&url) {
                    debug!("Skipping inline source URL on a blocked domain: {}", url);
                    return None;
                }
                explicit_url(&url)
            })
    }

    /// Every acceptable URL in the text, best first.
    ///
    /// Sorted by descending score; ties go to the shorter URL.
    pub fn candidates(&self, text: &str, title: &str) -> Vec<CandidateUrl> {
        let title_words = title_words(title);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for found in URL_RE.find_iter(text) {
            let raw = found
                .as_str()
                .trim_end_matches(['.', ',', ')', '!', '?', ':']);
            if !seen.insert(raw.to_string()) {
                continue;
            }

            if let Some(reason) = rejection_reason(raw) {
                debug!("Skipping URL {} ({})", raw, reason);
                continue;
            }

            let url = self.cleaner.clean(raw);
            let score = score_url(&url, &title_words);
            debug!("URL candidate {} scored {}", url, score);
            candidates.push(CandidateUrl { url, score });
        }

        candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.url.len().cmp(&b.url.len())));
        candidates.dedup_by(|a, b| a.url == b.url);
        candidates
    }
}

/// URLs that only appear as `href` values, entity-decoded
fn link_targets(markup: &str) -> Vec<String> {
    HREF_RE
        .captures_iter(markup)
        .map(|caps| decode_html_entities(&caps[1]).into_owned())
        .collect()
}

/// Scores a URL for how likely it is to be the note's recipe page
pub fn score_url(url: &str, title_words: &[String]) -> i32 {
    let lower = url.to_lowercase();
    let mut score = 1;

    score += 5 * title_words.iter().filter(|w| lower.contains(w.as_str())).count() as i32;
    score -= 10 * UNWANTED_PARTS.iter().filter(|p| lower.contains(*p)).count() as i32;

    let path_separators = lower
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .matches('/')
        .count();
    score += match path_separators {
        0..=2 => 3,
        3 => 2,
        4 => 0,
        _ => -2,
    };

    score += 2 * RECIPE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as i32;

    if RECIPE_SITES.iter().any(|site| lower.contains(site)) {
        score += 5;
    }
    if lower.contains("seriouseats.com") {
        score += 3;
    }
    if BLOG_MARKERS.iter().any(|marker| lower.contains(marker)) {
        score += 3;
    }
    score += DISH_MARKERS.iter().filter(|m| lower.contains(*m)).count() as i32;

    if url.len() > 150 || ["utm_", "ref=", "src="].iter().any(|p| lower.contains(p)) {
        score -= 1;
    }

    score
}

/// Lowercased title words longer than two characters, punctuation removed
pub fn title_words(title: &str) -> Vec<String> {
    TITLE_CLEAN_RE
        .replace_all(&title.to_lowercase(), "")
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(String::from)
        .collect()
}

/// Validates an explicit URL as HTTP(S) with a host
fn explicit_url(url: &str) -> Option<String> {
    let url = trim_trailing(url.trim());
    match Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            if is_blocked(&url) {
                debug!("Ignoring explicit source URL on a blocked domain: {}", url);
                None
            } else {
                Some(url)
            }
        }
        _ => {
            debug!("Ignoring invalid explicit source URL: {}", url);
            None
        }
    }
}

fn trim_trailing(url: &str) -> String {
    TrimTrailingPunctuation.apply(url)
}

fn host_matches(host: &str, domains: &[&str]) -> bool {
    domains
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

fn is_blocked(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .is_some_and(|host| {
            host_matches(&host, BLOCKED_DOMAINS)
                || host.starts_with("xml.")
                || host.starts_with("xmlns.")
        })
}

/// Why a free-standing URL is not a candidate, if it isn't
fn rejection_reason(url: &str) -> Option<&'static str> {
    if url.len() < 10 || url.len() > 500 {
        return Some("unreasonable length");
    }

    let Ok(parsed) = Url::parse(url) else {
        return Some("unparseable");
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return Some("not http(s)");
    }
    let Some(host) = parsed.host_str().map(str::to_lowercase) else {
        return Some("no host");
    };

    if is_blocked(url) {
        return Some("non-recipe domain");
    }
    if host_matches(&host, PLACEHOLDER_HOSTS) {
        return Some("placeholder host");
    }

    let path = parsed.path().to_lowercase();
    if BLOCKED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Some("asset file");
    }

    let lower = url.to_lowercase();
    if SHARING_PARAMS.iter().any(|param| lower.contains(param)) {
        return Some("sharing parameters");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str, title: &str) -> Option<String> {
        SourceResolver::new().resolve(&SourceInput {
            title,
            text,
            ..Default::default()
        })
    }

    #[test]
    fn test_metadata_url_wins() {
        let resolver = SourceResolver::new();
        let url = resolver.resolve(&SourceInput {
            title: "Soup",
            markup: "",
            text: "https://www.allrecipes.com/soup",
            metadata_url: Some("https://smallblog.net/soup/"),
        });
        assert_eq!(url.as_deref(), Some("https://smallblog.net/soup"));
    }

    #[test]
    fn test_invalid_metadata_url_falls_through() {
        let resolver = SourceResolver::new();
        let url = resolver.resolve(&SourceInput {
            title: "Soup",
            markup: "",
            text: "From https://smallblog.net/soup",
            metadata_url: Some("ftp://files.net/soup"),
        });
        assert_eq!(url.as_deref(), Some("https://smallblog.net/soup"));
    }

    #[test]
    fn test_inline_source_tags() {
        let resolver = SourceResolver::new();
        let markup = r#"<en-note style="--en-clipped-content:fullPage; --en-clipped-source-url:https://www.kitchenblog.net/lentil-soup/; --en-clipped-source-title:Soup"><div>x</div></en-note>"#;
        let url = resolver.resolve(&SourceInput {
            title: "Lentil Soup",
            markup,
            text: "x",
            metadata_url: None,
        });
        assert_eq!(url.as_deref(), Some("https://www.kitchenblog.net/lentil-soup"));

        let markup = "<div><source-url> https://cooks.net/stew;</source-url></div>";
        let url = resolver.resolve(&SourceInput {
            title: "Stew",
            markup,
            text: "",
            metadata_url: None,
        });
        assert_eq!(url.as_deref(), Some("https://cooks.net/stew"));
    }

    #[test]
    fn test_link_target_is_a_candidate() {
        let resolver = SourceResolver::new();
        let markup = r#"<en-note><div>From <a href="https://www.kitchenblog.net/grandmas-soup?x=1&amp;y=2">Grandma's soup</a></div></en-note>"#;
        let url = resolver.resolve(&SourceInput {
            title: "Grandma's Soup",
            markup,
            text: "From Grandma's soup",
            metadata_url: None,
        });
        assert_eq!(
            url.as_deref(),
            Some("https://www.kitchenblog.net/grandmas-soup?x=1&y=2")
        );

        // Link targets go through the same filters
        let markup = r#"<a href="https://www.pinterest.com/pin/123">Pinned</a>"#;
        let url = resolver.resolve(&SourceInput {
            title: "Soup",
            markup,
            text: "Pinned",
            metadata_url: None,
        });
        assert_eq!(url, None);
    }

    #[test]
    fn test_social_media_link_gives_no_candidate() {
        let text = "Saw this on https://www.facebook.com/sharer/sharer.php?u=soup\nand https://t.co/abc123";
        assert_eq!(resolve(text, "Tomato Soup"), None);
    }

    #[test]
    fn test_t_co_does_not_block_similar_hosts() {
        let text = "https://www.eat.co/recipes/tomato-soup";
        assert!(resolve(text, "Tomato Soup").is_some());
    }

    #[test]
    fn test_filters_assets_placeholders_and_sharing_urls() {
        let text = "http://xml.evernote.com/pub/enml2.dtd\n\
                    https://example.com/recipe\n\
                    https://cdn.site.net/photo.jpg\n\
                    https://news.site.net/share?url=abc\n\
                    mailto:me@site.net";
        assert_eq!(resolve(text, "Anything"), None);
    }

    #[test]
    fn test_print_variant_scores_lower() {
        let words = title_words("Tomato Soup");
        let clean = score_url("https://www.seriouseats.com/tomato-soup", &words);
        let print = score_url("https://www.seriouseats.com/tomato-soup/print", &words);
        assert!(clean > print);

        let clean = score_url("https://smallblog.net/2020/05/soup", &words);
        let print = score_url("https://smallblog.net/2020/05/soup/print", &words);
        assert!(clean > print);
    }

    #[test]
    fn test_title_match_beats_unrelated_url() {
        let text = "See https://smallblog.net/about and https://smallblog.net/green-curry-noodles";
        assert_eq!(
            resolve(text, "Green Curry Noodles").as_deref(),
            Some("https://smallblog.net/green-curry-noodles")
        );
    }

    #[test]
    fn test_ties_prefer_shorter_url() {
        let candidates = SourceResolver::new()
            .candidates("https://aaa.net/xyz-long https://aaa.net/xyz", "Zzz");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].score, candidates[1].score);
        assert_eq!(candidates[0].url, "https://aaa.net/xyz");
    }

    #[test]
    fn test_winner_is_cleaned() {
        let text = "Recipe: https://www.kitchenblog.net/stew/print/?utm_campaign=feed#top.";
        assert_eq!(
            resolve(text, "Stew").as_deref(),
            Some("https://www.kitchenblog.net/stew")
        );
    }

    #[test]
    fn test_title_words() {
        assert_eq!(
            title_words("Mom's Best-Ever Pot Pie!"),
            vec!["moms", "best-ever", "pot", "pie"]
        );
    }
}
