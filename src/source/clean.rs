//! Pluggable URL cleaning rules.
//!
//! Each rule is a small strategy object so the resolver and the fetch cascade
//! share one ordered rule set instead of carrying their own copies of the
//! string surgery.

use log::debug;

/// Path segments that point at a print view, feed or comment thread
pub const UNWANTED_SEGMENTS: &[&str] = &[
    "print", "amp", "mobile", "comments", "comment", "respond", "feed", "rss", "trackback",
];

/// Query parameter key prefixes used for tracking or sharing
pub const TRACKING_PARAM_PREFIXES: &[&str] = &[
    "utm_", "ref", "src", "fbclid", "gclid", "mc_", "campaign", "medium", "source", "content",
    "term", "cid", "sid", "print", "share", "comment", "respond",
];

/// One transformation applied to a candidate URL
pub trait UrlCleaningRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, url: &str) -> String;
}

/// Drops everything after `#`
pub struct StripFragment;

impl UrlCleaningRule for StripFragment {
    fn name(&self) -> &'static str {
        "strip-fragment"
    }

    fn apply(&self, url: &str) -> String {
        url.split('#').next().unwrap_or_default().to_string()
    }
}

/// Truncates the URL at the first unwanted path segment, as long as at least
/// one real path segment comes before it.
pub struct TruncateUnwantedSegment;

impl UrlCleaningRule for TruncateUnwantedSegment {
    fn name(&self) -> &'static str {
        "truncate-unwanted-segment"
    }

    fn apply(&self, url: &str) -> String {
        // ASCII lowercasing keeps byte offsets aligned with `url`
        let lower = url.to_ascii_lowercase();

        for segment in UNWANTED_SEGMENTS {
            let needle = format!("/{segment}");
            let mut from = 0;

            while let Some(found) = lower[from..].find(&needle) {
                let pos = from + found;
                let end = pos + needle.len();
                let at_boundary = lower[end..]
                    .chars()
                    .next()
                    .map_or(true, |c| matches!(c, '/' | '?' | '#' | ';'));

                if at_boundary {
                    let before = url[..pos].trim_end_matches('/');
                    // scheme "//" plus one path separator
                    if before.matches('/').count() >= 3 {
                        return before.to_string();
                    }
                }
                from = end;
            }
        }

        url.to_string()
    }
}

/// Removes tracking and sharing query parameters, keeping the rest in order
pub struct DropTrackingParams;

impl UrlCleaningRule for DropTrackingParams {
    fn name(&self) -> &'static str {
        "drop-tracking-params"
    }

    fn apply(&self, url: &str) -> String {
        let Some((base, query)) = url.split_once('?') else {
            return url.to_string();
        };

        let kept: Vec<&str> = query
            .split('&')
            .filter(|param| {
                let Some((key, _)) = param.split_once('=') else {
                    return false;
                };
                let key = key.to_lowercase();
                !TRACKING_PARAM_PREFIXES
                    .iter()
                    .any(|prefix| key.starts_with(prefix))
            })
            .collect();

        if kept.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, kept.join("&"))
        }
    }
}

/// Strips trailing `/` and `;` characters
pub struct TrimTrailingPunctuation;

impl UrlCleaningRule for TrimTrailingPunctuation {
    fn name(&self) -> &'static str {
        "trim-trailing-punctuation"
    }

    fn apply(&self, url: &str) -> String {
        url.trim_end_matches(['/', ';']).to_string()
    }
}

/// An ordered list of cleaning rules
pub struct UrlCleaner {
    rules: Vec<Box<dyn UrlCleaningRule>>,
}

impl Default for UrlCleaner {
    fn default() -> Self {
        Self::standard()
    }
}

impl UrlCleaner {
    /// The standard rule set: fragment, unwanted segment, tracking params, trailing punctuation
    pub fn standard() -> Self {
        Self::with_rules(vec![
            Box::new(StripFragment),
            Box::new(TruncateUnwantedSegment),
            Box::new(DropTrackingParams),
            Box::new(TrimTrailingPunctuation),
        ])
    }

    pub fn with_rules(rules: Vec<Box<dyn UrlCleaningRule>>) -> Self {
        Self { rules }
    }

    pub fn clean(&self, url: &str) -> String {
        self.rules.iter().fold(url.to_string(), |current, rule| {
            let cleaned = rule.apply(&current);
            if cleaned != current {
                debug!("URL rule {}: '{}' -> '{}'", rule.name(), current, cleaned);
            }
            cleaned
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fragment() {
        assert_eq!(
            StripFragment.apply("https://site.com/soup#comments"),
            "https://site.com/soup"
        );
    }

    #[test]
    fn test_truncate_unwanted_segment() {
        let rule = TruncateUnwantedSegment;
        assert_eq!(
            rule.apply("https://site.com/tomato-soup/print/12345"),
            "https://site.com/tomato-soup"
        );
        assert_eq!(
            rule.apply("https://site.com/tomato-soup/amp/"),
            "https://site.com/tomato-soup"
        );
        // Nothing meaningful before the segment
        assert_eq!(rule.apply("https://site.com/print"), "https://site.com/print");
        // Only whole segments count
        assert_eq!(
            rule.apply("https://site.com/recipes/printable-soup"),
            "https://site.com/recipes/printable-soup"
        );
    }

    #[test]
    fn test_drop_tracking_params() {
        let rule = DropTrackingParams;
        assert_eq!(
            rule.apply("https://site.com/soup?utm_source=x&id=7&fbclid=abc"),
            "https://site.com/soup?id=7"
        );
        assert_eq!(
            rule.apply("https://site.com/soup?utm_medium=email"),
            "https://site.com/soup"
        );
        assert_eq!(rule.apply("https://site.com/soup"), "https://site.com/soup");
    }

    #[test]
    fn test_trim_trailing_punctuation() {
        assert_eq!(
            TrimTrailingPunctuation.apply("https://site.com/soup/;/"),
            "https://site.com/soup"
        );
    }

    #[test]
    fn test_standard_cleaner_order() {
        let cleaner = UrlCleaner::standard();
        assert_eq!(
            cleaner.clean("https://www.site.com/lentil-soup/print/?utm_source=pin#step-2"),
            "https://www.site.com/lentil-soup"
        );
        assert_eq!(
            cleaner.clean("https://www.site.com/lentil-soup/?page=2"),
            "https://www.site.com/lentil-soup/?page=2"
        );
    }

    #[test]
    fn test_custom_rule_set() {
        let cleaner = UrlCleaner::with_rules(vec![Box::new(TrimTrailingPunctuation)]);
        assert_eq!(
            cleaner.clean("https://site.com/soup/print/"),
            "https://site.com/soup/print"
        );
    }
}
