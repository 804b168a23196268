use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::config::ValidatorConfig;

static MEASUREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b\d+(?:[./]\d+)?|[¼½¾⅓⅔⅛⅜⅝⅞])\s*(?:cups?|tablespoons?|tbsps?|tbs|teaspoons?|tsps?|pounds?|lbs?|ounces?|oz|grams?|g|kg|kilograms?|ml|millilit(?:er|re)s?|lit(?:er|re)s?|l|cloves?|pinch(?:es)?|dash(?:es)?|quarts?|pints?|cans?|sticks?)\b",
    )
    .expect("measurement regex")
});

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").expect("word regex"));

const COOKING_VERBS: &[&str] = &[
    "bake", "boil", "simmer", "stir", "mix", "whisk", "chop", "slice", "dice", "mince", "saute",
    "fry", "roast", "grill", "heat", "preheat", "combine", "pour", "season", "drain", "knead",
    "fold", "beat", "blend", "marinate", "toss", "cook", "serve", "add", "melt", "spread",
    "sprinkle", "garnish", "chill", "cover", "reduce", "broil", "steam", "peel",
];

const HOMEPAGE_INDICATORS: &[&str] = &[
    "browse our recipes",
    "browse recipes",
    "page not found",
    "404 not found",
    "latest recipes",
    "popular recipes",
    "featured recipes",
    "trending now",
    "recipe index",
    "search results",
    "sign up for our newsletter",
    "subscribe to our newsletter",
    "all categories",
];

const STOP_WORDS: &[&str] = &[
    "the", "and", "with", "for", "from", "recipe", "recipes", "best", "easy", "how", "make",
    "your", "our", "this", "that", "you", "are", "quick", "simple",
];

const RECIPE_URL_MARKERS: &[&str] = &["recipe", "cook", "food", "kitchen", "bake"];

/// Per-signal breakdown of a relevance score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceScore {
    pub measurements: usize,
    pub cooking_verbs: usize,
    pub title_matches: usize,
    pub homepage_indicators: usize,
    pub net: i32,
}

/// Scores fetched page text for how likely it is to be the recipe the note
/// points at.
pub fn score(text: &str, title: &str, url: &str) -> RelevanceScore {
    let lower = text.to_lowercase();
    let words: Vec<&str> = WORD_RE.find_iter(&lower).map(|m| m.as_str()).collect();
    let mut result = RelevanceScore::default();

    result.measurements = MEASUREMENT_RE.find_iter(text).count();
    result.net += match result.measurements {
        0 => 0,
        1..=2 => 1,
        _ => 3,
    };

    result.cooking_verbs = COOKING_VERBS
        .iter()
        .filter(|verb| words.contains(verb))
        .count();
    result.net += match result.cooking_verbs {
        0 | 1 => 0,
        2..=4 => 1,
        _ => 2,
    };

    let mut title_words: Vec<String> = WORD_RE
        .find_iter(&title.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(&word.as_str()))
        .collect();
    title_words.dedup();
    result.title_matches = title_words
        .iter()
        .filter(|word| words.contains(&word.as_str()))
        .count();
    result.net += match result.title_matches {
        0 => 0,
        1 => 1,
        _ => 2,
    };

    let non_blank_lines = text.lines().filter(|line| !line.trim().is_empty()).count();
    if text.len() > 500 && non_blank_lines > 10 {
        result.net += 1;
    }

    result.homepage_indicators = HOMEPAGE_INDICATORS
        .iter()
        .filter(|phrase| lower.contains(*phrase))
        .count();
    if result.homepage_indicators >= 2 {
        result.net -= 2;
    }

    let length = text.trim().len();
    if length < 200 {
        result.net -= 2;
    }
    if length < 100 {
        result.net -= 3;
    }

    let url = url.to_lowercase();
    if result.net <= 0 && RECIPE_URL_MARKERS.iter().any(|m| url.contains(m)) {
        result.net -= 1;
    }

    result
}

/// Accepts fetched content when its net score reaches the configured threshold.
///
/// Text shorter than 100 characters is never accepted.
pub fn is_relevant(text: &str, title: &str, url: &str, config: &ValidatorConfig) -> bool {
    let result = score(text, title, url);
    let accepted = text.trim().len() >= 100 && result.net >= config.accept_threshold;

    debug!(
        "Content validation for {}: measurements={} verbs={} title={} homepage={} net={} -> {}",
        url,
        result.measurements,
        result.cooking_verbs,
        result.title_matches,
        result.homepage_indicators,
        result.net,
        if accepted { "accept" } else { "reject" }
    );

    accepted
}
