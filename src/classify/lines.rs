//! Line cleaning and the pre-filters every classifier shares.

use std::sync::LazyLock;

use regex::Regex;

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[•\-*+>◦▪▫○●□■➤→⁃‣‧⁌⁍]\s*").expect("bullet regex")
});

static CHECKBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[☐✓✗✔✘]\s*").expect("checkbox regex"));

// Whitespace is required after the marker so "1.5 cups" keeps its quantity
static NUMBER_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)\]]\s+").expect("number marker regex"));

static LETTER_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][.)]\s+").expect("letter marker regex"));

static PAGE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpage\s+\d+\b|\bp\.\s*\d+\b").expect("page regex"));

static TIME_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(prep|cook|total)\s+time\b").expect("time label regex"));

static SERVING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(serves?|servings?|yield|makes?)\s+\d+\b").expect("serving regex")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s+(min|minutes|hrs?|hours?)\b").expect("duration regex")
});

static INGREDIENT_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bingredients?\b").expect("ingredient header regex"));

static INSTRUCTION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(instructions?|directions?|method|steps?|preparation)\b")
        .expect("instruction header regex")
});

const HEADER_MAX_LEN: usize = 40;

/// Strips list bullets, checkboxes and numbered or lettered markers.
///
/// Markers are removed until none remain, so cleaning a cleaned line is a no-op.
pub fn clean_line(line: &str) -> String {
    let mut current = line.trim().to_string();
    loop {
        let next = [&*BULLET_RE, &*CHECKBOX_RE, &*NUMBER_MARKER_RE, &*LETTER_MARKER_RE]
            .iter()
            .fold(current.clone(), |acc, re| re.replace(&acc, "").into_owned())
            .trim()
            .to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

pub fn is_url(line: &str) -> bool {
    let lower = line.to_lowercase();
    ["http", "www.", ".com", ".org"]
        .iter()
        .any(|part| lower.contains(part))
}

pub fn is_page_reference(line: &str) -> bool {
    PAGE_REF_RE.is_match(line)
}

pub fn is_time_label(line: &str) -> bool {
    TIME_LABEL_RE.is_match(line)
}

pub fn is_serving_line(line: &str) -> bool {
    SERVING_RE.is_match(line)
}

pub fn has_duration(line: &str) -> bool {
    DURATION_RE.is_match(line)
}

/// Lines no classifier ever keeps: URLs, page references and time labels
pub fn is_noise(line: &str) -> bool {
    is_url(line) || is_page_reference(line) || is_time_label(line)
}

/// Serving and duration lines are kept for instructions but never become ingredients
pub fn excluded_from_ingredients(line: &str) -> bool {
    is_noise(line) || is_serving_line(line) || has_duration(line)
}

fn is_header_shaped(line: &str) -> bool {
    line.chars().count() <= HEADER_MAX_LEN && !line.starts_with(|c: char| c.is_ascii_digit())
}

/// A short line opening an ingredients section, e.g. "Ingredients:"
pub fn is_ingredient_header(line: &str) -> bool {
    is_header_shaped(line) && INGREDIENT_HEADER_RE.is_match(line)
}

/// A short line opening the method section, e.g. "Directions"
pub fn is_instruction_header(line: &str) -> bool {
    is_header_shaped(line) && INSTRUCTION_HEADER_RE.is_match(line)
}

/// Whether a line mentions any section word, regardless of its length
pub fn mentions_section(line: &str) -> bool {
    INGREDIENT_HEADER_RE.is_match(line) || INSTRUCTION_HEADER_RE.is_match(line)
}
