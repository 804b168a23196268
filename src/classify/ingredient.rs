use std::sync::LazyLock;

use regex::Regex;

use super::instruction;
use super::rules::{Line, RuleSet, Verdict};
use super::substitution::is_substitution_note;
use crate::note::markup::is_placeholder;

/// Verbs that mark a line as a step when they open it
pub const COOKING_VERBS: &[&str] = &[
    "heat", "cook", "bake", "boil", "simmer", "saute", "sauté", "fry", "grill", "mix", "stir",
    "whisk", "blend", "combine", "add", "pour", "place", "remove", "drain", "rinse", "wash",
    "chop", "dice", "slice", "cut", "preheat", "serve", "garnish", "season", "taste", "adjust",
    "make", "prepare", "get", "take", "put", "set", "let", "allow", "bring", "reduce",
    "increase", "cover", "uncover", "flip", "turn", "grate", "melt", "dissolve", "spread",
    "brush", "spray", "oil", "grease", "line", "transfer", "arrange", "top", "fill", "stuff",
];

/// Verbs that stop a "to taste" line from counting as an ingredient
const SEASONING_EXCEPTIONS: &[&str] = &[
    "uncover", "stir", "mix", "add", "heat", "cook", "remove", "serve", "drain", "transfer",
    "top",
];

const SECTION_PREFIXES: &[&str] = &[
    "ingredients", "directions", "instructions", "method", "preparation", "for the",
    "herb blend", "everything else", "sauce", "topping", "marinade", "dressing", "garnish",
    "notes", "variations",
];

const CONNECTIVES: &[&str] = &[
    "until", "then", "and stir", "and mix", "and add", "and pour", "according to", "as needed",
    "or more", "if needed", "coming to", "works pretty", "is easier", "my favorite", "i find",
    "i like",
];

/// Words that rule a line out of the relaxed in-section test
const SECTION_VERBS: &[&str] = &["heat", "cook", "bake", "mix", "stir", "add", "pour", "remove"];

const SEQUENCING_WORDS: &[&str] = &["step", "then", "next", "meanwhile", "after", "before", "until"];

static SEASONING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bto\s+taste\b|\bsalt\s+and\s+pepper\b").expect("seasoning regex"));

static NUMBERED_STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)\-]\s").expect("numbered step regex"));

static PROCEDURAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(using|while|until|when|then|next|after|before|during|meanwhile|alternately|alternatively|if you|you can|this will|this is|repeat|continue|coming to|works pretty|is easier|my favorite|i find|i like|and stir|stir them|into the sauce)\b",
    )
    .expect("procedural regex")
});

static QUANTITY_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?|[¼½¾⅓⅔⅛⅜⅝⅞])(?:\s*-\s*\d+(?:[./]\d+)?)?\s*(?:\([^)]*\)\s*)?(?:cups?|tablespoons?|tbsps?|tbs|teaspoons?|tsps?|pounds?|lbs?|ounces?|oz|grams?|g|kilograms?|kg|ml|millilit(?:er|re)s?|lit(?:er|re)s?|l|quarts?|pints?|gallons?|cans?|jars?|bottles?|packages?|pkgs?|box(?:es)?|bags?|bunch(?:es)?|cloves?|heads?|slices?|pieces?|sticks?|pinch(?:es)?|dash(?:es)?|inch(?:es)?)\b",
    )
    .expect("quantity regex")
});

static LEADING_QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d|[¼½¾⅓⅔⅛⅜⅝⅞])").expect("leading quantity regex"));

fn word_match(haystack: &str, words: &[&str]) -> usize {
    words
        .iter()
        .filter(|word| {
            haystack
                .match_indices(*word)
                .any(|(start, _)| on_word_boundary(haystack, start, word.len()))
        })
        .count()
}

fn on_word_boundary(haystack: &str, start: usize, len: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[start + len..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// The strict ingredient test, evaluated on a cleaned line
pub static INGREDIENT_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new("ingredient", Verdict::Reject)
        .rule("too_short", Verdict::Reject, |line| line.len() < 3)
        .rule("seasoning_phrase", Verdict::Accept, |line| {
            SEASONING_RE.is_match(&line.lower)
                && !SEASONING_EXCEPTIONS.contains(&line.first_word())
                && line.len() < 50
        })
        .rule("cooking_verb", Verdict::Reject, starts_with_cooking_verb)
        .rule("numbered_step", Verdict::Reject, |line| {
            NUMBERED_STEP_RE.is_match(line.text) || line.lower.starts_with("step")
        })
        .rule("section_header", Verdict::Reject, |line| {
            SECTION_PREFIXES
                .iter()
                .any(|prefix| line.lower.starts_with(prefix))
        })
        .rule("procedural_phrase", Verdict::Reject, |line| {
            PROCEDURAL_RE.is_match(&line.lower)
        })
        .rule("too_long", Verdict::Reject, |line| line.len() > 200)
        .rule("connective_cap", Verdict::Reject, |line| {
            word_match(&line.lower, CONNECTIVES) > 1
        })
        .rule("quantity_unit", Verdict::Accept, |line| {
            QUANTITY_UNIT_RE.is_match(line.text)
        })
        .rule("leading_quantity", Verdict::Accept, |line| {
            LEADING_QUANTITY_RE.is_match(line.text)
        })
});

fn starts_with_cooking_verb(line: &Line) -> bool {
    COOKING_VERBS.contains(&line.first_word())
}

/// Strict test: a quantity, a unit, or a short seasoning phrase, and nothing procedural
pub fn is_ingredient(cleaned: &str) -> bool {
    INGREDIENT_RULES.accepts(cleaned)
}

/// Lenient test used inside an ingredients section.
///
/// Accepts a moderate-length line that carries no cooking verb, no leading
/// sequencing word and no instruction shape. Substitution notes are left out.
pub fn is_section_ingredient(cleaned: &str) -> bool {
    let line = Line::new(cleaned);
    let len = line.len();

    len > 3
        && len < 100
        && !is_placeholder(cleaned)
        && !is_substitution_note(cleaned)
        && word_match(&line.lower, SECTION_VERBS) == 0
        && !starts_with_cooking_verb(&line)
        && !SEQUENCING_WORDS
            .iter()
            .any(|word| line.lower.starts_with(word))
        && !(len > 15 && instruction::is_instruction(cleaned))
}
