use std::sync::LazyLock;

use regex::Regex;

const INDICATORS: &[&str] = &[
    "you can replace",
    "can replace",
    "replace",
    "replacing",
    "substitute",
    "try replacing",
    "instead of",
    "alternative",
    "or use",
    "can substitute",
    "can use",
    "use instead",
];

/// Food terms a substitution note can be matched to an ingredient by
const FOOD_TERMS: &[&str] = &[
    "pecans", "pecan", "parsley", "sage", "herbs", "nuts", "cheese", "flour", "oil", "butter",
    "onion", "garlic", "milk", "cream", "mushrooms", "mushroom", "chicken", "beef", "pork",
    "fish",
];

static NOTE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(you can |can |try )").expect("note prefix regex"));

/// A line suggesting an ingredient swap, e.g. "You can replace pecans with walnuts"
pub fn is_substitution_note(line: &str) -> bool {
    let lower = line.to_lowercase();
    INDICATORS.iter().any(|indicator| lower.contains(indicator))
}

/// Appends the first substitution note that shares a food term with the
/// ingredient, in parentheses.
pub fn enrich(ingredient: &str, notes: &[&str]) -> String {
    let lower = ingredient.to_lowercase();
    let foods: Vec<&str> = FOOD_TERMS
        .iter()
        .copied()
        .filter(|food| lower.contains(food))
        .collect();

    if foods.is_empty() {
        return ingredient.to_string();
    }

    notes
        .iter()
        .find(|note| {
            let note = note.to_lowercase();
            foods.iter().any(|food| note.contains(food))
        })
        .map(|note| {
            let note = NOTE_PREFIX_RE.replace(note.trim(), "");
            format!("{ingredient} ({note})")
        })
        .unwrap_or_else(|| ingredient.to_string())
}
