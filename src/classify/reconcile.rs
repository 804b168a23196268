use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::note::markup::{collapse_whitespace, is_placeholder};

static INGREDIENT_SHAPES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"optional\s+additional\s+seasonings?\s+to\s+taste.*i\s+usually\s+add",
        r"^optional\s+additional\s+seasonings?\s+to\s+taste",
        r"^\s*to\s+taste\s*[-:]?\s*(salt|pepper|seasoning)",
        r"^optional\s*[-:]?\s*[a-z\s,&]+\s+to\s+taste\s*$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("ingredient shape regex"))
    .collect()
});

/// Any of these means the line really is a step
const COOKING_INDICATORS: &[&str] = &[
    "make", "melt", "mix", "stir", "cook", "heat", "drain", "transfer", "add in", "dump",
    "brown", "mixing in", "stirring", "top with", "melting", "breadcrumb", "topping",
    "constantly", "drain and", "noodles", "transfer to", "plate",
];

/// An instruction line that is really an ingredient statement
pub fn is_misplaced_ingredient(line: &str) -> bool {
    let lower = line.to_lowercase();
    !COOKING_INDICATORS.iter().any(|verb| lower.contains(verb))
        && INGREDIENT_SHAPES.iter().any(|shape| shape.is_match(&lower))
}

/// Moves ingredient-shaped instruction lines to the end of the ingredient
/// list. Placeholders and every other instruction keep their order.
pub fn reconcile(
    mut ingredients: Vec<String>,
    instructions: Vec<String>,
) -> (Vec<String>, Vec<String>) {
    let mut kept = Vec::with_capacity(instructions.len());

    for instruction in instructions {
        if !is_placeholder(&instruction) && is_misplaced_ingredient(&instruction) {
            debug!("Moving instruction to ingredients: '{}'", instruction);
            ingredients.push(collapse_whitespace(&instruction));
        } else {
            kept.push(instruction);
        }
    }

    (ingredients, kept)
}
