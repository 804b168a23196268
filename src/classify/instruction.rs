use std::sync::LazyLock;

use regex::Regex;

use super::lines::{is_serving_line, is_time_label};
use super::rules::{RuleSet, Verdict};
use super::substitution::is_substitution_note;

/// Minimum length of a line kept as an instruction
pub const MIN_INSTRUCTION_LEN: usize = 15;

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(cook|bake|mix|add|heat|stir|pour|place|remove|serve|prepare|combine|season|boil|simmer|fry|chop|slice|dice|mince|whisk|blend|fold|beat|knead|roll|spread|brush|drizzle|sprinkle|garnish|chill|freeze|thaw|create|preheat|until|then|next|meanwhile)\b",
    )
    .expect("instruction keyword regex")
});

/// The instruction test. Lines are evaluated as they appear in the text.
pub static INSTRUCTION_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::new("instruction", Verdict::Reject)
        .rule("serving_line", Verdict::Reject, |line| is_serving_line(line.text))
        .rule("time_label", Verdict::Reject, |line| is_time_label(line.text))
        .rule("too_short", Verdict::Reject, |line| line.len() < 20)
        .rule("substitution_note", Verdict::Reject, |line| {
            is_substitution_note(line.text)
        })
        .rule("instruction_keyword", Verdict::Accept, |line| {
            KEYWORD_RE.is_match(&line.lower)
        })
});

pub fn is_instruction(line: &str) -> bool {
    INSTRUCTION_RULES.accepts(line)
}
