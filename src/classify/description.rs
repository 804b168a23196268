use super::ingredient::is_ingredient;
use super::instruction::is_instruction;
use super::lines::{clean_line, is_noise, mentions_section};
use crate::note::markup::is_placeholder;

/// Only the opening lines of a note are considered for its description
pub const DESCRIPTION_WINDOW: usize = 5;

const MIN_DESCRIPTION_LINE_LEN: usize = 20;

/// A prose line that is neither ingredient, instruction nor section header
pub fn is_description_line(line: &str) -> bool {
    line.chars().count() > MIN_DESCRIPTION_LINE_LEN
        && !is_placeholder(line)
        && !is_noise(line)
        && !is_ingredient(&clean_line(line))
        && !is_instruction(line)
        && !mentions_section(line)
}

/// Joins description lines and caps the result at `max_len` characters
pub fn summarize<'a>(lines: impl IntoIterator<Item = &'a str>, max_len: usize) -> Option<String> {
    let joined = lines.into_iter().collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        return None;
    }

    if joined.chars().count() > max_len {
        let truncated: String = joined.chars().take(max_len).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(joined)
    }
}
