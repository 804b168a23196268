//! Line classification for notes and pages without structured data.
//!
//! Every non-blank line gets exactly one [`LineRole`]. Ingredients are found
//! in up to two passes, the second used only when the first found nothing:
//!
//! 1. the strict ingredient test on every line, plus a relaxed test inside
//!    "Ingredients" sections
//! 2. the strict test on the first ten lines only, with length bounds
//!
//! The relaxed test is never applied outside a section: without a header to
//! anchor it, it accepts any short line of prose. A "strict test on every
//! line, ignoring sections" pass would repeat pass 1 exactly, so there is none.
//!
//! Instructions, image placeholders and the description are assigned from the
//! lines that are left.

pub mod description;
pub mod ingredient;
pub mod instruction;
pub mod lines;
pub mod reconcile;
pub mod rules;
pub mod substitution;

use log::debug;

use crate::config::ClassifierConfig;
use crate::note::markup::is_placeholder;

use description::DESCRIPTION_WINDOW;
use ingredient::{is_ingredient, is_section_ingredient};
use instruction::{is_instruction, MIN_INSTRUCTION_LEN};
use lines::{clean_line, excluded_from_ingredients, is_ingredient_header, is_instruction_header, is_noise};
use substitution::is_substitution_note;

/// How many opening lines the last ingredient pass looks at
const FIRST_LINES_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Ingredient,
    Instruction,
    Description,
    Ignorable,
}

/// One non-blank line of input with the role it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// Index among the non-blank lines of the input
    pub position: usize,
    /// Output text: cleaned, and for ingredients possibly enriched
    pub text: String,
    pub role: LineRole,
}

/// The classifier's output after caps and reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub ingredients: Vec<String>,
    /// Instruction lines with image placeholders interleaved
    pub instructions: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngredientPass {
    Sections,
    FirstLines,
}

/// Assigns a role to every non-blank line of `text`
pub fn classify_lines(text: &str) -> Vec<ClassifiedLine> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let notes: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| is_substitution_note(line))
        .collect();

    let mut roles: Vec<Option<ClassifiedLine>> = vec![None; lines.len()];

    for pass in [IngredientPass::Sections, IngredientPass::FirstLines] {
        let found = ingredient_pass(pass, &lines, &notes, &mut roles);
        debug!("Ingredient pass {:?} found {} lines", pass, found);
        if found > 0 {
            break;
        }
    }

    for (position, line) in lines.iter().enumerate() {
        if roles[position].is_some() {
            continue;
        }

        let (role, text) = if is_placeholder(line) {
            (LineRole::Instruction, line.to_string())
        } else if is_noise(line) || is_substitution_note(line) {
            (LineRole::Ignorable, line.to_string())
        } else if line.chars().count() > MIN_INSTRUCTION_LEN
            && is_instruction(line)
            && !is_ingredient(&clean_line(line))
        {
            (LineRole::Instruction, clean_line(line))
        } else if position < DESCRIPTION_WINDOW && description::is_description_line(line) {
            (LineRole::Description, line.to_string())
        } else {
            (LineRole::Ignorable, line.to_string())
        };

        roles[position] = Some(ClassifiedLine {
            position,
            text,
            role,
        });
    }

    roles.into_iter().flatten().collect()
}

/// Runs one ingredient pass, recording accepted lines. Returns how many it found.
fn ingredient_pass(
    pass: IngredientPass,
    lines: &[&str],
    notes: &[&str],
    roles: &mut [Option<ClassifiedLine>],
) -> usize {
    let window = match pass {
        IngredientPass::Sections => lines.len(),
        IngredientPass::FirstLines => FIRST_LINES_WINDOW.min(lines.len()),
    };

    let mut in_section = false;
    let mut found = 0;

    for (position, line) in lines.iter().enumerate().take(window) {
        if is_placeholder(line) || excluded_from_ingredients(line) {
            continue;
        }

        if pass == IngredientPass::Sections {
            if is_ingredient_header(line) {
                in_section = true;
                continue;
            }
            if is_instruction_header(line) {
                in_section = false;
                continue;
            }
        }

        let cleaned = clean_line(line);
        let length = cleaned.chars().count();
        if length <= 2 {
            continue;
        }

        let accepted = match pass {
            IngredientPass::Sections => {
                is_ingredient(&cleaned) || (in_section && is_section_ingredient(&cleaned))
            }
            IngredientPass::FirstLines => length > 5 && length < 150 && is_ingredient(&cleaned),
        };

        if accepted {
            roles[position] = Some(ClassifiedLine {
                position,
                text: substitution::enrich(&cleaned, notes),
                role: LineRole::Ingredient,
            });
            found += 1;
        }
    }

    found
}

/// Classifies plain text into ingredient, instruction and description lists.
///
/// Ingredient and instruction lists are capped before the reconciliation pass
/// moves ingredient-shaped instructions over.
pub fn classify(text: &str, config: &ClassifierConfig) -> Classification {
    let classified = classify_lines(text);

    let ingredients: Vec<String> = texts(&classified, LineRole::Ingredient)
        .take(config.max_ingredients)
        .map(String::from)
        .collect();
    let instructions: Vec<String> = texts(&classified, LineRole::Instruction)
        .take(config.max_instructions)
        .map(String::from)
        .collect();
    let description = description::summarize(
        texts(&classified, LineRole::Description),
        config.description_max_len,
    );

    let (ingredients, instructions) = reconcile::reconcile(ingredients, instructions);

    debug!(
        "Classified {} lines: {} ingredients, {} instructions, description: {}",
        classified.len(),
        ingredients.len(),
        instructions.len(),
        description.is_some()
    );

    Classification {
        ingredients,
        instructions,
        description,
    }
}

fn texts(classified: &[ClassifiedLine], role: LineRole) -> impl Iterator<Item = &str> + '_ {
    classified
        .iter()
        .filter(move |line| line.role == role)
        .map(|line| line.text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Classification {
        classify(text, &ClassifierConfig::default())
    }

    #[test]
    fn test_simple_note() {
        let result = run("2 cups tomatoes\n1 tsp salt\nHeat the tomatoes until soft.");
        assert_eq!(result.ingredients, vec!["2 cups tomatoes", "1 tsp salt"]);
        assert_eq!(result.instructions, vec!["Heat the tomatoes until soft."]);
    }

    #[test]
    fn test_sections_relax_the_ingredient_test() {
        let text = "A hearty bowl for cold winter evenings.\n\
            Ingredients\n\
            fresh basil leaves\n\
            2 cups tomatoes\n\
            Parmesan rind\n\
            Instructions\n\
            1. Heat the tomatoes with the rind until soft.\n\
            2. Serve topped with the basil leaves.";
        let result = run(text);
        assert_eq!(
            result.ingredients,
            vec!["fresh basil leaves", "2 cups tomatoes", "Parmesan rind"]
        );
        assert_eq!(
            result.instructions,
            vec![
                "Heat the tomatoes with the rind until soft.",
                "Serve topped with the basil leaves."
            ]
        );
        assert_eq!(
            result.description.as_deref(),
            Some("A hearty bowl for cold winter evenings.")
        );
    }

    #[test]
    fn test_placeholders_keep_their_position() {
        let text = "1 lb pasta\nBoil the pasta until tender.\n[IMAGE_0]\nDrain and serve with the sauce.";
        let result = run(text);
        assert_eq!(
            result.instructions,
            vec![
                "Boil the pasta until tender.",
                "[IMAGE_0]",
                "Drain and serve with the sauce."
            ]
        );
    }

    #[test]
    fn test_noise_lines_are_ignored() {
        let text = "Serves 4\nPrep time: 10 minutes\nhttps://cooks.net/soup\n2 cups stock\nSimmer the stock for ten minutes, then serve.";
        let result = run(text);
        assert_eq!(result.ingredients, vec!["2 cups stock"]);
        assert_eq!(
            result.instructions,
            vec!["Simmer the stock for ten minutes, then serve."]
        );
    }

    #[test]
    fn test_substitution_notes_enrich_ingredients() {
        let text = "1 cup pecans\n2 tbsp butter\nYou can replace pecans with walnuts\nToast the pecans in the butter until fragrant.";
        let result = run(text);
        assert_eq!(
            result.ingredients,
            vec!["1 cup pecans (replace pecans with walnuts)", "2 tbsp butter"]
        );
        assert_eq!(
            result.instructions,
            vec!["Toast the pecans in the butter until fragrant."]
        );
    }

    #[test]
    fn test_no_ingredients_found() {
        let result = run("Grandma's secret.\nAsk her about it at the next dinner party please.");
        assert!(result.ingredients.is_empty());
    }

    #[test]
    fn test_relaxed_test_needs_a_section() {
        let text = "fresh basil leaves\nParmesan rind\nAsk grandma about this one at Sunday lunch.";
        assert!(run(text).ingredients.is_empty());

        assert_eq!(
            run("Ingredients\nfresh basil leaves\nParmesan rind").ingredients,
            vec!["fresh basil leaves", "Parmesan rind"]
        );
    }

    #[test]
    fn test_caps() {
        let text: String = (1..=40).map(|i| format!("{i} cups water\n")).collect();
        let config = ClassifierConfig {
            max_ingredients: 25,
            ..ClassifierConfig::default()
        };
        assert_eq!(classify(&text, &config).ingredients.len(), 25);
    }

    #[test]
    fn test_reclassifying_ingredients_yields_no_instructions() {
        let text = "Tomato soup for a cold evening at home.\n\
            Ingredients\n\
            fresh basil leaves\n\
            2 cups tomatoes\n\
            1 cup pecans\n\
            Salt and pepper to taste\n\
            Optional parsley, chives & dill to taste\n\
            You can replace pecans with walnuts, then toast them\n\
            Instructions\n\
            Heat the tomatoes until soft.\n\
            Optional additional seasoning to taste - I usually add garlic powder\n\
            Blend with basil and serve.";
        let first = run(text);
        assert!(!first.ingredients.is_empty());

        let second = run(&first.ingredients.join("\n"));
        assert!(
            second.instructions.is_empty(),
            "reclassified as instructions: {:?}",
            second.instructions
        );
    }
}
