//! Builds the output [`RecipeRecord`] from whichever content won.

use chrono::{Local, NaiveDateTime};
use log::debug;

use crate::classify::Classification;
use crate::config::OutputConfig;
use crate::model::{HowToStep, ImageFile, Nutrition, RecipeRecord, StructuredRecipe};
use crate::note::markup::{parse_placeholder, NoteImage, Placeholder};

const DEFAULT_YIELD: &str = "4";
const DEFAULT_PREP_TIME: &str = "PT15M";
const DEFAULT_COOK_TIME: &str = "PT30M";
const DEFAULT_TOTAL_TIME: &str = "PT45M";

pub const FOLLOW_ORIGINAL: &str = "Follow the original recipe instructions from your Evernote note.";
const IMAGE_REFERENCE: &str = "[Image reference]";

const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The content a record is built from
#[derive(Debug, Clone)]
pub enum RecipeContent {
    /// Complete schema.org data from the source page
    Structured(StructuredRecipe),
    /// Classified lines from the note, or from a validated page
    Classified(Classification),
}

/// Note metadata merged into every record
#[derive(Debug, Clone, Copy)]
pub struct NoteMeta<'a> {
    pub title: &'a str,
    /// Creation timestamp as exported, e.g. `20231201T123000Z`
    pub created: Option<&'a str>,
    pub source_url: Option<&'a str>,
    /// Plain text of the note, used verbatim when no ingredients were found
    pub note_text: &'a str,
    /// Images the content's placeholders refer to
    pub images: &'a [NoteImage],
}

/// Normalizes an export timestamp, falling back to the current local time
pub fn format_timestamp(created: Option<&str>) -> String {
    created
        .and_then(|value| value.get(..15))
        .and_then(|value| NaiveDateTime::parse_from_str(value, EXPORT_TIMESTAMP_FORMAT).ok())
        .map(|dt| dt.format(RECORD_TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(now)
}

fn now() -> String {
    Local::now().format(RECORD_TIMESTAMP_FORMAT).to_string()
}

/// `full.<ext>` for the first image, `image_<i>.<ext>` for the rest
pub fn image_filename(index: usize, extension: &str) -> String {
    if index == 0 {
        format!("full.{extension}")
    } else {
        format!("image_{index}.{extension}")
    }
}

/// Turns instruction lines into steps, resolving placeholders to image files
pub fn to_steps(instructions: &[String], filenames: &[String]) -> Vec<HowToStep> {
    instructions
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| match parse_placeholder(line) {
            Some(Placeholder::Indexed(index)) => match filenames.get(index) {
                Some(file) => HowToStep::with_image(format!("See image: {file}"), file.as_str()),
                None => HowToStep::new(IMAGE_REFERENCE),
            },
            Some(Placeholder::Generic) => HowToStep::new(IMAGE_REFERENCE),
            None => HowToStep::new(line),
        })
        .collect()
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Merges winning content with note metadata into one record
pub fn assemble(content: RecipeContent, meta: &NoteMeta, config: &OutputConfig) -> RecipeRecord {
    let url = meta.source_url.unwrap_or_default().to_string();
    let mut record = RecipeRecord {
        context: "https://schema.org",
        kind: "Recipe",
        name: meta.title.to_string(),
        description: config.default_description.clone(),
        image: String::new(),
        recipe_yield: DEFAULT_YIELD.to_string(),
        prep_time: DEFAULT_PREP_TIME.to_string(),
        cook_time: DEFAULT_COOK_TIME.to_string(),
        total_time: DEFAULT_TOTAL_TIME.to_string(),
        recipe_category: config.default_category.clone(),
        recipe_cuisine: String::new(),
        keywords: config.default_keywords.clone(),
        recipe_ingredient: Vec::new(),
        recipe_instructions: Vec::new(),
        nutrition: Nutrition::default(),
        tool: Vec::new(),
        date_created: format_timestamp(meta.created),
        date_modified: now(),
        org_url: url.clone(),
        url,
        images: Vec::new(),
    };

    match content {
        RecipeContent::Structured(recipe) => {
            debug!("Assembling '{}' from structured data", meta.title);
            if record.name.trim().is_empty() {
                record.name = recipe.name.clone();
            }
            record.description = non_empty(recipe.description, &config.default_description);
            record.image = recipe.image.unwrap_or_default();
            record.recipe_yield = non_empty(recipe.recipe_yield, DEFAULT_YIELD);
            record.prep_time = non_empty(recipe.prep_time, DEFAULT_PREP_TIME);
            record.cook_time = non_empty(recipe.cook_time, DEFAULT_COOK_TIME);
            record.total_time = non_empty(recipe.total_time, DEFAULT_TOTAL_TIME);
            record.recipe_category = non_empty(recipe.category, &config.default_category);
            record.recipe_cuisine = recipe.cuisine.unwrap_or_default();
            record.keywords = non_empty(recipe.keywords, &config.default_keywords);
            record.recipe_ingredient = recipe.ingredients;
            record.recipe_instructions = recipe
                .instructions
                .into_iter()
                .map(|step| match step.image {
                    Some(image) => HowToStep::with_image(step.text, image),
                    None => HowToStep::new(step.text),
                })
                .collect();
            if record.url.is_empty() {
                record.url = recipe.url.clone();
                record.org_url = recipe.url;
            }
        }
        RecipeContent::Classified(classification) => {
            debug!("Assembling '{}' from classified lines", meta.title);
            let images: Vec<ImageFile> = meta
                .images
                .iter()
                .enumerate()
                .map(|(index, image)| ImageFile {
                    filename: image_filename(index, image.extension),
                    mime: image.mime.clone(),
                    data: image.data.clone(),
                })
                .collect();
            let filenames: Vec<String> = images.iter().map(|i| i.filename.clone()).collect();

            record.description = non_empty(classification.description, &config.default_description);
            record.image = filenames.first().cloned().unwrap_or_default();
            record.recipe_ingredient = classification
                .ingredients
                .into_iter()
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty())
                .collect();

            record.recipe_instructions = if record.recipe_ingredient.is_empty() {
                debug!("No ingredients for '{}', keeping the note text as one step", meta.title);
                let text = meta.note_text.trim();
                vec![HowToStep::new(if text.is_empty() { FOLLOW_ORIGINAL } else { text })]
            } else {
                let steps = to_steps(&classification.instructions, &filenames);
                if steps.is_empty() {
                    vec![HowToStep::new(FOLLOW_ORIGINAL)]
                } else {
                    steps
                }
            };
            record.images = images;
        }
    }

    record
}
