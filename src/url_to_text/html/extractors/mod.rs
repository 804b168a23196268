use log::debug;
use scraper::Html;

use crate::model::StructuredRecipe;

mod json_ld;

pub use json_ld::{humanize_duration, JsonLdExtractor};

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

pub trait Extractor {
    /// Returns a recipe only when it passes [`StructuredRecipe::is_complete`]
    fn parse(&self, context: &ParsingContext) -> Option<StructuredRecipe>;
}

/// Runs the structured-data extractors over a fetched page, first hit wins
pub fn extract_structured_recipe(html: &str, url: &str) -> Option<StructuredRecipe> {
    let context = ParsingContext {
        url: url.to_string(),
        document: Html::parse_document(html),
    };

    let extractors: [&dyn Extractor; 1] = [&JsonLdExtractor];
    let recipe = extractors
        .iter()
        .find_map(|extractor| extractor.parse(&context));

    if recipe.is_none() {
        debug!("No complete structured recipe on {}", url);
    }
    recipe
}
