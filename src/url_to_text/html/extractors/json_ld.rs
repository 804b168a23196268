use std::sync::LazyLock;

use html_escape::decode_html_entities;
use log::debug;
use regex::Regex;
use scraper::Selector;
use serde::Deserialize;
use serde_json::Value;

use super::{Extractor, ParsingContext};
use crate::model::{StructuredRecipe, StructuredStep};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("spaces regex"));

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("trailing comma regex"));

static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)H").expect("hours regex"));

static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)M").expect("minutes regex"));

/// Reads schema.org Recipe objects out of `application/ld+json` script blocks
pub struct JsonLdExtractor;

impl JsonLdExtractor {
    fn convert_to_recipe(&self, recipe: JsonLdRecipe, url: &str) -> StructuredRecipe {
        let ingredients = match recipe.recipe_ingredient {
            Some(RecipeIngredients::Single(line)) => vec![line],
            Some(RecipeIngredients::Multiple(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    IngredientItem::Text(text) => Some(text),
                    IngredientItem::Object(obj) => {
                        let name = obj.text.or(obj.name)?;
                        match obj.amount {
                            Some(amount) if !amount.trim().is_empty() => {
                                Some(format!("{} {}", amount.trim(), name))
                            }
                            _ => Some(name),
                        }
                    }
                    IngredientItem::Other(_) => None,
                })
                .collect(),
            None => Vec::new(),
        }
        .iter()
        .map(|line| clean_text(line))
        .filter(|line| !line.is_empty())
        .collect();

        let mut instructions = Vec::new();
        match recipe.recipe_instructions {
            Some(RecipeInstructions::Text(text)) => {
                // A single block of text: one step per line
                let text = decode_html_symbols(&text).replace("<br>", "\n");
                for line in text.lines() {
                    push_step(&mut instructions, line, None);
                }
            }
            Some(RecipeInstructions::Items(items)) => collect_steps(items, &mut instructions),
            None => {}
        }

        let description = recipe
            .description
            .and_then(|desc| match desc {
                DescriptionType::String(d) => Some(d),
                DescriptionType::Object(d) => d.text,
            })
            .map(|d| clean_text(&d))
            .filter(|d| !d.is_empty());

        let times = [&recipe.prep_time, &recipe.cook_time, &recipe.total_time];
        debug!(
            "JsonLdExtractor: times prep={} cook={} total={}",
            times[0].as_deref().map(humanize_duration).unwrap_or_default(),
            times[1].as_deref().map(humanize_duration).unwrap_or_default(),
            times[2].as_deref().map(humanize_duration).unwrap_or_default(),
        );

        StructuredRecipe {
            name: clean_text(&recipe.name.unwrap_or_default()),
            description,
            ingredients,
            instructions,
            image: recipe.image.and_then(first_image),
            prep_time: non_empty(recipe.prep_time),
            cook_time: non_empty(recipe.cook_time),
            total_time: non_empty(recipe.total_time),
            recipe_yield: recipe.recipe_yield.and_then(|y| match y {
                RecipeYield::String(s) => non_empty(Some(clean_text(&s))),
                RecipeYield::Number(n) => Some(n.to_string()),
                RecipeYield::Array(values) => values
                    .iter()
                    .find(|v| v.contains(char::is_alphabetic))
                    .or_else(|| values.first())
                    .map(|v| clean_text(v)),
                RecipeYield::Other(_) => None,
            }),
            keywords: recipe.keywords.and_then(StringOrList::joined),
            category: recipe.recipe_category.and_then(StringOrList::joined),
            cuisine: recipe.recipe_cuisine.and_then(StringOrList::joined),
            url: url.to_string(),
        }
    }
}

fn collect_steps(items: Vec<InstructionItem>, steps: &mut Vec<StructuredStep>) {
    for item in items {
        match item {
            InstructionItem::Text(text) => push_step(steps, &text, None),
            InstructionItem::Typed(HowTo::HowToStep(step)) => {
                let text = step.text.or(step.name).unwrap_or_default();
                push_step(steps, &text, step.image.and_then(first_image));
            }
            InstructionItem::Typed(HowTo::HowToSection(section)) => {
                collect_steps(section.item_list_element, steps)
            }
            InstructionItem::Nested(items) => collect_steps(items, steps),
            InstructionItem::Other(value) => {
                // Untyped step objects still carry their text
                if let Some(text) = value.get("text").and_then(Value::as_str) {
                    push_step(steps, text, None);
                }
            }
        }
    }
}

fn push_step(steps: &mut Vec<StructuredStep>, text: &str, image: Option<String>) {
    let text = clean_text(text);
    if !text.is_empty() {
        steps.push(StructuredStep { text, image });
    }
}

fn first_image(image: ImageType) -> Option<String> {
    let url = match image {
        ImageType::String(url) => Some(url),
        ImageType::Object(obj) => obj.url,
        ImageType::Multiple(images) => images.into_iter().find_map(first_image),
        ImageType::Other(_) => None,
    }?;
    let url = decode_html_symbols(&url).trim().to_string();
    (!url.is_empty()).then_some(url)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct JsonLdRecipe {
    name: Option<String>,
    description: Option<DescriptionType>,
    image: Option<ImageType>,
    #[serde(rename = "recipeIngredient")]
    recipe_ingredient: Option<RecipeIngredients>,
    #[serde(rename = "recipeInstructions")]
    recipe_instructions: Option<RecipeInstructions>,
    #[serde(rename = "recipeYield")]
    recipe_yield: Option<RecipeYield>,
    #[serde(rename = "prepTime")]
    prep_time: Option<String>,
    #[serde(rename = "cookTime")]
    cook_time: Option<String>,
    #[serde(rename = "totalTime")]
    total_time: Option<String>,
    #[serde(rename = "recipeCategory")]
    recipe_category: Option<StringOrList>,
    #[serde(rename = "recipeCuisine")]
    recipe_cuisine: Option<StringOrList>,
    keywords: Option<StringOrList>,
}

#[derive(Debug, Deserialize)]
struct TextObject {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionType {
    String(String),
    Object(TextObject),
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageType {
    String(String),
    Object(ImageObject),
    Multiple(Vec<ImageType>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    Single(String),
    Multiple(Vec<IngredientItem>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngredientItem {
    Text(String),
    Object(IngredientObject),
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    text: Option<String>,
    name: Option<String>,
    amount: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeInstructions {
    Text(String),
    Items(Vec<InstructionItem>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructionItem {
    Text(String),
    Typed(HowTo),
    Nested(Vec<InstructionItem>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "@type")]
enum HowTo {
    HowToStep(HowToStep),
    HowToSection(HowToSection),
}

#[derive(Debug, Deserialize)]
struct HowToStep {
    text: Option<String>,
    name: Option<String>,
    image: Option<ImageType>,
}

#[derive(Debug, Deserialize)]
struct HowToSection {
    #[serde(rename = "itemListElement", default)]
    item_list_element: Vec<InstructionItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    String(String),
    Number(f64),
    Array(Vec<String>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    Multiple(Vec<String>),
    Other(Value),
}

impl StringOrList {
    fn joined(self) -> Option<String> {
        let joined = match self {
            StringOrList::String(s) => clean_text(&s),
            StringOrList::Multiple(v) => v
                .iter()
                .map(|s| clean_text(s))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            StringOrList::Other(_) => String::new(),
        };
        (!joined.is_empty()).then_some(joined)
    }
}

fn decode_html_symbols(text: &str) -> String {
    // Some sites double-encode their entities
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

/// Decodes entities, strips HTML tags and collapses whitespace
fn clean_text(text: &str) -> String {
    let decoded = decode_html_symbols(text);
    let stripped = TAG_RE.replace_all(&decoded, " ");
    SPACES_RE.replace_all(&stripped, " ").trim().to_string()
}

/// ISO 8601 duration as a short human string, e.g. `PT1H30M` -> `1h 30m`
pub fn humanize_duration(duration: &str) -> String {
    let Some(rest) = duration.strip_prefix("PT") else {
        return duration.to_string();
    };

    let mut parts = Vec::new();
    if let Some(hours) = HOURS_RE.captures(rest) {
        parts.push(format!("{}h", &hours[1]));
    }
    if let Some(minutes) = MINUTES_RE.captures(rest) {
        parts.push(format!("{}m", &minutes[1]));
    }

    if parts.is_empty() {
        rest.to_string()
    } else {
        parts.join(" ")
    }
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| kind.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Finds the first Recipe object in a block: the root, an array item, or an
/// entry of a `@graph` list.
fn find_recipe(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe),
        Value::Object(_) if is_recipe_type(value) => Some(value),
        Value::Object(_) => match value.get("@graph") {
            Some(Value::Array(graph)) => graph.iter().find_map(|item| match item {
                Value::Array(_) => find_recipe(item),
                _ if is_recipe_type(item) => Some(item),
                _ => None,
            }),
            Some(graph @ Value::Object(_)) if is_recipe_type(graph) => Some(graph),
            _ => None,
        },
        _ => None,
    }
}

/// Removes `//` and `/* */` comments that sit outside JSON strings
fn strip_comments(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Parses a script block, with one trailing-comma repair attempt
fn parse_block(raw: &str, index: usize) -> Option<Value> {
    let cleaned = strip_comments(raw);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("JsonLdExtractor: Failed to parse JSON-LD {}: {}", index, e);
            let repaired = TRAILING_COMMA_RE.replace_all(&cleaned, "$1");
            match serde_json::from_str::<Value>(&repaired) {
                Ok(value) => {
                    debug!("JsonLdExtractor: Repaired JSON-LD {}", index);
                    Some(value)
                }
                Err(e) => {
                    debug!("JsonLdExtractor: Repair failed for JSON-LD {}: {}", index, e);
                    None
                }
            }
        }
    }
}

impl Extractor for JsonLdExtractor {
    fn parse(&self, context: &ParsingContext) -> Option<StructuredRecipe> {
        debug!("JsonLdExtractor: Starting parse for URL: {}", context.url);
        let selector = Selector::parse("script[type='application/ld+json']").ok()?;
        let scripts: Vec<_> = context.document.select(&selector).collect();
        debug!(
            "JsonLdExtractor: Found {} JSON-LD script tags",
            scripts.len()
        );

        for (index, script) in scripts.iter().enumerate() {
            let raw_json: String = script.text().collect();
            let Some(json_ld) = parse_block(&raw_json, index) else {
                continue;
            };

            let Some(recipe_json) = find_recipe(&json_ld) else {
                debug!("JsonLdExtractor: No recipe found in JSON-LD {}", index);
                continue;
            };

            match serde_json::from_value::<JsonLdRecipe>(recipe_json.clone()) {
                Ok(recipe) => {
                    let recipe = self.convert_to_recipe(recipe, &context.url);
                    if recipe.is_complete() {
                        debug!(
                            "JsonLdExtractor: Accepted '{}' ({} ingredients, {} steps)",
                            recipe.name,
                            recipe.ingredients.len(),
                            recipe.instructions.len()
                        );
                        return Some(recipe);
                    }
                    debug!(
                        "JsonLdExtractor: Recipe in JSON-LD {} is incomplete, skipping",
                        index
                    );
                }
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to convert JSON-LD {}: {}", index, e);
                }
            }
        }

        None
    }
}
