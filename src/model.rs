use serde::Serialize;

/// A binary attachment embedded in a note
#[derive(Debug, Clone, Default)]
pub struct Attachment {
    /// Content hash as recorded by the exporter, if any
    pub hash: Option<String>,
    pub mime: String,
    pub data: Vec<u8>,
}

/// A note as read from an export. The pipeline only ever borrows it.
#[derive(Debug, Clone, Default)]
pub struct NoteDocument {
    pub title: Option<String>,
    /// Raw note markup
    pub body: Option<String>,
    /// Creation timestamp in the exporter's format (e.g. `20231201T123000Z`)
    pub created: Option<String>,
    pub attachments: Vec<Attachment>,
    /// Source URL recorded in the note's metadata
    pub source_url: Option<String>,
}

impl NoteDocument {
    /// Convenience constructor for a note without attachments or metadata
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }
}

/// One instruction step of a structured recipe
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredStep {
    pub text: String,
    pub image: Option<String>,
}

/// Recipe data recovered from schema.org structured data on a web page
#[derive(Debug, Clone, Default)]
pub struct StructuredRecipe {
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<StructuredStep>,
    pub image: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub total_time: Option<String>,
    pub recipe_yield: Option<String>,
    pub keywords: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub url: String,
}

impl StructuredRecipe {
    /// Minimal completeness gate: a name, ingredients and instructions
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && self.ingredients.iter().any(|i| !i.trim().is_empty())
            && self.instructions.iter().any(|s| !s.text.trim().is_empty())
    }
}

/// An instruction step in the output record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HowToStep {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl HowToStep {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "HowToStep",
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            kind: "HowToStep",
            text: text.into(),
            image: Some(image.into()),
        }
    }
}

/// Empty nutrition block kept for consumers that expect the key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nutrition {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub calories: Option<String>,
    #[serde(rename = "fatContent")]
    pub fat_content: Option<String>,
    #[serde(rename = "proteinContent")]
    pub protein_content: Option<String>,
    #[serde(rename = "carbohydrateContent")]
    pub carbohydrate_content: Option<String>,
}

impl Default for Nutrition {
    fn default() -> Self {
        Self {
            kind: "NutritionInformation",
            calories: None,
            fat_content: None,
            protein_content: None,
            carbohydrate_content: None,
        }
    }
}

/// The canonical output record, serialized as schema.org Recipe JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRecord {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "recipeYield")]
    pub recipe_yield: String,
    #[serde(rename = "prepTime")]
    pub prep_time: String,
    #[serde(rename = "cookTime")]
    pub cook_time: String,
    #[serde(rename = "totalTime")]
    pub total_time: String,
    #[serde(rename = "recipeCategory")]
    pub recipe_category: String,
    #[serde(rename = "recipeCuisine")]
    pub recipe_cuisine: String,
    pub keywords: String,
    #[serde(rename = "recipeIngredient")]
    pub recipe_ingredient: Vec<String>,
    #[serde(rename = "recipeInstructions")]
    pub recipe_instructions: Vec<HowToStep>,
    pub nutrition: Nutrition,
    pub tool: Vec<String>,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "dateModified")]
    pub date_modified: String,
    pub url: String,
    #[serde(rename = "orgURL")]
    pub org_url: String,
    /// Files the packaging step should write next to the record, in index order
    #[serde(skip)]
    pub images: Vec<ImageFile>,
}

impl RecipeRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// An image resolved from a note attachment, named for the output record
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub filename: String,
    pub mime: String,
    pub data: Vec<u8>,
}
