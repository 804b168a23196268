use async_trait::async_trait;
use recipe_note_import::url_to_text::fetchers::FetchedPage;
use recipe_note_import::{ImportConfig, ImportError, NoteDocument, NoteImporter, PageFetcher};

const SOUP: &str = "<en-note><div>2 cups tomatoes</div><div>1 tsp salt</div>\
    <div>Heat the tomatoes until soft.</div></en-note>";

struct JsonLdPage;

#[async_trait]
impl PageFetcher for JsonLdPage {
    async fn fetch_page(&self, url: &str) -> Option<FetchedPage> {
        let body = r#"<html><head><script type="application/ld+json">
            {"@type": "Recipe", "name": "Soup",
             "recipeIngredient": ["3 cups stock"],
             "recipeInstructions": "Simmer the stock."}
        </script></head><body></body></html>"#;
        Some(FetchedPage {
            url: url.to_string(),
            status: 200,
            body: body.to_string(),
        })
    }
}

#[tokio::test]
async fn test_builder_without_note() {
    let result = NoteImporter::builder()
        .config(ImportConfig::default())
        .build()
        .await;
    assert!(matches!(result, Err(ImportError::BuilderError(_))));
}

#[tokio::test]
async fn test_builder_offline() {
    let record = NoteImporter::builder()
        .note(NoteDocument::new("Tomato Soup", SOUP))
        .source_url("https://cooks.example.net/tomato-soup")
        .config(ImportConfig::default())
        .fetcher(JsonLdPage)
        .no_web_fetch()
        .build()
        .await
        .unwrap();

    assert_eq!(record.recipe_ingredient, vec!["2 cups tomatoes", "1 tsp salt"]);
    assert_eq!(record.url, "https://cooks.example.net/tomato-soup");
}

#[tokio::test]
async fn test_builder_with_fetcher() {
    let record = NoteImporter::builder()
        .note(NoteDocument::new("Tomato Soup", SOUP))
        .source_url("https://cooks.example.net/tomato-soup")
        .config(ImportConfig::default())
        .fetcher(JsonLdPage)
        .build()
        .await
        .unwrap();

    assert_eq!(record.name, "Tomato Soup");
    assert_eq!(record.recipe_ingredient, vec!["3 cups stock"]);
    assert_eq!(record.recipe_instructions[0].text, "Simmer the stock.");
}

#[tokio::test]
async fn test_builder_malformed_note() {
    let note = NoteDocument {
        title: Some("Empty".to_string()),
        ..Default::default()
    };
    let result = NoteImporter::builder()
        .note(note)
        .config(ImportConfig::default())
        .no_web_fetch()
        .build()
        .await;
    assert!(matches!(result, Err(ImportError::MalformedNote(_))));
}

/// Requires network access
#[tokio::test]
#[ignore]
async fn test_builder_real_site() {
    let _ = env_logger::try_init();
    let record = NoteImporter::builder()
        .note(NoteDocument::new("Classic Cottage Pie", "<en-note/>"))
        .source_url("https://www.bbcgoodfood.com/recipes/classic-cottage-pie")
        .build()
        .await
        .unwrap();
    assert!(!record.recipe_ingredient.is_empty());
}
