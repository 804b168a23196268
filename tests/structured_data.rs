use recipe_note_import::{convert_note, FetchCascade, ImportConfig, NoteDocument};

fn create_recipe_html(json_ld: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Recipe Page</title>
            <script type="application/ld+json">
                {json_ld}
            </script>
        </head>
        <body>
            <h1>Recipe</h1>
        </body>
        </html>
        "#
    )
}

fn config() -> ImportConfig {
    let mut config = ImportConfig::default();
    config.fetch.politeness_delays = false;
    config
}

fn note_for(url: &str, title: &str) -> NoteDocument {
    NoteDocument {
        source_url: Some(url.to_string()),
        ..NoteDocument::new(title, "<en-note><div>See link.</div></en-note>")
    }
}

#[tokio::test]
async fn test_lowercase_recipe_type() {
    let mut server = mockito::Server::new_async().await;
    let json_ld = r#"
    {
        "@context": "https://schema.org",
        "@type": "recipe",
        "name": "Easy Black Bean Soup",
        "image": "https://cdn.cooks.example.net/blackbean.jpg",
        "description": "This black bean soup recipe is easy to make and full of flavor.",
        "keywords": ["black bean soup", "vegetarian", "easy"],
        "prepTime": "PT10M",
        "cookTime": "PT30M",
        "totalTime": "PT40M",
        "recipeYield": "6",
        "recipeCategory": "Soup",
        "recipeCuisine": "Mexican",
        "recipeIngredient": [
            "2 cans black beans",
            "1 onion, diced",
            "2 cloves garlic, minced",
            "1 tsp cumin",
            "4 cups vegetable broth",
            "Salt and pepper to taste"
        ],
        "recipeInstructions": [
            "Sauté onion and garlic until soft.",
            "Add cumin and cook for 1 minute.",
            "Add beans and broth, simmer for 20 minutes.",
            "Season with salt and pepper."
        ]
    }
    "#;

    let _m = server
        .mock("GET", "/recipe")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(create_recipe_html(json_ld))
        .create_async()
        .await;

    let url = format!("{}/recipe", server.url());
    let config = config();
    let cascade = FetchCascade::new(&config.fetch);
    let record = convert_note(&note_for(&url, "Black Bean Soup"), &cascade, &config)
        .await
        .unwrap();

    assert_eq!(record.name, "Black Bean Soup");
    assert_eq!(record.recipe_ingredient.len(), 6);
    assert_eq!(record.recipe_instructions.len(), 4);
    assert_eq!(record.recipe_instructions[0].text, "Sauté onion and garlic until soft.");
    assert_eq!(record.keywords, "black bean soup, vegetarian, easy");
    assert_eq!(record.recipe_category, "Soup");
    assert_eq!(record.recipe_cuisine, "Mexican");
    assert_eq!(record.recipe_yield, "6");
    assert_eq!(record.prep_time, "PT10M");
    assert_eq!(record.url, url);
}

#[tokio::test]
async fn test_array_fields_and_empty_strings() {
    let mut server = mockito::Server::new_async().await;
    let json_ld = r#"
    {
        "@context": "https://schema.org",
        "@type": "Recipe",
        "author": {"@type": "Person", "name": "amateurprochef"},
        "cookTime": "PT30M",
        "description": "",
        "image": [
            "https://cdn.cooks.example.net/image1.jpg",
            "https://cdn.cooks.example.net/image2.jpg"
        ],
        "keywords": "",
        "name": "Shahi Paneer",
        "prepTime": "",
        "recipeCategory": ["All", "All Things Indian"],
        "recipeCuisine": [],
        "recipeIngredient": ["300g paneer", "4 roma tomatoes", "2 red onion"],
        "recipeInstructions": [
            {"@type": "HowToStep", "text": "Chop the vegetables."},
            {"@type": "HowToStep", "text": "Simmer with the paneer."}
        ]
    }
    "#;

    let _m = server
        .mock("GET", "/paneer")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(create_recipe_html(json_ld))
        .create_async()
        .await;

    let url = format!("{}/paneer", server.url());
    let config = config();
    let cascade = FetchCascade::new(&config.fetch);
    let record = convert_note(&note_for(&url, "Shahi Paneer"), &cascade, &config)
        .await
        .unwrap();

    assert_eq!(record.image, "https://cdn.cooks.example.net/image1.jpg");
    assert_eq!(record.recipe_category, "All, All Things Indian");
    assert_eq!(record.recipe_cuisine, "");
    // Empty strings fall back to the record defaults
    assert_eq!(record.description, "Recipe imported from Evernote");
    assert_eq!(record.keywords, "imported, evernote");
    assert_eq!(record.prep_time, "PT15M");
    assert_eq!(record.cook_time, "PT30M");
    assert_eq!(record.recipe_ingredient.len(), 3);
}

#[tokio::test]
async fn test_incomplete_structured_data_falls_back_to_note() {
    let mut server = mockito::Server::new_async().await;
    let json_ld = r#"
    {
        "@type": "Recipe",
        "name": "Mystery Cake",
        "recipeIngredient": ["2 cups flour"],
        "recipeInstructions": []
    }
    "#;

    let _m = server
        .mock("GET", "/cake")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(create_recipe_html(json_ld))
        .create_async()
        .await;

    let url = format!("{}/cake", server.url());
    let config = config();
    let cascade = FetchCascade::new(&config.fetch);
    let note = NoteDocument {
        source_url: Some(url),
        ..NoteDocument::new(
            "Mystery Cake",
            "<en-note><div>1 cup sugar</div><div>Bake the cake until golden brown.</div></en-note>",
        )
    };
    let record = convert_note(&note, &cascade, &config).await.unwrap();

    assert_eq!(record.recipe_ingredient, vec!["1 cup sugar"]);
    assert_eq!(
        record.recipe_instructions[0].text,
        "Bake the cake until golden brown."
    );
}

#[tokio::test]
async fn test_unreachable_source_falls_back_to_note() {
    let config = config();
    let cascade = FetchCascade::new(&config.fetch);
    let note = NoteDocument {
        source_url: Some("http://127.0.0.1:1/recipe".to_string()),
        ..NoteDocument::new(
            "Rice",
            "<en-note><div>2 cups rice</div><div>Simmer the rice until tender.</div></en-note>",
        )
    };
    let record = convert_note(&note, &cascade, &config).await.unwrap();

    assert_eq!(record.recipe_ingredient, vec!["2 cups rice"]);
}
