use std::fs;
use std::path::PathBuf;

use recipe_note_import::note::read_notes;
use recipe_note_import::{import_export, ImportConfig};

const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE en-export SYSTEM "http://xml.evernote.com/pub/evernote-export3.dtd">
<en-export export-date="20240101T000000Z" application="Evernote" version="10">
  <note>
    <title>Banana Bread</title>
    <created>20230315T094500Z</created>
    <content><![CDATA[<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE en-note SYSTEM "http://xml.evernote.com/pub/enml2.dtd">
<en-note>
<div>Moist loaf that uses up the brown bananas on the counter.</div>
<div><b>Ingredients</b></div>
<ul>
<li>3 ripe bananas</li>
<li>2 cups flour</li>
<li>1 tsp baking soda</li>
<li>Pinch of salt</li>
</ul>
<div>Directions</div>
<div>1. Preheat the oven to 350F and grease the loaf pan.</div>
<div>2. Mash the bananas and mix with the flour and soda.</div>
<en-media type="image/png" hash="5d41402abc4b2a76b9719d911017c592"/>
<div>3. Bake until a skewer comes out clean, then cool.</div>
</en-note>]]></content>
    <resource>
      <data encoding="base64">aGVsbG8=</data>
      <mime>image/png</mime>
    </resource>
  </note>
  <note>
    <created>20230316T100000Z</created>
    <content><![CDATA[<en-note><div>1 cup rice</div></en-note>]]></content>
  </note>
</en-export>"#;

fn offline() -> ImportConfig {
    let mut config = ImportConfig::default();
    config.fetch.enabled = false;
    config
}

fn write_export(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("recipe-note-import-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("recipes.enex"), EXPORT).unwrap();
    fs::write(dir.join("notes.txt"), "not an export").unwrap();
    dir
}

#[test]
fn test_attachment_hash_resolves_to_bytes() {
    let notes = read_notes(EXPORT).unwrap();
    let normalized = recipe_note_import::note::normalize(
        notes[0].body.as_deref().unwrap(),
        &notes[0].attachments,
    );

    assert!(normalized.text.contains("[IMAGE_0]"));
    assert_eq!(normalized.images.len(), 1);
    assert_eq!(normalized.images[0].data, b"hello");
}

#[tokio::test]
async fn test_import_export_file() {
    let dir = write_export("file");
    let report = import_export(&dir.join("recipes.enex"), &offline())
        .await
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].reason.contains("no title"));

    let record = &report.records[0];
    assert_eq!(record.name, "Banana Bread");
    assert_eq!(record.date_created, "2023-03-15T09:45:00");
    assert_eq!(
        record.recipe_ingredient,
        vec!["3 ripe bananas", "2 cups flour", "1 tsp baking soda", "Pinch of salt"]
    );
    assert_eq!(
        record.description,
        "Moist loaf that uses up the brown bananas on the counter."
    );
    assert_eq!(record.image, "full.png");
    assert_eq!(record.images[0].data, b"hello");

    let texts: Vec<_> = record
        .recipe_instructions
        .iter()
        .map(|step| step.text.as_str())
        .collect();
    assert_eq!(
        texts,
        vec![
            "Preheat the oven to 350F and grease the loaf pan.",
            "Mash the bananas and mix with the flour and soda.",
            "See image: full.png",
            "Bake until a skewer comes out clean, then cool.",
        ]
    );

    let json = record.to_json().unwrap();
    assert!(json.contains("\"@type\": \"Recipe\""));
    assert!(json.contains("\"recipeIngredient\""));

    fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_import_export_directory() {
    let dir = write_export("dir");
    let report = import_export(&dir, &offline()).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].name, "Banana Bread");

    fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_corrupt_attachment_keeps_the_batch() {
    let export = r#"<en-export>
  <note><title>Soup</title><content><![CDATA[<en-note><div>2 cups stock</div><div>Simmer the stock gently.</div></en-note>]]></content></note>
  <note>
    <title>Bread</title>
    <content><![CDATA[<en-note><div>3 cups flour</div><div>Knead the dough until smooth.</div></en-note>]]></content>
    <resource><data>!!!corrupt!!!</data><mime>image/png</mime></resource>
  </note>
  <note><title>Stew</title><content><![CDATA[<en-note><div>1 lb beef</div><div>Brown the beef in batches.</div></en-note>]]></content></note>
</en-export>"#;
    let dir = std::env::temp_dir().join(format!("recipe-note-import-corrupt-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("recipes.enex");
    fs::write(&path, export).unwrap();

    let report = import_export(&path, &offline()).await.unwrap();

    let names: Vec<_> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Soup", "Bread", "Stew"]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.records[1].recipe_ingredient, vec!["3 cups flour"]);
    assert!(report.records[1].images.is_empty());

    fs::remove_dir_all(dir).ok();
}
