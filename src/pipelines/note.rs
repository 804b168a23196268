use log::{debug, info, warn};

use crate::assemble::{assemble, NoteMeta, RecipeContent};
use crate::classify::classify;
use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::model::{NoteDocument, RecipeRecord};
use crate::note::markup::normalize;
use crate::source::{SourceInput, SourceResolver};
use crate::url_to_text::fetchers::{FetchedPage, PageFetcher};
use crate::url_to_text::html::extractors::humanize_duration;
use crate::url_to_text::html::{extract_structured_recipe, page_to_text};
use crate::url_to_text::validate::is_relevant;

const UNTITLED: &str = "Untitled Recipe";

/// Where the content of a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOrigin {
    /// Structured data embedded in the fetched page
    StructuredPage,
    /// Classified text of the fetched page
    PageText,
    /// Classified text of the note itself
    Note,
}

/// A note that produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNote {
    pub title: String,
    pub reason: String,
}

/// Outcome of converting a batch of notes
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<RecipeRecord>,
    pub skipped: Vec<SkippedNote>,
}

/// Convert one note into a recipe record
///
/// This pipeline:
/// 1. Normalizes the note markup into text and image placeholders
/// 2. Resolves the note's source URL, if any
/// 3. Fetches the source page when fetching is enabled
/// 4. Uses complete structured data from the page when present
/// 5. Otherwise classifies the page text, if it looks like this recipe
/// 6. Otherwise classifies the note's own text
///
/// # Arguments
/// * `note` - The note to convert
/// * `fetcher` - Retrieves the source page
/// * `config` - Run-wide settings
///
/// # Returns
/// * `Ok(RecipeRecord)` - The assembled record
/// * `Err(ImportError::MalformedNote)` - If the note has no title or body
pub async fn convert_note<F>(
    note: &NoteDocument,
    fetcher: &F,
    config: &ImportConfig,
) -> Result<RecipeRecord, ImportError>
where
    F: PageFetcher + ?Sized,
{
    convert_note_with_origin(note, fetcher, config)
        .await
        .map(|(record, _)| record)
}

/// Same as [`convert_note`], also reporting which content won
pub async fn convert_note_with_origin<F>(
    note: &NoteDocument,
    fetcher: &F,
    config: &ImportConfig,
) -> Result<(RecipeRecord, ContentOrigin), ImportError>
where
    F: PageFetcher + ?Sized,
{
    let title = note
        .title
        .as_deref()
        .ok_or_else(|| ImportError::MalformedNote("note has no title".to_string()))?;
    let body = note.body.as_deref().ok_or_else(|| {
        ImportError::MalformedNote(format!("note '{title}' has no content"))
    })?;
    let title = match title.trim() {
        "" => UNTITLED,
        trimmed => trimmed,
    };

    let normalized = normalize(body, &note.attachments);
    debug!(
        "Normalized '{}': {} chars, {} images",
        title,
        normalized.text.len(),
        normalized.images.len()
    );

    let source_url = SourceResolver::new().resolve(&SourceInput {
        title,
        markup: body,
        text: &normalized.text,
        metadata_url: note.source_url.as_deref(),
    });

    let page = match &source_url {
        Some(url) if config.fetch.enabled => fetcher.fetch_page(url).await,
        Some(url) => {
            debug!("Web fetching disabled, not fetching {}", url);
            None
        }
        None => None,
    };

    let mut meta = NoteMeta {
        title,
        created: note.created.as_deref(),
        source_url: source_url.as_deref(),
        note_text: &normalized.text,
        images: &normalized.images,
    };

    let (content, origin) = match page.and_then(|page| page_content(&page, title, config)) {
        Some((content, origin)) => {
            // Page content never refers to the note's images
            meta.images = &[];
            (content, origin)
        }
        None => (
            RecipeContent::Classified(classify(&normalized.text, &config.classifier)),
            ContentOrigin::Note,
        ),
    };

    info!("Converted '{}' from {:?}", title, origin);
    Ok((assemble(content, &meta, &config.output), origin))
}

/// Picks usable content from a fetched page, or nothing
fn page_content(
    page: &FetchedPage,
    title: &str,
    config: &ImportConfig,
) -> Option<(RecipeContent, ContentOrigin)> {
    if let Some(recipe) = extract_structured_recipe(&page.body, &page.url) {
        debug!(
            "Structured recipe '{}' on {}: {} ingredients, {} steps, total time {}",
            recipe.name,
            page.url,
            recipe.ingredients.len(),
            recipe.instructions.len(),
            recipe
                .total_time
                .as_deref()
                .map(humanize_duration)
                .unwrap_or_else(|| "unknown".to_string())
        );
        return Some((RecipeContent::Structured(recipe), ContentOrigin::StructuredPage));
    }

    let text = page_to_text(&page.body);
    if !is_relevant(&text, title, &page.url, &config.validator) {
        info!("Fetched page {} rejected, using note content", page.url);
        return None;
    }

    let classification = classify(&text, &config.classifier);
    if classification.ingredients.is_empty() {
        debug!("No ingredients in page text of {}, using note content", page.url);
        return None;
    }

    Some((RecipeContent::Classified(classification), ContentOrigin::PageText))
}

/// Convert a batch of notes, one after another
///
/// Notes that cannot be converted are logged and listed in the report; they
/// never stop the batch.
pub async fn convert_notes<F>(
    notes: &[NoteDocument],
    fetcher: &F,
    config: &ImportConfig,
) -> BatchReport
where
    F: PageFetcher + ?Sized,
{
    let mut report = BatchReport::default();

    for (index, note) in notes.iter().enumerate() {
        debug!("Processing note {}/{}", index + 1, notes.len());
        match convert_note(note, fetcher, config).await {
            Ok(record) => report.records.push(record),
            Err(e) => {
                let title = note
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("note #{}", index + 1));
                warn!("Skipping '{}': {}", title, e);
                report.skipped.push(SkippedNote {
                    title,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Converted {} notes, skipped {}",
        report.records.len(),
        report.skipped.len()
    );
    report
}
