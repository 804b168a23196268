//! Turns notes exported from a note-taking app into schema.org Recipe records.
//!
//! Each note is normalized to plain text, its source URL is resolved and
//! fetched when possible, and the record is built from the best content
//! available: structured data on the source page, the page's text when it
//! looks like the same recipe, or the note's own lines.

pub mod assemble;
pub mod builder;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod note;
pub mod pipelines;
pub mod source;
pub mod url_to_text;

use std::path::Path;

use log::info;

// Re-export commonly used types
pub use builder::{NoteImporter, NoteImporterBuilder};
pub use config::{load_config, ImportConfig};
pub use error::ImportError;
pub use model::{Attachment, HowToStep, ImageFile, NoteDocument, RecipeRecord};
pub use pipelines::{convert_note, convert_notes, BatchReport, SkippedNote};
pub use url_to_text::fetchers::{FetchCascade, PageFetcher};

/// Convert every note of an export file, or of every `.enex` file in a directory
///
/// # Arguments
/// * `path` - An `.enex` file or a directory containing them
/// * `config` - Run-wide settings
///
/// # Returns
/// * `Ok(BatchReport)` - Records for the notes that converted, and the skipped ones
/// * `Err(ImportError)` - If the export could not be read
pub async fn import_export(path: &Path, config: &ImportConfig) -> Result<BatchReport, ImportError> {
    let notes = if path.is_dir() {
        note::read_notes_from_dir(path)?
    } else {
        note::read_notes_from_path(path)?
    };
    info!("Read {} notes from {}", notes.len(), path.display());

    let fetcher = FetchCascade::new(&config.fetch);
    Ok(convert_notes(&notes, &fetcher, config).await)
}
