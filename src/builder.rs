use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::model::{NoteDocument, RecipeRecord};
use crate::pipelines::convert_note;
use crate::url_to_text::fetchers::{FetchCascade, PageFetcher};

/// Builder for configuring and executing a single note import
#[derive(Default)]
pub struct NoteImporterBuilder {
    note: Option<NoteDocument>,
    source_url: Option<String>,
    config: Option<ImportConfig>,
    no_web_fetch: bool,
    fetcher: Option<Box<dyn PageFetcher>>,
}

impl NoteImporterBuilder {
    /// Set the note to import
    ///
    /// # Example
    /// ```
    /// use recipe_note_import::{NoteDocument, NoteImporter};
    ///
    /// let builder = NoteImporter::builder()
    ///     .note(NoteDocument::new("Tomato Soup", "<en-note><div>2 cups tomatoes</div></en-note>"));
    /// ```
    pub fn note(mut self, note: NoteDocument) -> Self {
        self.note = Some(note);
        self
    }

    /// Set the source URL, replacing whatever the note's metadata says
    ///
    /// # Example
    /// ```
    /// use recipe_note_import::{NoteDocument, NoteImporter};
    ///
    /// let builder = NoteImporter::builder()
    ///     .note(NoteDocument::new("Tomato Soup", "<en-note/>"))
    ///     .source_url("https://cooks.example.com/tomato-soup");
    /// ```
    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Use a specific configuration instead of loading one
    ///
    /// Without this, `build` loads `config.toml` and `RECIPE_IMPORT__*`
    /// environment variables.
    pub fn config(mut self, config: ImportConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Never fetch the source page; only the note's own content is used
    ///
    /// # Example
    /// ```
    /// use recipe_note_import::{NoteDocument, NoteImporter};
    ///
    /// let builder = NoteImporter::builder()
    ///     .note(NoteDocument::new("Tomato Soup", "<en-note/>"))
    ///     .no_web_fetch();
    /// ```
    pub fn no_web_fetch(mut self) -> Self {
        self.no_web_fetch = true;
        self
    }

    /// Replace the network fetch cascade, e.g. with a cache or a stub
    pub fn fetcher(mut self, fetcher: impl PageFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Build and execute the note import
    ///
    /// # Returns
    /// The assembled `RecipeRecord`
    ///
    /// # Errors
    /// Returns `ImportError` if:
    /// - No note was specified
    /// - The note has no title or body
    /// - The configuration could not be loaded
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_note_import::{NoteDocument, NoteImporter};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let record = NoteImporter::builder()
    ///     .note(NoteDocument::new("Tomato Soup", "<en-note><div>2 cups tomatoes</div></en-note>"))
    ///     .no_web_fetch()
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<RecipeRecord, ImportError> {
        let mut note = self.note.ok_or_else(|| {
            ImportError::BuilderError("No note specified. Use .note()".to_string())
        })?;
        if let Some(url) = self.source_url {
            note.source_url = Some(url);
        }

        let mut config = match self.config {
            Some(config) => config,
            None => ImportConfig::load()?,
        };
        if self.no_web_fetch {
            config.fetch.enabled = false;
        }

        match self.fetcher {
            Some(fetcher) => convert_note(&note, fetcher.as_ref(), &config).await,
            None => {
                let cascade = FetchCascade::new(&config.fetch);
                convert_note(&note, &cascade, &config).await
            }
        }
    }
}

/// Main entry point for the builder API
pub struct NoteImporter;

impl NoteImporter {
    /// Creates a new builder for importing a note
    ///
    /// # Example
    /// ```
    /// use recipe_note_import::NoteImporter;
    ///
    /// let builder = NoteImporter::builder();
    /// ```
    pub fn builder() -> NoteImporterBuilder {
        NoteImporterBuilder::default()
    }
}
