use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Run-wide import configuration.
///
/// The value is built once and passed by reference into every stage of the
/// pipeline; nothing mutates it after loading.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImportConfig {
    /// Fetch cascade settings
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Content validator settings
    #[serde(default)]
    pub validator: ValidatorConfig,
    /// Line classifier limits
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Defaults written into every record
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration for fetching a note's source page
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Whether source pages are fetched at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether profile pre-delays and retry back-off delays are honoured
    #[serde(default = "default_true")]
    pub politeness_delays: bool,
    /// Timeout of the DNS + TCP pre-flight probe in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// Domains that get lower body-length thresholds and retry back-off
    #[serde(default = "default_major_sites")]
    pub major_sites: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            politeness_delays: true,
            probe_timeout_secs: default_probe_timeout(),
            major_sites: default_major_sites(),
        }
    }
}

impl FetchConfig {
    /// Returns true when the URL belongs to one of the configured major recipe sites
    pub fn is_major_site(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.major_sites.iter().any(|site| url.contains(site.as_str()))
    }
}

/// Configuration for the fetched-content relevance check
#[derive(Debug, Deserialize, Clone)]
pub struct ValidatorConfig {
    /// Minimum net score for fetched content to be accepted
    #[serde(default = "default_accept_threshold")]
    pub accept_threshold: i32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            accept_threshold: default_accept_threshold(),
        }
    }
}

/// Output caps for the line classifier
#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default = "default_max_ingredients")]
    pub max_ingredients: usize,
    #[serde(default = "default_max_instructions")]
    pub max_instructions: usize,
    #[serde(default = "default_description_max_len")]
    pub description_max_len: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_ingredients: default_max_ingredients(),
            max_instructions: default_max_instructions(),
            description_max_len: default_description_max_len(),
        }
    }
}

/// Static strings written into records when the source has nothing better
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_keywords")]
    pub default_keywords: String,
    #[serde(default = "default_description")]
    pub default_description: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            default_keywords: default_keywords(),
            default_description: default_description(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_major_sites() -> Vec<String> {
    vec![
        "seriouseats.com".to_string(),
        "nytimes.com".to_string(),
        "foodnetwork.com".to_string(),
        "allrecipes.com".to_string(),
    ]
}

fn default_accept_threshold() -> i32 {
    2
}

fn default_max_ingredients() -> usize {
    25
}

fn default_max_instructions() -> usize {
    30
}

fn default_description_max_len() -> usize {
    500
}

fn default_category() -> String {
    "Imported".to_string()
}

fn default_keywords() -> String {
    "imported, evernote".to_string()
}

fn default_description() -> String {
    "Recipe imported from Evernote".to_string()
}

impl ImportConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_IMPORT__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_IMPORT__FETCH__ENABLED=false
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`ImportConfig::load`] for the source priority.
pub fn load_config() -> Result<ImportConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE_IMPORT__FETCH__ENABLED
        .add_source(
            Environment::with_prefix("RECIPE_IMPORT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ImportConfig::default();
        assert!(config.fetch.enabled);
        assert!(config.fetch.politeness_delays);
        assert_eq!(config.fetch.probe_timeout_secs, 5);
        assert_eq!(config.validator.accept_threshold, 2);
        assert_eq!(config.classifier.max_ingredients, 25);
        assert_eq!(config.classifier.max_instructions, 30);
        assert_eq!(config.output.default_category, "Imported");
    }

    #[test]
    fn test_major_site_matching() {
        let fetch = FetchConfig::default();
        assert!(fetch.is_major_site("https://www.SeriousEats.com/pasta"));
        assert!(!fetch.is_major_site("https://smallblog.net/pasta"));
    }

    #[test]
    fn test_load_config_without_file() {
        // Every field has a default, so an empty source set still deserializes
        let result = load_config();
        assert!(result.is_ok());
    }
}
