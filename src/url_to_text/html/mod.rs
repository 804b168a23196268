pub mod extractors;
pub mod text;

pub use extractors::extract_structured_recipe;
pub use text::{html_to_text, page_to_text};
