pub mod fetchers;
pub mod html;
pub mod validate;
