pub mod enex;
pub mod markup;

pub use enex::{read_notes, read_notes_from_dir, read_notes_from_path};
pub use markup::{normalize, NormalizedNote, NoteImage, Placeholder};
