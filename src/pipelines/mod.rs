pub mod note;

pub use note::{
    convert_note, convert_note_with_origin, convert_notes, BatchReport, ContentOrigin, SkippedNote,
};
