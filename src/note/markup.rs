//! Note markup to plain text.
//!
//! Embedded media references are replaced with positional placeholder lines
//! (`[IMAGE_<n>]`) so later stages can keep pictures interleaved with the
//! instruction steps they illustrate.

use std::collections::HashMap;
use std::sync::LazyLock;

use html_escape::decode_html_entities;
use log::debug;
use md5::{Digest, Md5};
use regex::{Captures, Regex};

use crate::model::Attachment;

/// Placeholder emitted for a media reference that could not be resolved
pub const GENERIC_PLACEHOLDER: &str = "[IMAGE]";

static WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\?xml[^>]*\?>|<!DOCTYPE[^>]*>|<en-note[^>]*>|</en-note\s*>")
        .expect("wrapper regex")
});

static MEDIA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<en-media\b([^>]*?)/?>").expect("media regex"));

static MEDIA_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</en-media\s*>").expect("media close regex"));

static HASH_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhash\s*=\s*["']([^"']*)["']"#).expect("hash attribute regex")
});

static TODO_CHECKED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<en-todo\b[^>]*checked\s*=\s*["']true["'][^>]*>"#)
        .expect("checked todo regex")
});

static TODO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<en-todo\b[^>]*>").expect("todo regex"));

static TODO_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</en-todo\s*>").expect("todo close regex"));

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<br\b[^>]*>|</?(?:div|p|li|ul|ol|h[1-6]|tr|table|blockquote|pre|section|article|hr)\b[^>]*>",
    )
    .expect("block regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex"));

static SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("spaces regex"));

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[IMAGE(?:_(\d+))?\]$").expect("placeholder regex"));

/// An image attachment referenced by the note, in placeholder index order
#[derive(Debug, Clone, PartialEq)]
pub struct NoteImage {
    pub hash: String,
    pub mime: String,
    pub extension: &'static str,
    pub data: Vec<u8>,
}

/// Plain text of a note plus the images its placeholders point to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedNote {
    pub text: String,
    pub images: Vec<NoteImage>,
}

/// A placeholder line recognised in plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Indexed(usize),
    Generic,
}

/// Builds the placeholder token for an image index
pub fn placeholder(index: usize) -> String {
    format!("[IMAGE_{index}]")
}

/// Recognises a whole line as a placeholder token
pub fn parse_placeholder(line: &str) -> Option<Placeholder> {
    let caps = PLACEHOLDER_RE.captures(line.trim())?;
    match caps.get(1) {
        Some(index) => index.as_str().parse().ok().map(Placeholder::Indexed),
        None => Some(Placeholder::Generic),
    }
}

pub fn is_placeholder(line: &str) -> bool {
    parse_placeholder(line).is_some()
}

/// Content hash of an attachment: the recorded one, or the md5 of its payload
pub fn content_hash(attachment: &Attachment) -> String {
    match &attachment.hash {
        Some(hash) if !hash.trim().is_empty() => hash.trim().to_lowercase(),
        _ => format!("{:x}", Md5::digest(&attachment.data)),
    }
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "jpg",
    }
}

/// Converts note markup into plain text with image placeholders.
///
/// Images are numbered in order of first reference in the markup; image
/// attachments the markup never references are appended afterwards so the
/// record can still use them. Never fails: malformed input degrades to
/// whatever text survives tag stripping.
pub fn normalize(markup: &str, attachments: &[Attachment]) -> NormalizedNote {
    if markup.trim().is_empty() {
        return NormalizedNote::default();
    }

    let mut by_hash: HashMap<String, &Attachment> = HashMap::new();
    for attachment in attachments.iter().filter(|a| is_image(a)) {
        by_hash.entry(content_hash(attachment)).or_insert(attachment);
    }

    let mut images: Vec<NoteImage> = Vec::new();
    let mut assigned: HashMap<String, usize> = HashMap::new();

    let content = WRAPPER_RE.replace_all(markup, "");
    let content = MEDIA_RE.replace_all(&content, |caps: &Captures| {
        let hash = HASH_ATTR_RE
            .captures(&caps[1])
            .map(|h| h[1].trim().to_lowercase());

        let Some(hash) = hash else {
            debug!("Media reference without hash attribute");
            return format!("\n{GENERIC_PLACEHOLDER}\n");
        };

        if let Some(index) = assigned.get(&hash) {
            return format!("\n{}\n", placeholder(*index));
        }

        match by_hash.get(&hash) {
            Some(attachment) => {
                let index = images.len();
                images.push(to_note_image(&hash, attachment));
                assigned.insert(hash, index);
                debug!("Media reference resolved to image {}", index);
                format!("\n{}\n", placeholder(index))
            }
            None => {
                debug!("Media hash {} has no matching attachment", hash);
                format!("\n{GENERIC_PLACEHOLDER}\n")
            }
        }
    });
    let content = MEDIA_CLOSE_RE.replace_all(&content, "");

    let content = TODO_CHECKED_RE.replace_all(&content, "✓ ");
    let content = TODO_RE.replace_all(&content, "☐ ");
    let content = TODO_CLOSE_RE.replace_all(&content, "");

    let content = BLOCK_RE.replace_all(&content, "\n");
    let content = TAG_RE.replace_all(&content, "");
    let content = decode_html_entities(&content);

    let text = collapse_whitespace(&content);

    for attachment in attachments.iter().filter(|a| is_image(a)) {
        let hash = content_hash(attachment);
        if !assigned.contains_key(&hash) {
            assigned.insert(hash.clone(), images.len());
            images.push(to_note_image(&hash, attachment));
        }
    }

    NormalizedNote { text, images }
}

fn is_image(attachment: &Attachment) -> bool {
    attachment.mime.to_lowercase().starts_with("image/")
}

fn to_note_image(hash: &str, attachment: &Attachment) -> NoteImage {
    NoteImage {
        hash: hash.to_string(),
        mime: attachment.mime.clone(),
        extension: extension_for_mime(&attachment.mime),
        data: attachment.data.clone(),
    }
}

/// Collapses runs of spaces, trims every line and drops blank lines
pub fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| SPACES_RE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
