//! Streaming reader for Evernote `.enex` exports.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ImportError;
use crate::model::{Attachment, NoteDocument};

/// Parses every `<note>` in an export.
///
/// Notes missing a `title` or `content` element are still returned with
/// `None` in that field; deciding what to do with them is the pipeline's job.
pub fn read_notes(xml: &str) -> Result<Vec<NoteDocument>, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut notes = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut text = String::new();
    let mut note: Option<NoteDocument> = None;
    let mut resource: Option<ResourceBuilder> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                open_element(&name, &e, &mut note, &mut resource)?;
                path.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                let name = e.name().as_ref().to_vec();
                open_element(&name, &e, &mut note, &mut resource)?;
                text.clear();
                close_element(&name, &path, &text, &mut notes, &mut note, &mut resource)?;
            }
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::End(e) => {
                let name = e.name().as_ref().to_vec();
                path.pop();
                close_element(&name, &path, &text, &mut notes, &mut note, &mut resource)?;
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!("Read {} notes from export", notes.len());
    Ok(notes)
}

/// Reads a single `.enex` file
pub fn read_notes_from_path(path: &Path) -> Result<Vec<NoteDocument>, ImportError> {
    let xml = std::fs::read_to_string(path)?;
    read_notes(&xml)
}

/// Reads every `.enex` file in a directory, in file-name order.
///
/// A file that fails to parse is logged and skipped.
pub fn read_notes_from_dir(dir: &Path) -> Result<Vec<NoteDocument>, ImportError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("enex"))
        })
        .collect();
    files.sort();

    info!("Found {} .enex files in {}", files.len(), dir.display());

    let mut notes = Vec::new();
    for file in files {
        match read_notes_from_path(&file) {
            Ok(mut found) => notes.append(&mut found),
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }
    Ok(notes)
}

#[derive(Default)]
struct ResourceBuilder {
    hash: Option<String>,
    mime: String,
    data: Vec<u8>,
    corrupt: bool,
}

fn open_element(
    name: &[u8],
    e: &BytesStart,
    note: &mut Option<NoteDocument>,
    resource: &mut Option<ResourceBuilder>,
) -> Result<(), ImportError> {
    match name {
        b"note" => *note = Some(NoteDocument::default()),
        b"resource" if note.is_some() => *resource = Some(ResourceBuilder::default()),
        b"data" => {
            if let Some(res) = resource.as_mut() {
                res.hash = hash_attribute(e)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn close_element(
    name: &[u8],
    path: &[Vec<u8>],
    text: &str,
    notes: &mut Vec<NoteDocument>,
    note: &mut Option<NoteDocument>,
    resource: &mut Option<ResourceBuilder>,
) -> Result<(), ImportError> {
    let parent = path.last().map(Vec::as_slice);

    if let Some(res) = resource.as_mut() {
        match name {
            b"data" => {
                let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                match STANDARD.decode(cleaned.as_bytes()) {
                    Ok(data) => res.data = data,
                    Err(e) => {
                        warn!("Dropping attachment with invalid data: {}", e);
                        res.corrupt = true;
                    }
                }
            }
            b"mime" => res.mime = text.trim().to_string(),
            b"resource" => {
                if let (Some(res), Some(doc)) = (resource.take(), note.as_mut()) {
                    if res.corrupt {
                        return Ok(());
                    }
                    doc.attachments.push(Attachment {
                        hash: res.hash,
                        mime: res.mime,
                        data: res.data,
                    });
                }
            }
            _ => {}
        }
        return Ok(());
    }

    let Some(doc) = note.as_mut() else {
        return Ok(());
    };

    match (name, parent) {
        (b"title", Some(b"note")) => doc.title = Some(text.trim().to_string()),
        (b"content", Some(b"note")) => doc.body = Some(text.to_string()),
        (b"created", Some(b"note")) => doc.created = Some(text.trim().to_string()),
        (b"source-url", Some(b"note-attributes")) => {
            let url = text.trim();
            if !url.is_empty() {
                doc.source_url = Some(url.to_string());
            }
        }
        (b"note", _) => {
            if let Some(doc) = note.take() {
                notes.push(doc);
            }
        }
        _ => {}
    }
    Ok(())
}

fn hash_attribute(e: &BytesStart) -> Result<Option<String>, ImportError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_lowercase();
        if key.contains("hash") {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE en-export SYSTEM "http://xml.evernote.com/pub/evernote-export3.dtd">
<en-export export-date="20240101T000000Z" application="Evernote" version="10">
  <note>
    <title>Tomato Soup</title>
    <created>20231201T123000Z</created>
    <note-attributes>
      <source-url>https://www.example-recipes.net/tomato-soup</source-url>
    </note-attributes>
    <content><![CDATA[<?xml version="1.0" encoding="UTF-8"?><en-note><div>2 cups tomatoes</div></en-note>]]></content>
    <resource>
      <data encoding="base64">aGVs
bG8=</data>
      <mime>image/png</mime>
      <resource-attributes><source-url>https://cdn.example.net/img.png</source-url></resource-attributes>
    </resource>
  </note>
  <note>
    <created>20231202T080000Z</created>
  </note>
</en-export>"#;

    #[test]
    fn test_read_notes() {
        let notes = read_notes(EXPORT).unwrap();
        assert_eq!(notes.len(), 2);

        let soup = &notes[0];
        assert_eq!(soup.title.as_deref(), Some("Tomato Soup"));
        assert_eq!(soup.created.as_deref(), Some("20231201T123000Z"));
        assert_eq!(
            soup.source_url.as_deref(),
            Some("https://www.example-recipes.net/tomato-soup")
        );
        assert!(soup.body.as_deref().unwrap().contains("2 cups tomatoes"));
        assert_eq!(soup.attachments.len(), 1);
        assert_eq!(soup.attachments[0].data, b"hello");
        assert_eq!(soup.attachments[0].mime, "image/png");
        assert!(soup.attachments[0].hash.is_none());

        let malformed = &notes[1];
        assert!(malformed.title.is_none());
        assert!(malformed.body.is_none());
    }

    #[test]
    fn test_invalid_base64_drops_only_the_attachment() {
        let xml = r#"<en-export>
  <note><title>Soup</title><content><![CDATA[<en-note><div>2 cups stock</div></en-note>]]></content></note>
  <note>
    <title>Bread</title>
    <content><![CDATA[<en-note><div>3 cups flour</div></en-note>]]></content>
    <resource><data>!!!corrupt!!!</data><mime>image/png</mime></resource>
    <resource><data>aGVsbG8=</data><mime>image/jpeg</mime></resource>
  </note>
  <note><title>Stew</title><content><![CDATA[<en-note><div>1 lb beef</div></en-note>]]></content></note>
</en-export>"#;
        let notes = read_notes(xml).unwrap();

        let titles: Vec<_> = notes.iter().filter_map(|n| n.title.as_deref()).collect();
        assert_eq!(titles, vec!["Soup", "Bread", "Stew"]);

        let bread = &notes[1];
        assert!(bread.body.as_deref().unwrap().contains("3 cups flour"));
        assert_eq!(bread.attachments.len(), 1);
        assert_eq!(bread.attachments[0].mime, "image/jpeg");
        assert_eq!(bread.attachments[0].data, b"hello");
    }
}
