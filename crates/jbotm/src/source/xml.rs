//! jbovlaste XML export reader.
//!
//! Only `<valsi>` records are read; the natural-language-to-Lojban half of
//! the export (`<nlword>`) is ignored.

use super::RawSource;
use crate::error::{OtmError, Result};
use crate::raw::{GlossWord, Keyword, RawEntry};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// XML exports, one `jbo-<lang>.xml` file per language
#[derive(Debug, Clone)]
pub struct XmlExport {
    pub dir: PathBuf,
}

impl XmlExport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, lang: &str) -> PathBuf {
        self.dir.join(format!("jbo-{lang}.xml"))
    }
}

impl RawSource for XmlExport {
    fn load(&self, lang: &str) -> Result<Vec<RawEntry>> {
        let path = self.path(lang);
        let xml = fs::read_to_string(&path)?;
        parse_export(&xml, &path)
    }
}

/// Child elements whose text becomes a field of the current record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Definition,
    DefinitionId,
    Notes,
    Selmaho,
    Rafsi,
    Username,
    Realname,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"definition" => Some(Field::Definition),
            b"definitionid" => Some(Field::DefinitionId),
            b"notes" => Some(Field::Notes),
            b"selmaho" => Some(Field::Selmaho),
            b"rafsi" => Some(Field::Rafsi),
            b"username" => Some(Field::Username),
            b"realname" => Some(Field::Realname),
            _ => None,
        }
    }

    fn store(self, entry: &mut RawEntry, text: String) {
        match self {
            Field::Definition => entry.definition = text,
            Field::DefinitionId => entry.definitionid = text,
            Field::Notes => entry.notes = Some(text),
            Field::Selmaho => entry.selmaho = Some(text),
            Field::Rafsi => entry.rafsi.get_or_insert_with(Vec::new).push(text),
            Field::Username => entry.user.username = text,
            Field::Realname => entry.user.realname = Some(text),
        }
    }
}

fn attributes(element: &BytesStart<'_>, path: &Path) -> Result<HashMap<String, String>> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| OtmError::xml(e, path))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| OtmError::xml(e, path))?
                .into_owned();
            Ok((key, value))
        })
        .collect()
}

fn open_valsi(element: &BytesStart<'_>, path: &Path) -> Result<RawEntry> {
    let mut attrs = attributes(element, path)?;
    Ok(RawEntry {
        word: attrs.remove("word").unwrap_or_default(),
        word_type: attrs.remove("type").unwrap_or_default(),
        unofficial: attrs.remove("unofficial"),
        ..Default::default()
    })
}

fn add_listed(entry: &mut RawEntry, element: &BytesStart<'_>, path: &Path) -> Result<()> {
    match element.name().as_ref() {
        b"glossword" => {
            let mut attrs = attributes(element, path)?;
            entry.glossword.get_or_insert_with(Vec::new).push(GlossWord {
                word: attrs.remove("word").unwrap_or_default(),
                sense: attrs.remove("sense"),
            });
        }
        b"keyword" => {
            let mut attrs = attributes(element, path)?;
            entry.keyword.get_or_insert_with(Vec::new).push(Keyword {
                word: attrs.remove("word").unwrap_or_default(),
                place: attrs.remove("place").unwrap_or_default(),
                sense: attrs.remove("sense"),
            });
        }
        _ => {}
    }
    Ok(())
}

/// Parse the text of a jbovlaste export. `path` is only used for errors.
pub fn parse_export(xml: &str, path: &Path) -> Result<Vec<RawEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            OtmError::xml(format!("at byte {}: {}", reader.buffer_position(), e), path)
        })?;

        match event {
            Event::Start(e) => {
                if let Some(entry) = current.as_mut() {
                    add_listed(entry, &e, path)?;
                    field = Field::from_tag(e.name().as_ref());
                    text.clear();
                } else if e.name().as_ref() == b"valsi" {
                    current = Some(open_valsi(&e, path)?);
                }
            }
            Event::Empty(e) => {
                if let Some(entry) = current.as_mut() {
                    add_listed(entry, &e, path)?;
                } else if e.name().as_ref() == b"valsi" {
                    entries.push(open_valsi(&e, path)?);
                }
            }
            Event::Text(t) if field.is_some() => {
                let unescaped = t.unescape().map_err(|e| OtmError::xml(e, path))?;
                text.push_str(&unescaped);
            }
            Event::CData(c) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Event::End(e) => {
                if e.name().as_ref() == b"valsi" {
                    entries.extend(current.take());
                    field = None;
                } else if let (Some(entry), Some(f)) = (&mut current, field.take()) {
                    f.store(entry, text.trim().to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if current.is_some() {
        return Err(OtmError::xml("unterminated <valsi> element", path));
    }

    tracing::debug!(entries = entries.len(), "parsed {}", path.display());
    Ok(entries)
}
