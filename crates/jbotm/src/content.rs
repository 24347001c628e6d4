use crate::otm::Content;
use crate::raw::{GlossWord, Keyword, RawEntry};

pub const NOTES: &str = "notes";
pub const GLOSS: &str = "gloss";
pub const KEYWORD: &str = "keyword";
pub const RAFSI: &str = "rafsi";
pub const USERNAME: &str = "username";

/// Build the display blocks for a raw entry.
///
/// Blocks are always emitted in the order notes, gloss, keyword, rafsi,
/// username. Absent fields are skipped; the username block is always last.
pub fn extract_contents(raw: &RawEntry) -> Vec<Content> {
    let mut contents = Vec::new();

    if let Some(notes) = raw.notes.as_deref().filter(|n| !n.is_empty()) {
        contents.push(Content::new(NOTES, notes));
    }
    if let Some(glosses) = &raw.glossword {
        contents.push(Content::new(GLOSS, render_glosses(glosses)));
    }
    if let Some(keywords) = &raw.keyword {
        contents.push(Content::new(KEYWORD, render_keywords(keywords)));
    }
    if let Some(rafsi) = &raw.rafsi {
        contents.push(Content::new(RAFSI, rafsi.join("   ")));
    }
    contents.push(Content::new(USERNAME, raw.user.username.as_str()));

    contents
}

fn with_sense(word: &str, sense: Option<&str>) -> String {
    match sense {
        Some(sense) => format!("{word}; {sense}"),
        None => word.to_string(),
    }
}

fn render_glosses(glosses: &[GlossWord]) -> String {
    glosses
        .iter()
        .map(|g| with_sense(&g.word, g.sense.as_deref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_keywords(keywords: &[Keyword]) -> String {
    keywords
        .iter()
        .map(|k| format!("[{}]: {}", k.place, with_sense(&k.word, k.sense.as_deref())))
        .collect::<Vec<_>>()
        .join(", ")
}
