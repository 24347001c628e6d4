//! OTM-JSON document types.
//!
//! Field order matters: dictionary applications display keys in the order
//! they appear, so every struct serializes its fields in declaration order.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Character ordering used by consuming applications to sort entries
pub const ALPHABET_ORDER: &str = ".'aAbBcCdDeEfFgGiIjJkKlLmMnNoOpPrRsStTuUvVxXyYzZ";

/// Identity of a headword; the join key for relations
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Hash)]
pub struct Entry {
    pub id: i64,
    pub form: String,
}

impl Entry {
    /// Id given to entries whose definition id could not be parsed
    pub const DEGRADED_ID: i64 = -1;

    pub fn new(form: impl Into<String>, id: i64) -> Self {
        Self {
            id,
            form: form.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Translation {
    pub title: String,
    pub forms: Vec<String>,
}

/// A titled block of display text
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Content {
    pub title: SmolStr,
    pub text: String,
}

impl Content {
    pub fn new(title: impl Into<SmolStr>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Variation {
    pub title: String,
    pub form: String,
}

/// A reference from one word to another entry of the same document
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Relation {
    /// Field the reference was found in
    pub title: String,
    pub entry: Entry,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct DictionaryWord {
    pub entry: Entry,
    pub translations: Vec<Translation>,
    pub tags: Vec<String>,
    pub contents: Vec<Content>,
    pub variations: Vec<Variation>,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Zpdic {
    #[serde(rename = "alphabetOrder")]
    pub alphabet_order: String,
}

impl Default for Zpdic {
    fn default() -> Self {
        Self {
            alphabet_order: ALPHABET_ORDER.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct LangPair {
    pub from: SmolStr,
    pub to: SmolStr,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Meta {
    pub lang: LangPair,
    /// ISO date (`YYYY-MM-DD`) the document was generated
    pub generated_date: String,
}

/// A complete OTM-JSON dictionary
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Document {
    pub words: Vec<DictionaryWord>,
    pub zpdic: Zpdic,
    pub meta: Meta,
}
