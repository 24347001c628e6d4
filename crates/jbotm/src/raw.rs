//! Raw jbovlaste records, in the shape of the cached JSON exports.
//!
//! The cache mirrors the XML export attribute-for-attribute: attributes
//! carry an `@` prefix and repeated children may appear either as a single
//! value or as an array.

use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, formats::PreferOne, serde_as, skip_serializing_none};

/// One headword's definition in one target language
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct RawEntry {
    #[serde(rename = "@word")]
    pub word: String,
    /// Word class, e.g. `gismu`, `cmavo`, `lujvo`
    #[serde(rename = "@type")]
    pub word_type: String,
    /// Present (with any value) on unofficial entries
    #[serde(rename = "@unofficial")]
    pub unofficial: Option<String>,
    /// Kept as text; parsed when the entry is normalized
    #[serde(default)]
    pub definitionid: String,
    #[serde(default)]
    pub definition: String,
    pub notes: Option<String>,
    #[serde_as(as = "Option<OneOrMany<_, PreferOne>>")]
    pub glossword: Option<Vec<GlossWord>>,
    #[serde_as(as = "Option<OneOrMany<_, PreferOne>>")]
    pub keyword: Option<Vec<Keyword>>,
    #[serde_as(as = "Option<OneOrMany<_, PreferOne>>")]
    pub rafsi: Option<Vec<String>>,
    pub selmaho: Option<String>,
    #[serde(default)]
    pub user: User,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct GlossWord {
    #[serde(rename = "@word")]
    pub word: String,
    #[serde(rename = "@sense")]
    pub sense: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct Keyword {
    #[serde(rename = "@word")]
    pub word: String,
    /// Argument slot the keyword describes
    #[serde(rename = "@place")]
    pub place: String,
    #[serde(rename = "@sense")]
    pub sense: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct User {
    #[serde(default)]
    pub username: String,
    pub realname: Option<String>,
}

impl RawEntry {
    pub fn is_unofficial(&self) -> bool {
        self.unofficial.is_some()
    }
}
