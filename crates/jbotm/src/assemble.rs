use crate::error::{OtmError, Result};
use crate::otm::{DictionaryWord, Document, LangPair, Meta, Zpdic};
use chrono::NaiveDate;
use smol_str::SmolStr;
use std::fs;
use std::path::Path;

/// Language every jbovlaste dictionary translates from
pub const SOURCE_LANGUAGE: &str = "jbo";

impl Document {
    /// Wrap finished words with collation order and metadata
    pub fn new(
        words: Vec<DictionaryWord>,
        from: impl Into<SmolStr>,
        to: impl Into<SmolStr>,
        generated: NaiveDate,
    ) -> Self {
        Self {
            words,
            zpdic: Zpdic::default(),
            meta: Meta {
                lang: LangPair {
                    from: from.into(),
                    to: to.into(),
                },
                generated_date: generated.format("%Y-%m-%d").to_string(),
            },
        }
    }

    /// Same as [`Document::new`], dated today in local time
    pub fn today(words: Vec<DictionaryWord>, from: impl Into<SmolStr>, to: impl Into<SmolStr>) -> Self {
        Self::new(words, from, to, chrono::Local::now().date_naive())
    }

    /// Pretty JSON with two-space indentation and unescaped non-ASCII text
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize and write to `path`, replacing any existing file
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json().map_err(|e| OtmError::json(e, path))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;

        tracing::info!("Written to {}", path.display());
        Ok(())
    }

    /// Read a previously written document
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| OtmError::json_with_source(e, path, content))
    }
}
