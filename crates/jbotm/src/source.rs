mod json;
mod xml;

pub use json::JsonCache;
pub use xml::{XmlExport, parse_export};

use crate::error::{OtmError, Result};
use crate::raw::RawEntry;

/// Something that can produce the raw jbovlaste records for a language
pub trait RawSource {
    fn load(&self, lang: &str) -> Result<Vec<RawEntry>>;
}

impl<S: RawSource + ?Sized> RawSource for &S {
    fn load(&self, lang: &str) -> Result<Vec<RawEntry>> {
        (**self).load(lang)
    }
}

/// Reads the JSON cache, regenerating it from `fallback` when the cache
/// is missing or unreadable.
#[derive(Debug, Clone)]
pub struct CachedSource<F = XmlExport> {
    pub cache: JsonCache,
    pub fallback: F,
}

impl<F: RawSource> CachedSource<F> {
    pub fn new(cache: JsonCache, fallback: F) -> Self {
        Self { cache, fallback }
    }
}

impl<F: RawSource> RawSource for CachedSource<F> {
    fn load(&self, lang: &str) -> Result<Vec<RawEntry>> {
        let cached = self.cache.path(lang);
        match self.cache.load(lang) {
            Ok(entries) => {
                tracing::info!("Loaded {}", cached.display());
                return Ok(entries);
            }
            Err(e) => {
                tracing::warn!(
                    "Couldn't load '{}' ({}). Regenerating from source export...",
                    cached.display(),
                    e
                );
            }
        }

        let entries = self
            .fallback
            .load(lang)
            .map_err(|e| OtmError::SourceUnavailable {
                lang: lang.to_string(),
                source: Some(Box::new(e)),
            })?;
        tracing::info!(entries = entries.len(), "OK, loaded.");

        self.cache.save(lang, &entries)?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;

    struct Counting {
        calls: Cell<usize>,
        entries: Vec<RawEntry>,
    }

    impl RawSource for Counting {
        fn load(&self, _lang: &str) -> Result<Vec<RawEntry>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.entries.clone())
        }
    }

    struct Missing;

    impl RawSource for Missing {
        fn load(&self, lang: &str) -> Result<Vec<RawEntry>> {
            Err(OtmError::xml("no export", format!("xml/jbo-{lang}.xml")))
        }
    }

    fn entry(word: &str) -> RawEntry {
        RawEntry {
            word: word.to_string(),
            word_type: "gismu".to_string(),
            definitionid: "1".to_string(),
            definition: "thing".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fallback_populates_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = CachedSource::new(
            JsonCache::new(dir.path().join("json")),
            Counting {
                calls: Cell::new(0),
                entries: vec![entry("broda"), entry("brode")],
            },
        );

        let first = source.load("en").expect("falls back");
        let second = source.load("en").expect("reads cache");

        assert_eq!(first, second);
        assert_eq!(source.fallback.calls.get(), 1);
        assert!(dir.path().join("json").join("jbo-en.json").is_file());
    }

    #[test]
    fn test_corrupt_cache_is_regenerated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = JsonCache::new(dir.path());
        fs::write(cache.path("ja"), "[{ not json").expect("write corrupt cache");
        let source = CachedSource::new(
            cache,
            Counting {
                calls: Cell::new(0),
                entries: vec![entry("klama")],
            },
        );

        let entries = source.load("ja").expect("falls back");

        assert_eq!(entries, vec![entry("klama")]);
        assert_eq!(source.fallback.calls.get(), 1);
    }

    #[test]
    fn test_nothing_available() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = CachedSource::new(JsonCache::new(dir.path()), Missing);

        let err = source.load("eo").expect_err("no data anywhere");

        assert!(matches!(err, OtmError::SourceUnavailable { ref lang, .. } if lang == "eo"));
    }
}
