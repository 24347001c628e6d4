use super::RawSource;
use crate::error::{OtmError, Result};
use crate::raw::RawEntry;
use std::fs;
use std::path::{Path, PathBuf};

/// Cached raw records, one `jbo-<lang>.json` array per language
#[derive(Debug, Clone)]
pub struct JsonCache {
    pub dir: PathBuf,
}

impl JsonCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, lang: &str) -> PathBuf {
        self.dir.join(format!("jbo-{lang}.json"))
    }

    /// Persist `entries` as the cache for `lang`
    pub fn save(&self, lang: &str, entries: &[RawEntry]) -> Result<PathBuf> {
        let path = self.path(lang);
        let json = serde_json::to_string_pretty(entries).map_err(|e| OtmError::json(e, &path))?;

        fs::create_dir_all(&self.dir)?;
        fs::write(&path, json)?;

        tracing::debug!("Saved {}", path.display());
        Ok(path)
    }

    fn read(path: &Path) -> Result<Vec<RawEntry>> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| OtmError::json_with_source(e, path, content))
    }
}

impl RawSource for JsonCache {
    fn load(&self, lang: &str) -> Result<Vec<RawEntry>> {
        Self::read(&self.path(lang))
    }
}
