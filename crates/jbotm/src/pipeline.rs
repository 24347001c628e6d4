//! Per-language orchestration: load, normalize, tweak, enrich, assemble.

use crate::archive::archive_outputs;
use crate::cli::JbotmArgs;
use crate::config::Config;
use crate::error::Result;
use crate::normalize::normalize;
use crate::otm::{DictionaryWord, Document};
use crate::raw::RawEntry;
use crate::relations::enrich;
use crate::source::{CachedSource, JsonCache, RawSource, XmlExport};
use crate::tweak::{Tweak, apply_all};
use smol_str::SmolStr;
use std::path::PathBuf;

/// Switches that apply to every language in a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute cross-references between entries
    pub add_relations: bool,
    /// Strip the `$` marker from definitions and contents
    pub no_dollar: bool,
    /// Bundle the outputs into a zip archive
    pub zip: bool,
}

impl From<&JbotmArgs> for RunOptions {
    fn from(args: &JbotmArgs) -> Self {
        Self {
            add_relations: args.add_relations,
            no_dollar: args.no_dollar,
            zip: args.zip,
        }
    }
}

/// Normalize raw records and run `tweaks` over each, keeping input order
pub fn build_words(raws: &[RawEntry], tweaks: &[Tweak]) -> Vec<DictionaryWord> {
    raws.iter()
        .map(|raw| apply_all(tweaks, normalize(raw)))
        .collect()
}

/// Builds OTM-JSON dictionaries from a raw source
pub struct Generator<S = CachedSource<XmlExport>> {
    config: Config,
    source: S,
    options: RunOptions,
}

impl Generator {
    /// Generator reading the cache and XML directories named in `config`
    pub fn from_config(config: Config, options: RunOptions) -> Self {
        let source = CachedSource::new(
            JsonCache::new(&config.paths.cache),
            XmlExport::new(&config.paths.xml),
        );
        Self::new(config, source, options)
    }
}

impl<S: RawSource> Generator<S> {
    pub fn new(config: Config, source: S, options: RunOptions) -> Self {
        Self {
            config,
            source,
            options,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tweaks for `lang`, with `no-dollar` appended when requested
    pub fn tweaks(&self, lang: &str) -> Vec<Tweak> {
        let mut tweaks = self.config.tweaks_for(lang).to_vec();
        if self.options.no_dollar && !tweaks.contains(&Tweak::NoDollar) {
            tweaks.push(Tweak::NoDollar);
        }
        tweaks
    }

    /// Build the dictionary for one target language
    pub async fn generate(&self, lang: &str) -> Result<Document> {
        let raws = self.source.load(lang)?;
        let tweaks = self.tweaks(lang);
        if !tweaks.is_empty() {
            let names: Vec<&str> = tweaks.iter().map(|t| t.name()).collect();
            tracing::debug!(lang, tweaks = %names.join(", "), "applying tweaks");
        }

        let mut words = build_words(&raws, &tweaks);

        if self.options.add_relations {
            tracing::info!(lang, words = words.len(), "Adding relations...");
            words = enrich(words, self.config.enrich).await?;
        }

        Ok(Document::today(
            words,
            self.config.source_language.clone(),
            lang,
        ))
    }

    /// Build and write the dictionary for `lang`, returning the output path
    pub async fn generate_to_file(&self, lang: &str) -> Result<PathBuf> {
        let doc = self.generate(lang).await?;
        let path = self.config.paths.output_file(lang);
        doc.write_to(&path)?;
        Ok(path)
    }

    /// Generate every language in order, then archive them if requested.
    /// Stops at the first language that fails.
    pub async fn run(&self, langs: &[SmolStr]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(langs.len());
        for lang in langs {
            written.push(self.generate_to_file(lang).await?);
        }

        if self.options.zip {
            archive_outputs(&written, self.config.paths.archive_file(langs))?;
        }

        Ok(written)
    }
}
