use crate::assemble::SOURCE_LANGUAGE;
use crate::error::{OtmError, Result as OtmResult};
use crate::relations::EnrichOptions;
use crate::tweak::Tweak;
use miette::{IntoDiagnostic, Result, miette};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Target languages jbovlaste exports, in priority order
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "en", "ja", "jbo", "eo", "en-simple", "de", "fr", "ru", "zh", "es",
];

/// Tweaks applied to Japanese output unless configured otherwise
pub const JA_TWEAKS: &[Tweak] = &[
    Tweak::GoodNotes,
    Tweak::IntegrateGloss,
    Tweak::SortContents,
    Tweak::DeleteEmptyNotes,
];

/// Aliases that expand to a prefix of the configured language list,
/// ordered narrowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LanguageGroup {
    Top3,
    Top5,
    All,
}

impl LanguageGroup {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top3" => Some(LanguageGroup::Top3),
            "top5" => Some(LanguageGroup::Top5),
            "all" => Some(LanguageGroup::All),
            _ => None,
        }
    }

    /// How many leading languages the alias stands for
    pub fn take(self) -> usize {
        match self {
            LanguageGroup::Top3 => 3,
            LanguageGroup::Top5 => 5,
            LanguageGroup::All => usize::MAX,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub languages: Vec<SmolStr>,
    pub source_language: SmolStr,
    pub paths: PathsConfig,
    pub tweaks: BTreeMap<SmolStr, Vec<Tweak>>,
    pub enrich: EnrichOptions,
}

#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Cached raw JSON records
    pub cache: PathBuf,
    /// jbovlaste XML exports
    pub xml: PathBuf,
    /// Generated OTM-JSON dictionaries
    pub output: PathBuf,
    /// Zip archives
    pub archive: PathBuf,
}

impl PathsConfig {
    pub fn output_file(&self, lang: &str) -> PathBuf {
        self.output.join(format!("jbo-{lang}_otm.json"))
    }

    pub fn archive_file(&self, langs: &[impl AsRef<str>]) -> PathBuf {
        let joined: Vec<&str> = langs.iter().map(AsRef::as_ref).collect();
        self.archive.join(format!("{}-otmjson.zip", joined.join("-")))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache: PathBuf::from("json"),
            xml: PathBuf::from("xml"),
            output: PathBuf::from("otm-json"),
            archive: PathBuf::from("zip"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|&l| SmolStr::new(l)).collect(),
            source_language: SmolStr::new_static(SOURCE_LANGUAGE),
            paths: PathsConfig::default(),
            tweaks: BTreeMap::from([(SmolStr::new_static("ja"), JA_TWEAKS.to_vec())]),
            enrich: EnrichOptions::default(),
        }
    }
}

impl Config {
    /// Read a KDL config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).into_diagnostic()?;
        Self::from_kdl(&text)
    }

    /// Parse KDL; nodes that are left out keep their defaults
    pub fn from_kdl(text: &str) -> Result<Self> {
        let doc = text
            .parse::<kdl::KdlDocument>()
            .map_err(|e| miette!("Failed to parse KDL: {}", e))?;

        let mut config = Config::default();

        for node in doc.nodes() {
            match node.name().value() {
                "languages" => {
                    let languages = string_args(node)?;
                    if languages.is_empty() {
                        return Err(miette!("languages needs at least one language code"));
                    }
                    if let Some(alias) = languages.iter().find(|l| LanguageGroup::parse(l).is_some()) {
                        return Err(miette!("{} is reserved as a group alias", alias));
                    }
                    config.languages = languages;
                }
                "source" => {
                    config.source_language = string_arg(node, "source")?.into();
                }
                "paths" => parse_paths(node, &mut config.paths)?,
                "tweaks" => {
                    let lang = string_arg(node, "tweaks")?;
                    let tweaks = match node.children() {
                        Some(children) => children
                            .nodes()
                            .iter()
                            .map(|n| n.name().value().parse::<Tweak>().map_err(|e| miette!(e)))
                            .collect::<Result<Vec<_>>>()?,
                        None => Vec::new(),
                    };
                    config.tweaks.insert(lang.into(), tweaks);
                }
                "enrich" => parse_enrich(node, &mut config.enrich)?,
                other => {
                    return Err(miette!("Unknown config node: {}", other));
                }
            }
        }

        Ok(config)
    }

    /// Replace the enrichment pool shape; zero is raised to one
    pub fn override_enrich(&mut self, workers: Option<usize>, chunks: Option<usize>) {
        if let Some(workers) = workers {
            self.enrich.workers = workers.max(1);
        }
        if let Some(chunks) = chunks {
            self.enrich.chunks = chunks.max(1);
        }
    }

    /// Tweaks configured for `lang`, empty when none are
    pub fn tweaks_for(&self, lang: &str) -> &[Tweak] {
        self.tweaks.get(lang).map(Vec::as_slice).unwrap_or_default()
    }

    /// Expand a slash-separated language argument into the languages to build.
    ///
    /// `all` yields the whole configured list. `top5` and `top3` yield the
    /// first five or three, followed by any other codes given alongside
    /// them. Codes never repeat and keep their first position.
    pub fn resolve_languages(&self, arg: &str) -> OtmResult<Vec<SmolStr>> {
        let requested: Vec<&str> = arg.split('/').map(str::trim).filter(|s| !s.is_empty()).collect();
        if requested.is_empty() {
            return Err(OtmError::NoLanguage);
        }

        let mut group: Option<LanguageGroup> = None;
        let mut explicit: Vec<&str> = Vec::new();
        for lang in requested {
            match LanguageGroup::parse(lang) {
                // The widest alias wins
                Some(g) => group = group.max(Some(g)),
                None if self.languages.iter().any(|l| l == lang) => explicit.push(lang),
                None => return Err(OtmError::unknown_language(lang, &self.languages)),
            }
        }

        let mut running: Vec<SmolStr> = Vec::new();
        if let Some(group) = group {
            running.extend(self.languages.iter().take(group.take()).cloned());
        }
        for lang in explicit {
            if !running.iter().any(|l| l == lang) {
                running.push(SmolStr::new(lang));
            }
        }
        Ok(running)
    }
}

fn string_arg(node: &kdl::KdlNode, what: &str) -> Result<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(str::to_string)
        .ok_or_else(|| miette!("{} expects a string value", what))
}

fn string_args(node: &kdl::KdlNode) -> Result<Vec<SmolStr>> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| {
            e.value()
                .as_string()
                .map(SmolStr::new)
                .ok_or_else(|| miette!("{} expects string values", node.name().value()))
        })
        .collect()
}

fn parse_paths(node: &kdl::KdlNode, paths: &mut PathsConfig) -> Result<()> {
    let children = node
        .children()
        .ok_or_else(|| miette!("paths block has no children"))?;

    for child in children.nodes() {
        let name = child.name().value();
        let val = PathBuf::from(string_arg(child, name)?);
        match name {
            "cache" => paths.cache = val,
            "xml" => paths.xml = val,
            "output" => paths.output = val,
            "archive" => paths.archive = val,
            other => {
                return Err(miette!("Unknown paths field: {}", other));
            }
        }
    }
    Ok(())
}

fn parse_enrich(node: &kdl::KdlNode, enrich: &mut EnrichOptions) -> Result<()> {
    let children = node
        .children()
        .ok_or_else(|| miette!("enrich block has no children"))?;

    for child in children.nodes() {
        let name = child.name().value();
        let val = child
            .entries()
            .first()
            .and_then(|e| e.value().as_integer())
            .filter(|&v| v > 0)
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| miette!("{} expects a positive integer", name))?;
        match name {
            "workers" => enrich.workers = val,
            "chunks" => enrich.chunks = val,
            other => {
                return Err(miette!("Unknown enrich field: {}", other));
            }
        }
    }
    Ok(())
}
