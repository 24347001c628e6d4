use miette::{Diagnostic, SourceSpan};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building OTM-JSON dictionaries
#[derive(Debug, Error, Diagnostic)]
pub enum OtmError {
    /// IO error when reading sources or writing outputs
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse or serialize JSON
    #[error("Failed to process JSON in {}", path.display())]
    #[diagnostic(
        code(otm::json_error),
        help("Delete the cached file to regenerate it from the XML export")
    )]
    Json {
        #[source]
        source: serde_json::Error,
        /// Path to the file being read or written
        path: PathBuf,
        /// Source text that failed to parse
        #[source_code]
        src: Option<String>,
        /// Location of the error in the source
        #[label("parse error here")]
        span: Option<SourceSpan>,
    },

    /// Failed to read a jbovlaste XML export
    #[error("Failed to read XML export {}: {message}", path.display())]
    #[diagnostic(
        code(otm::xml_error),
        help("Re-download the export from jbovlaste; it may be truncated")
    )]
    Xml {
        message: String,
        /// Path to the export file
        path: PathBuf,
    },

    /// Language code not present in the configured list
    #[error("Invalid language `{code}`. Available: {}", available.join(", "))]
    #[diagnostic(code(otm::unknown_language))]
    UnknownLanguage {
        /// The rejected code
        code: String,
        /// Every configured language code
        available: Vec<String>,
    },

    /// No language was requested
    #[error("No language specified")]
    #[diagnostic(
        code(otm::no_language),
        help("Pass a slash-separated list such as `en/ja`, or one of `top3`, `top5`, `all`")
    )]
    NoLanguage,

    /// Neither the cache nor the XML export could provide entries
    #[error("No source data for language `{lang}`")]
    #[diagnostic(
        code(otm::source_unavailable),
        help("Place jbo-{lang}.json in the cache directory or jbo-{lang}.xml in the XML directory")
    )]
    SourceUnavailable {
        lang: String,
        #[source]
        source: Option<Box<OtmError>>,
    },

    /// A relation worker failed; the whole pass is abandoned
    #[error("Relation worker failed: {message}")]
    #[diagnostic(
        code(otm::enrichment),
        help("No partial output is written; rerun without --addrelations to skip relations")
    )]
    Enrichment {
        /// Chunk that failed, when known
        chunk: Option<usize>,
        message: String,
    },

    /// Failed to build the zip archive
    #[error("Failed to write archive {}", path.display())]
    #[diagnostic(code(otm::archive))]
    Archive {
        #[source]
        source: zip::result::ZipError,
        path: PathBuf,
    },
}

impl OtmError {
    /// Create a JSON error with context
    pub fn json(source: serde_json::Error, path: impl Into<PathBuf>) -> Self {
        Self::Json {
            source,
            path: path.into(),
            src: None,
            span: None,
        }
    }

    /// Create a JSON parse error carrying the offending text
    pub fn json_with_source(
        source: serde_json::Error,
        path: impl Into<PathBuf>,
        src: String,
    ) -> Self {
        let span = offset_of(&src, source.line(), source.column()).map(|offset| (offset, 1).into());

        Self::Json {
            source,
            path: path.into(),
            src: Some(src),
            span,
        }
    }

    /// Create an XML error
    pub fn xml(message: impl ToString, path: impl Into<PathBuf>) -> Self {
        Self::Xml {
            message: message.to_string(),
            path: path.into(),
        }
    }

    /// Create a worker failure for the given chunk
    pub fn enrichment(chunk: usize, cause: impl std::fmt::Display) -> Self {
        Self::Enrichment {
            chunk: Some(chunk),
            message: format!("chunk {chunk}: {cause}"),
        }
    }

    /// Create an unknown language error
    pub fn unknown_language(code: impl Into<String>, available: &[impl AsRef<str>]) -> Self {
        Self::UnknownLanguage {
            code: code.into(),
            available: available.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

// serde_json reports 1-based line/column pairs
fn offset_of(src: &str, line: usize, column: usize) -> Option<usize> {
    let line = line.checked_sub(1)?;
    let start: usize = src.split_inclusive('\n').take(line).map(str::len).sum();
    Some((start + column.saturating_sub(1)).min(src.len()))
}

/// Result type for dictionary operations
pub type Result<T> = std::result::Result<T, OtmError>;
