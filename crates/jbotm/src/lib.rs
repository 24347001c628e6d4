//! # jbovlaste to OTM-JSON conversion
//!
//! Reads the Lojban lexicon exported by jbovlaste and writes one OTM-JSON
//! dictionary per target language, optionally linking every entry to the
//! entries its definition and notes reference.
//!
//! ## Usage
//!
//! The `jbotm` binary takes a slash-separated list of target languages:
//!
//! ```bash
//! cargo run -p jbotm -- en/ja --addrelations
//! cargo run -p jbotm -- top5 --nodollar --zip
//! ```
//!
//! Raw records are read from `json/jbo-<lang>.json`. When that cache is
//! missing it is rebuilt from the XML export at `xml/jbo-<lang>.xml`.
//! Dictionaries land in `otm-json/`. Directories, languages and tweaks can
//! be overridden with a KDL file passed via `--config`.
//!
//! ## Modules
//!
//! - [`raw`] - Raw jbovlaste records
//! - [`otm`] - OTM-JSON data model
//! - [`content`] - Display content blocks derived from raw records
//! - [`normalize`] - Raw record to dictionary word conversion
//! - [`tweak`] - Per-language post-processing
//! - [`relations`] - Parallel cross-reference enrichment
//! - [`assemble`] - Document assembly and serialization
//! - [`source`] - JSON cache and XML export readers
//! - [`archive`] - Zip bundling of generated dictionaries
//! - [`config`] - Languages, directories and KDL configuration
//! - [`pipeline`] - Per-language orchestration

pub mod archive;
pub mod assemble;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod normalize;
pub mod otm;
pub mod pipeline;
pub mod raw;
pub mod relations;
pub mod source;
pub mod tweak;
