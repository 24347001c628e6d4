use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert the jbovlaste Lojban lexicon to OTM-JSON")]
pub struct JbotmArgs {
    /// Slash-separated target languages, e.g. `en/ja`, or `top3`, `top5`, `all`
    pub langs: String,

    /// Link entries to the entries they reference
    #[arg(long = "addrelations")]
    pub add_relations: bool,

    /// Strip `$` markers from definitions and notes
    #[arg(long = "nodollar")]
    pub no_dollar: bool,

    /// Bundle the generated dictionaries into a zip archive
    #[arg(long)]
    pub zip: bool,

    /// Path to KDL config file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Relation worker count (overrides config)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Number of chunks the word list is split into for relations (overrides config)
    #[arg(long)]
    pub chunks: Option<usize>,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
