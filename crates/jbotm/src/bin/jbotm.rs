use clap::Parser;
use jbotm::cli::JbotmArgs;
use jbotm::config::Config;
use jbotm::pipeline::{Generator, RunOptions};
use miette::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = JbotmArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut config = match &args.config {
        Some(path) => {
            tracing::debug!("Reading config from {:?}...", path);
            Config::load(path)?
        }
        None => Config::default(),
    };
    config.override_enrich(args.workers, args.chunks);

    let langs = config.resolve_languages(&args.langs)?;
    tracing::info!("Generating {}", langs.join(", "));

    Generator::from_config(config, RunOptions::from(&args))
        .run(&langs)
        .await?;

    println!("Success!");
    Ok(())
}
