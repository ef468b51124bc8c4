// src/main.rs

use anyhow::Result;
use clap::Parser;
use modgen::config::GeneratorConfig;
use modgen::epoch::{EpochSource, FixedEpoch, RpmQuery};
use modgen::{generate, validate};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "modgen")]
#[command(author, version, about = "Generate modulemd stream metadata for an RPM driver repository", long_about = None)]
struct Cli {
    /// Directory containing the pre-built rpm files
    repodir: PathBuf,

    /// Output file; the document is printed to stdout when omitted
    outfile: Option<PathBuf>,

    /// TOML file overriding the built-in package lists and thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the rpm epoch query and assume this epoch for every artifact
    #[arg(long, value_name = "EPOCH")]
    assume_epoch: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    let epoch_source: Box<dyn EpochSource> = match cli.assume_epoch {
        Some(epoch) => Box::new(FixedEpoch::new(epoch)),
        None => Box::new(RpmQuery),
    };

    info!("Generating module metadata for {}", cli.repodir.display());
    let document = generate::generate(
        &config,
        &cli.repodir,
        epoch_source.as_ref(),
        generate::run_stamp(),
    )?;

    match &cli.outfile {
        Some(path) => {
            fs::write(path, &document).map_err(|e| modgen::Error::Io {
                path: path.clone(),
                source: e,
            })?;
            println!(
                "Wrote module metadata for {} to {}",
                config.module_name,
                path.display()
            );
            validate::validate_modulemd(path);
        }
        None => print!("{document}"),
    }

    Ok(())
}
