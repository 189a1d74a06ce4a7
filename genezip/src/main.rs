mod cli;

use anyhow::{Context, Result};
use classifier::{Classifier, read_manifest};
use clap::Parser;
use cli::Cli;
use std::fs::File;
use std::io::BufWriter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    tracing::info!("GeneZip, v{}", env!("CARGO_PKG_VERSION"));

    let output = File::create(&cli.output)
        .with_context(|| format!("cannot create output file {}", cli.output.display()))?;
    let mut output = BufWriter::new(output);

    tracing::info!("training");
    let mut classifier = Classifier::new(cli.max_depth);
    classifier.batch_add(&cli.training_manifest)?;

    let queries = read_manifest(&cli.query_manifest)?;

    tracing::info!(models = classifier.len(), "predicting");
    classifier.print_header(&mut output)?;
    for (name, path) in &queries {
        classifier.predict(name, path, &mut output)?;
    }

    tracing::info!("done");
    classifier.print_stats(&mut std::io::stderr())?;

    Ok(())
}
