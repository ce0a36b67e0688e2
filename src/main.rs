use anyhow::Context as _;
use clap::Parser;
use cnform::{cnf, grammar::Grammar};
use std::{path::PathBuf, time::Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Only report whether the input grammar is already in CNF.
    #[arg(long)]
    check: bool,

    /// The path of the grammar definition file.
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    process_file(&args)
        .with_context(|| anyhow::anyhow!("errored during processing {}", args.input.display()))?;

    Ok(())
}

fn process_file(args: &Args) -> anyhow::Result<()> {
    let s = Instant::now();
    let grammar = Grammar::from_file(&args.input) //
        .context("failed to load the grammar definition")?;
    tracing::info!("from_file: {:?} elapsed", s.elapsed());

    if args.check {
        println!(
            "the grammar is {}in Chomsky normal form",
            if cnf::is_cnf(&grammar) { "" } else { "NOT " }
        );
        return Ok(());
    }

    println!("## input grammar\n\n{}", grammar);

    let s = Instant::now();
    let normalized = cnf::normalize(grammar);
    tracing::info!("normalize: {:?} elapsed", s.elapsed());

    println!("## normalized grammar\n\n{}", normalized);

    Ok(())
}
