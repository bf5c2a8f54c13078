//! Command-line exporter from Spec-IR databases to ReqIF documents.

mod cli;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
