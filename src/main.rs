//! Command-line interface for querying a course catalog snapshot against
//! degree requirement rules.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
