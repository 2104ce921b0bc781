use std::process;

use anyhow::Context;
use clap::Parser;
use coursepath::{Config, Diagnostic, storage::snapshot};
use tracing::instrument;

use super::{
    OutputFormat, print_json,
    terminal::{Colorize, is_narrow, truncate},
};

#[derive(Debug, Parser)]
#[command(about = "Load the catalog snapshot and report dropped records")]
pub struct Validate {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Validate {
    /// Exits with status 2 when any record was dropped.
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let load = snapshot::load(&config.catalog).with_context(|| {
            format!("failed to load catalog {}", config.catalog.display())
        })?;

        match self.output {
            OutputFormat::Json => print_json(&load.diagnostics)?,
            OutputFormat::Table => {
                println!(
                    "Loaded {} courses from {}",
                    load.catalog.len(),
                    config.catalog.display()
                );
                if load.diagnostics.is_empty() {
                    println!("{}", "No records dropped.".success());
                } else {
                    println!(
                        "{} records dropped:",
                        load.diagnostics.len().to_string().warning()
                    );
                    for diagnostic in &load.diagnostics {
                        print_diagnostic(diagnostic);
                    }
                }
            }
        }

        if !load.diagnostics.is_empty() {
            process::exit(2);
        }
        Ok(())
    }
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    println!(
        "  {:<8} {} {}",
        diagnostic.level,
        diagnostic.location.as_str().emphasis(),
        diagnostic.reason
    );
    if !is_narrow() {
        let fragment = diagnostic.fragment.to_string();
        println!("           {}", truncate(&fragment, 100).dim());
    }
}
