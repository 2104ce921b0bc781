use anyhow::Context;
use clap::Parser;
use coursepath::{Config, RuleSet, domain::Strategy};
use serde::Serialize;
use tracing::instrument;

use super::{OutputFormat, print_json, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "List the names of all requirements")]
pub struct Requirements {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Entry<'a> {
    name: &'a str,
    kind: &'a str,
    supported: bool,
}

impl Requirements {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        // Only the rules are needed; the catalog is never opened.
        let rules = RuleSet::load(&config.rules)
            .with_context(|| format!("failed to load rules from {}", config.rules.display()))?;

        let entries: Vec<_> = rules
            .iter()
            .map(|rule| Entry {
                name: rule.name(),
                kind: rule.strategy().kind(),
                supported: !matches!(rule.strategy(), Strategy::Unknown { .. }),
            })
            .collect();

        match self.output {
            OutputFormat::Json => print_json(&entries)?,
            OutputFormat::Table => {
                if entries.is_empty() {
                    println!("No requirements defined in {}.", config.rules.display());
                }
                for entry in &entries {
                    if entry.supported {
                        println!("{} {}", entry.name, format!("({})", entry.kind).dim());
                    } else {
                        println!(
                            "{} {}",
                            entry.name,
                            format!("({}: never satisfied)", entry.kind).warning()
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
