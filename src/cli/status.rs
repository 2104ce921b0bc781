use clap::Parser;
use coursepath::Config;
use serde_json::json;
use tracing::instrument;

use super::{
    OutputFormat, open_service, print_json,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show catalog and rule statistics")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Status {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let service = open_service(config)?;
        let catalog = service.catalog();
        let summary = catalog.summary();
        let dropped = service.diagnostics().len();

        match self.output {
            OutputFormat::Json => print_json(&json!({
                "term": config.term,
                "catalog": config.catalog,
                "rules": config.rules,
                "fingerprint": catalog.fingerprint(),
                "summary": summary,
                "requirements": service.rules().len(),
                "dropped_records": dropped,
            }))?,
            OutputFormat::Table => {
                if catalog.is_empty() {
                    println!(
                        "No courses found in {}. Check the `catalog` path in your configuration.",
                        config.catalog.display()
                    );
                    return Ok(());
                }

                println!("{}", format!("Term {}", config.term).emphasis());
                println!("{}", "─────────".dim());
                println!("Courses        {}", summary.courses);
                println!("Unique IDs     {}", summary.unique_ids);
                println!("Sections       {}", summary.sections);
                println!("Prerequisites  {}", summary.with_prerequisites);
                println!("Departments    {}", summary.departments.len());
                println!("Requirements   {}", service.rules().len());
                if !is_narrow() {
                    println!("Fingerprint    {}", catalog.fingerprint().dim());
                }
                println!();

                if summary.duplicate_ids > 0 {
                    println!(
                        "Duplicate course IDs: {}",
                        summary.duplicate_ids.to_string().warning()
                    );
                }
                if dropped == 0 {
                    println!("Dropped records: {}", "0".success());
                } else {
                    println!("Dropped records: {}", dropped.to_string().warning());
                    println!("{}", "Run 'coursepath validate' to see them.".dim());
                }
            }
        }

        Ok(())
    }
}
