use clap::Parser;
use coursepath::{Config, CourseCode};
use serde_json::json;
use tracing::instrument;

use super::{OutputFormat, open_service, print_json, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Show the requirements satisfied by a course")]
pub struct Fulfilled {
    /// Course code, e.g. HUM2020
    code: String,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Fulfilled {
    #[instrument(level = "debug", skip(self, config), fields(code = %self.code))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let code = CourseCode::parse_lenient(&self.code)?;
        let service = open_service(config)?;
        let matches = service.fulfilled_by_code(&code);

        if matches.is_empty() {
            anyhow::bail!("No course with code {code} in {}", config.catalog.display());
        }

        match self.output {
            OutputFormat::Json => {
                let entries: Vec<_> = matches
                    .iter()
                    .map(|(course, requirements)| {
                        json!({
                            "code": course.code,
                            "courseId": course.course_id,
                            "name": course.name,
                            "requirements": requirements,
                        })
                    })
                    .collect();
                print_json(&entries)?;
            }
            OutputFormat::Table => {
                for (course, requirements) in &matches {
                    println!("{}", course.to_string().emphasis());
                    if requirements.is_empty() {
                        println!("  {}", "satisfies no requirements".dim());
                    }
                    for name in requirements {
                        println!("  {} {name}", "✓".success());
                    }
                }
            }
        }
        Ok(())
    }
}
