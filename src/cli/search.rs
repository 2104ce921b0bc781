use clap::Parser;
use coursepath::{Config, Course, CourseCode, Filter, Service};
use tracing::instrument;

use super::{
    OutputFormat, open_service, print_json,
    terminal::{Colorize, is_narrow, truncate},
};

#[derive(Debug, Parser)]
#[command(about = "Search the catalog")]
pub struct Search {
    /// Course code, e.g. COP3503 (case-insensitive, exact)
    #[arg(long)]
    code: Option<String>,

    /// Instructor name (case-insensitive, exact)
    #[arg(long)]
    instructor: Option<String>,

    /// Name of a requirement the course must satisfy
    #[arg(long)]
    requirement: Option<String>,

    /// Maximum number of results (overrides the configuration file)
    #[arg(long)]
    limit: Option<usize>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Search {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(limit) = self.limit {
            config.set_search_limit(limit);
        }
        let service = open_service(&config)?;

        let filter = Filter::from_params(self.code, self.instructor, self.requirement);
        let results = search(&service, &filter)?;
        tracing::debug!(?filter, matches = results.len(), "search complete");

        match self.output {
            OutputFormat::Json => print_json(&results)?,
            OutputFormat::Table => print_table(&results),
        }
        Ok(())
    }
}

fn search<'a>(service: &'a Service, filter: &Filter) -> anyhow::Result<Vec<&'a Course>> {
    service.search(filter).map_err(|unknown| {
        anyhow::anyhow!(
            "Bad request: {unknown}. Run 'coursepath requirements' to list valid names."
        )
    })
}

fn print_table(results: &[&Course]) {
    if results.is_empty() {
        println!("No matching courses.");
        return;
    }

    if is_narrow() {
        for course in results {
            println!("{}", course.to_string().emphasis());
            let instructors = instructor_list(course);
            if !instructors.is_empty() {
                println!("  {}", instructors.dim());
            }
        }
        return;
    }

    println!(
        "{:<9} {:<8} {:<36} {:>4}  Instructors",
        "Code", "ID", "Name", "Secs"
    );
    for course in results {
        let code = course.code.as_ref().map_or("-", CourseCode::as_str);
        let id = id_cell(course.course_id);
        let name = truncate(course.name.as_deref().unwrap_or(""), 36);
        println!(
            "{} {id:<8} {name:<36} {:>4}  {}",
            format!("{code:<9}").emphasis(),
            course.sections.len(),
            truncate(&instructor_list(course), 40).dim()
        );
    }
}

fn id_cell(course_id: Option<u64>) -> String {
    course_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

/// Distinct instructor names, in first-seen order.
fn instructor_list(course: &Course) -> String {
    let mut names: Vec<&str> = Vec::new();
    for name in course.instructors() {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names.join(", ")
}
