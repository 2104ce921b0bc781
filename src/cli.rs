use std::path::PathBuf;

mod fulfilled;
mod requirements;
mod search;
mod status;
mod terminal;
mod validate;

use anyhow::Context;
use clap::ArgAction;
use coursepath::{Config, Service};
use fulfilled::Fulfilled;
use requirements::Requirements;
use search::Search;
use status::Status;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, default_value = "coursepath.toml", global = true)]
    config: PathBuf,

    /// Catalog snapshot to load (overrides the configuration file)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Requirement rules to load (overrides the configuration file)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let mut config = Config::load_or_default(&self.config)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        if let Some(catalog) = self.catalog {
            config.catalog = catalog;
        }
        if let Some(rules) = self.rules {
            config.rules = rules;
        }

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show catalog statistics (default)
    Status(Status),

    /// Search the catalog
    ///
    /// Filters are combined with AND. An omitted filter, or the literal value
    /// 'null', matches everything.
    Search(Search),

    /// List the names of all requirements
    Requirements(Requirements),

    /// Show the requirements satisfied by a course
    Fulfilled(Fulfilled),

    /// Load the catalog snapshot and report dropped records
    Validate(Validate),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(config),
            Self::Search(command) => command.run(config),
            Self::Requirements(command) => command.run(config),
            Self::Fulfilled(command) => command.run(config),
            Self::Validate(command) => command.run(config),
        }
    }
}

/// Output formats shared by every command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn open_service(config: &Config) -> anyhow::Result<Service> {
    Service::open(config).with_context(|| {
        format!(
            "failed to start with catalog {} and rules {}",
            config.catalog.display(),
            config.rules.display()
        )
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
