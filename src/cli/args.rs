//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

/// BizLens - Company analysis with strategy frameworks and sentiment monitoring
#[derive(Parser, Debug)]
#[command(name = "bizlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Run or inspect the sentiment monitor
    Monitor(MonitorArgs),

    /// Analyze one company and print the report
    Analyze(AnalyzeArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST, env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the monitor command
#[derive(Parser, Debug)]
pub struct MonitorArgs {
    #[command(subcommand)]
    pub action: MonitorAction,
}

/// Sentiment monitor actions
#[derive(Subcommand, Debug)]
pub enum MonitorAction {
    /// Run a single sweep and print its report
    Once,
    /// Sweep on the configured interval until Ctrl-C
    Run,
    /// List monitored companies
    List,
}

/// Arguments for the analyze command
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Company to analyze
    pub company: String,

    /// Print the full analysis as JSON instead of a text digest
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from(["bizlens", "analyze", "Acme Corp", "--json"]);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.company, "Acme Corp");
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_monitor_once() {
        let cli = Cli::parse_from(["bizlens", "-v", "monitor", "once"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Monitor(MonitorArgs {
                action: MonitorAction::Once
            })
        ));
    }
}
