use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable findings with call paths
    Terminal,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(name = "replaycheck")]
#[command(about = "Determinism-compliance analyzer for Go durable-workflow code", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a file or directory for workflow determinism violations
    Analyze {
        /// File or directory to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rule file (YAML); replaces the built-in rule set
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Glob patterns to exclude from the scan
        #[arg(long, value_delimiter = ',')]
        ignore: Option<Vec<String>>,

        /// Also analyze _test.go files
        #[arg(long)]
        include_tests: bool,

        /// Exit successfully even when error-severity issues are found
        #[arg(long)]
        no_fail: bool,
    },
}
