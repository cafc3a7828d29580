//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Routecov: route coverage from static route trees and runtime dumps
#[derive(Parser, Debug)]
#[command(name = "routecov")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Spaces per tree level in rendered trees
    #[arg(long, default_value_t = 2, global = true)]
    pub indent: usize,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report route coverage from runtime dumps
    Coverage(CoverageArgs),

    /// List discovered routes and their trees
    Routes(RoutesArgs),
}

/// Where and how to look for routes
#[derive(Args, Debug, Clone)]
pub struct DiscoveryArgs {
    /// Project base directory
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Comma-separated file patterns to include (name, glob or regex)
    #[arg(long)]
    pub includes: Option<String>,

    /// Comma-separated file patterns to exclude; excludes win over includes
    #[arg(long)]
    pub excludes: Option<String>,

    /// Also scan test sources and resources
    #[arg(long)]
    pub include_test: bool,

    /// Step catalog JSON file replacing the built-in catalog
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Source root relative to the base directory (repeatable)
    #[arg(long = "source-root")]
    pub source_roots: Vec<PathBuf>,

    /// Resource directory relative to the base directory (repeatable)
    #[arg(long = "resource-dir")]
    pub resource_dirs: Vec<PathBuf>,
}

/// Arguments for the coverage command
#[derive(Parser, Debug)]
pub struct CoverageArgs {
    /// Route discovery options
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Directory of runtime dumps, relative to the base directory
    #[arg(long, default_value = routecov::DEFAULT_DUMP_DIR)]
    pub dump_dir: PathBuf,

    /// Exit with an error when a route is not fully covered
    #[arg(long)]
    pub fail_on_error: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the routes command
#[derive(Parser, Debug)]
pub struct RoutesArgs {
    /// Route discovery options
    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: FormatArg,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
