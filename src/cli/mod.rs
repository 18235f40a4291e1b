//! CLI command definitions for yamltree
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod find;
pub mod merge;
pub mod select;
pub mod templatize;

use crate::format::OutputFormat;
use crate::template::UnresolvedPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use find::FindArgs;
use merge::MergeArgs;
use select::SelectArgs;
use std::path::PathBuf;
use templatize::TemplatizeArgs;

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Unresolved-placeholder policy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnresolvedArg {
    /// Replace with the empty string
    Empty,
    /// Leave the placeholder in place
    Keep,
    /// Fail the command
    Error,
}

impl From<UnresolvedArg> for UnresolvedPolicy {
    fn from(value: UnresolvedArg) -> Self {
        match value {
            UnresolvedArg::Empty => UnresolvedPolicy::Empty,
            UnresolvedArg::Keep => UnresolvedPolicy::Keep,
            UnresolvedArg::Error => UnresolvedPolicy::Error,
        }
    }
}

/// Nested YAML configuration builder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<FormatArg>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// How to treat ${NAME} placeholders nothing resolves (overrides config)
    #[arg(long, value_enum, global = true)]
    pub unresolved: Option<UnresolvedArg>,

    /// Do not let process environment variables override `_env` values
    #[arg(long, global = true)]
    pub no_os_env: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a node and everything it extends
    Select(SelectArgs),

    /// Print the value at a slash-delimited path
    Find(FindArgs),

    /// Deep-merge documents into the first one
    Merge(MergeArgs),

    /// Substitute ${NAME} placeholders using the document's environment
    Templatize(TemplatizeArgs),
}
