//! yamltree
//!
//! Builds an effective configuration tree from YAML documents linked through
//! `extends`, with deep merging and `${VAR}` substitution.

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{Level, debug, warn};
use tracing_subscriber::FmtSubscriber;
use yamltree::cli::find::run_find;
use yamltree::cli::merge::run_merge;
use yamltree::cli::select::run_select;
use yamltree::cli::templatize::run_templatize;
use yamltree::cli::{Cli, Command};
use yamltree::config::{Config, ConfigLoader};
use yamltree::error::ErrorReport;
use yamltree::format::render;

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::load()?,
    };
    for source in loader.sources() {
        debug!(path = %source.display(), "Using config file");
    }
    let mut config = loader.into_config();

    // Override from CLI arguments
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if let Some(policy) = cli.unresolved {
        config.resolver.unresolved = policy.into();
    }
    if cli.no_os_env {
        config.resolver.inherit_os_env = false;
    }
    Ok(config)
}

fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    let config = load_config(&cli)?;

    let result = match &cli.command {
        Command::Select(args) => run_select(args, &config.resolver),
        Command::Find(args) => run_find(args),
        Command::Merge(args) => run_merge(args),
        Command::Templatize(args) => run_templatize(args, &config.resolver),
    };

    match result.and_then(|node| render(&node, config.output.format)) {
        Ok(text) => write_output(&text, cli.output.as_deref()),
        Err(e) => {
            warn!(code = ?e.code(), error = %e, "Command failed");
            let report = ErrorReport::from(&e);
            let json = serde_json::to_string(&report)
                .unwrap_or_else(|_| format!("{{\"message\": {:?}}}", e.to_string()));
            eprintln!("{}", json);
            std::process::exit(1);
        }
    }
}
