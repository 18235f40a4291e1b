//! Templatize subcommand: substitute placeholders in a single document.

use crate::codec::load;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::node::Node;
use crate::path::find;
use crate::template::{Env, ProcessEnv, Substituter};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the templatize subcommand
#[derive(Args, Debug)]
pub struct TemplatizeArgs {
    /// Document to rewrite
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Path of the environment block inside the document
    #[arg(long, default_value = "_env")]
    pub env_path: String,
}

/// Run the templatize command.
pub fn run_templatize(args: &TemplatizeArgs, config: &ResolverConfig) -> Result<Node> {
    let mut root = load(&args.file)?;
    let env = find(&root, &args.env_path)
        .map(Env::from_node)
        .transpose()?
        .unwrap_or_default();

    let vars = if config.inherit_os_env {
        ProcessEnv::from_os()
    } else {
        ProcessEnv::new()
    };
    Substituter::new(&vars)
        .with_policy(config.unresolved)
        .templatize(&mut root, &env)?;
    Ok(root)
}
