//! Select subcommand: resolve a node and everything it extends.

use crate::codec::load;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::node::Node;
use crate::resolve::Resolver;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the select subcommand
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Primary document
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Slash-delimited path of the node to resolve, e.g. `services/web`
    #[arg(value_name = "PATH")]
    pub path: String,
}

/// Run the select command.
///
/// Relative `extends` files resolve against the configured base directory,
/// falling back to the directory holding the primary document.
pub fn run_select(args: &SelectArgs, config: &ResolverConfig) -> Result<Node> {
    let root = load(&args.file)?;

    let mut config = config.clone();
    if config.base_dir.is_none() {
        config.base_dir = args.file.parent().map(Path::to_path_buf);
    }

    let mut resolver = Resolver::from_config(&config);
    let resolved = resolver.select(&root, &args.path)?;
    info!(file = %args.file.display(), path = %args.path, "Resolved node");
    Ok(resolved)
}
