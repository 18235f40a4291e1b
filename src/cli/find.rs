//! Find subcommand: print the value at a path.

use crate::codec::load;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::path::{find_default, find_default_int, require};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the find subcommand
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Document to search
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Slash-delimited path, e.g. `b/e/f`
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Value printed when the path is absent
    #[arg(short, long)]
    pub default: Option<String>,

    /// Only accept integers; anything else falls back to the default
    #[arg(long, requires = "default")]
    pub int: bool,
}

/// Run the find command.
pub fn run_find(args: &FindArgs) -> Result<Node> {
    let root = load(&args.file)?;
    lookup(&root, args)
}

fn lookup(root: &Node, args: &FindArgs) -> Result<Node> {
    match (&args.default, args.int) {
        (Some(default), true) => {
            let default = default
                .parse::<i64>()
                .map_err(|_| Error::config(format!("--default '{}' is not an integer", default)))?;
            Ok(Node::int(find_default_int(root, &args.path, default)))
        }
        (Some(default), false) => Ok(Node::string(find_default(root, &args.path, default)?)),
        (None, _) => require(root, &args.path).cloned(),
    }
}
