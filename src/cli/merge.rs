//! Merge subcommand: fold overlay documents into a base document.

use crate::codec::load;
use crate::error::Result;
use crate::merge::merge_mapping;
use crate::node::Node;
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

/// Arguments for the merge subcommand
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Base document; its values win unless --override is given
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// Documents merged into the base, in order
    #[arg(value_name = "OVERLAY", required = true)]
    pub overlays: Vec<PathBuf>,

    /// Let overlay scalars replace differing base scalars
    #[arg(long = "override")]
    pub override_existing: bool,
}

/// Run the merge command.
pub fn run_merge(args: &MergeArgs) -> Result<Node> {
    let mut merged = load(&args.base)?;
    for overlay in &args.overlays {
        let src = load(overlay)?;
        debug!(overlay = %overlay.display(), "Merging document");
        merge_mapping(
            merged.try_mapping_mut("base")?,
            src.try_mapping("overlay")?,
            args.override_existing,
        )?;
    }
    Ok(merged)
}
