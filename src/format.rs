//! Output formatting for resolved trees.

use crate::error::{Error, Result};
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// Output format for printed trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Render a node in the given format.
///
/// Scalars print bare (no document markers or quotes) so that `find` output
/// can be used directly in shell scripts.
pub fn render(node: &Node, format: OutputFormat) -> Result<String> {
    if let Node::Scalar(s) = node
        && format == OutputFormat::Yaml
    {
        return Ok(format!("{}\n", s.render()));
    }
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(node).map_err(Error::encode),
        OutputFormat::Json => serde_json::to_string_pretty(node)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(Error::encode),
    }
}
