//! Configuration types for the `yamltree` tool.

use crate::format::OutputFormat;
use crate::template::UnresolvedPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings that shape `extends` resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Directory relative `file` references resolve against.
    /// When unset the CLI uses the directory of the primary document.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// What happens to `${NAME}` placeholders nothing resolves.
    #[serde(default)]
    pub unresolved: UnresolvedPolicy,

    /// Seed the highest-precedence variable layer from the process environment.
    #[serde(default = "default_inherit_os_env")]
    pub inherit_os_env: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            unresolved: UnresolvedPolicy::default(),
            inherit_os_env: default_inherit_os_env(),
        }
    }
}

fn default_inherit_os_env() -> bool {
    true
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("resolver:\n  unresolved: keep\n").unwrap();
        assert_eq!(config.resolver.unresolved, UnresolvedPolicy::Keep);
        assert!(config.resolver.inherit_os_env);
        assert_eq!(config.resolver.base_dir, None);
        assert_eq!(config.output.format, OutputFormat::Yaml);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }
}
