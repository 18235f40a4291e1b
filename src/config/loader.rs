//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and folds them with the crate's own
//! deep merge, later tiers overriding scalars of earlier ones.

use super::types::Config;
use crate::codec;
use crate::error::{Error, Result};
use crate::format::OutputFormat;
use crate::merge::merge_all;
use crate::node::Node;
use crate::template::UnresolvedPolicy;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the project and user configuration.
pub const CONFIG_FILE: &str = "yamltree.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config (`./yamltree.yaml`)
    Project = 1,
    /// User-level config (`~/.yamltree/yamltree.yaml`)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for each configuration tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: YAMLTREE_USER_DIR or ~/.yamltree
        let user_dir = std::env::var("YAMLTREE_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".yamltree")));

        // Project dir: YAMLTREE_PROJECT_DIR or $CWD
        let project_dir = std::env::var("YAMLTREE_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(".")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn tier_files(&self) -> Vec<(ConfigTier, PathBuf)> {
        let mut files = Vec::new();
        if let Some(ref dir) = self.project_dir {
            files.push((ConfigTier::Project, dir.join(CONFIG_FILE)));
        }
        if let Some(ref dir) = self.user_dir {
            files.push((ConfigTier::User, dir.join(CONFIG_FILE)));
        }
        files
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest tier first
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    ///
    /// `YAMLTREE_CONFIG_PATH` names an explicit file that replaces the
    /// project and user tiers.
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = std::env::var("YAMLTREE_CONFIG_PATH") {
            return Self::load_file(explicit);
        }
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load defaults, one explicit file, then environment overrides.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let documents = vec![defaults_node()?, codec::load(path)?];
        let mut config = into_config(merge_all(documents)?)?;
        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths: ConfigPaths::with_dirs(None, None),
            config,
            sources: vec![path.to_path_buf()],
        })
    }

    /// Load configuration with explicit tier directories.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut documents = vec![defaults_node()?];
        let mut sources = Vec::new();

        for (tier, file) in paths.tier_files() {
            if !file.exists() {
                continue;
            }
            match codec::load(&file) {
                Ok(node) => {
                    debug!(tier = %tier, path = %file.display(), "Loaded config tier");
                    documents.push(node);
                    sources.push(file);
                }
                Err(e) => {
                    warn!(tier = %tier, path = %file.display(), error = %e, "Skipping unreadable config file");
                }
            }
        }

        let mut config = into_config(merge_all(documents)?)?;
        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(base_dir) = std::env::var("YAMLTREE_BASE_DIR") {
            config.resolver.base_dir = Some(PathBuf::from(base_dir));
        }

        if let Ok(policy) = std::env::var("YAMLTREE_UNRESOLVED") {
            match UnresolvedPolicy::from_str(&policy) {
                Some(policy) => config.resolver.unresolved = policy,
                None => warn!(value = %policy, "Ignoring invalid YAMLTREE_UNRESOLVED"),
            }
        }

        if let Ok(format) = std::env::var("YAMLTREE_FORMAT") {
            match OutputFormat::from_str(&format) {
                Some(format) => config.output.format = format,
                None => warn!(value = %format, "Ignoring invalid YAMLTREE_FORMAT"),
            }
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

fn defaults_node() -> Result<Node> {
    let value = serde_yaml::to_value(Config::default()).map_err(|e| Error::config(e.to_string()))?;
    Ok(codec::from_yaml(value))
}

fn into_config(node: Node) -> Result<Config> {
    let value = serde_yaml::to_value(&node).map_err(|e| Error::config(e.to_string()))?;
    serde_yaml::from_value(value).map_err(|e| Error::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths_discover() {
        let paths = ConfigPaths::discover();
        assert!(paths.project_dir.is_some());
        // user_dir may or may not exist depending on environment
    }

    #[test]
    fn test_load_defaults_only() {
        // Create empty temp dirs so no config files are found
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert!(config.resolver.inherit_os_env);
        assert_eq!(config.resolver.base_dir, None);
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_project_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("project");
        std::fs::create_dir_all(&project_dir).unwrap();

        let config_content = r#"
resolver:
  inherit_os_env: false
"#;
        std::fs::write(project_dir.join(CONFIG_FILE), config_content).unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(temp.path().join("user")));

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert!(!config.resolver.inherit_os_env);
        assert_eq!(config.resolver.unresolved, UnresolvedPolicy::Empty);
        assert_eq!(loader.sources().len(), 1);
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("project");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        let project_config = r#"
resolver:
  base_dir: /srv/project
  unresolved: keep
"#;
        std::fs::write(project_dir.join(CONFIG_FILE), project_config).unwrap();

        let user_config = r#"
resolver:
  unresolved: error
"#;
        std::fs::write(user_dir.join(CONFIG_FILE), user_config).unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir));

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert_eq!(config.resolver.unresolved, UnresolvedPolicy::Error);
        assert_eq!(config.resolver.base_dir, Some(PathBuf::from("/srv/project")));
    }

    #[test]
    fn test_broken_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE), "resolver: [unclosed\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(temp.path().to_path_buf()), None);
        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.config().resolver, ResolverConfig::default());
    }

    #[test]
    fn test_load_file_invalid_value_is_config_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("custom.yaml");
        std::fs::write(&file, "resolver:\n  unresolved: sometimes\n").unwrap();

        let err = ConfigLoader::load_file(&file).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
