//! Inheritance resolution through `extends` links.
//!
//! `select(root, path)` copies the node at `path` and folds every document it
//! extends into it, transitively:
//!
//! ```yaml
//! service:
//!   extends:
//!     file: base.yml      # required
//!     service: defaults   # optional path inside base.yml
//!     path: nested        # optional key to merge under
//! ```
//!
//! Entries are processed as a growing queue: extends found on a loaded
//! subtree are appended to the end, so the full graph is flattened breadth
//! first. Merging never overrides, so the selected node's own values and
//! earlier entries win over later ones, while sequences accumulate.
//!
//! Each queued entry remembers the `(file, service)` links it was reached
//! through. Meeting one of them again is a cycle and fails with
//! [`Error::CyclicExtends`]. Reaching the same base through two different
//! branches is not a cycle: the repeat is skipped, since merging it again
//! cannot change the result. Each distinct link is read once, so wide
//! diamond lattices resolve in linear work.

use crate::codec;
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::merge::merge_mapping_except;
use crate::node::{Mapping, Node};
use crate::path::{find, require};
use crate::source::{DocumentSource, FsSource};
use crate::template::{Env, ProcessEnv, Substituter, UnresolvedPolicy};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Reserved key holding a subtree's environment overrides.
pub const ENV_KEY: &str = "_env";
/// Reserved key holding one extends entry or a sequence of them.
pub const EXTENDS_KEY: &str = "extends";

/// A parsed `extends` entry after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendsEntry {
    pub file: String,
    pub service: Option<String>,
    pub path: Option<String>,
}

impl ExtendsEntry {
    /// Read the entry fields, substituting placeholders in each.
    fn parse(node: &Node, env: &Env, sub: &Substituter<'_>) -> Result<Self> {
        let mapping = node.try_mapping(EXTENDS_KEY)?;
        let file = optional_field(mapping, "file", env, sub)?
            .ok_or(Error::MissingFileReference)?;
        Ok(Self {
            file,
            service: optional_field(mapping, "service", env, sub)?,
            path: optional_field(mapping, "path", env, sub)?,
        })
    }

    fn link(&self, source: &impl DocumentSource) -> String {
        format!(
            "{}#{}",
            source.identity(&self.file),
            self.service.as_deref().unwrap_or("")
        )
    }
}

/// A string field of an entry; null, missing and empty all mean unset.
fn optional_field(
    mapping: &Mapping,
    field: &str,
    env: &Env,
    sub: &Substituter<'_>,
) -> Result<Option<String>> {
    let value = match mapping.get(field) {
        None => return Ok(None),
        Some(node) if node.is_null() => return Ok(None),
        Some(node) => node.try_str(&format!("{}/{}", EXTENDS_KEY, field))?,
    };
    let value = sub.substitute(value, env)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// The `extends` entries declared directly on `node`.
pub fn extends_entries(node: &Node) -> Result<Vec<Node>> {
    match find(node, EXTENDS_KEY) {
        None => Ok(Vec::new()),
        Some(entry @ Node::Mapping(_)) => Ok(vec![entry.clone()]),
        Some(Node::Sequence(items)) => items
            .iter()
            .map(|item| {
                item.try_mapping(EXTENDS_KEY)?;
                Ok(item.clone())
            })
            .collect(),
        Some(other) => Err(Error::type_mismatch(
            EXTENDS_KEY,
            "mapping or sequence",
            other.kind(),
        )),
    }
}

/// A queued entry with the chain of links that led to it.
#[derive(Debug, Clone)]
struct Pending {
    entry: Node,
    chain: Vec<String>,
}

/// Resolves `extends` chains against a document source.
#[derive(Debug, Clone)]
pub struct Resolver<S = FsSource> {
    source: S,
    vars: ProcessEnv,
    policy: UnresolvedPolicy,
}

impl Default for Resolver<FsSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver<FsSource> {
    /// Filesystem resolver with an empty process layer.
    pub fn new() -> Self {
        Self::with_source(FsSource::new())
    }

    /// Build a filesystem resolver from tool configuration.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let source = match &config.base_dir {
            Some(dir) => FsSource::with_base_dir(dir),
            None => FsSource::new(),
        };
        let vars = if config.inherit_os_env {
            ProcessEnv::from_os()
        } else {
            ProcessEnv::new()
        };
        Self::with_source(source)
            .with_process_env(vars)
            .with_policy(config.unresolved)
    }
}

impl<S: DocumentSource> Resolver<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            vars: ProcessEnv::new(),
            policy: UnresolvedPolicy::default(),
        }
    }

    /// Replace the process layer.
    pub fn with_process_env(mut self, vars: ProcessEnv) -> Self {
        self.vars = vars;
        self
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The process layer, including values seeded by earlier `select` calls.
    pub fn process_env(&self) -> &ProcessEnv {
        &self.vars
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve the node at `path` in `root` with all its `extends`.
    ///
    /// Stops at the first error. Variables seeded into the process layer
    /// before the failure stay seeded.
    pub fn select(&mut self, root: &Node, path: &str) -> Result<Node> {
        let parent_env = find(root, ENV_KEY).map(Env::from_node).transpose()?;
        if let Some(env) = &parent_env {
            self.vars.seed(env);
        }
        let entry_env = parent_env.clone().unwrap_or_default();

        let mut elem = require(root, path)?.clone();
        elem.try_mapping(path)?;

        let mut worklist: Vec<Pending> = extends_entries(&elem)?
            .into_iter()
            .map(|entry| Pending {
                entry,
                chain: Vec::new(),
            })
            .collect();

        let mut merged: HashSet<(String, Option<String>)> = HashSet::new();
        let mut index = 0;
        while index < worklist.len() {
            let Pending { entry, mut chain } = worklist[index].clone();
            index += 1;

            let entry = {
                let sub = Substituter::new(&self.vars).with_policy(self.policy);
                ExtendsEntry::parse(&entry, &entry_env, &sub)?
            };

            let link = entry.link(&self.source);
            if chain.contains(&link) {
                chain.push(link);
                return Err(Error::CyclicExtends { chain });
            }
            chain.push(link.clone());

            if !merged.insert((link, entry.path.clone())) {
                debug!(file = %entry.file, "Skipping already merged extends entry");
                continue;
            }

            debug!(
                target_path = path,
                file = %entry.file,
                service = entry.service.as_deref().unwrap_or(""),
                nest = entry.path.as_deref().unwrap_or(""),
                depth = chain.len(),
                "Processing extends entry"
            );

            let data = self.source.read(&entry.file)?;
            let document = codec::decode(&data, Some(Path::new(&entry.file)))?;

            let mut es = match &entry.service {
                Some(service) => find(&document, service)
                    .cloned()
                    .ok_or_else(|| Error::service_not_found(service, &entry.file))?,
                None => document.clone(),
            };
            es.try_mapping(entry.service.as_deref().unwrap_or(&entry.file))?;

            for inherited in extends_entries(&es)? {
                worklist.push(Pending {
                    entry: inherited,
                    chain: chain.clone(),
                });
            }

            // Child document env first, parent env on top.
            let mut env = find(&document, ENV_KEY)
                .map(Env::from_node)
                .transpose()?
                .unwrap_or_default();
            self.vars.seed(&env);
            if let Some(parent) = &parent_env {
                env.overlay(parent);
            }

            let sub = Substituter::new(&self.vars).with_policy(self.policy);
            sub.templatize(&mut es, &env)?;

            let src = es.try_mapping(&entry.file)?;
            let target = merge_target(&mut elem, entry.path.as_deref())?;
            merge_mapping_except(target, src, &[EXTENDS_KEY], false)?;

            sub.templatize(&mut elem, &env)?;
        }

        Ok(elem)
    }
}

/// The mapping an entry merges into: `elem` itself or `elem[nest]`.
fn merge_target<'a>(elem: &'a mut Node, nest: Option<&str>) -> Result<&'a mut Mapping> {
    let mapping = elem.try_mapping_mut("select")?;
    let Some(key) = nest else {
        return Ok(mapping);
    };
    let slot = mapping.entry(key.to_string()).or_insert_with(Node::mapping);
    let found = slot.kind();
    slot.as_mapping_mut()
        .ok_or_else(|| Error::merge_conflict(key, found))
}

/// Resolve `path` in `root` from the filesystem with default settings and an
/// empty process layer.
pub fn select(root: &Node, path: &str) -> Result<Node> {
    Resolver::new().select(root, path)
}
