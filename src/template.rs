//! `${NAME}` placeholder substitution.
//!
//! A placeholder resolves, in order, from:
//! 1. the process layer ([`ProcessEnv`]) if the name is set there and non-empty,
//! 2. the environment map passed with the call (an `_env` block),
//! 3. the [`UnresolvedPolicy`].
//!
//! The process layer is an explicit value. It is only seeded from the real
//! process environment at the outermost boundary ([`ProcessEnv::from_os`]).

use crate::error::{Error, Result};
use crate::node::{Node, Scalar};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

/// Captures everything inside `${...}`.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid")
});

/// What to do with a placeholder nothing resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Replace with the empty string.
    #[default]
    Empty,
    /// Leave `${NAME}` in place.
    Keep,
    /// Fail with `UnresolvedVariable`.
    Error,
}

impl UnresolvedPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "empty" => Some(Self::Empty),
            "keep" => Some(Self::Keep),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Variable name to value, as read from an `_env` block.
///
/// Entries holding a mapping or sequence have no string form. They are kept
/// aside and only fail when a placeholder actually names them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
    nested: BTreeMap<String, &'static str>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an `_env` mapping. Scalars are rendered to strings.
    pub fn from_node(node: &Node) -> Result<Self> {
        let mapping = node.try_mapping("_env")?;
        let mut env = Self::new();
        for (name, value) in mapping {
            match value {
                Node::Scalar(s) => {
                    env.vars.insert(name.clone(), s.render());
                }
                other => {
                    debug!(name, kind = other.kind(), "Deferring non-scalar _env entry");
                    env.nested.insert(name.clone(), other.kind());
                }
            }
        }
        Ok(env)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Value for `name`, or a `TypeMismatch` if the entry is not a scalar.
    pub fn lookup(&self, name: &str) -> Result<Option<&str>> {
        if let Some(found) = self.nested.get(name) {
            return Err(Error::type_mismatch(
                &format!("_env/{}", name),
                "scalar",
                found,
            ));
        }
        Ok(self.get(name))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.nested.remove(&name);
        self.vars.insert(name, value.into());
    }

    /// Copy every entry of `other` over this one; `other` wins.
    pub fn overlay(&mut self, other: &Env) {
        for (k, v) in &other.vars {
            self.insert(k.clone(), v.clone());
        }
        for (k, kind) in &other.nested {
            self.vars.remove(k);
            self.nested.insert(k.clone(), *kind);
        }
    }

    /// Scalar entries only.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.nested.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len() + self.nested.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Env {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            nested: BTreeMap::new(),
        }
    }
}

/// Highest-precedence variable layer, standing in for the process environment.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnv {
    vars: HashMap<String, String>,
}

impl ProcessEnv {
    /// An empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the real process environment.
    pub fn from_os() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Value for `name` if set and non-empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Set `name` only if it is not set yet. Returns whether it was inserted.
    pub fn set_if_absent(&mut self, name: &str, value: &str) -> bool {
        if self.vars.contains_key(name) {
            return false;
        }
        self.vars.insert(name.to_string(), value.to_string());
        true
    }

    /// Seed every entry of `env`, first set wins.
    pub fn seed(&mut self, env: &Env) {
        for (name, value) in env.iter() {
            if self.set_if_absent(name, value) {
                trace!(name, "Seeded variable");
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProcessEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Placeholder rewriter bound to a process layer and a policy.
#[derive(Debug, Clone, Copy)]
pub struct Substituter<'a> {
    vars: &'a ProcessEnv,
    policy: UnresolvedPolicy,
}

impl<'a> Substituter<'a> {
    pub fn new(vars: &'a ProcessEnv) -> Self {
        Self {
            vars,
            policy: UnresolvedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rewrite every `${NAME}` in `value`.
    pub fn substitute(&self, value: &str, env: &Env) -> Result<String> {
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(value) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&value[last..whole.start()]);
            last = whole.end();

            let name = name.as_str();
            let found = match self.vars.get(name) {
                Some(v) => Some(v),
                None => env.lookup(name)?,
            };
            if let Some(v) = found {
                trace!(name, "Resolved placeholder");
                out.push_str(v);
                continue;
            }
            match self.policy {
                UnresolvedPolicy::Empty => {
                    warn!(name, "Unresolved placeholder replaced with empty string");
                }
                UnresolvedPolicy::Keep => out.push_str(whole.as_str()),
                UnresolvedPolicy::Error => {
                    return Err(Error::UnresolvedVariable {
                        name: name.to_string(),
                    });
                }
            }
        }
        out.push_str(&value[last..]);
        Ok(out)
    }

    /// Substitute every string scalar in `node`, recursing through mappings
    /// and sequences. Keys are left alone.
    pub fn templatize(&self, node: &mut Node, env: &Env) -> Result<()> {
        match node {
            Node::Scalar(Scalar::String(s)) => {
                if s.contains("${") {
                    *s = self.substitute(s.as_str(), env)?;
                }
            }
            Node::Scalar(_) => {}
            Node::Mapping(m) => {
                for value in m.values_mut() {
                    self.templatize(value, env)?;
                }
            }
            Node::Sequence(items) => {
                for item in items.iter_mut() {
                    self.templatize(item, env)?;
                }
            }
        }
        Ok(())
    }
}

/// [`Substituter::substitute`] with the default policy.
pub fn substitute(value: &str, env: &Env, vars: &ProcessEnv) -> Result<String> {
    Substituter::new(vars).substitute(value, env)
}

/// [`Substituter::templatize`] with the default policy.
pub fn templatize(node: &mut Node, env: &Env, vars: &ProcessEnv) -> Result<()> {
    Substituter::new(vars).templatize(node, env)
}
