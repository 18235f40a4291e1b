//! Nested YAML configuration builder.
//!
//! Combines a primary document with the documents it `extends`, deep-merging
//! their contents and substituting `${VAR}` placeholders from layered
//! environments.
//!
//! ```no_run
//! use yamltree::{load, find_default, Resolver};
//!
//! let root = load("services.yml")?;
//! let web = Resolver::new().select(&root, "services/web")?;
//! let image = find_default(&web, "image", "nginx")?;
//! # Ok::<(), yamltree::Error>(())
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod merge;
pub mod node;
pub mod path;
pub mod resolve;
pub mod source;
pub mod template;

pub use codec::{dump, dump_to, export, load, load_raw};
pub use error::{Error, ErrorCode, Result};
pub use merge::{merge, merge_all, merge_mapping};
pub use node::{Mapping, Node, Scalar};
pub use path::{find, find_default, find_default_int, find_mut};
pub use resolve::{ENV_KEY, EXTENDS_KEY, ExtendsEntry, Resolver, select};
pub use source::{DocumentSource, FsSource, MemorySource};
pub use template::{Env, ProcessEnv, Substituter, UnresolvedPolicy, substitute, templatize};
