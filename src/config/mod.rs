//! Tool configuration.
//!
//! Settings come from four tiers, merged field by field:
//! 1. **Defaults** - built in
//! 2. **Project** - `./yamltree.yaml`
//! 3. **User** - `~/.yamltree/yamltree.yaml`
//! 4. **Environment** - `YAMLTREE_*` variables
//!
//! ## Environment Variables
//! - `YAMLTREE_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `YAMLTREE_PROJECT_DIR` - Project config dir (default: `.`)
//! - `YAMLTREE_USER_DIR` - User config dir (default: `~/.yamltree`)
//! - `YAMLTREE_BASE_DIR` - Directory relative `extends` files resolve against
//! - `YAMLTREE_UNRESOLVED` - `empty`, `keep` or `error`
//! - `YAMLTREE_FORMAT` - `yaml` or `json`

mod loader;
mod types;

pub use loader::{CONFIG_FILE, ConfigLoader, ConfigPaths, ConfigTier};
pub use types::*;
