//! # Installation Contract Module
//!
//! The contract declares which paths the host will own in an installed copy
//! of the component:
//! - Declared paths: files, directories (`dir/`) and glob patterns
//! - Standalone check: a command proving the component runs on its own
//! - Hooks: host-overridable files with a declared fallback policy

pub mod loader;
pub mod model;
pub mod path;

pub use loader::{
    load_contract, parse_contract, ContractError, CONTRACT_FILE_NAME, SUPPORTED_SCHEMA_VERSION,
};
pub use model::{Contract, DeclaredPath, Fallback, FallbackError, Hook, PathKind};
pub use path::{has_glob_meta, normalize_declared_path, normalize_hook_path, PathError};
