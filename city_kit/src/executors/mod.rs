//! # Executors Module
//!
//! The four contract checks. Each returns a [`CheckOutcome`](crate::verdict::CheckOutcome)
//! and converts its own errors into a `fail`:
//! - `boundary`: declared paths are excluded from version control
//! - `standalone`: the component runs from a clean clone
//! - `hooks`: configuration hooks are sound
//! - `split`: declared paths exist at the install location

pub mod boundary;
pub mod hooks;
pub mod split;
pub mod standalone;

pub use boundary::{check_boundary, ignore_candidate, DIRECTORY_PROBE};
pub use hooks::check_hooks;
pub use split::check_split;
pub use standalone::{
    check_standalone, check_standalone_in, format_duration, trim_output, StandaloneRequest,
    DEFAULT_STANDALONE_TIMEOUT, SCRATCH_PREFIX,
};
