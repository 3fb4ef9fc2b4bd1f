//! # Data Collectors Module
//!
//! Observations of the outside world consumed by the checks.

pub mod filesystem;
pub mod git;

pub use filesystem::{find_glob_match, probe, probe_under, EntryKind, WalkError};
pub use git::{GitCollector, GitError, IgnoreOracle};
