//! # City Kit
//!
//! Installation contract verification for components that are embedded in a
//! host deployment. A component declares in `city.toml` which paths the host
//! will own; this crate checks that declaration four ways.
//!
//! ## Modules
//!
//! - `contracts` - Contract document model, path normalizer and loader
//! - `glob` - Segment-based glob matcher and probe path synthesis
//! - `commands` - Allowlisted subprocess executors (git, isolated shell)
//! - `collectors` - Observations from git and the filesystem
//! - `executors` - The boundary, standalone, config-hooks and split checks
//! - `verdict` - Check results, summary and the aggregated verdict
//! - `execution_api` - High-level `run_city()` entry point
//! - `ledger` - Interface for durably recording verdicts
//! - `logging` - Global logger setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use city_kit::execution_api::{run_city, RunOptions};
//!
//! let options = RunOptions {
//!     install_at: Some("/srv/host/component".into()),
//!     ..RunOptions::default()
//! };
//!
//! let verdict = run_city(Path::new("."), &options);
//! std::process::exit(verdict.exit_code);
//! ```

pub mod collectors;
pub mod commands;
pub mod contracts;
pub mod execution_api;
pub mod executors;
pub mod glob;
pub mod ledger;
pub mod logging;
pub mod verdict;
