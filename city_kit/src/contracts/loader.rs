//! # Contract Loader
//!
//! Reads `city.toml`, checks the schema version and normalizes every
//! declared path and hook file. Any failure here is a contract error and
//! short-circuits the run to the `invalid` verdict.
//!
//! ```toml
//! [city]
//! schema_version = 1
//! polis_files = ["polis.yaml", ".secrets", "memory/", "memory/**"]
//! standalone_check = "make test"
//!
//! [[hook]]
//! file = ".secrets"
//! fallback = "env:POLIS_API_KEY"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::model::{Contract, DeclaredPath, Hook};
use super::path::{normalize_hook_path, PathError};

/// Contract document name at the repository root
pub const CONTRACT_FILE_NAME: &str = "city.toml";

/// The only schema version this engine understands
pub const SUPPORTED_SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Default, Deserialize)]
struct RawContractFile {
    #[serde(default)]
    city: RawCitySection,
    #[serde(default)]
    hook: Vec<RawHook>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCitySection {
    schema_version: Option<i64>,
    #[serde(default)]
    polis_files: Vec<String>,
    #[serde(default)]
    standalone_check: String,
}

#[derive(Debug, Deserialize)]
struct RawHook {
    #[serde(default)]
    file: String,
    #[serde(default)]
    fallback: String,
}

/// Malformed contract or unsafe declaration
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("invalid {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid city.toml TOML: {0}")]
    Parse(String),
    #[error("invalid city.toml: [city].schema_version is required")]
    MissingSchemaVersion,
    #[error("invalid city.toml: unsupported schema_version {found} (expected {expected})")]
    UnsupportedSchemaVersion { found: i64, expected: i64 },
    #[error("invalid city.toml polis_files entry {entry:?}: {source}")]
    InvalidPolisFile {
        entry: String,
        #[source]
        source: PathError,
    },
    #[error("invalid city.toml hook.file {entry:?}: {source}")]
    InvalidHookFile {
        entry: String,
        #[source]
        source: PathError,
    },
}

/// Load and validate `city.toml` from a repository root
pub fn load_contract(repo_root: &Path) -> Result<Contract, ContractError> {
    let path = repo_root.join(CONTRACT_FILE_NAME);
    let text = std::fs::read_to_string(&path).map_err(|source| ContractError::Read {
        path: path.clone(),
        source,
    })?;

    let contract = parse_contract(&text)?;
    log::info!(
        "Loaded contract {} (polis_files={}, hooks={})",
        path.display(),
        contract.polis_files.len(),
        contract.hooks.len()
    );
    Ok(contract)
}

/// Parse and validate contract text
pub fn parse_contract(text: &str) -> Result<Contract, ContractError> {
    let raw: RawContractFile =
        toml::from_str(text).map_err(|e| ContractError::Parse(e.message().to_string()))?;

    let schema_version = raw
        .city
        .schema_version
        .ok_or(ContractError::MissingSchemaVersion)?;
    if schema_version != SUPPORTED_SCHEMA_VERSION {
        return Err(ContractError::UnsupportedSchemaVersion {
            found: schema_version,
            expected: SUPPORTED_SCHEMA_VERSION,
        });
    }

    let polis_files = raw
        .city
        .polis_files
        .iter()
        .map(|entry| {
            DeclaredPath::parse(entry).map_err(|source| ContractError::InvalidPolisFile {
                entry: entry.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let hooks = raw
        .hook
        .into_iter()
        .map(|hook| {
            let file = normalize_hook_path(&hook.file).map_err(|source| {
                ContractError::InvalidHookFile {
                    entry: hook.file.clone(),
                    source,
                }
            })?;
            Ok(Hook {
                file,
                fallback: hook.fallback.trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>, ContractError>>()?;

    Ok(Contract {
        schema_version,
        polis_files,
        standalone_check: raw.city.standalone_check.trim().to_string(),
        hooks,
    })
}
