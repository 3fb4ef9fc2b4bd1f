//! # gate
//!
//! Installation contract verification for components embedded in a host
//! deployment.
//!
//! ## Usage
//!
//! ```bash
//! # Verify a component checkout
//! gate city ./component
//!
//! # Include the split check against a real install
//! gate city ./component --install-at /srv/host/component
//!
//! # Machine-readable verdict, also saved to a file
//! gate city ./component --json -o verdict.json
//! ```
//!
//! ## Exit Codes
//!
//! - **0**: all checks passed
//! - **1**: one or more checks failed
//! - **2**: passed with skipped checks
//! - **3**: invalid contract, repository or arguments

mod cli;
mod config;
mod ledger;
mod output;
mod runner;

use city_kit::logging;
use city_kit::verdict::EXIT_INVALID;
use cli::{parse_args, CliResult};

fn main() {
    // Initialize logging
    if let Err(e) = logging::init_global_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(EXIT_INVALID);
    }

    let args: Vec<String> = std::env::args().collect();

    let exit_code = match parse_args(&args) {
        CliResult::Help(text) => {
            print!("{}", text);
            0
        }
        CliResult::Error(text) => {
            eprint!("{}", text);
            EXIT_INVALID
        }
        CliResult::Run(config) => match runner::run_city_command(&config) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_INVALID
            }
        },
    };

    if exit_code != 0 {
        logging::print_cargo_style_summary();
    }

    std::process::exit(exit_code);
}
