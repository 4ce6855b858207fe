//! Command-line interface and orchestration for repo-score
//!
//! This module implements the CLI commands and wires the other modules together:
//! argument parsing, configuration, logging, and the per-repository workflow.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **score**: Read a URL file, resolve each URL to a GitHub repository, compute all
//!   metrics, and print one NDJSON record per repository
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `score` command runs in a fixed order:
//!
//! 1. Initialize logging and load configuration
//! 2. Require a GitHub token and check it against the API
//! 3. Read the URL list and resolve every URL, skipping (or, with `--strict`,
//!    aborting on) URLs that cannot be resolved
//! 4. Evaluate repositories one after another, with the metrics of each repository
//!    running concurrently, so records come out in input order
//! 5. Write each record to the host's output as soon as it is ready

mod common;
mod config;
mod host;
mod init;
mod run;
mod score;

#[cfg(debug_assertions)]
pub use config::Config;

pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use score::{ScoreArgs, score_urls};
