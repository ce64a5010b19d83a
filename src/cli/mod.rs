//! # CLI Module
//!
//! Command-line interface for the `jetrouter` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve the demo [`EchoController`](crate::echo::EchoController):
//!
//! ```bash
//! jetrouter serve --addr 127.0.0.1:8080
//! ```
//!
//! Options:
//! - `--addr <ADDR>` - Listen address (env `JET_ADDR`, default `0.0.0.0:8080`)
//! - `--timeout-ms <MS>` - Cooperative per-request deadline
//!
//! The server runs until SIGINT or SIGTERM.
//!
//! ### `routes`
//!
//! Print every route key with the handler it dispatches to:
//!
//! ```bash
//! jetrouter routes
//! ```
//!
//! ## Global Options
//!
//! - `--log-level <LEVEL>` - overrides `JET_LOG_LEVEL`
//! - `--log-format <json|pretty>` - overrides `JET_LOG_FORMAT`
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use jetrouter::cli::{Cli, run_cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli)?;
//! ```

mod commands;


pub use commands::{build_router, build_service, run_cli, Cli, Commands};
