//! # HubSpot Sync CLI
//!
//! Drives the connector from the command line: credential validation, a full
//! sync that prints a JSON summary, and manual grant / revoke.
//!
//! The binary in `main.rs` only wires these modules together; everything it
//! calls lives here so it can be exercised from tests.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command, LogFormat, ProvisionArgs};
