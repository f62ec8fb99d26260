//! Subcommand implementations

pub mod provision;
pub mod sync;

pub use provision::{grant, revoke, ProvisionOutcome, ProvisionTarget};
pub use sync::{run_full_sync, SyncSummary, TypeSummary};
