use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hubspot_sync_domain::ResourceKind;

#[derive(Parser, Debug)]
#[command(name = "hubspot-sync")]
#[command(version)]
#[command(about = "Sync HubSpot users, teams and roles and manage membership", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML or JSON). Without it the environment is
    /// read first, then `hubspot-sync.{toml,json}` is probed.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "HUBSPOT_SYNC_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,

    /// Abort the whole command after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub deadline_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the token can read the account
    Validate,

    /// Print connector metadata and resource types
    Metadata,

    /// Enumerate every resource, entitlement and grant and print a summary
    Sync,

    /// Grant a team or role membership to a user
    Grant(ProvisionArgs),

    /// Revoke a team or role membership from a user
    Revoke(ProvisionArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ProvisionArgs {
    /// HubSpot user id of the principal
    #[arg(long)]
    pub user: String,

    /// Resource type holding the entitlement (team or role)
    #[arg(long, value_parser = parse_resource_kind)]
    pub resource_type: ResourceKind,

    /// Id of the team or role
    #[arg(long)]
    pub resource: String,

    /// Entitlement slug (primary-member, secondary-member or member)
    #[arg(long)]
    pub entitlement: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn parse_resource_kind(raw: &str) -> Result<ResourceKind, String> {
    raw.parse::<ResourceKind>().map_err(|_| format!("unknown resource type '{raw}'"))
}
