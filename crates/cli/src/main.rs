//! hubspot-sync - HubSpot connector command-line driver
//!
//! Main entry point of the binary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use hubspot_sync_cli::commands::{self, ProvisionTarget};
use hubspot_sync_cli::logging::init_logging;
use hubspot_sync_cli::{Cli, Command, ProvisionArgs};
use hubspot_sync_core::{CallContext, HubSpotConnector};
use hubspot_sync_domain::ConnectorConfig;
use hubspot_sync_infra::{config, HubSpotClient};
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging FIRST so we can see .env loading
    init_logging(cli.log_format)?;

    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    let config = load_config(&cli)?;
    tracing::info!(
        base_url = %config.base_url,
        user_status = config.user_status,
        page_size = config.page_size,
        "hubspot-sync starting"
    );

    let client = Arc::new(HubSpotClient::new(&config).context("failed to build HubSpot client")?);
    let connector = HubSpotConnector::new(client.clone(), &config);
    let ctx = call_context(cli.deadline_secs);

    match cli.command {
        Command::Validate => {
            connector.validate(&ctx).await.context("credential validation failed")?;
            print_json(&serde_json::json!({ "valid": true }))
        }
        Command::Metadata => print_json(&connector.metadata()),
        Command::Sync => {
            let summary =
                commands::run_full_sync(&connector, &ctx).await.context("full sync failed")?;
            print_json(&summary)
        }
        Command::Grant(args) => {
            let outcome = commands::grant(&connector, client.as_ref(), &ctx, &target(args))
                .await
                .context("grant failed")?;
            print_json(&outcome)
        }
        Command::Revoke(args) => {
            let outcome = commands::revoke(&connector, client.as_ref(), &ctx, &target(args))
                .await
                .context("revoke failed")?;
            print_json(&outcome)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ConnectorConfig> {
    let config = match &cli.config {
        Some(path) => {
            let config = config::load_from_file(Some(path.clone()))?;
            config.validate()?;
            config
        }
        None => config::load()?,
    };
    Ok(config)
}

/// Context cancelled on Ctrl-C and bounded by the optional deadline.
fn call_context(deadline_secs: Option<u64>) -> CallContext {
    let mut ctx = CallContext::new();
    if let Some(secs) = deadline_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    let canceller = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling in-flight calls");
            canceller.cancel();
        }
    });

    ctx
}

fn target(args: ProvisionArgs) -> ProvisionTarget {
    ProvisionTarget {
        user_id: args.user,
        kind: args.resource_type,
        resource_id: args.resource,
        slug: args.entitlement,
    }
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
