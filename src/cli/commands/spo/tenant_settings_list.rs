//! `spo tenant-settings-list` — lists the global SharePoint Online tenant
//! settings with enumerated codes decoded to their labels.

use anyhow::{bail, Result};
use clap::Args;
use log::debug;
use serde_json::Value;

use crate::api::{HttpClient, Transport};
use crate::auth::{AuthConfig, CommandContext};
use crate::cli::output::{self, OutputOpts};
use crate::cli::validation;
use crate::spo::{tenant_settings, ClientSvc};

#[derive(Args)]
pub struct TenantSettingsListArgs {
    /// URL of the tenant admin site, e.g. https://contoso-admin.sharepoint.com
    #[arg(long)]
    pub admin_url: String,

    #[command(flatten)]
    pub output: OutputOpts,
}

pub async fn handle(args: TenantSettingsListArgs) -> Result<()> {
    if !validation::is_valid_sharepoint_url(&args.admin_url) {
        bail!("{} is not a valid SharePoint Online site URL", args.admin_url);
    }
    output::configure_colors(&args.output);

    let config = AuthConfig::from_env()?;
    let ctx = CommandContext::for_url(&config, &args.admin_url).await?;
    let client = HttpClient::new(ctx.access_token.clone())?;

    let settings = list_settings(&client, &args).await?;
    output::print_record(&settings, &args.output)
}

async fn list_settings(transport: &dyn Transport, args: &TenantSettingsListArgs) -> Result<Value> {
    let svc = ClientSvc::new(transport);

    debug!("Retrieving request digest for {}", args.admin_url);
    let digest = svc.request_digest(&args.admin_url).await?;
    let raw = svc.tenant_settings(&args.admin_url, &digest).await?;

    Ok(tenant_settings::decode(&raw))
}
