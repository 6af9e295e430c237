//! `user list` — lists Azure AD users, optionally filtered by property
//! prefixes.

use anyhow::{bail, Result};
use clap::Args;
use serde_json::Value;

use crate::api::{odata, HttpClient, Transport};
use crate::auth::{AuthConfig, CommandContext};
use crate::cli::output::{self, OutputOpts};

const DEFAULT_PROPERTIES: &str = "userPrincipalName,displayName";
const PAGE_SIZE: u32 = 100;

#[derive(Args)]
pub struct UserListArgs {
    /// Comma-separated list of properties to retrieve
    #[arg(long, default_value = DEFAULT_PROPERTIES)]
    pub properties: String,

    /// Only users whose property starts with the value, as property=value.
    /// Repeat to combine filters
    #[arg(long = "filter", value_name = "PROPERTY=VALUE")]
    pub filters: Vec<String>,

    #[command(flatten)]
    pub output: OutputOpts,
}

pub async fn handle(args: UserListArgs) -> Result<()> {
    output::configure_colors(&args.output);

    let config = AuthConfig::from_env()?;
    let ctx = CommandContext::graph(&config).await?;
    let client = HttpClient::new(ctx.access_token.clone())?;

    let users = list_users(&client, &ctx.resource, &args).await?;

    let columns: Vec<&str> = args.properties.split(',').map(str::trim).collect();
    output::print_records(&users, &columns, &args.output)
}

async fn list_users(
    transport: &dyn Transport,
    resource: &str,
    args: &UserListArgs,
) -> Result<Vec<Value>> {
    let url = build_users_url(resource, args)?;
    odata::get_all_items(transport, &url).await
}

fn build_users_url(resource: &str, args: &UserListArgs) -> Result<String> {
    let select: Vec<&str> = args.properties.split(',').map(str::trim).collect();
    let mut url = format!("{}/v1.0/users?$select={}", resource, select.join(","));

    if !args.filters.is_empty() {
        let mut clauses = Vec::with_capacity(args.filters.len());
        for filter in &args.filters {
            let Some((property, value)) = filter.split_once('=') else {
                bail!("Invalid filter '{}': expected property=value", filter);
            };
            clauses.push(format!(
                "startsWith({}, '{}')",
                property.trim(),
                odata::encode_filter_value(value)
            ));
        }
        url.push_str(&format!("&$filter={}", clauses.join(" and ")));
    }

    url.push_str(&format!("&$top={}", PAGE_SIZE));
    Ok(url)
}
