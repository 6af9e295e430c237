//! `teams channel-member-list` — lists the members of a team channel.

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use colored::*;
use serde_json::Value;

use crate::api::{odata, HttpClient, Transport};
use crate::auth::{AuthConfig, CommandContext};
use crate::cli::output::{self, OutputOpts};
use crate::cli::validation;

const DEFAULT_COLUMNS: &[&str] = &["id", "roles", "displayName", "userId", "email"];

#[derive(Args)]
pub struct ChannelMemberListArgs {
    /// ID of the team
    #[arg(long, conflicts_with = "team_name", required_unless_present = "team_name")]
    pub team_id: Option<String>,

    /// Display name of the team
    #[arg(long)]
    pub team_name: Option<String>,

    /// ID of the channel
    #[arg(long, conflicts_with = "channel_name", required_unless_present = "channel_name")]
    pub channel_id: Option<String>,

    /// Display name of the channel
    #[arg(long)]
    pub channel_name: Option<String>,

    /// Only list members with this role
    #[arg(long)]
    pub role: Option<MemberRole>,

    #[command(flatten)]
    pub output: OutputOpts,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum MemberRole {
    Owner,
    Member,
    Guest,
}

pub async fn handle(args: ChannelMemberListArgs) -> Result<()> {
    validate(&args)?;
    output::configure_colors(&args.output);

    let config = AuthConfig::from_env()?;
    let ctx = CommandContext::graph(&config).await?;
    let client = HttpClient::new(ctx.access_token.clone())?;

    let members = list_members(&client, &ctx.resource, &args).await?;
    output::print_records(&members, DEFAULT_COLUMNS, &args.output)
}

fn validate(args: &ChannelMemberListArgs) -> Result<()> {
    if let Some(team_id) = &args.team_id {
        if !validation::is_valid_guid(team_id) {
            bail!("{} is not a valid GUID", team_id);
        }
    }

    if let Some(channel_id) = &args.channel_id {
        if !validation::is_valid_teams_channel_id(channel_id) {
            bail!("{} is not a valid Teams channel ID", channel_id);
        }
    }

    Ok(())
}

async fn list_members(
    transport: &dyn Transport,
    resource: &str,
    args: &ChannelMemberListArgs,
) -> Result<Vec<Value>> {
    let team_id = resolve_team_id(transport, resource, args).await?;
    let channel_id = resolve_channel_id(transport, resource, &team_id, args).await?;

    if args.output.verbose {
        println!(
            "Retrieving members of channel {}...",
            channel_id.as_str().cyan()
        );
    }

    let endpoint = format!(
        "{}/v1.0/teams/{}/channels/{}/members",
        resource, team_id, channel_id
    );
    let mut members = odata::get_all_items(transport, &endpoint).await?;

    if let Some(role) = &args.role {
        members.retain(|member| matches_role(member, role));
    }

    Ok(members)
}

async fn resolve_team_id(
    transport: &dyn Transport,
    resource: &str,
    args: &ChannelMemberListArgs,
) -> Result<String> {
    if let Some(team_id) = &args.team_id {
        return Ok(team_id.clone());
    }
    let Some(team_name) = &args.team_name else {
        bail!("Specify either --team-id or --team-name");
    };

    let url = format!(
        "{}/v1.0/groups?$filter=displayName eq '{}'&$select=id,resourceProvisioningOptions",
        resource,
        odata::encode_filter_value(team_name)
    );
    let groups = odata::get_all_items(transport, &url).await?;

    let group = match groups.as_slice() {
        [group] => group,
        [] => bail!("The specified team does not exist in Microsoft Teams"),
        _ => {
            let ids: Vec<&str> = groups
                .iter()
                .filter_map(|g| g.get("id").and_then(Value::as_str))
                .collect();
            bail!(
                "Multiple teams with name '{}' found: {}",
                team_name,
                ids.join(", ")
            );
        }
    };

    let provisioned_as_team = group
        .get("resourceProvisioningOptions")
        .and_then(Value::as_array)
        .is_some_and(|options| options.iter().any(|option| option == "Team"));
    if !provisioned_as_team {
        bail!("The specified team does not exist in Microsoft Teams");
    }

    group
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Group response did not contain an id"))
}

async fn resolve_channel_id(
    transport: &dyn Transport,
    resource: &str,
    team_id: &str,
    args: &ChannelMemberListArgs,
) -> Result<String> {
    if let Some(channel_id) = &args.channel_id {
        return Ok(channel_id.clone());
    }
    let Some(channel_name) = &args.channel_name else {
        bail!("Specify either --channel-id or --channel-name");
    };

    let url = format!(
        "{}/v1.0/teams/{}/channels?$filter=displayName eq '{}'",
        resource,
        team_id,
        odata::encode_filter_value(channel_name)
    );
    let response = transport.get(&url).await?;

    response
        .get("value")
        .and_then(Value::as_array)
        .and_then(|channels| channels.first())
        .and_then(|channel| channel.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            anyhow::anyhow!("The specified channel does not exist in the Microsoft Teams team")
        })
}

fn matches_role(member: &Value, role: &MemberRole) -> bool {
    let roles: Vec<&str> = member
        .get("roles")
        .and_then(Value::as_array)
        .map(|roles| roles.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    match role {
        // plain members carry no role value at all
        MemberRole::Member => roles.is_empty(),
        MemberRole::Owner => roles.contains(&"owner"),
        MemberRole::Guest => roles.contains(&"guest"),
    }
}
