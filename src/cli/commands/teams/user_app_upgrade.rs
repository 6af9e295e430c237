//! `teams user-app-upgrade` — upgrades an app installed in the personal
//! scope of a user to its latest version.

use anyhow::{bail, Result};
use clap::Args;
use colored::*;
use serde_json::Value;

use crate::api::{odata, HttpClient, Transport};
use crate::auth::{AuthConfig, CommandContext};
use crate::cli::output::{self, OutputOpts};
use crate::cli::validation;

#[derive(Args)]
pub struct UserAppUpgradeArgs {
    /// ID of the user
    #[arg(long)]
    pub user_id: String,

    /// Installation-specific ID of the app instance
    #[arg(long, conflicts_with = "app_name", required_unless_present = "app_name")]
    pub app_id: Option<String>,

    /// Display name of the app
    #[arg(long)]
    pub app_name: Option<String>,

    #[command(flatten)]
    pub output: OutputOpts,
}

pub async fn handle(args: UserAppUpgradeArgs) -> Result<()> {
    if !validation::is_valid_guid(&args.user_id) {
        bail!("{} is not a valid GUID", args.user_id);
    }
    output::configure_colors(&args.output);

    let config = AuthConfig::from_env()?;
    let ctx = CommandContext::graph(&config).await?;
    let client = HttpClient::new(ctx.access_token.clone())?;

    upgrade_app(&client, &ctx.resource, &args).await?;

    if args.output.verbose {
        println!("{}", "App upgraded".green());
    }
    Ok(())
}

async fn upgrade_app(
    transport: &dyn Transport,
    resource: &str,
    args: &UserAppUpgradeArgs,
) -> Result<()> {
    let app_id = resolve_app_id(transport, resource, args).await?;

    let url = format!(
        "{}/v1.0/users/{}/teamwork/installedApps/{}/upgrade",
        resource, args.user_id, app_id
    );
    transport.post(&url, &[], None).await?;
    Ok(())
}

async fn resolve_app_id(
    transport: &dyn Transport,
    resource: &str,
    args: &UserAppUpgradeArgs,
) -> Result<String> {
    if let Some(app_id) = &args.app_id {
        return Ok(app_id.clone());
    }
    let Some(app_name) = &args.app_name else {
        bail!("Specify either --app-id or --app-name");
    };

    let url = format!(
        "{}/v1.0/users/{}/teamwork/installedApps?$expand=teamsAppDefinition&$filter=teamsAppDefinition/displayName eq '{}'",
        resource,
        args.user_id,
        odata::encode_filter_value(app_name)
    );
    let apps = odata::get_all_items(transport, &url).await?;

    match apps.as_slice() {
        [] => bail!(
            "The app {} is not installed for user {}",
            app_name,
            args.user_id
        ),
        [app] => app
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Installed app response did not contain an id")),
        _ => {
            let ids: Vec<&str> = apps
                .iter()
                .filter_map(|app| app.get("id").and_then(Value::as_str))
                .collect();
            bail!(
                "Multiple installed apps with name '{}' found: {}",
                app_name,
                ids.join(", ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::StubTransport;
    use serde_json::json;

    const GRAPH: &str = "https://graph.microsoft.com";
    const USER_ID: &str = "c527a470-a882-481c-981c-ee6efaba85c7";
    const APP_ID: &str = "YzUyN2E0NzAtYTg4Mi00ODFjLTk4MWMtZWU2ZWZhYmE4NWM3";

    fn args(app_id: Option<&str>, app_name: Option<&str>) -> UserAppUpgradeArgs {
        UserAppUpgradeArgs {
            user_id: USER_ID.to_string(),
            app_id: app_id.map(str::to_string),
            app_name: app_name.map(str::to_string),
            output: OutputOpts {
                format: crate::cli::output::OutputFormat::Text,
                no_color: true,
                verbose: false,
            },
        }
    }

    #[tokio::test]
    async fn upgrades_by_app_id() {
        let transport = StubTransport::new().on_post(
            &format!(
                "https://graph.microsoft.com/v1.0/users/{}/teamwork/installedApps/{}/upgrade",
                USER_ID, APP_ID
            ),
            Value::Null,
        );

        upgrade_app(&transport, GRAPH, &args(Some(APP_ID), None))
            .await
            .unwrap();

        let posts = transport.post_bodies.lock().unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn resolves_app_by_name() {
        let transport = StubTransport::new()
            .on_get(
                &format!(
                    "https://graph.microsoft.com/v1.0/users/{}/teamwork/installedApps?$expand=teamsAppDefinition&$filter=teamsAppDefinition/displayName eq 'SomeAppName'",
                    USER_ID
                ),
                json!({ "value": [{ "id": APP_ID, "teamsAppDefinition": { "displayName": "SomeAppName" } }] }),
            )
            .on_post(
                &format!(
                    "https://graph.microsoft.com/v1.0/users/{}/teamwork/installedApps/{}/upgrade",
                    USER_ID, APP_ID
                ),
                Value::Null,
            );

        upgrade_app(&transport, GRAPH, &args(None, Some("SomeAppName")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_app_is_an_error() {
        let transport = StubTransport::new().on_get(
            &format!(
                "https://graph.microsoft.com/v1.0/users/{}/teamwork/installedApps?$expand=teamsAppDefinition&$filter=teamsAppDefinition/displayName eq 'NonExistentAppName'",
                USER_ID
            ),
            json!({ "value": [] }),
        );

        let err = upgrade_app(&transport, GRAPH, &args(None, Some("NonExistentAppName")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is not installed"));
    }

    #[tokio::test]
    async fn ambiguous_app_name_is_an_error() {
        let transport = StubTransport::new().on_get(
            &format!(
                "https://graph.microsoft.com/v1.0/users/{}/teamwork/installedApps?$expand=teamsAppDefinition&$filter=teamsAppDefinition/displayName eq 'MultipleAppName'",
                USER_ID
            ),
            json!({ "value": [{ "id": "a" }, { "id": "b" }] }),
        );

        let err = upgrade_app(&transport, GRAPH, &args(None, Some("MultipleAppName")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Multiple installed apps"));
        assert!(err.to_string().contains("a, b"));
    }

    #[tokio::test]
    async fn upgrade_failure_is_fatal() {
        let transport = StubTransport::new().on_post_error(
            &format!(
                "https://graph.microsoft.com/v1.0/users/{}/teamwork/installedApps/{}/upgrade",
                USER_ID, APP_ID
            ),
            "The app upgrade failed",
        );

        let err = upgrade_app(&transport, GRAPH, &args(Some(APP_ID), None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "The app upgrade failed");
    }
}
