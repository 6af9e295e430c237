//! `spo sitedesign-task-get` — gets a scheduled site-design application
//! task.

use anyhow::{bail, Result};
use clap::Args;
use serde_json::{json, Value};

use crate::api::{HttpClient, Transport};
use crate::auth::{AuthConfig, CommandContext};
use crate::cli::output::{self, OutputOpts};
use crate::cli::validation;
use crate::spo::ClientSvc;

#[derive(Args)]
pub struct SitedesignTaskGetArgs {
    /// URL of the site the task was scheduled for
    #[arg(long)]
    pub web_url: String,

    /// ID of the site design task
    #[arg(long)]
    pub task_id: String,

    #[command(flatten)]
    pub output: OutputOpts,
}

pub async fn handle(args: SitedesignTaskGetArgs) -> Result<()> {
    if !validation::is_valid_sharepoint_url(&args.web_url) {
        bail!("{} is not a valid SharePoint Online site URL", args.web_url);
    }
    if !validation::is_valid_guid(&args.task_id) {
        bail!("{} is not a valid GUID", args.task_id);
    }
    output::configure_colors(&args.output);

    let config = AuthConfig::from_env()?;
    let ctx = CommandContext::for_url(&config, &args.web_url).await?;
    let client = HttpClient::new(ctx.access_token.clone())?;

    match get_task(&client, &args).await? {
        Some(task) => output::print_record(&task, &args.output)?,
        None => {
            if args.output.verbose {
                println!("Task not found.");
            }
        }
    }
    Ok(())
}

async fn get_task(transport: &dyn Transport, args: &SitedesignTaskGetArgs) -> Result<Option<Value>> {
    let svc = ClientSvc::new(transport);
    let digest = svc.request_digest(&args.web_url).await?;

    let url = format!(
        "{}/_api/Microsoft.Sharepoint.Utilities.WebTemplateExtensions.SiteScriptUtility.GetSiteDesignTask",
        args.web_url.trim_end_matches('/')
    );
    let body = json!({ "taskId": args.task_id }).to_string();
    let response = transport
        .post(
            &url,
            &[
                ("Content-Type", "application/json;charset=utf-8"),
                ("X-RequestDigest", &digest),
            ],
            Some(body),
        )
        .await?;

    // a scheduled task that has already run (or never existed) comes back
    // as a null-flagged response, which is not an error
    if response.get("odata.null").and_then(Value::as_bool) == Some(true) {
        return Ok(None);
    }

    Ok(Some(response))
}
