//! `spo propertybag-get` — gets the value of a property from a site or
//! folder property bag.

use anyhow::{bail, Result};
use clap::Args;
use log::debug;
use serde_json::Value;

use crate::api::{HttpClient, Transport};
use crate::auth::{AuthConfig, CommandContext};
use crate::cli::output::{self, OutputOpts};
use crate::cli::validation;
use crate::spo::{property_bag, ClientSvc};

#[derive(Args)]
pub struct PropertybagGetArgs {
    /// URL of the site to read the property bag from
    #[arg(long)]
    pub web_url: String,

    /// Key of the property to retrieve. Case-sensitive
    #[arg(long)]
    pub key: String,

    /// Site-relative URL of a folder to read the property bag from instead
    /// of the web
    #[arg(long)]
    pub folder: Option<String>,

    #[command(flatten)]
    pub output: OutputOpts,
}

pub async fn handle(args: PropertybagGetArgs) -> Result<()> {
    if !validation::is_valid_sharepoint_url(&args.web_url) {
        bail!("{} is not a valid SharePoint Online site URL", args.web_url);
    }
    output::configure_colors(&args.output);

    let config = AuthConfig::from_env()?;
    let ctx = CommandContext::for_url(&config, &args.web_url).await?;
    let client = HttpClient::new(ctx.access_token.clone())?;

    match get_property(&client, &args).await? {
        Some(property) => println!("{}", property.value),
        None => {
            if args.output.verbose {
                println!("Property not found.");
            }
        }
    }
    Ok(())
}

async fn get_property(
    transport: &dyn Transport,
    args: &PropertybagGetArgs,
) -> Result<Option<property_bag::Property>> {
    let svc = ClientSvc::new(transport);

    debug!("Retrieving request digest for {}", args.web_url);
    let digest = svc.request_digest(&args.web_url).await?;
    let identity = svc.current_web_identity(&args.web_url, &digest).await?;

    let bag: Value = match &args.folder {
        Some(folder) => {
            svc.folder_property_bag(&args.web_url, &digest, &identity, folder)
                .await?
        }
        None => svc.web_property_bag(&args.web_url, &digest, &identity).await?,
    };

    Ok(property_bag::filter_by_key(&bag, &args.key))
}
