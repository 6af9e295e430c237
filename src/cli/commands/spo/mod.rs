mod propertybag_get;
mod sitedesign_task_get;
mod tenant_settings_list;

pub use propertybag_get::PropertybagGetArgs;
pub use sitedesign_task_get::SitedesignTaskGetArgs;
pub use tenant_settings_list::TenantSettingsListArgs;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum SpoCommands {
    /// Get the value of a property from a site or folder property bag
    PropertybagGet(PropertybagGetArgs),
    /// List the global SharePoint Online tenant settings
    TenantSettingsList(TenantSettingsListArgs),
    /// Get a scheduled site design task
    SitedesignTaskGet(SitedesignTaskGetArgs),
}

pub async fn handle_spo_command(command: SpoCommands) -> Result<()> {
    match command {
        SpoCommands::PropertybagGet(args) => propertybag_get::handle(args).await,
        SpoCommands::TenantSettingsList(args) => tenant_settings_list::handle(args).await,
        SpoCommands::SitedesignTaskGet(args) => sitedesign_task_get::handle(args).await,
    }
}
