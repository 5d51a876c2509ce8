use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::output::output_success;
use crate::cli::{connect, OutputFormat};
use crate::config::AppConfig;
use crate::identity::set_super_admin;

#[derive(Subcommand)]
pub enum SuperAdminCommands {
    #[command(about = "Set the flag on every profile the user has")]
    Grant {
        #[arg(help = "User id")]
        user_id: Uuid,
    },

    #[command(about = "Clear the flag on every profile the user has")]
    Revoke {
        #[arg(help = "User id")]
        user_id: Uuid,
    },
}

pub async fn handle(cmd: SuperAdminCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = connect(config).await?;
    let (user_id, granted) = match cmd {
        SuperAdminCommands::Grant { user_id } => (user_id, true),
        SuperAdminCommands::Revoke { user_id } => (user_id, false),
    };

    let rows = set_super_admin(&db, user_id, granted).await?;
    if rows == 0 {
        anyhow::bail!("User {} has no profiles yet; the flag is stored on profiles", user_id);
    }
    let verb = if granted { "granted to" } else { "revoked from" };
    output_success(
        output_format,
        &format!("Super admin {} {} ({} profiles)", verb, user_id, rows),
        Some(json!({ "user_id": user_id, "profiles": rows })),
    )
}
