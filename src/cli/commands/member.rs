use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::output::{output_rows, output_success};
use crate::cli::{connect, OutputFormat};
use crate::config::AppConfig;
use crate::services::{member_service, TenantService};
use crate::types::MembershipRole;

#[derive(Subcommand)]
pub enum MemberCommands {
    #[command(about = "List members of a tenant")]
    List {
        #[arg(help = "Tenant slug")]
        slug: String,
    },

    #[command(about = "Grant a staff or admin membership")]
    Grant {
        #[arg(help = "Tenant slug")]
        slug: String,
        #[arg(help = "User id")]
        user_id: Uuid,
        #[arg(long, default_value = "staff", help = "admin or staff")]
        role: MembershipRole,
    },
}

pub async fn handle(cmd: MemberCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = connect(config).await?;
    let service = TenantService::new(&db)?;

    match cmd {
        MemberCommands::List { slug } => {
            let tenant = service.find_by_slug(&slug).await?;
            let members = member_service::list_members(&db, tenant.id).await?;
            output_rows(output_format, "members", &members, &["USER", "ROLE", "SINCE"], |m| {
                vec![
                    m.user_id.to_string(),
                    m.role.as_str().to_string(),
                    m.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
        }
        MemberCommands::Grant { slug, user_id, role } => {
            let tenant = service.find_by_slug(&slug).await?;
            let membership = member_service::assign(&db, tenant.id, user_id, role).await?;
            output_success(
                output_format,
                &format!("{} is now {} of '{}'", user_id, role.as_str(), slug),
                Some(json!({ "membership": membership })),
            )
        }
    }
}
