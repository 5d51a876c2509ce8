use clap::Subcommand;
use serde_json::json;

use crate::cli::output::{output_rows, output_success};
use crate::cli::{connect, OutputFormat};
use crate::config::AppConfig;
use crate::services::TenantService;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List all tenants, suspended ones included")]
    List,

    #[command(about = "Create a tenant with default branding")]
    Create {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Subdomain slug")]
        slug: String,
    },

    #[command(about = "Suspend a tenant; its hosts resolve to not found")]
    Suspend {
        #[arg(help = "Tenant slug")]
        slug: String,
    },

    #[command(about = "Restore a suspended tenant")]
    Restore {
        #[arg(help = "Tenant slug")]
        slug: String,
    },
}

pub async fn handle(cmd: TenantCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = connect(config).await?;
    let service = TenantService::new(&db)?;

    match cmd {
        TenantCommands::List => {
            let tenants = service.list_tenants().await?;
            output_rows(output_format, "tenants", &tenants, &["SLUG", "NAME", "ACTIVE", "ID"], |t| {
                vec![t.slug.clone(), t.name.clone(), t.is_active.to_string(), t.id.to_string()]
            })
        }
        TenantCommands::Create { name, slug } => {
            let tenant = service.create_tenant(&name, &slug, None).await?;
            output_success(
                output_format,
                &format!("Tenant '{}' created", tenant.slug),
                Some(json!({ "tenant": tenant })),
            )
        }
        TenantCommands::Suspend { slug } => {
            let tenant = service.find_by_slug(&slug).await?;
            service.set_active(tenant.id, false).await?;
            output_success(output_format, &format!("Tenant '{}' suspended", slug), None)
        }
        TenantCommands::Restore { slug } => {
            let tenant = service.find_by_slug(&slug).await?;
            service.set_active(tenant.id, true).await?;
            output_success(output_format, &format!("Tenant '{}' restored", slug), None)
        }
    }
}
