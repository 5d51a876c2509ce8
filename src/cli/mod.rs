pub mod commands;
pub mod output;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::database::{DatabaseManager, Db, PgStore};

#[derive(Parser)]
#[command(name = "huntctl")]
#[command(about = "huntctl - operator tool for the scavenger hunt service")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Tenant lifecycle")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "Tenant memberships")]
    Member {
        #[command(subcommand)]
        cmd: commands::member::MemberCommands,
    },

    #[command(about = "Grant or revoke the platform super-admin flag")]
    SuperAdmin {
        #[command(subcommand)]
        cmd: commands::super_admin::SuperAdminCommands,
    },

    #[command(about = "Issue a bearer token for local testing")]
    Token(commands::token::TokenArgs),

    #[command(about = "Print sample redemption codes")]
    Code(commands::code::CodeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Elevated handle on the configured database. Operator commands bypass
/// row-level policies the same way platform endpoints do.
pub async fn connect(config: &AppConfig) -> anyhow::Result<Db> {
    let pool = DatabaseManager::connect(config).await?;
    let store = PgStore::new(pool, config.database.rls_role.clone(), config.database.enable_query_logging)?;
    Ok(Db::elevated(Arc::new(store)))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, config, output_format).await,
        Commands::Member { cmd } => commands::member::handle(cmd, config, output_format).await,
        Commands::SuperAdmin { cmd } => commands::super_admin::handle(cmd, config, output_format).await,
        Commands::Token(args) => commands::token::handle(args, config, output_format),
        Commands::Code(args) => commands::code::handle(args, output_format),
    }
}
