use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::issue_token;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(help = "User id (random when omitted)")]
    pub user_id: Option<Uuid>,

    #[arg(long, help = "Email claim")]
    pub email: Option<String>,
}

pub fn handle(args: TokenArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let user_id = args.user_id.unwrap_or_else(Uuid::new_v4);
    let token = issue_token(&config.security, user_id, args.email)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "user_id": user_id, "token": token }))?
        ),
        OutputFormat::Text => {
            eprintln!("user_id: {}", user_id);
            println!("{}", token);
        }
    }
    Ok(())
}
