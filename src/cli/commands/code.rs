use clap::Args;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::redemption::generate_code;

#[derive(Args)]
pub struct CodeArgs {
    #[arg(long, short = 'n', default_value_t = 5, help = "How many codes to print")]
    pub count: usize,
}

pub fn handle(args: CodeArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let codes: Vec<String> = (0..args.count).map(|_| generate_code()).collect();

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "codes": codes }))?),
        OutputFormat::Text => codes.iter().for_each(|c| println!("{}", c)),
    }
    Ok(())
}
