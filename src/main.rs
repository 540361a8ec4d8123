use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use bidwaves::BidwavesError;
use bidwaves::cli::{Cli, Commands, ConfigAction, OutputOptions};
use bidwaves::commands::{
    cmd_config_get, cmd_config_set, cmd_config_show, cmd_ls, cmd_query, cmd_rm, cmd_search,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ls { kind, list, json } => cmd_ls(kind, &list, OutputOptions::new(json)).await,
        Commands::Search { kind, list, json } => {
            cmd_search(kind, &list, OutputOptions::new(json)).await
        }
        Commands::Query { kind, list, json } => cmd_query(kind, &list, OutputOptions::new(json)),
        Commands::Rm { kind, id, json } => cmd_rm(kind, &id, OutputOptions::new(json)).await,
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => cmd_config_show(OutputOptions::new(json)),
            ConfigAction::Get { key, json } => cmd_config_get(&key, OutputOptions::new(json)),
            ConfigAction::Set { key, value, json } => {
                cmd_config_set(&key, &value, OutputOptions::new(json))
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), describe(&e));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable. `RUST_LOG` overrides.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn describe(err: &BidwavesError) -> String {
    match err {
        BidwavesError::Api(api) => format!("{}: {}", api.label(), api.user_message()),
        other => other.to_string(),
    }
}
