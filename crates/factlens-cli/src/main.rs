mod cli;
mod commands;
mod display;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cli.global.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    tracing::debug!("factlens v{}", env!("CARGO_PKG_VERSION"));

    let opts = &cli.global;
    match cli.command {
        Command::Analyze {
            inputs,
            files,
            json,
            stats,
        } => commands::analyze(opts, &inputs, &files, json, stats).await,
        Command::Session { json } => commands::session(opts, json).await,
        Command::Models => commands::models(opts).await,
        Command::CurrentModel => commands::current_model(opts).await,
        Command::UseModel { model_id } => commands::use_model(opts, &model_id).await,
        Command::FactCheck { text, url } => {
            commands::fact_check(opts, &text, url.as_deref()).await
        }
        Command::Health => commands::health(opts).await,
        Command::Ping => commands::ping(opts).await,
        Command::Register { email, password } => {
            commands::register(opts, &email, &password).await
        }
        Command::Login { email, password } => commands::login(opts, &email, &password).await,
        Command::Metrics { days } => commands::metrics(opts, days).await,
    }
}
