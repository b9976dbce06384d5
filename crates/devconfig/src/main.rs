mod backend;
mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use devconfig_core::Engine;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::commands::CliEngine;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never touch a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "devconfig", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let engine = build_engine(&cli.global).await?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &engine, &cli.global).await
        }
    }
}

/// Resolve the profile, connect the backends and load the catalog.
async fn build_engine(global: &GlobalOpts) -> Result<CliEngine, CliError> {
    let resolved = config::resolve(global)?;
    let engine_config = resolved.engine_config()?;
    let transport = resolved.transport(global);
    let (points, store) = backend::connect(&resolved, &transport)?;

    tracing::debug!(
        profile = %resolved.name,
        mode = %engine_config.mode,
        catalog_dir = %engine_config.catalog_dir.display(),
        "opening engine"
    );
    Ok(Engine::open(engine_config, points, store).await?)
}
