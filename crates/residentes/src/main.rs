//! `residentes` - CLI and HTTP server for the resident registry.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use residentes::cli::{Cli, Command, ConfigCommand, ListCommand, OutputFormat, ServeCommand};
use residentes::{build_router, init_logging, AppState, Config, Repository};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, &serve_cmd),
        Command::Check(check_cmd) => handle_check(&config, check_cmd.json),
        Command::List(list_cmd) => handle_list(&config, &list_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    cmd.apply(&mut config);
    config.validate()?;

    let repository = Repository::open(config.database_path())?;
    let state = AppState::new(Arc::new(repository)).with_cors_origins(&config.server.cors)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let address = config.bind_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;
        info!(address = %listener.local_addr()?, "Listening");

        axum::serve(listener, build_router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        info!("Server stopped");
        Ok(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn handle_check(config: &Config, json: bool) -> anyhow::Result<()> {
    let result = Repository::inspect(config.database_path());

    if json {
        let status = match &result {
            Ok(status) => serde_json::json!({
                "status": "ok",
                "database_path": status.path,
                "residents": status.residents,
            }),
            Err(e) => serde_json::json!({
                "status": "error",
                "database_path": config.database_path(),
                "error": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("residentes check");
        println!("----------------");
        println!("Database:      {}", config.database_path().display());
        match &result {
            Ok(status) => {
                println!("Status:        ok");
                println!("Residents:     {}", status.residents);
            }
            Err(e) => println!("Status:        error ({e})"),
        }
    }

    result.map(|_| ()).context("database check failed")
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let repository = Repository::open(config.database_path())?;
    let residents = repository.list()?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&residents)?),
        OutputFormat::Table => {
            if residents.is_empty() {
                println!("No residents stored.");
            }
            for resident in &residents {
                println!(
                    "{:>5}  {:<32}  {:<10}  {:<20}  {}",
                    resident.id,
                    resident.full_name(),
                    resident.birth_date,
                    resident.passport,
                    resident.email
                );
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!(
                    "  CORS origins:       {}",
                    config.server.cors.origins.join(", ")
                );
                println!();
                println!("[Database]");
                println!("  Name:               {}", config.database.name);
                println!("  Path:               {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
