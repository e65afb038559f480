use std::process::ExitCode;

use circulation::config::{Cli, Command, ServeArgs};
use circulation::prelude::*;
use clap::Parser;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = circulation::logging::init(cli.log.as_deref()) {
        eprintln!("failed to open log file: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CirculationError> {
    let store = Store::open(cli.store.store_options()).await?;
    let library = Library::new(store);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(library, &cli.serve).await,
        Command::Import { kind, file } => {
            let bytes = tokio::fs::read(&file).await.map_err(|e| {
                CirculationError::ImportError(format!("cannot read {}: {e}", file.display()))
            })?;
            let count = library.import(kind, bytes).await?;
            println!("Imported {count} {} from {}", kind.as_str(), file.display());
            Ok(())
        }
        Command::Export { kind, file } => {
            let export = library.export(kind).await?;
            tokio::fs::write(&file, &export.bytes).await.map_err(|e| {
                CirculationError::ExportError(format!("cannot write {}: {e}", file.display()))
            })?;
            println!("Exported {kind} to {}", file.display());
            Ok(())
        }
    }
}

async fn serve(library: Library, args: &ServeArgs) -> Result<(), CirculationError> {
    let router = create_router(library, &args.api_options());
    let addr = args.addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| CirculationError::ConfigError(format!("cannot listen on {addr}: {e}")))?;
    tracing::info!(%addr, "server running");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CirculationError::Other(format!("server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
