//! # Imelink CLI Entry Point
//!
//! Main binary for the imelink IME display manager. Provides a command-line
//! interface for hosting the manager service and for driving it as a client.
//!
//! ## Usage
//!
//! ```bash
//! # Host the manager service, targeting display 2
//! imelink serve -b 0.0.0.0:7400 -d 2
//!
//! # Ask which display hosts the IME
//! imelink status -c 127.0.0.1:7400
//!
//! # Report the client window visible / hidden
//! imelink show -c 127.0.0.1:7400
//! imelink hide -c 127.0.0.1:7400
//!
//! # Register a callback endpoint and log pushed display changes
//! imelink watch -c 127.0.0.1:7400
//! ```
//!
//! Logging is configured through `RUST_LOG` (e.g. `RUST_LOG=imelink=debug`).

use std::sync::Arc;

use anyhow::Result;
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use imelink_client::ImeClientManager;
use imelink_common::transport::TcpServer;
use imelink_server::{serve_manager, ImeDisplayService, TcpCallbackConnector};

/// Main CLI structure parsed from command-line arguments.
#[derive(FromArgs)]
/// imelink - IME display control over a binder-style IPC binding
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
    Status(StatusArgs),
    Show(ShowArgs),
    Hide(HideArgs),
    Watch(WatchArgs),
}

/// Arguments for hosting the IME manager service.
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// host the IME manager service
struct ServeArgs {
    /// address to bind the manager to
    #[argh(option, short = 'b', default = "\"0.0.0.0:7400\".into()")]
    bind: String,

    /// display id the IME initially targets (-1 for none)
    #[argh(option, short = 'd', default = "-1")]
    display_id: i32,
}

/// Arguments for querying the IME display.
#[derive(FromArgs)]
#[argh(subcommand, name = "status")]
/// print the display currently hosting the IME
struct StatusArgs {
    /// manager address to connect to
    #[argh(option, short = 'c')]
    connect: String,
}

/// Arguments for reporting the client window visible.
#[derive(FromArgs)]
#[argh(subcommand, name = "show")]
/// report the client window as visible
struct ShowArgs {
    /// manager address to connect to
    #[argh(option, short = 'c')]
    connect: String,
}

/// Arguments for reporting the client window hidden.
#[derive(FromArgs)]
#[argh(subcommand, name = "hide")]
/// report the client window as hidden
struct HideArgs {
    /// manager address to connect to
    #[argh(option, short = 'c')]
    connect: String,
}

/// Arguments for watching pushed display changes.
#[derive(FromArgs)]
#[argh(subcommand, name = "watch")]
/// register a callback endpoint and log pushed display changes
struct WatchArgs {
    /// manager address to connect to
    #[argh(option, short = 'c')]
    connect: String,

    /// address to host the callback endpoint on
    #[argh(option, short = 'b', default = "\"127.0.0.1:0\".into()")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli: Cli = argh::from_env();
    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Status(args) => status(args).await,
        Commands::Show(args) => window_status(args.connect, true).await,
        Commands::Hide(args) => window_status(args.connect, false).await,
        Commands::Watch(args) => watch(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let service = Arc::new(ImeDisplayService::with_display(
        Arc::new(TcpCallbackConnector),
        args.display_id,
    )?);
    serve_manager(&args.bind, service).await?;
    Ok(())
}

async fn status(args: StatusArgs) -> Result<()> {
    let display_id = tokio::task::spawn_blocking(move || {
        let client = ImeClientManager::connect(&args.connect)?;
        client.ime_display()
    })
    .await??;
    println!("{}", display_id);
    Ok(())
}

async fn window_status(connect: String, show: bool) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let client = ImeClientManager::connect(&connect)?;
        client.send_window_status(show)
    })
    .await??;
    Ok(())
}

async fn watch(args: WatchArgs) -> Result<()> {
    let client = tokio::task::spawn_blocking(move || ImeClientManager::connect(&args.connect))
        .await??;
    let client = Arc::new(client);

    let callback_server = TcpServer::bind(&args.bind).await?;
    let endpoint = callback_server.local_addr()?.to_string();
    let stub = client.callback_stub();
    tokio::spawn(async move {
        if let Err(e) = callback_server.serve(stub).await {
            tracing::error!(error = %e, "callback endpoint failed");
        }
    });

    let registering = client.clone();
    tokio::task::spawn_blocking(move || registering.register(&endpoint)).await??;
    tracing::info!(display_id = client.state().display_id(), "watching");

    // Pushed changes are logged by the callback handler; park forever.
    std::future::pending::<()>().await;
    Ok(())
}
