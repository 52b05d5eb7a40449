//! symlens - symbol lookup and hierarchy traversal CLI
//!
//! Answers symbol queries from language servers as compact tables
//! for AI coding agents.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use symlens::app::App;
use symlens::cli::{Cli, Commands};
use symlens::models::HierarchyKind;

fn main() {
    // Quiet by default; RUST_LOG=symlens=debug for verbose output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "symlens=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!(
                r#"{{"success":false,"error":"Failed to create runtime: {}"}}"#,
                e
            );
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(async_main());

    if let Err(e) = result {
        let response = serde_json::json!({
            "success": false,
            "error": e.to_string()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| format!(r#"{{"success":false,"error":"{}"}}"#, e))
        );
        std::process::exit(2);
    }
}

async fn async_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app = App::new(cli.root, cli.format)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize: {}", e))?;

    let result = execute_command(cli.command, &app).await;
    app.shutdown().await;
    result
}

async fn execute_command(command: Commands, app: &App) -> anyhow::Result<()> {
    use symlens::cli::commands::{self, lookup::LookupCommand};

    match command {
        Commands::Resolve(args) => {
            commands::lookup::execute(LookupCommand::Resolve, args, app).await
        }
        Commands::Symbols(args) => commands::symbols::execute(args, app).await,

        // Location queries
        Commands::Refs(args) => {
            commands::lookup::execute(LookupCommand::References, args, app).await
        }
        Commands::Def(args) => {
            commands::lookup::execute(LookupCommand::Definition, args, app).await
        }
        Commands::Decl(args) => {
            commands::lookup::execute(LookupCommand::Declaration, args, app).await
        }
        Commands::Typedef(args) => {
            commands::lookup::execute(LookupCommand::TypeDefinition, args, app).await
        }
        Commands::Impl(args) => {
            commands::lookup::execute(LookupCommand::Implementation, args, app).await
        }
        Commands::Hover(args) => commands::lookup::execute(LookupCommand::Hover, args, app).await,

        // Hierarchies
        Commands::Calls(args) => commands::hierarchy::execute(HierarchyKind::Call, args, app).await,
        Commands::Types(args) => commands::hierarchy::execute(HierarchyKind::Type, args, app).await,
        Commands::Children(args) => commands::children::execute(args, app).await,

        Commands::Config(args) => commands::config::execute(args, app).await,
    }
}
