use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mandate_core::config::CoreConfig;
use mandate_core::logging;
use mandate_rules::{load_catalog, public_rule_id};
use mandate_server::{build_router, seed_catalog, AppState, EvaluationRepository};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mandate-server")]
#[command(about = "Mandate - regulatory obligations evaluation service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP evaluation service
    Serve(ServeArgs),
    /// Load rule packs into the catalog table
    Seed(SeedArgs),
    /// Validate rule packs without touching the database
    CatalogCheck(CatalogCheckArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 0.0.0.0:8080 (falls back to MANDATE_HTTP_BIND)
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Args)]
struct SeedArgs {
    /// Directory or file holding rule packs
    #[arg(long, default_value = "catalog")]
    catalog: PathBuf,
    /// Overwrite rules that already exist instead of skipping them
    #[arg(long, default_value_t = false)]
    replace: bool,
}

#[derive(Args)]
struct CatalogCheckArgs {
    /// Directory or file holding rule packs
    #[arg(long, default_value = "catalog")]
    catalog: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = logging::init_tracing(None) {
        eprintln!("⚠️ failed to initialise tracing: {err}");
    }

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Seed(args) => seed(args).await,
        Commands::CatalogCheck(args) => catalog_check(args),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = CoreConfig::from_env().context("failed to load configuration")?;
    let repository = connect(&config).await?;

    // An empty catalog with a configured pack path gets seeded on boot so a
    // fresh deployment answers evaluations immediately.
    if let Some(path) = &config.catalog_path {
        if repository.rule_count().await? == 0 {
            let summary = seed_catalog(&repository, path, false)
                .await
                .context("failed to seed catalog on startup")?;
            info!(
                inserted = summary.inserted,
                path = %path.display(),
                "seeded empty catalog"
            );
        }
    }

    let state = AppState {
        repository,
        version: env!("CARGO_PKG_VERSION"),
    };
    let app = build_router(state);

    let bind = args
        .bind
        .or_else(|| config.http_bind.clone())
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());
    let addr: SocketAddr = bind.parse().context("invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;
    let actual_addr = listener
        .local_addr()
        .context("failed to read socket address")?;
    info!(%actual_addr, "starting mandate-server");

    if let Err(err) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(?err, "server terminated with error");
    }

    Ok(())
}

async fn seed(args: SeedArgs) -> anyhow::Result<()> {
    let config = CoreConfig::from_env().context("failed to load configuration")?;
    let repository = connect(&config).await?;

    let summary = seed_catalog(&repository, &args.catalog, args.replace)
        .await
        .context("failed to seed catalog")?;

    println!(
        "Seeded rules: {} inserted, {} replaced, {} skipped",
        summary.inserted, summary.replaced, summary.skipped
    );
    Ok(())
}

fn catalog_check(args: CatalogCheckArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(&args.catalog).context("rule packs failed validation")?;
    println!("Catalog OK: {} rules", catalog.len());
    for rule in catalog.rules() {
        let id = public_rule_id(&rule.jurisdiction, &rule.title, rule.category.as_deref(), None);
        println!("  {id}");
    }
    Ok(())
}

async fn connect(config: &CoreConfig) -> anyhow::Result<EvaluationRepository> {
    EvaluationRepository::from_config(config)
        .await
        .context("failed to connect and run migrations")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
