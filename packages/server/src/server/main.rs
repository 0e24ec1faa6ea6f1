// Main entry point for the IndexNow server and CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indexnow::{PublishEvent, RequestContext, Visibility};
use indexnow_server::kernel::{build_indexnow, run_scheduled_tick, start_scheduler, ServerDeps};
use indexnow_server::server::build_app;
use indexnow_server::server::routes::{BulkReportResponse, TickResponse};
use indexnow_server::Config;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "indexnow-server")]
#[command(about = "Announce site URLs to search engines via IndexNow")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server and the periodic sitemap tick (default)
    Serve,

    /// Submit a single published item
    Publish {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        permalink: String,
        #[arg(long, default_value = "publish")]
        visibility: String,
        #[arg(long, default_value_t = 0)]
        user_id: i64,
    },

    /// Resolve and submit a sitemap now, ignoring the interval
    SubmitSitemap {
        #[arg(long)]
        sitemap_url: Option<String>,
        #[arg(long, default_value_t = 0)]
        user_id: i64,
    },

    /// Run one gate-checked sitemap tick
    Tick,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,indexnow=debug,indexnow_server=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let indexnow = build_indexnow(&config)
        .await
        .context("Failed to build IndexNow pipeline")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, ServerDeps::new(indexnow)).await?,

        Commands::Publish {
            id,
            permalink,
            visibility,
            user_id,
        } => {
            let event = PublishEvent::new(id, Visibility::from(visibility.as_str()), permalink);
            let outcome = indexnow
                .handle_publish(&event, &RequestContext::new(user_id, "cli"))
                .await;
            print_json(&outcome)?;
        }

        Commands::SubmitSitemap {
            sitemap_url,
            user_id,
        } => {
            let report = indexnow
                .handle_manual_submit(sitemap_url.as_deref(), &RequestContext::new(user_id, "cli"))
                .await;
            print_json(&BulkReportResponse::from(&report))?;
        }

        Commands::Tick => {
            let outcome = run_scheduled_tick(&indexnow).await;
            print_json(&TickResponse::from(&outcome))?;
        }
    }

    Ok(())
}

async fn serve(config: Config, deps: ServerDeps) -> Result<()> {
    let mut scheduler = start_scheduler(deps.indexnow.clone(), &config.tick_schedule)
        .await
        .context("Failed to start scheduler")?;

    let app = build_app(deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    })
    .await
    .context("Server error")?;

    scheduler
        .shutdown()
        .await
        .context("Failed to stop scheduler")?;

    Ok(())
}
