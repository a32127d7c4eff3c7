use clap::Parser;
use tracing::{error, info};

mod credentials;
mod engine;
mod render;
mod session;

use engine::{build_resolver, BoardEngine};
use timetable_core::config::TimetableConfig;
use timetable_core::dates::parse_date;

/// Shows a school's daily timetable and keeps it up to date.
#[derive(Debug, Parser)]
#[command(name = "timetable-board", version)]
struct Args {
    /// Path to timetable.toml (default: $TIMETABLE_CONFIG, then ~/.timetable/timetable.toml).
    #[arg(long)]
    config: Option<String>,

    /// Store this API token and use it from now on.
    #[arg(long)]
    token: Option<String>,

    /// Resolve and print once, then exit.
    #[arg(long)]
    once: bool,

    /// Start searching at this date (YYYY-MM-DD) instead of the next school day.
    #[arg(long)]
    date: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timetable_board=info,timetable_client=info".into()),
        )
        .init();

    let args = Args::parse();

    // explicit path > TIMETABLE_CONFIG env > ~/.timetable/timetable.toml
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var("TIMETABLE_CONFIG").ok());
    let config = TimetableConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        TimetableConfig::default()
    });

    let start_date = args.date.as_deref().map(parse_date).transpose()?;
    let resolver = build_resolver(&config)?;
    let mut engine = BoardEngine::new(config, config_path, resolver)
        .with_start_date(start_date)
        .with_token(args.token.clone());

    if let Some(token) = args.token.as_deref() {
        engine.store().save(token)?;
    }
    engine.ensure_token().await?;

    if args.once {
        engine.refresh().await;
        println!("{}", engine.render());
        if let Some(err) = engine.session().last_error() {
            error!("refresh failed: {err}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            let _ = shutdown_tx.send(true);
        }
    });

    engine.run(shutdown_rx).await;
    Ok(())
}
