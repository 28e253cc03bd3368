use std::sync::Arc;
use std::time::Duration;

use cardpull_engine::reaper::run_session_reaper;
use cardpull_engine::{EngineConfig, GachaEngine};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardpull_worker=debug,cardpull_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = EngineConfig::from_env();
    tracing::info!(
        cooldown_secs = config.cooldown_secs,
        choice_timeout_secs = config.choice_timeout_secs,
        pity_legendary = config.pity.legendary_threshold,
        pity_mythic = config.pity.mythic_threshold,
        anilist_url = %config.anilist_url,
        "Loaded engine configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = cardpull_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    cardpull_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    cardpull_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Engine ---
    let sweep_interval = config.session_sweep_interval();
    let engine = Arc::new(GachaEngine::with_anilist(pool.clone(), config));
    tracing::info!("Gacha engine ready");

    let cancel = CancellationToken::new();
    let reaper_handle = tokio::spawn(run_session_reaper(
        Arc::clone(&engine),
        sweep_interval,
        cancel.clone(),
    ));

    shutdown_signal().await;

    // --- Shutdown ---
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reaper_handle).await;
    let dropped = engine.sessions().clear().await;
    if dropped > 0 {
        tracing::info!(dropped, "Discarded open draw sessions");
    }
    pool.close().await;
    tracing::info!("Worker shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
