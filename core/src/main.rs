// CARDWATCH CORE
// Backend for the single-page fraud screening form

mod alert;
mod config;
mod http;
mod ml;
mod telemetry;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{oneshot, RwLock};

use crate::alert::AlertSync;
use crate::config::CoreConfig;
use crate::http::ApiState;
use crate::ml::Predictor;
use crate::telemetry::{StatsSnapshot, TelemetryStore};

fn main() {
    let _ = env_logger::try_init();

    if let Err(error) = run_console() {
        eprintln!("[CARDWATCH] {}", error);
        std::process::exit(1);
    }
}

fn run_console() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(async move {
            if let Err(error) = tokio::signal::ctrl_c().await {
                eprintln!("[CARDWATCH] Failed to listen for shutdown: {}", error);
            }
            let _ = shutdown_tx.send(());
        });

        let stats = run_until_shutdown(shutdown_rx).await?;
        println!(
            "[STATS] assessed={}, flagged={}, cleared={}",
            stats.assessed, stats.flagged, stats.cleared
        );

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}

pub async fn run_until_shutdown(
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<StatsSnapshot, Box<dyn std::error::Error>> {
    println!("==========================================");
    println!("=     CARDWATCH CORE - INITIALIZING      =");
    println!("=    Transaction Fraud Screening API     =");
    println!("==========================================\n");

    let config = CoreConfig::from_env();

    // Both artifacts load before the listener binds; a bad artifact means
    // the process refuses to start.
    let predictor = Predictor::load(
        &PathBuf::from(&config.model_path),
        &PathBuf::from(&config.scaler_path),
    )?;

    println!(
        "[OK] Classifier: {} v{} (threshold {})",
        predictor.model_id(),
        predictor.model_version(),
        predictor.threshold()
    );
    println!(
        "[OK] Scaler: loaded ({} features)",
        ml::features::FEATURE_COUNT
    );

    let telemetry = Arc::new(TelemetryStore::new(config.history_limit));
    let alert = Arc::new(AlertSync::new());
    if alert.is_configured() {
        println!("[OK] Alert push: CONFIGURED");
    }

    let api_addr = config.api_addr.clone();
    let state = ApiState {
        telemetry: Arc::clone(&telemetry),
        predictor: Arc::new(predictor),
        alert,
        config: Arc::new(RwLock::new(config)),
    };

    println!("[OK] API: serving on {}\n", api_addr);

    let api_handle = tokio::spawn(async move {
        if let Err(error) = http::serve(api_addr, state).await {
            eprintln!("[API] Server error: {}", error);
        }
    });

    let _ = shutdown_rx.await;

    println!("\n[CARDWATCH] Shutting down gracefully...");
    api_handle.abort();

    Ok(telemetry.snapshot_stats().await)
}
