#[path = "attend-mint-service/cli.rs"]
mod cli;
#[path = "attend-mint-service/setup.rs"]
mod setup;

use crate::cli::Cli;
use attend_core::foundation::PipelineError;
use attend_core::infrastructure::config::load_app_config;
use attend_core::infrastructure::storage::StatusStore;
use attend_service::api::{run_api_server, ApiState};
use attend_service::service::metrics::Metrics;
use attend_service::service::reporter::run_unfinished_job_reporter_loop;
use attend_service::service::scheduler::{run_mint_scheduler, SchedulerConfig};
use attend_service::service::shutdown::shutdown_channel;
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    args.apply_to_env();

    let app_config = load_app_config()?;
    setup::init_logging(&app_config, args.log_level.as_deref())?;
    info!(
        "attend-mint-service starting version={} data_dir={} ledger_mode={} listen_addr={}",
        env!("CARGO_PKG_VERSION"),
        app_config.service.data_dir,
        app_config.ledger.mode,
        app_config.api.listen_addr
    );

    let store = setup::init_storage(&app_config)?;
    let store_dyn: Arc<dyn StatusStore> = store.clone();
    info!("storage initialized data_dir={}", app_config.service.data_dir);

    let ledger = setup::init_ledger(&app_config)?;
    let signer = setup::init_signer(&app_config)?;
    let metrics = Arc::new(Metrics::new()?);
    let pipeline = setup::build_pipeline(&app_config, store_dyn.clone(), ledger.clone(), signer, metrics.clone());

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let scheduler = tokio::spawn(run_mint_scheduler(
        pipeline.coordinator.clone(),
        pipeline.ready,
        SchedulerConfig::from(&app_config.pipeline),
        shutdown_rx.clone(),
    ));

    let report_interval_secs = app_config.pipeline.report_interval_secs;
    let reporter = if report_interval_secs > 0 {
        info!("unfinished job reporter started interval_seconds={}", report_interval_secs);
        Some(tokio::spawn(run_unfinished_job_reporter_loop(
            store_dyn.clone(),
            metrics.clone(),
            Duration::from_secs(report_interval_secs),
            shutdown_rx.clone(),
        )))
    } else {
        None
    };

    let listen_addr: SocketAddr = app_config
        .api
        .listen_addr
        .parse()
        .map_err(|err| PipelineError::ConfigError(format!("invalid api.listen_addr {:?}: {}", app_config.api.listen_addr, err)))?;
    let api_state = Arc::new(ApiState {
        ingestor: pipeline.ingestor,
        coordinator: pipeline.coordinator,
        queries: pipeline.queries,
        queue: pipeline.queue,
        ledger,
        metrics,
        operator_token: app_config.api.operator_token.clone(),
        max_body_bytes: app_config.api.max_body_bytes,
    });
    if api_state.operator_token.as_deref().map(str::trim).filter(|token| !token.is_empty()).is_none() {
        warn!("api.operator_token is not set; retry and bulk-mint endpoints are unauthenticated");
    }
    let mut server = tokio::spawn(run_api_server(listen_addr, api_state, shutdown_rx));

    let early_exit = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| PipelineError::Message(err.to_string()))?;
            info!("shutdown signal received");
            None
        }
        joined = &mut server => Some(joined),
    };
    let _ = shutdown_tx.send(true);

    let server_result = match early_exit {
        Some(joined) => {
            warn!("api server exited before a shutdown signal");
            joined
        }
        None => server.await,
    };
    match server_result {
        Ok(Err(err)) => warn!("api server error: {}", err),
        Err(err) => warn!("api server task failed: {}", err),
        Ok(Ok(())) => {}
    }
    match scheduler.await {
        Ok(Err(err)) => warn!("mint scheduler error: {}", err),
        Err(err) => warn!("mint scheduler task failed: {}", err),
        Ok(Ok(())) => {}
    }
    if let Some(reporter) = reporter {
        let _ = reporter.await;
    }
    store.flush()?;
    info!("attend-mint-service stopped");
    Ok(())
}
