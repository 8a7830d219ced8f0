use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use futures_util::future;
use log::{debug, info};
use oracle::message_bus::{MessageBus, UiCommand};
use oracle::{store, PixelOracle};
use tokio::signal;
use utils::{print_err, unwrap_or_def_verbose, ResultExt as _};

mod api;
mod logging;
mod oracle;
mod utils;

async fn terminate_on_signal() -> Result<()> {
    let interrupt_signal: Pin<Box<dyn Future<Output = _>>> = Box::pin(async {
        signal::unix::signal(signal::unix::SignalKind::interrupt())
            .context("Failed to register terminate signal handlers!")?
            .recv()
            .await;
        Ok(())
    });
    let terminate_signal = Box::pin(async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to register terminate signal handlers!")?
            .recv()
            .await;
        Ok(())
    });
    future::select_all([interrupt_signal, terminate_signal])
        .await
        .0
}

#[tokio::main]
async fn main() {
    let _logger = logging::init();
    let config = unwrap_or_def_verbose(store::load_config());
    let responses = unwrap_or_def_verbose(store::load_response_table(&config.responses_file));
    let message_bus = MessageBus::new();

    let oracle = PixelOracle::new(responses, config.clone(), message_bus.clone());
    let oracle_task = tokio::spawn(oracle.dispatch_inputs(message_bus.subscribe()));

    tokio::spawn({
        let message_bus = message_bus.clone();
        async move {
            api::serve(message_bus, config.serving_addr, config.static_serving_dir)
                .await
                .print_err()
        }
    });

    info!("Running");
    terminate_on_signal().await.print_err();
    info!("Terminating.");
    message_bus.send(UiCommand::CloseApplication.into());

    debug!("Waiting for the oracle to stop...");
    let _ = oracle_task.await.inspect_err(print_err);
    debug!("Oracle stopped.")
}
