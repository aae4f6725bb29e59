//! Status polling worker for deployment items

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::tool::item::DeployItem;

/// Status worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Polling interval
    pub interval: Duration,

    /// Initial delay before the first poll
    pub initial_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            initial_delay: Duration::from_secs(1),
        }
    }
}

/// Run the status worker for one item.
///
/// A failed refresh is terminal for that tick only; the next tick is a
/// fresh attempt.
pub async fn run<S, F>(
    options: &Options,
    item: &DeployItem,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Status worker starting...");

    // Initial delay
    sleep_fn(options.initial_delay).await;

    loop {
        // Check for shutdown
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Status worker shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {
                // Continue with poll
            }
        }

        debug!("Refreshing deployment status...");

        match item.refresh_status().await {
            Ok(status) => {
                debug!("Deployment status: {:?}", status.state());
            }
            Err(e) => {
                error!("Status refresh failed: {}", e);
            }
        }
    }
}
