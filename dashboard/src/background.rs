use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::export;
use crate::state::AppState;

/// Periodically reloads the sample store and rewrites the exported SVG charts.
pub fn spawn_background_workers(state: Arc<AppState>, export_interval: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(export_interval);
        loop {
            interval.tick().await;

            if let Err(e) = state.reload().await {
                error!("Failed to reload samples: {e:#}");
                continue;
            }

            let samples = state.samples().await;
            let plot_dir = state.plot_dir.clone();
            match tokio::task::spawn_blocking(move || export::export_all(&samples, &plot_dir)).await
            {
                Ok(Ok(written)) => info!("Exported {} charts", written.len()),
                Ok(Err(e)) => error!("Chart export failed: {e:#}"),
                Err(e) => error!("Chart export task panicked: {e}"),
            }
        }
    });
}
