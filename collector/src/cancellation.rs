use tokio::sync::watch;
use tracing::info;

/// A token that can be checked or awaited for cancellation.
#[derive(Clone)]
pub struct CancellationToken(watch::Receiver<bool>);

impl CancellationToken {
    /// Returns true if cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancellation is signalled. Never resolves if the sender is gone.
    pub async fn cancelled(&mut self) {
        if self.0.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sending half of a [`CancellationToken`].
pub struct Shutdown(watch::Sender<bool>);

impl Shutdown {
    pub fn new() -> (Self, CancellationToken) {
        let (tx, rx) = watch::channel(false);
        (Self(tx), CancellationToken(rx))
    }

    /// Signal cancellation. Returns false if it was already signalled.
    pub fn cancel(&self) -> bool {
        !self.0.send_replace(true)
    }
}

/// Returns a token cancelled on Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let (shutdown, token) = Shutdown::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, finishing current cycle");
            shutdown.cancel();
        }
    });
    token
}
