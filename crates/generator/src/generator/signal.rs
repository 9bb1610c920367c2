//! Signal Task (§4.2). Each subscriber registers its own
//! `tokio::signal::unix::signal` handle per kind it cares about — the OS
//! fans a given signal out to every registration, so tasks never share one.

use tokio::sync::mpsc;

/// Await any shutdown signal (interrupt, terminate, quit). Reusable by every
/// long-lived task (interval, per-watcher consumer, event multiplexer) that
/// needs its own shutdown subscription.
pub async fn await_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut quit = signal(SignalKind::quit()).expect("failed to install SIGQUIT handler");

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
        _ = quit.recv() => {}
    }
}

/// The dedicated Signal Task: additionally watches hangup and asks the
/// caller to run a full resync over `resync_tx`. Returns once a shutdown
/// signal arrives, dropping `resync_tx` so the caller's resync loop ends.
pub async fn run(resync_tx: mpsc::Sender<()>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                tracing::info!("received SIGHUP, triggering full resync");
                if resync_tx.send(()).await.is_err() {
                    return;
                }
            }
            _ = await_shutdown() => {
                tracing::info!("received shutdown signal, signal task exiting");
                return;
            }
        }
    }
}
