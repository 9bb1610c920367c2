//! Debouncer (§4.7). Collapses a burst of inbound ticks into at most one
//! outbound tick per burst, bounded by `Wait.min`/`Wait.max`. `None` (or
//! `min == 0`) forwards every input verbatim.

use std::pin::Pin;

use tokio::sync::mpsc;
use tokio::time::Sleep;

use crate::config::Wait;

pub async fn run(mut input: mpsc::Receiver<()>, wait: Option<Wait>, output: mpsc::Sender<()>) {
    let wait = match wait {
        Some(wait) if !wait.min.is_zero() => wait,
        _ => {
            while input.recv().await.is_some() {
                if output.send(()).await.is_err() {
                    return;
                }
            }
            return;
        }
    };

    let mut min_timer: Option<Pin<Box<Sleep>>> = None;
    let mut max_timer: Option<Pin<Box<Sleep>>> = None;
    let mut pending = false;

    loop {
        tokio::select! {
            maybe_event = input.recv() => {
                match maybe_event {
                    Some(()) => {
                        pending = true;
                        min_timer = Some(Box::pin(tokio::time::sleep(wait.min)));
                        if max_timer.is_none() {
                            max_timer = Some(Box::pin(tokio::time::sleep(wait.max)));
                        }
                    }
                    None => return,
                }
            }
            () = sleep_or_pending(&mut min_timer) => {
                if pending {
                    pending = false;
                    if output.send(()).await.is_err() {
                        return;
                    }
                }
                min_timer = None;
                max_timer = None;
            }
            () = sleep_or_pending(&mut max_timer) => {
                if pending {
                    pending = false;
                    if output.send(()).await.is_err() {
                        return;
                    }
                }
                min_timer = None;
                max_timer = None;
            }
        }
    }
}

async fn sleep_or_pending(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn forwards_verbatim_without_wait() {
        let (in_tx, in_rx) = mpsc::channel(10);
        let (out_tx, mut out_rx) = mpsc::channel(10);
        tokio::spawn(run(in_rx, None, out_tx));

        in_tx.send(()).await.unwrap();
        in_tx.send(()).await.unwrap();
        drop(in_tx);

        assert!(out_rx.recv().await.is_some());
        assert!(out_rx.recv().await.is_some());
        assert!(out_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn collapses_burst_to_one_tick_on_min_timer() {
        let (in_tx, in_rx) = mpsc::channel(10);
        let (out_tx, mut out_rx) = mpsc::channel(10);
        let wait = Wait {
            min: Duration::from_millis(50),
            max: Duration::from_secs(5),
        };
        tokio::spawn(run(in_rx, Some(wait), out_tx));

        in_tx.send(()).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        in_tx.send(()).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        in_tx.send(()).await.unwrap();

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(out_rx.recv().await.is_some());

        // No further burst; nothing else should be pending.
        drop(in_tx);
        assert!(out_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn emits_within_max_under_continuous_input() {
        let (in_tx, in_rx) = mpsc::channel(10);
        let (out_tx, mut out_rx) = mpsc::channel(10);
        let wait = Wait {
            min: Duration::from_millis(50),
            max: Duration::from_millis(120),
        };
        tokio::spawn(run(in_rx, Some(wait), out_tx));

        // Keep resetting min_timer faster than it can fire, for longer than max.
        for _ in 0..10 {
            in_tx.send(()).await.unwrap();
            tokio::time::advance(Duration::from_millis(20)).await;
        }

        assert!(out_rx.recv().await.is_some());
        drop(in_tx);
    }
}
