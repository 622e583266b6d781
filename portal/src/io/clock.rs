//! Periodic wall-clock ticks delivered over a channel.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Background ticker. Cancelled by [`Clock::cancel`] or on drop.
///
/// After cancellation returns no further tick is sent.
#[derive(Debug)]
pub struct Clock {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Clock {
    /// Send local time on `ticks` every `period`, the first tick immediately.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(period: Duration, ticks: mpsc::Sender<NaiveDateTime>) -> Self {
        Self::spawn_with(period, ticks, || Local::now().naive_local())
    }

    /// Like [`spawn`](Self::spawn) with an injected time source.
    pub fn spawn_with<F>(period: Duration, ticks: mpsc::Sender<NaiveDateTime>, now: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = timer.tick() => {
                        let sent = tokio::select! {
                            biased;
                            () = token.cancelled() => break,
                            sent = ticks.send(now()) => sent,
                        };
                        if sent.is_err() {
                            debug!("tick receiver gone");
                            break;
                        }
                    }
                }
            }
            debug!("clock stopped");
        });
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait for the ticker task to exit.
    pub async fn join(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            // A panicked or aborted ticker has stopped either way.
            let _ = handle.await;
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::at_noon;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_cancelled() {
        let (tx, mut rx) = mpsc::channel(8);
        let clock = Clock::spawn_with(Duration::from_secs(1), tx, || at_noon(2018, 6, 1));

        assert_eq!(rx.recv().await, Some(at_noon(2018, 6, 1)));
        assert_eq!(rx.recv().await, Some(at_noon(2018, 6, 1)));

        clock.join().await;
        while rx.try_recv().is_ok() {}
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_ticker() {
        let (tx, mut rx) = mpsc::channel(8);
        let clock = Clock::spawn_with(Duration::from_secs(1), tx, || at_noon(2018, 6, 1));
        assert!(rx.recv().await.is_some());
        drop(clock);
        while rx.try_recv().is_ok() {}
        assert_eq!(rx.recv().await, None);
    }
}
