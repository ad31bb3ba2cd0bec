//! # Quote Refresh Countdown
//!
//! Keeps a displayed quote fresh by re-requesting it on a fixed cadence.
//!
//! [`Countdown`] is the pure state machine: it starts at `N`, loses one
//! second per [`Countdown::tick`], and on reaching zero reports
//! [`Tick::Fire`] and resets to `N`. [`spawn_countdown`] drives it from a
//! Tokio task that also accepts manual refresh and reset commands, publishes
//! the remaining seconds on a `watch` channel, and stops when its
//! [`CancellationToken`] is cancelled or the [`CountdownHandle`] is dropped.
//!
//! # Examples
//!
//! ```
//! use onramp_gateway::application::services::countdown::{Countdown, Tick};
//!
//! let mut countdown = Countdown::new(2);
//! assert_eq!(countdown.tick(), Tick::Remaining(1));
//! assert_eq!(countdown.tick(), Tick::Fire);
//! assert_eq!(countdown.remaining(), 2);
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Default refresh interval in seconds.
pub const DEFAULT_REFRESH_SECS: u32 = 15;

const TICK: Duration = Duration::from_secs(1);

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Seconds left before the next refresh.
    Remaining(u32),
    /// The countdown reached zero and has been reset.
    Fire,
}

/// Pure countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    interval: u32,
    remaining: u32,
}

impl Countdown {
    /// Creates a countdown starting at `interval_secs` (minimum 1).
    #[must_use]
    pub fn new(interval_secs: u32) -> Self {
        let interval = interval_secs.max(1);
        Self {
            interval,
            remaining: interval,
        }
    }

    /// Configured interval.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Seconds until the next refresh.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advances one second.
    pub fn tick(&mut self) -> Tick {
        if self.remaining > 1 {
            self.remaining -= 1;
            Tick::Remaining(self.remaining)
        } else {
            self.remaining = self.interval;
            Tick::Fire
        }
    }

    /// Restarts from the full interval.
    pub fn reset(&mut self) {
        self.remaining = self.interval;
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_SECS)
    }
}

/// Command sent to a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownCommand {
    /// Fire now and restart.
    Refresh,
    /// Restart without firing.
    Reset,
}

/// Handle to a running countdown task.
///
/// Dropping the handle cancels the task.
#[derive(Debug)]
pub struct CountdownHandle {
    commands: mpsc::Sender<CountdownCommand>,
    remaining: watch::Receiver<u32>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    /// Requests an immediate refresh.
    ///
    /// Returns false if the countdown has stopped.
    pub async fn refresh(&self) -> bool {
        self.commands.send(CountdownCommand::Refresh).await.is_ok()
    }

    /// Restarts the countdown without refreshing.
    ///
    /// Returns false if the countdown has stopped.
    pub async fn reset(&self) -> bool {
        self.commands.send(CountdownCommand::Reset).await.is_ok()
    }

    /// Current remaining seconds.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    /// Receiver that observes every change of the remaining seconds.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    /// Stops the countdown. No refresh fires after this returns.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels and waits for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawns a countdown that calls `on_fire` every `interval_secs` seconds and
/// on every manual refresh.
///
/// The countdown stops when `parent` is cancelled, when the returned handle
/// is cancelled or dropped, or when the command channel closes.
pub fn spawn_countdown<F, Fut>(
    interval_secs: u32,
    parent: &CancellationToken,
    mut on_fire: F,
) -> CountdownHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut countdown = Countdown::new(interval_secs);
    let (commands_tx, mut commands_rx) = mpsc::channel(8);
    let (remaining_tx, remaining_rx) = watch::channel(countdown.remaining());
    let cancel = parent.child_token();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let fire = tokio::select! {
                biased;
                () = token.cancelled() => break,
                command = commands_rx.recv() => match command {
                    Some(CountdownCommand::Refresh) => {
                        countdown.reset();
                        ticker.reset();
                        true
                    }
                    Some(CountdownCommand::Reset) => {
                        countdown.reset();
                        ticker.reset();
                        false
                    }
                    None => break,
                },
                _ = ticker.tick() => countdown.tick() == Tick::Fire,
            };

            if fire {
                trace!("countdown fired");
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    () = on_fire() => {}
                }
            }
            remaining_tx.send_replace(countdown.remaining());
        }
        debug!("countdown stopped");
    });

    CountdownHandle {
        commands: commands_tx,
        remaining: remaining_rx,
        cancel,
        task: Some(task),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod state {
        use super::*;

        #[test]
        fn fires_after_n_ticks_and_resets() {
            let mut countdown = Countdown::new(15);
            for expected in (1..15).rev() {
                assert_eq!(countdown.tick(), Tick::Remaining(expected));
            }
            assert_eq!(countdown.tick(), Tick::Fire);
            assert_eq!(countdown.remaining(), 15);
        }

        #[test]
        fn reset_restores_interval() {
            let mut countdown = Countdown::new(10);
            countdown.tick();
            countdown.tick();
            countdown.reset();
            assert_eq!(countdown.remaining(), 10);
        }

        #[test]
        fn zero_interval_clamped() {
            let mut countdown = Countdown::new(0);
            assert_eq!(countdown.interval(), 1);
            assert_eq!(countdown.tick(), Tick::Fire);
        }

        #[test]
        fn default_is_fifteen_seconds() {
            assert_eq!(Countdown::default().remaining(), DEFAULT_REFRESH_SECS);
        }
    }

    mod driver {
        use super::*;

        fn counting() -> (Arc<AtomicUsize>, impl FnMut() -> std::future::Ready<()> + Send) {
            let fired = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&fired);
            let on_fire = move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::future::ready(())
            };
            (fired, on_fire)
        }

        #[tokio::test(start_paused = true)]
        async fn fires_every_interval() {
            let (fired, on_fire) = counting();
            let handle = spawn_countdown(5, &CancellationToken::new(), on_fire);

            tokio::time::sleep(Duration::from_millis(4_500)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 0);
            assert_eq!(handle.remaining(), 1);

            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 1);
            assert_eq!(handle.remaining(), 5);

            tokio::time::sleep(Duration::from_secs(5)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn manual_refresh_fires_and_restarts() {
            let (fired, on_fire) = counting();
            let handle = spawn_countdown(5, &CancellationToken::new(), on_fire);

            tokio::time::sleep(Duration::from_millis(3_500)).await;
            assert!(handle.refresh().await);
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 1);
            assert_eq!(handle.remaining(), 5);

            // Restarted: the next automatic fire is five seconds after the refresh.
            tokio::time::sleep(Duration::from_millis(4_000)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 1);
            tokio::time::sleep(Duration::from_millis(1_000)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn reset_does_not_fire() {
            let (fired, on_fire) = counting();
            let handle = spawn_countdown(5, &CancellationToken::new(), on_fire);

            tokio::time::sleep(Duration::from_millis(3_500)).await;
            assert!(handle.reset().await);
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(handle.remaining(), 5);
            assert_eq!(fired.load(Ordering::SeqCst), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn cancel_stops_firing() {
            let (fired, on_fire) = counting();
            let handle = spawn_countdown(2, &CancellationToken::new(), on_fire);
            handle.cancel();
            tokio::time::sleep(Duration::from_secs(10)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 0);
            assert!(!handle.refresh().await);
        }

        #[tokio::test(start_paused = true)]
        async fn parent_cancellation_propagates() {
            let (fired, on_fire) = counting();
            let parent = CancellationToken::new();
            let handle = spawn_countdown(2, &parent, on_fire);
            parent.cancel();
            tokio::time::sleep(Duration::from_secs(10)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 0);
            assert!(handle.is_cancelled());
        }

        #[tokio::test(start_paused = true)]
        async fn drop_cancels() {
            let (fired, on_fire) = counting();
            let handle = spawn_countdown(2, &CancellationToken::new(), on_fire);
            drop(handle);
            tokio::time::sleep(Duration::from_secs(10)).await;
            assert_eq!(fired.load(Ordering::SeqCst), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn subscribers_see_each_second() {
            let (_fired, on_fire) = counting();
            let handle = spawn_countdown(3, &CancellationToken::new(), on_fire);
            let mut rx = handle.subscribe();
            rx.changed().await.unwrap();
            assert_eq!(*rx.borrow_and_update(), 2);
            rx.changed().await.unwrap();
            assert_eq!(*rx.borrow_and_update(), 1);
            handle.shutdown().await;
        }
    }
}
