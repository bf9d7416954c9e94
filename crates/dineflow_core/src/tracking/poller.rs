//! Fixed-interval order status polling.
//!
//! # Responsibility
//! - Run a status fetch immediately, then once per interval, on a worker thread.
//! - Report status changes and fetch failures to a callback.
//!
//! # Invariants
//! - No backoff: a failed fetch waits exactly one interval before the next try.
//! - A failure never clears the last delivered status.
//! - `Changed` fires only when the status differs from the last delivered one.
//! - Polling ends after a terminal status, on `PollHandle::stop`, or on drop.

use crate::model::order::OrderStatus;
use log::{debug, info, warn};
use std::fmt::Display;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

pub const MIN_POLL_INTERVAL_SECS: u64 = 5;
pub const MAX_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Event delivered to the poll callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Changed(OrderStatus),
    Failed(String),
}

/// Clamps a caller-provided interval into the supported polling range.
pub fn normalize_poll_interval(secs: Option<u64>) -> Duration {
    let secs = match secs {
        Some(0) | None => DEFAULT_POLL_INTERVAL_SECS,
        Some(value) => value.clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS),
    };
    Duration::from_secs(secs)
}

/// Owner of a running poll loop. Dropping it stops polling.
pub struct PollHandle {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stops polling and waits for the worker thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Whether the loop has ended on its own (terminal status reached).
    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map_or(true, |worker| worker.is_finished())
    }

    fn shutdown(&mut self) {
        // Disconnecting the channel wakes the worker out of its interval wait.
        drop(self.stop_tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("event=poll_stop module=tracking status=error error_code=worker_panicked");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawner for status poll loops.
pub struct StatusPoller;

impl StatusPoller {
    /// Starts polling `fetch` every `interval`, reporting through `on_event`.
    ///
    /// # Errors
    /// - Returns an I/O error when the worker thread cannot be spawned.
    pub fn spawn<F, E, C>(
        interval: Duration,
        mut fetch: F,
        mut on_event: C,
    ) -> std::io::Result<PollHandle>
    where
        F: FnMut() -> Result<OrderStatus, E> + Send + 'static,
        E: Display,
        C: FnMut(PollEvent) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker = std::thread::Builder::new()
            .name("order-status-poller".to_string())
            .spawn(move || {
                info!(
                    "event=poll_start module=tracking status=ok interval_ms={}",
                    interval.as_millis()
                );
                let mut last: Option<OrderStatus> = None;
                loop {
                    match fetch() {
                        Ok(status) => {
                            if last != Some(status) {
                                debug!(
                                    "event=poll_changed module=tracking status=ok order_status={}",
                                    status
                                );
                                last = Some(status);
                                on_event(PollEvent::Changed(status));
                            }
                            if status.is_terminal() {
                                info!(
                                    "event=poll_stop module=tracking status=ok reason=terminal order_status={}",
                                    status
                                );
                                return;
                            }
                        }
                        Err(err) => {
                            warn!(
                                "event=poll_fetch module=tracking status=error error={}",
                                err
                            );
                            on_event(PollEvent::Failed(err.to_string()));
                        }
                    }

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            info!("event=poll_stop module=tracking status=ok reason=teardown");
                            return;
                        }
                    }
                }
            })?;

        Ok(PollHandle {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_poll_interval, PollEvent, StatusPoller};
    use crate::model::order::OrderStatus;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    const TICK: Duration = Duration::from_millis(5);

    fn scripted(
        script: Vec<Result<OrderStatus, &'static str>>,
    ) -> impl FnMut() -> Result<OrderStatus, &'static str> + Send + 'static {
        let queue = Arc::new(Mutex::new(VecDeque::from(script)));
        move || {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err("script exhausted"))
        }
    }

    fn wait_until_finished(handle: &super::PollHandle) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.is_finished() {
            assert!(Instant::now() < deadline, "poller did not finish in time");
            std::thread::sleep(TICK);
        }
    }

    #[test]
    fn interval_is_clamped_and_defaulted() {
        assert_eq!(normalize_poll_interval(None), Duration::from_secs(10));
        assert_eq!(normalize_poll_interval(Some(0)), Duration::from_secs(10));
        assert_eq!(normalize_poll_interval(Some(1)), Duration::from_secs(5));
        assert_eq!(normalize_poll_interval(Some(12)), Duration::from_secs(12));
        assert_eq!(normalize_poll_interval(Some(600)), Duration::from_secs(30));
    }

    #[test]
    fn emits_only_changes_and_stops_on_terminal_status() {
        let (tx, rx) = mpsc::channel();
        let handle = StatusPoller::spawn(
            TICK,
            scripted(vec![
                Ok(OrderStatus::Created),
                Ok(OrderStatus::Created),
                Ok(OrderStatus::Paid),
                Ok(OrderStatus::Completed),
            ]),
            move |event| {
                let _ = tx.send(event);
            },
        )
        .unwrap();

        wait_until_finished(&handle);
        handle.stop();

        let events = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(
            events,
            vec![
                PollEvent::Changed(OrderStatus::Created),
                PollEvent::Changed(OrderStatus::Paid),
                PollEvent::Changed(OrderStatus::Completed),
            ]
        );
    }

    #[test]
    fn failures_are_reported_and_polling_continues() {
        let (tx, rx) = mpsc::channel();
        let handle = StatusPoller::spawn(
            TICK,
            scripted(vec![
                Ok(OrderStatus::Accepted),
                Err("network down"),
                Ok(OrderStatus::Accepted),
                Ok(OrderStatus::Cancelled),
            ]),
            move |event| {
                let _ = tx.send(event);
            },
        )
        .unwrap();

        wait_until_finished(&handle);
        drop(handle);

        let events = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(
            events,
            vec![
                PollEvent::Changed(OrderStatus::Accepted),
                PollEvent::Failed("network down".to_string()),
                PollEvent::Changed(OrderStatus::Cancelled),
            ]
        );
    }

    #[test]
    fn stop_tears_down_a_non_terminal_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = StatusPoller::spawn(
            Duration::from_secs(60),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &'static str>(OrderStatus::Paid)
            },
            |_| {},
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while calls.load(Ordering::SeqCst) == 0 {
            assert!(Instant::now() < deadline, "first fetch never ran");
            std::thread::sleep(TICK);
        }

        let started = Instant::now();
        handle.stop();
        assert!(started.elapsed() < Duration::from_secs(30));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
