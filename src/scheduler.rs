//! Frame and signal cadences.
//!
//! The frame cadence is paced by whoever drives the scheduler: the window
//! runner redraws at the display's refresh rate, the headless runner at a
//! fixed interval. The signal cadence is an independent fixed-period timer
//! that the driver checks with [`Scheduler::signal_due`]. The two are not
//! phase-locked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::time::Time;

/// Clonable flag that asks a running swarm to stop.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Scheduler {
    time: Time,
    signal_interval: Duration,
    next_signal: Instant,
    shutdown: ShutdownHandle,
}

impl Scheduler {
    /// Start both cadences now. The first signal tick is one period away.
    pub fn new(signal_interval: Duration) -> Self {
        Self::starting_at(Instant::now(), signal_interval)
    }

    pub fn starting_at(now: Instant, signal_interval: Duration) -> Self {
        Self {
            time: Time::starting_at(now),
            signal_interval,
            next_signal: now + signal_interval,
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Record a frame tick at `now`.
    pub fn frame_at(&mut self, now: Instant) -> &Time {
        self.time.update_at(now);
        &self.time
    }

    /// Record a frame tick now.
    pub fn frame(&mut self) -> &Time {
        self.frame_at(Instant::now())
    }

    /// Whether the signal cadence fired by `now`.
    ///
    /// Returns `true` at most once per call and schedules the next tick.
    /// Ticks missed during a stall collapse into one; the next deadline is
    /// then a full period after `now`.
    pub fn signal_due(&mut self, now: Instant) -> bool {
        if now < self.next_signal {
            return false;
        }
        self.next_signal += self.signal_interval;
        if self.next_signal <= now {
            self.next_signal = now + self.signal_interval;
        }
        true
    }

    #[inline]
    pub fn next_signal_deadline(&self) -> Instant {
        self.next_signal
    }

    #[inline]
    pub fn signal_interval(&self) -> Duration {
        self.signal_interval
    }

    #[inline]
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Handle that stops the swarm from any thread.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_triggered()
    }
}
