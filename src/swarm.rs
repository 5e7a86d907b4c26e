//! Composition root: simulation, sensor bridge, scheduler and framebuffer.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::canvas::Framebuffer;
use crate::config::SwarmConfig;
use crate::error::{ConfigError, SensorError};
use crate::scheduler::{Scheduler, ShutdownHandle};
use crate::sensor::LightSensor;
use crate::signal::{SignalBridge, SignalReading};
use crate::simulation::{Simulation, StepStats};

/// Frames between frame-rate log lines.
const STATS_LOG_EVERY: u64 = 300;

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub stats: StepStats,
    /// Reading applied during this tick, if one arrived.
    pub reading: Option<SignalReading>,
}

/// Summary of a headless run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub hits: u64,
    pub readings: u64,
    pub final_active_count: usize,
}

/// A running photon swarm.
pub struct PhotonSwarm {
    config: SwarmConfig,
    simulation: Simulation,
    bridge: SignalBridge,
    scheduler: Scheduler,
    framebuffer: Framebuffer,
}

impl PhotonSwarm {
    /// Build a swarm around an existing bridge.
    pub fn new(config: SwarmConfig, bridge: SignalBridge) -> Result<Self, ConfigError> {
        Self::starting_at(config, bridge, Instant::now())
    }

    /// Build a swarm whose cadences start at `now`.
    pub fn starting_at(
        config: SwarmConfig,
        bridge: SignalBridge,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let simulation = Simulation::new(&config);
        let (width, height) = simulation.surface_size();
        let scheduler = Scheduler::starting_at(now, config.signal_interval());

        tracing::info!(
            capacity = simulation.capacity(),
            radius = config.boundary_radius,
            signal_ms = config.signal_interval_ms,
            "photon swarm initialized"
        );

        Ok(Self {
            framebuffer: Framebuffer::new(width, height),
            config,
            simulation,
            bridge,
            scheduler,
        })
    }

    /// Build a swarm listening to `sensor`, or a dark one if it could not be
    /// acquired.
    pub fn with_sensor<S: LightSensor + 'static>(
        config: SwarmConfig,
        sensor: Result<S, SensorError>,
    ) -> Result<Self, ConfigError> {
        let bridge = SignalBridge::from_result(sensor, config.photons_ratio, config.capacity());
        Self::new(config, bridge)
    }

    /// Run both cadences for a frame at `now`.
    ///
    /// Fires a sensor request when the signal period elapsed, applies any
    /// reading that has arrived, then steps the simulation once.
    pub fn tick_at(&mut self, now: Instant) -> FrameReport {
        if self.scheduler.signal_due(now) && !self.bridge.refresh() && self.bridge.in_flight() {
            tracing::debug!("previous light sensor request still pending");
        }
        let reading = self.bridge.poll();
        if let Some(reading) = reading {
            self.apply_reading(reading);
        }

        let stats = self.simulation.step(&mut self.framebuffer);
        let frame = self.scheduler.frame_at(now).frame();

        if frame % STATS_LOG_EVERY == 0 {
            tracing::debug!(
                frame,
                fps = self.scheduler.time().fps(),
                active = self.simulation.active_count(),
                "frame stats"
            );
        }

        FrameReport {
            frame,
            stats,
            reading,
        }
    }

    pub fn tick(&mut self) -> FrameReport {
        self.tick_at(Instant::now())
    }

    /// Wait up to `timeout` for a pending sensor answer and apply it.
    pub fn settle_signal(&mut self, timeout: Duration) -> Option<SignalReading> {
        let reading = self.bridge.wait(timeout)?;
        self.apply_reading(reading);
        Some(reading)
    }

    fn apply_reading(&mut self, reading: SignalReading) {
        let applied = self.simulation.set_active_count(reading.active_count);
        tracing::info!(lux = reading.lux, active = applied, "{reading}");
    }

    /// Step `frames` frames, one every `frame_interval`, without a window.
    ///
    /// Stops early when the shutdown handle is triggered.
    pub fn run_headless(&mut self, frames: u64, frame_interval: Duration) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut next_frame = Instant::now();

        for _ in 0..frames {
            if self.scheduler.is_shutdown() {
                tracing::info!("shutdown requested");
                break;
            }
            let report = self.tick_at(Instant::now());
            summary.frames += 1;
            summary.hits += report.stats.hits as u64;
            if report.reading.is_some() {
                summary.readings += 1;
            }

            next_frame += frame_interval;
            let now = Instant::now();
            if next_frame > now {
                thread::sleep(next_frame - now);
            } else {
                next_frame = now;
            }
        }

        summary.final_active_count = self.simulation.active_count();
        summary
    }

    /// Write the current frame as a PNG.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.framebuffer.save_png(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "snapshot written");
        Ok(())
    }

    /// Window title text carrying the live readout.
    pub fn readout(&self) -> String {
        match self.bridge.last_reading() {
            Some(reading) => format!("Photon Swarm · {reading}"),
            None => "Photon Swarm · -- lx".to_string(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    #[inline]
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    #[inline]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    #[inline]
    pub fn bridge(&self) -> &SignalBridge {
        &self.bridge
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.scheduler.shutdown_handle()
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.scheduler.is_shutdown()
    }
}
