//! Error types for the photon swarm.
//!
//! Sensor errors never leave the signal path: the bridge logs them and the
//! animation keeps running. The remaining types cover configuration, GPU
//! setup and the window runner, which are allowed to fail a run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by a light sensor.
#[derive(Debug, Error)]
pub enum SensorError {
    /// No sensor could be acquired at startup.
    #[error("light sensor unavailable: {0}")]
    Unavailable(String),
    /// The sensor refused to start a reading cycle.
    #[error("could not start light sensor: {0}")]
    Start(String),
    /// The sensor started but the reading itself failed.
    #[error("getting light sensor data failed: {0}")]
    Read(String),
    /// The sensor worker thread is gone.
    #[error("light sensor worker disconnected")]
    Disconnected,
}

/// Errors raised while loading or validating a [`SwarmConfig`](crate::SwarmConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A field holds a value the simulation cannot run with.
    #[error("invalid config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("surface has no supported texture format")]
    NoSurfaceFormat,
}

/// Errors that can end a swarm run.
#[derive(Debug, Error)]
pub enum SwarmError {
    /// Failed to create or run the event loop.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Writing a framebuffer snapshot failed.
    #[error("failed to write snapshot: {0}")]
    Snapshot(#[from] image::ImageError),
}
