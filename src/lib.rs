//! # Photon Swarm
//!
//! An ambient light visualisation for round displays. Coloured photons bounce
//! inside a circular arena, leaving fading trails, and the number of photons
//! in motion follows the ambient light level reported by a light sensor.
//!
//! ## Quick Start
//!
//! ```no_run
//! use photon_swarm::prelude::*;
//!
//! fn main() -> Result<(), SwarmError> {
//!     let config = SwarmConfig::default();
//!     let sensor = open_sensor(SensorKind::Simulated, &SensorOptions::default());
//!     let swarm = PhotonSwarm::with_sensor(config, sensor)?;
//!     photon_swarm::window::run(swarm)
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Photons
//!
//! A fixed pool of [`Photon`]s is spawned once, sized by the maximum sensor
//! reading times the photons-per-lux ratio. Only the first `active_count` of
//! them move each frame; the rest sit still and undrawn. A photon that leaves
//! the arena is stepped back, reflected off the boundary and flashes a hit
//! circle where it escaped.
//!
//! ### Signal
//!
//! Once per signal period the [`SignalBridge`] asks its [`LightSensor`] for one
//! reading on a worker thread. When the answer arrives the active count
//! becomes `round(lux * ratio)`, clamped to the pool. A failed reading leaves
//! the count unchanged.
//!
//! ### Canvas
//!
//! Drawing goes through the [`Canvas`] trait. [`Framebuffer`] is the CPU
//! implementation used by both runners: the window runner uploads it to the
//! GPU every frame, the headless runner can save it as a PNG.
//!
//! ## Runners
//!
//! - [`window::run`] opens a square window and steps once per redraw.
//! - [`PhotonSwarm::run_headless`] steps at a fixed interval without a window.

pub mod canvas;
pub mod config;
pub mod error;
mod gpu;
pub mod photon;
pub mod scheduler;
pub mod sensor;
mod shader;
pub mod signal;
pub mod simulation;
pub mod spawn;
pub mod swarm;
pub mod time;
pub mod vector;
pub mod window;

pub use canvas::{Canvas, Color, Framebuffer};
pub use config::SwarmConfig;
pub use error::{ConfigError, GpuError, SensorError, SwarmError};
pub use glam::Vec2;
pub use photon::{Arena, Photon};
pub use scheduler::{Scheduler, ShutdownHandle};
pub use sensor::{
    open_sensor, FixedLightSensor, IioLightSensor, LightSensor, SensorKind, SensorOptions,
    SimulatedLightSensor,
};
pub use signal::{SignalBridge, SignalReading};
pub use simulation::{Simulation, StepStats};
pub use spawn::SpawnContext;
pub use swarm::{FrameReport, PhotonSwarm, RunSummary};

/// Convenient re-exports for common usage.
///
/// ```
/// use photon_swarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::{Canvas, Color, Framebuffer};
    pub use crate::config::SwarmConfig;
    pub use crate::error::{SensorError, SwarmError};
    pub use crate::photon::{Arena, Photon};
    pub use crate::sensor::{open_sensor, LightSensor, SensorKind, SensorOptions};
    pub use crate::signal::{SignalBridge, SignalReading};
    pub use crate::simulation::Simulation;
    pub use crate::swarm::PhotonSwarm;
    pub use crate::time::Time;
    pub use crate::Vec2;
}
