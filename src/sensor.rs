//! Ambient light sensors.
//!
//! A [`LightSensor`] is queried fresh on every signal tick: `start`, one
//! `read`, then `stop`. Readings are in lux and clamped to
//! `[0, MAX_SIGNAL_STRENGTH]`.
//!
//! Three sources ship with the crate:
//!
//! | Sensor | Source |
//! |--------|--------|
//! | [`FixedLightSensor`] | a constant, for demos and tests |
//! | [`SimulatedLightSensor`] | a slow day/night oscillation with jitter |
//! | [`IioLightSensor`] | a Linux industrial-I/O ambient light sensor |

use std::f32::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::SensorError;

/// Largest value an ambient light sensor reports.
pub const MAX_SIGNAL_STRENGTH: f32 = 65535.0;

/// Default sysfs directory holding IIO devices.
pub const IIO_DEVICES_ROOT: &str = "/sys/bus/iio/devices";

/// A source of ambient light readings.
///
/// Implementations run on the sensor worker thread, hence `Send`.
pub trait LightSensor: Send {
    /// Prepare the sensor for a reading.
    fn start(&mut self) -> Result<(), SensorError>;

    /// Take one reading in lux. Only valid between `start` and `stop`.
    fn read(&mut self) -> Result<f32, SensorError>;

    /// Release the sensor until the next cycle.
    fn stop(&mut self);

    /// Human readable name for logs.
    fn name(&self) -> &str;
}

impl<S: LightSensor + ?Sized> LightSensor for Box<S> {
    fn start(&mut self) -> Result<(), SensorError> {
        (**self).start()
    }

    fn read(&mut self) -> Result<f32, SensorError> {
        (**self).read()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Run one full start, read, stop cycle.
///
/// `stop` runs whether or not the read succeeded.
pub fn read_once<S: LightSensor + ?Sized>(sensor: &mut S) -> Result<f32, SensorError> {
    sensor.start()?;
    let reading = sensor.read();
    sensor.stop();
    let lux = reading?;
    if !lux.is_finite() {
        return Err(SensorError::Read(format!("non-finite reading {lux}")));
    }
    Ok(lux.clamp(0.0, MAX_SIGNAL_STRENGTH))
}

/// Which sensor the swarm should listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SensorKind {
    #[default]
    Simulated,
    Fixed,
    Iio,
}

/// Options for [`open_sensor`].
#[derive(Debug, Clone, Default)]
pub struct SensorOptions {
    /// Reading returned by the fixed sensor.
    pub lux: f32,
    /// Override for [`IIO_DEVICES_ROOT`].
    pub iio_root: Option<PathBuf>,
    /// Seed for the simulated sensor's jitter.
    pub seed: Option<u64>,
}

/// Acquire the requested sensor.
///
/// Fails with [`SensorError::Unavailable`] when the hardware is missing.
pub fn open_sensor(
    kind: SensorKind,
    options: &SensorOptions,
) -> Result<Box<dyn LightSensor>, SensorError> {
    let sensor: Box<dyn LightSensor> = match kind {
        SensorKind::Fixed => Box::new(FixedLightSensor::new(options.lux)),
        SensorKind::Simulated => Box::new(SimulatedLightSensor::new(options.seed)),
        SensorKind::Iio => {
            let root = options
                .iio_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(IIO_DEVICES_ROOT));
            Box::new(IioLightSensor::discover(root)?)
        }
    };
    tracing::info!(sensor = sensor.name(), "light sensor acquired");
    Ok(sensor)
}

/// Always reports the same reading.
#[derive(Debug, Clone)]
pub struct FixedLightSensor {
    lux: f32,
}

impl FixedLightSensor {
    pub fn new(lux: f32) -> Self {
        Self { lux }
    }
}

impl LightSensor for FixedLightSensor {
    fn start(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read(&mut self) -> Result<f32, SensorError> {
        Ok(self.lux)
    }

    fn stop(&mut self) {}

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Oscillates between dusk and bright daylight.
///
/// One full cycle takes `period_secs`. Each reading adds up to ±`jitter`
/// percent of noise so the swarm visibly breathes even at the extremes.
pub struct SimulatedLightSensor {
    started_at: Instant,
    period_secs: f32,
    low: f32,
    high: f32,
    jitter: f32,
    running: bool,
    rng: SmallRng,
}

impl SimulatedLightSensor {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            started_at: Instant::now(),
            period_secs: 60.0,
            low: 200.0,
            high: 40_000.0,
            jitter: 0.05,
            running: false,
            rng,
        }
    }

    /// Set the length of one dusk-to-daylight-to-dusk cycle.
    pub fn with_period(mut self, secs: f32) -> Self {
        self.period_secs = secs.max(f32::EPSILON);
        self
    }

    /// Set the reading range the oscillation sweeps.
    pub fn with_range(mut self, low: f32, high: f32) -> Self {
        self.low = low.min(high);
        self.high = high.max(low);
        self
    }

    /// Set the relative noise amplitude (0.05 = ±5%).
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    /// Noise-free reading `secs` into the cycle.
    pub fn level_at(&self, secs: f32) -> f32 {
        let phase = (secs / self.period_secs) * TAU;
        // Starts at `low`, peaks at `high` half a period later.
        let t = 0.5 - 0.5 * phase.cos();
        self.low + (self.high - self.low) * t
    }
}

impl LightSensor for SimulatedLightSensor {
    fn start(&mut self) -> Result<(), SensorError> {
        self.running = true;
        Ok(())
    }

    fn read(&mut self) -> Result<f32, SensorError> {
        if !self.running {
            return Err(SensorError::Read("sensor not started".into()));
        }
        let base = self.level_at(self.started_at.elapsed().as_secs_f32());
        let noise = if self.jitter > 0.0 {
            self.rng.gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        Ok((base * (1.0 + noise)).clamp(0.0, MAX_SIGNAL_STRENGTH))
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Linux IIO ambient light sensor read through sysfs.
///
/// Prefers the processed `in_illuminance_input` attribute; falls back to
/// `in_illuminance_raw`, scaled by `in_illuminance_scale` when present.
#[derive(Debug, Clone)]
pub struct IioLightSensor {
    device: PathBuf,
    channel: IioChannel,
    scale: f32,
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IioChannel {
    Input,
    Raw,
}

impl IioChannel {
    fn file(self) -> &'static str {
        match self {
            IioChannel::Input => "in_illuminance_input",
            IioChannel::Raw => "in_illuminance_raw",
        }
    }
}

impl IioLightSensor {
    /// Find the first IIO device under `root` exposing an illuminance channel.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self, SensorError> {
        let root = root.as_ref();
        let entries = fs::read_dir(root).map_err(|e| {
            SensorError::Unavailable(format!("cannot list {}: {e}", root.display()))
        })?;

        let mut devices: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        devices.sort();

        devices
            .into_iter()
            .find_map(|device| Self::open(device).ok())
            .ok_or_else(|| {
                SensorError::Unavailable(format!(
                    "no illuminance channel under {}",
                    root.display()
                ))
            })
    }

    /// Open a specific IIO device directory.
    pub fn open<P: Into<PathBuf>>(device: P) -> Result<Self, SensorError> {
        let device = device.into();
        let channel = if device.join(IioChannel::Input.file()).is_file() {
            IioChannel::Input
        } else if device.join(IioChannel::Raw.file()).is_file() {
            IioChannel::Raw
        } else {
            return Err(SensorError::Unavailable(format!(
                "{} has no illuminance channel",
                device.display()
            )));
        };

        let scale = match channel {
            IioChannel::Input => 1.0,
            IioChannel::Raw => read_number(&device.join("in_illuminance_scale")).unwrap_or(1.0),
        };

        let name = fs::read_to_string(device.join("name"))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| device.display().to_string());

        Ok(Self {
            device,
            channel,
            scale,
            name,
        })
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

impl LightSensor for IioLightSensor {
    fn start(&mut self) -> Result<(), SensorError> {
        if self.device.join(self.channel.file()).is_file() {
            Ok(())
        } else {
            Err(SensorError::Start(format!(
                "{} disappeared",
                self.device.display()
            )))
        }
    }

    fn read(&mut self) -> Result<f32, SensorError> {
        let value = read_number(&self.device.join(self.channel.file()))?;
        Ok(value * self.scale)
    }

    fn stop(&mut self) {}

    fn name(&self) -> &str {
        &self.name
    }
}

fn read_number(path: &Path) -> Result<f32, SensorError> {
    let text = fs::read_to_string(path)
        .map_err(|e| SensorError::Read(format!("{}: {e}", path.display())))?;
    text.trim()
        .parse::<f32>()
        .map_err(|e| SensorError::Read(format!("{}: {e}", path.display())))
}
