//! Bridge from the light sensor to the simulation's active count.
//!
//! The sensor lives on its own worker thread so a slow or hung read never
//! stalls a frame. The bridge keeps at most one request in flight: a new
//! [`refresh`](SignalBridge::refresh) is ignored until the previous answer
//! has been collected by [`poll`](SignalBridge::poll) or
//! [`wait`](SignalBridge::wait).
//!
//! Failures are logged and swallowed. The caller only ever sees successful
//! readings, so the simulation keeps its last count when the sensor misbehaves.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::error::SensorError;
use crate::sensor::{read_once, LightSensor};

/// A successful reading and the active count derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalReading {
    /// Raw sensor value in lux.
    pub lux: f32,
    /// `round(lux * ratio)`, clamped to the population capacity.
    pub active_count: usize,
}

impl fmt::Display for SignalReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lx", self.lux)
    }
}

struct SensorWorker {
    requests: Sender<()>,
    responses: Receiver<Result<f32, SensorError>>,
}

impl SensorWorker {
    fn spawn<S: LightSensor + 'static>(mut sensor: S) -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<()>();
        let (response_tx, response_rx) = mpsc::channel();
        let name = format!("light-sensor-{}", sensor.name());

        thread::Builder::new().name(name).spawn(move || {
            // Ends when the bridge drops its request sender.
            for () in request_rx {
                if response_tx.send(read_once(&mut sensor)).is_err() {
                    break;
                }
            }
            tracing::debug!("light sensor worker stopped");
        })?;

        Ok(Self {
            requests: request_tx,
            responses: response_rx,
        })
    }
}

/// Turns sensor readings into active photon counts.
pub struct SignalBridge {
    worker: Option<SensorWorker>,
    in_flight: bool,
    ratio: f32,
    capacity: usize,
    last: Option<SignalReading>,
}

impl SignalBridge {
    /// Attach `sensor` and start its worker thread.
    ///
    /// `ratio` is photons per lux; `capacity` bounds the derived count.
    pub fn new<S: LightSensor + 'static>(sensor: S, ratio: f32, capacity: usize) -> Self {
        match SensorWorker::spawn(sensor) {
            Ok(worker) => Self::with_worker(Some(worker), ratio, capacity),
            Err(err) => {
                tracing::warn!(error = %err, "could not spawn light sensor worker");
                Self::with_worker(None, ratio, capacity)
            }
        }
    }

    /// A bridge with no sensor. Every refresh is a no-op.
    pub fn detached(ratio: f32, capacity: usize) -> Self {
        Self::with_worker(None, ratio, capacity)
    }

    /// Attach the sensor if it was acquired, otherwise log and run detached.
    pub fn from_result<S: LightSensor + 'static>(
        sensor: Result<S, SensorError>,
        ratio: f32,
        capacity: usize,
    ) -> Self {
        match sensor {
            Ok(sensor) => Self::new(sensor, ratio, capacity),
            Err(err) => {
                tracing::warn!(error = %err, "could not access light sensor; photons stay dark");
                Self::detached(ratio, capacity)
            }
        }
    }

    fn with_worker(worker: Option<SensorWorker>, ratio: f32, capacity: usize) -> Self {
        Self {
            worker,
            in_flight: false,
            ratio,
            capacity,
            last: None,
        }
    }

    /// Whether a sensor is attached.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.worker.is_some()
    }

    /// Whether a request is waiting for its answer.
    #[inline]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Latest successful reading, for the readout.
    #[inline]
    pub fn last_reading(&self) -> Option<SignalReading> {
        self.last
    }

    /// Active count for a reading: `round(lux * ratio)` within `[0, capacity]`.
    pub fn active_count_for(&self, lux: f32) -> usize {
        let count = (lux * self.ratio).round();
        if count.is_nan() || count <= 0.0 {
            return 0;
        }
        (count as usize).min(self.capacity)
    }

    /// Ask the sensor for a fresh reading.
    ///
    /// Returns `false` when detached or while a previous request is pending.
    pub fn refresh(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        let Some(worker) = &self.worker else {
            return false;
        };
        if worker.requests.send(()).is_err() {
            self.disconnect();
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Collect the pending answer without blocking.
    pub fn poll(&mut self) -> Option<SignalReading> {
        if !self.in_flight {
            return None;
        }
        let result = match &self.worker {
            Some(worker) => match worker.responses.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(SensorError::Disconnected),
            },
            None => return None,
        };
        self.settle(result)
    }

    /// Collect the pending answer, waiting up to `timeout`.
    pub fn wait(&mut self, timeout: Duration) -> Option<SignalReading> {
        if !self.in_flight {
            return None;
        }
        let result = match &self.worker {
            Some(worker) => match worker.responses.recv_timeout(timeout) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => Err(SensorError::Disconnected),
            },
            None => return None,
        };
        self.settle(result)
    }

    fn settle(&mut self, result: Result<f32, SensorError>) -> Option<SignalReading> {
        self.in_flight = false;
        match result {
            Ok(lux) => {
                let reading = SignalReading {
                    lux,
                    active_count: self.active_count_for(lux),
                };
                self.last = Some(reading);
                Some(reading)
            }
            Err(SensorError::Disconnected) => {
                tracing::warn!("light sensor worker exited; photons keep their last count");
                self.disconnect();
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "light sensor reading failed");
                None
            }
        }
    }

    fn disconnect(&mut self) {
        self.worker = None;
        self.in_flight = false;
    }
}
