//! End-to-end tests of the swarm through its public API.
//!
//! These drive real sensors through the signal bridge and draw into the CPU
//! framebuffer, checking what ends up on screen and in the photon pool.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use photon_swarm::canvas::{Canvas, Color, Framebuffer};
use photon_swarm::photon::{Arena, Photon};
use photon_swarm::{
    FixedLightSensor, LightSensor, PhotonSwarm, SensorError, SignalBridge, Simulation, SwarmConfig,
    Vec2,
};

const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// Helpers
// ============================================================================

/// Sensor answering from a shared script, one entry per read.
struct ScriptedSensor {
    script: Arc<Mutex<VecDeque<Result<f32, SensorError>>>>,
}

impl LightSensor for ScriptedSensor {
    fn start(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read(&mut self) -> Result<f32, SensorError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SensorError::Read("script exhausted".into())))
    }

    fn stop(&mut self) {}

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Sensor whose reads block until a value is sent on its channel.
struct BlockingSensor {
    values: Receiver<f32>,
    reads: Arc<AtomicUsize>,
}

impl LightSensor for BlockingSensor {
    fn start(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read(&mut self) -> Result<f32, SensorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.values
            .recv()
            .map_err(|_| SensorError::Read("value channel closed".into()))
    }

    fn stop(&mut self) {}

    fn name(&self) -> &str {
        "blocking"
    }
}

fn seeded_config() -> SwarmConfig {
    SwarmConfig {
        seed: Some(42),
        ..Default::default()
    }
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("photon-swarm-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Signal to active count
// ============================================================================

#[test]
fn test_capacity_and_dim_room() {
    let config = seeded_config();
    assert_eq!(config.capacity(), 131);

    let bridge = SignalBridge::new(FixedLightSensor::new(500.0), config.photons_ratio, 131);
    let start = Instant::now();
    let mut swarm = PhotonSwarm::starting_at(config, bridge, start).unwrap();
    assert_eq!(swarm.simulation().capacity(), 131);
    assert_eq!(swarm.simulation().active_count(), 0);

    let report = swarm.tick_at(start + Duration::from_secs(1));
    let reading = report.reading.or_else(|| swarm.settle_signal(WAIT)).unwrap();
    assert_eq!(reading.active_count, 1);
    assert_eq!(swarm.simulation().active_count(), 1);
}

#[test]
fn test_bright_room_is_capped_at_capacity() {
    let config = seeded_config();
    let bridge = SignalBridge::new(FixedLightSensor::new(65_535.0), config.photons_ratio, 131);
    let start = Instant::now();
    let mut swarm = PhotonSwarm::starting_at(config, bridge, start).unwrap();

    let report = swarm.tick_at(start + Duration::from_secs(1));
    report.reading.or_else(|| swarm.settle_signal(WAIT)).unwrap();
    assert_eq!(swarm.simulation().active_count(), 131);

    let report = swarm.tick_at(start + Duration::from_millis(1016));
    assert_eq!(report.stats.moved, 131);
}

#[test]
fn test_failed_reading_keeps_active_count() {
    let config = seeded_config();
    let script = Arc::new(Mutex::new(VecDeque::from(vec![
        Ok(10_000.0),
        Err(SensorError::Read("bus error".into())),
    ])));
    let sensor = ScriptedSensor {
        script: script.clone(),
    };
    let bridge = SignalBridge::new(sensor, config.photons_ratio, config.capacity());
    let start = Instant::now();
    let mut swarm = PhotonSwarm::starting_at(config, bridge, start).unwrap();

    let report = swarm.tick_at(start + Duration::from_secs(1));
    report.reading.or_else(|| swarm.settle_signal(WAIT)).unwrap();
    assert_eq!(swarm.simulation().active_count(), 20);

    let report = swarm.tick_at(start + Duration::from_secs(2));
    assert!(report.reading.is_none());
    assert!(swarm.settle_signal(WAIT).is_none());
    assert_eq!(swarm.simulation().active_count(), 20);
    assert_eq!(swarm.readout(), "Photon Swarm · 10000 lx");
    assert!(script.lock().unwrap().is_empty());
}

#[test]
fn test_hung_sensor_only_delays_its_update() {
    let config = seeded_config();
    let (values, rx) = mpsc::channel();
    let reads = Arc::new(AtomicUsize::new(0));
    let sensor = BlockingSensor {
        values: rx,
        reads: reads.clone(),
    };
    let bridge = SignalBridge::new(sensor, config.photons_ratio, config.capacity());
    let start = Instant::now();
    let mut swarm = PhotonSwarm::starting_at(config, bridge, start).unwrap();

    values.send(10_000.0).unwrap();
    let report = swarm.tick_at(start + Duration::from_secs(1));
    report.reading.or_else(|| swarm.settle_signal(WAIT)).unwrap();
    assert_eq!(swarm.simulation().active_count(), 20);

    // The second request blocks inside the sensor for several periods.
    let hung_at = start + Duration::from_secs(2);
    let mut last_frame = swarm.tick_at(hung_at).frame;
    for i in 1..=300u64 {
        let report = swarm.tick_at(hung_at + Duration::from_millis(i * 16));
        assert_eq!(report.frame, last_frame + 1);
        assert_eq!(report.stats.moved, 20);
        assert!(report.reading.is_none());
        assert!(swarm.bridge().in_flight());
        last_frame = report.frame;
    }
    assert!(swarm.settle_signal(Duration::from_millis(20)).is_none());
    let deadline = Instant::now() + WAIT;
    while reads.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(reads.load(Ordering::SeqCst), 2);

    values.send(20_000.0).unwrap();
    let reading = swarm.settle_signal(WAIT).unwrap();
    assert_eq!(reading.lux, 20_000.0);
    assert_eq!(swarm.simulation().active_count(), 40);
    assert!(!swarm.bridge().in_flight());
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_missing_sensor_stays_dark() {
    let config = seeded_config();
    let sensor: Result<FixedLightSensor, SensorError> =
        Err(SensorError::Unavailable("no light sensor".into()));
    let start = Instant::now();
    let mut swarm = PhotonSwarm::with_sensor(config, sensor).unwrap();

    for i in 1..=180u64 {
        let report = swarm.tick_at(start + Duration::from_millis(i * 16));
        assert_eq!(report.stats.moved, 0);
        assert!(report.reading.is_none());
    }
    assert!(!swarm.bridge().is_connected());
}

// ============================================================================
// Simulation
// ============================================================================

#[test]
fn test_inactive_photons_never_move() {
    let arena = Arena::default();
    let photons = vec![
        Photon::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Color::rgb(255, 0, 0)),
        Photon::new(Vec2::new(10.0, 10.0), Vec2::new(-1.5, 0.5), Color::rgb(0, 255, 0)),
        Photon::new(Vec2::new(-20.0, 5.0), Vec2::new(0.5, -1.0), Color::rgb(0, 0, 255)),
    ];
    let mut simulation = Simulation::from_photons(photons.clone(), arena, 0.1);
    assert_eq!(simulation.set_active_count(1), 1);

    let mut frame = Framebuffer::new(360, 360);
    for _ in 0..100 {
        simulation.step(&mut frame);
    }

    assert_ne!(simulation.photons()[0].position, photons[0].position);
    assert_eq!(simulation.photons()[1].position, photons[1].position);
    assert_eq!(simulation.photons()[2].position, photons[2].position);
    assert_eq!(simulation.photons()[1].velocity, photons[1].velocity);
}

#[test]
fn test_active_count_never_exceeds_capacity() {
    let mut simulation = Simulation::new(&seeded_config());
    assert_eq!(simulation.set_active_count(10_000), 131);
    assert_eq!(simulation.active_photons().len(), 131);
    assert_eq!(simulation.set_active_count(0), 0);
    assert!(simulation.active_photons().is_empty());
}

#[test]
fn test_boundary_hit_flashes_and_bounces() {
    let arena = Arena::default();
    let photons = vec![Photon::new(
        Vec2::new(179.0, 0.0),
        Vec2::new(2.0, 0.0),
        Color::rgb(255, 159, 48),
    )];
    let mut simulation = Simulation::from_photons(photons, arena, 0.1);
    simulation.set_active_count(1);

    let mut frame = Framebuffer::new(360, 360);
    let stats = simulation.step(&mut frame);
    assert_eq!(stats.hits, 1);

    let photon = &simulation.photons()[0];
    assert_eq!(photon.position, Vec2::new(179.0, 0.0));
    assert!(photon.velocity.x < 0.0);
    assert!(photon.velocity.y > 0.0);
    assert!((photon.velocity.length() - 2.0).abs() < 1e-4);

    // Hit circle centred at (361, 180) reaches 12 px back into the frame.
    assert_eq!(frame.pixel(352, 180), Some(Color::rgb(255, 159, 48)));
    assert_eq!(frame.pixel(340, 180), Some(Color::BLACK));
}

#[test]
fn test_trails_fade() {
    let arena = Arena::default();
    let photons = vec![Photon::new(
        Vec2::ZERO,
        Vec2::new(3.0, 0.0),
        Color::rgb(255, 255, 255),
    )];
    let mut simulation = Simulation::from_photons(photons, arena, 0.1);
    simulation.set_active_count(1);

    let mut frame = Framebuffer::new(360, 360);
    simulation.step(&mut frame);
    let first = frame.pixel(183, 180).unwrap();
    assert_eq!(first, Color::rgb(255, 255, 255));

    for _ in 0..5 {
        simulation.step(&mut frame);
    }
    let faded = frame.pixel(183, 180).unwrap();
    assert!(faded.r < first.r && faded.r > 0, "faded to {faded}");
    assert_eq!(frame.global_alpha(), 1.0);
    assert_eq!(frame.size(), (360, 360));
}

// ============================================================================
// Headless runner
// ============================================================================

#[test]
fn test_headless_snapshot() {
    let config = seeded_config();
    let bridge = SignalBridge::new(FixedLightSensor::new(30_000.0), config.photons_ratio, 131);
    let mut swarm = PhotonSwarm::new(config, bridge).unwrap();

    swarm.run_headless(10, Duration::ZERO);

    let dir = scratch_dir("snapshot");
    let path = dir.join("frame.png");
    swarm.save_snapshot(&path).unwrap();

    let image = image::open(&path).unwrap();
    assert_eq!(image.width(), 360);
    assert_eq!(image.height(), 360);
    std::fs::remove_dir_all(&dir).unwrap();
}
