//! Frame clock.
//!
//! Tracks elapsed time, delta time, frame count and a periodically refreshed
//! FPS figure for the frame cadence.
//!
//! # Example
//!
//! ```
//! use photon_swarm::time::Time;
//!
//! let mut time = Time::new();
//! time.update();
//! assert_eq!(time.frame(), 1);
//! ```

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    /// Frames per second, recomputed every `fps_update_interval`.
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    /// Create a new clock starting now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock whose first frame is measured from `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Record a frame happening now.
    pub fn update(&mut self) -> (f32, f32) {
        self.update_at(Instant::now())
    }

    /// Record a frame at `now`. Returns `(elapsed, delta)` in seconds.
    ///
    /// Instants earlier than the previous frame count as zero delta.
    pub fn update_at(&mut self, now: Instant) -> (f32, f32) {
        self.delta_secs = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = self.last_frame.max(now);
        self.elapsed_secs = self.last_frame.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = self.last_frame.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = self.last_frame;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed time in seconds at the last frame.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time between the last two frames in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames recorded.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn start_instant(&self) -> Instant {
        self.start
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
