//! The photon population and its per-frame update/draw pass.

use crate::canvas::{Canvas, Color};
use crate::config::SwarmConfig;
use crate::photon::{Arena, Photon};
use crate::spawn::SpawnContext;

/// What a single [`Simulation::step`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Photons moved and drawn.
    pub moved: usize,
    /// Photons that hit the boundary this frame.
    pub hits: usize,
}

/// A fixed population of photons, of which the first `active_count` are live.
///
/// The population is sized once for the largest reading the sensor can
/// report. Changing the active count never allocates; photons past the
/// cursor keep their state and resume where they stopped when the count
/// rises again.
pub struct Simulation {
    photons: Vec<Photon>,
    active_count: usize,
    arena: Arena,
    fade_alpha: f32,
}

impl Simulation {
    /// Allocate `config.capacity()` photons, none of them active.
    pub fn new(config: &SwarmConfig) -> Self {
        let mut ctx =
            SpawnContext::new(config.capacity(), config.seed).with_population(config.population());
        Self::with_spawn(config, &mut ctx)
    }

    /// Allocate `ctx.count` photons drawn from `ctx`.
    pub fn with_spawn(config: &SwarmConfig, ctx: &mut SpawnContext) -> Self {
        let arena = config.arena();
        let mut photons = Vec::with_capacity(ctx.count);
        for _ in 0..ctx.count {
            photons.push(Photon::spawn(ctx, &arena, config.max_velocity));
            ctx.advance();
        }
        Self::from_photons(photons, arena, config.fade_alpha)
    }

    /// Build a simulation around an existing population.
    pub fn from_photons(photons: Vec<Photon>, arena: Arena, fade_alpha: f32) -> Self {
        Self {
            photons,
            active_count: 0,
            arena,
            fade_alpha,
        }
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Total number of photons allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.photons.len()
    }

    /// Set the number of live photons, clamped to the capacity.
    ///
    /// Returns the count actually applied.
    pub fn set_active_count(&mut self, count: usize) -> usize {
        let clamped = count.min(self.photons.len());
        if clamped != count {
            tracing::debug!(requested = count, capacity = self.photons.len(), "active count clamped");
        }
        self.active_count = clamped;
        clamped
    }

    #[inline]
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    #[inline]
    pub fn active_photons(&self) -> &[Photon] {
        &self.photons[..self.active_count]
    }

    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[inline]
    pub fn boundary_radius(&self) -> f32 {
        self.arena.radius
    }

    /// Width and height of the surface the arena maps onto.
    pub fn surface_size(&self) -> (u32, u32) {
        let side = (self.arena.radius * 2.0).ceil() as u32;
        (side, side)
    }

    /// Advance one frame.
    ///
    /// Fades the previous frame with translucent black so moving photons
    /// leave trails, then moves and draws every live photon in index order.
    pub fn step<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> StepStats {
        let (width, height) = canvas.size();
        canvas.set_global_alpha(self.fade_alpha);
        canvas.fill_rect(0.0, 0.0, width as f32, height as f32, Color::BLACK);
        canvas.set_global_alpha(1.0);

        let mut stats = StepStats::default();
        for photon in &mut self.photons[..self.active_count] {
            if photon.advance(&self.arena, canvas) {
                stats.hits += 1;
            }
            photon.draw(&self.arena, canvas);
            stats.moved += 1;
        }
        stats
    }
}
