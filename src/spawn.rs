//! Spawn context for photon initialization.
//!
//! Holds the RNG and the spawn geometry so every photon of a population is
//! drawn from the same stream. A fixed seed reproduces a run exactly.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Context handed to [`Photon::spawn`](crate::Photon::spawn).
pub struct SpawnContext {
    /// Index of the photon being spawned (0 to count-1).
    pub index: usize,
    /// Total number of photons being spawned.
    pub count: usize,
    /// Divisor of the colour ramp. Equals `count` unless set with
    /// [`with_population`](Self::with_population).
    pub population: f32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context seeded from `seed`, or from OS entropy when `None`.
    pub fn new(count: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            index: 0,
            count,
            population: count as f32,
            rng,
        }
    }

    /// Use an unrounded population size for [`progress`](Self::progress).
    pub fn with_population(mut self, population: f32) -> Self {
        self.population = population;
        self
    }

    /// Normalized progress through the spawn, `index / population`.
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.population <= 0.0 {
            return 0.0;
        }
        self.index as f32 / self.population
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random point in the square of side `side` centred at the origin.
    ///
    /// Each axis is uniform in `[-side / 2, side / 2)`.
    pub fn random_in_square(&mut self, side: f32) -> Vec2 {
        Vec2::new(
            (self.random() - 0.5) * side,
            (self.random() - 0.5) * side,
        )
    }

    /// Random velocity with each axis uniform in `[-span / 2, span / 2)`.
    pub fn random_velocity(&mut self, span: f32) -> Vec2 {
        self.random_in_square(span)
    }

    pub(crate) fn advance(&mut self) {
        self.index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        let mut ctx = SpawnContext::new(4, Some(1));
        assert_eq!(ctx.progress(), 0.0);
        ctx.advance();
        ctx.advance();
        assert_eq!(ctx.progress(), 0.5);

        let empty = SpawnContext::new(0, Some(1));
        assert_eq!(empty.progress(), 0.0);
    }

    #[test]
    fn test_progress_with_population() {
        let mut ctx = SpawnContext::new(2, Some(1)).with_population(4.0);
        assert_eq!(ctx.count, 2);
        ctx.advance();
        assert_eq!(ctx.progress(), 0.25);
    }

    #[test]
    fn test_random_in_square_bounds() {
        let mut ctx = SpawnContext::new(1, Some(7));
        for _ in 0..1000 {
            let p = ctx.random_in_square(180.0);
            assert!(p.x >= -90.0 && p.x < 90.0);
            assert!(p.y >= -90.0 && p.y < 90.0);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = SpawnContext::new(1, Some(42));
        let mut b = SpawnContext::new(1, Some(42));
        for _ in 0..16 {
            assert_eq!(a.random_velocity(4.0), b.random_velocity(4.0));
        }
    }
}
