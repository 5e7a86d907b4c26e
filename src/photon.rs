//! A single photon: position, velocity and colour, plus the boundary bounce.

use glam::Vec2;

use crate::canvas::{Canvas, Color};
use crate::spawn::SpawnContext;
use crate::vector::{magnitude, normalize, reflection_bias};

/// Vertical offset subtracted from the position to build the bounce normal.
///
/// The resulting normal is skewed off the true radial direction, so bounces
/// are not mirror-symmetric.
pub const NORMAL_Y_OFFSET: f32 = 0.5;

/// Geometry shared by every photon of a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    /// Radius of the round display, in display units.
    pub radius: f32,
    /// Radius of a photon dot.
    pub photon_radius: f32,
    /// Radius of the flash drawn on a boundary hit.
    pub hit_radius: f32,
}

impl Arena {
    /// Map a centre-origin position onto the top-left-origin surface.
    #[inline]
    pub fn to_canvas(&self, position: Vec2) -> Vec2 {
        position + Vec2::splat(self.radius)
    }

    /// Whether `position` lies outside the round boundary.
    #[inline]
    pub fn is_outside(&self, position: Vec2) -> bool {
        magnitude(position) > self.radius
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            radius: 180.0,
            photon_radius: 2.0,
            hit_radius: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Photon {
    /// Position relative to the arena centre.
    pub position: Vec2,
    pub velocity: Vec2,
    color: Color,
}

impl Photon {
    pub fn new(position: Vec2, velocity: Vec2, color: Color) -> Self {
        Self {
            position,
            velocity,
            color,
        }
    }

    /// Spawn photon `ctx.index` of `ctx.count`.
    ///
    /// The start position is uniform in a square of side `arena.radius`
    /// centred on the origin, so every photon starts within `radius / √2`
    /// of the centre.
    pub fn spawn(ctx: &mut SpawnContext, arena: &Arena, max_velocity: f32) -> Self {
        let position = ctx.random_in_square(arena.radius);
        let velocity = ctx.random_velocity(max_velocity);
        let color = gradient_color(ctx.index, ctx.population);
        Self::new(position, velocity, color)
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Move by one velocity step and bounce off the boundary.
    ///
    /// On a hit the flash is drawn at the escaped position before the photon
    /// is rolled back and redirected. Returns whether the boundary was hit.
    pub fn advance<C: Canvas + ?Sized>(&mut self, arena: &Arena, canvas: &mut C) -> bool {
        self.position += self.velocity;

        if !arena.is_outside(self.position) {
            return false;
        }

        self.draw_hit(arena, canvas);
        self.reflect(Vec2::new(
            self.position.x,
            self.position.y - NORMAL_Y_OFFSET,
        ));
        true
    }

    /// Undo the last step and bounce the velocity off `normal`.
    ///
    /// This is a biased bounce, not a mirror reflection: the new direction is
    /// `u - 2 * max(0.03, n · u) * n` for unit velocity `u` and unit normal
    /// `n`, rescaled to the old speed.
    pub fn reflect(&mut self, normal: Vec2) {
        self.position -= self.velocity;

        let speed = magnitude(self.velocity);
        let unit_velocity = normalize(self.velocity);
        let unit_normal = normalize(normal);

        let d = reflection_bias(unit_normal, unit_velocity);
        let direction = unit_velocity - 2.0 * d * unit_normal;

        self.velocity = direction * speed;
    }

    /// Position on a canvas whose origin is the arena's top-left corner.
    #[inline]
    pub fn canvas_position(&self, arena: &Arena) -> Vec2 {
        arena.to_canvas(self.position)
    }

    pub fn draw<C: Canvas + ?Sized>(&self, arena: &Arena, canvas: &mut C) {
        canvas.fill_circle(self.canvas_position(arena), arena.photon_radius, self.color);
    }

    pub fn draw_hit<C: Canvas + ?Sized>(&self, arena: &Arena, canvas: &mut C) {
        canvas.fill_circle(self.canvas_position(arena), arena.hit_radius, self.color);
    }
}

/// Warm gradient from dark red (first photon) to amber (last photon).
///
/// `population` is the unrounded pool size, so the last photon of a pool of
/// 131.07 stops just short of full red.
pub fn gradient_color(index: usize, population: f32) -> Color {
    let t = if population > 0.0 {
        index as f32 / population
    } else {
        0.0
    };
    let channel = |span: f32, base: f32| ((t * span).round() + base).min(255.0) as u8;
    Color::rgb(
        channel(192.0, 64.0),
        channel(255.0 * 0.5, 32.0),
        channel(24.0, 24.0),
    )
}
