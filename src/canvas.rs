//! Drawing surface abstraction and the CPU framebuffer behind it.
//!
//! The simulation only needs four primitives: the surface size, a global
//! alpha, a filled rectangle and a filled circle. [`Framebuffer`] implements
//! them on an [`image::RgbaImage`] with source-over blending, which is what
//! produces the motion trails when the background is faded instead of
//! cleared.

use std::path::Path;

use glam::Vec2;
use image::{Rgba, RgbaImage};

/// Opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// A 2D drawing surface with a top-left origin.
pub trait Canvas {
    /// Surface size in display units.
    fn size(&self) -> (u32, u32);

    /// Alpha applied to every subsequent fill, clamped to `[0, 1]`.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Fill a circle centred at `center`.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// CPU raster surface.
pub struct Framebuffer {
    image: RgbaImage,
    global_alpha: f32,
}

impl Framebuffer {
    /// Create an opaque black surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
            global_alpha: 1.0,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    /// Colour of the pixel at `(x, y)`, ignoring alpha.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
        Some(Color::rgb(r, g, b))
    }

    /// Raw RGBA8 bytes, row-major, for texture upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Write the current frame as a PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.image
            .save_with_format(path.as_ref(), image::ImageFormat::Png)
    }

    /// Source-over blend into 8-bit channels, rounded to nearest.
    ///
    /// Repeated black fills at alpha 0.1 stall at 5 per channel, where
    /// `round(5 * 0.9)` is 5 again, as on an 8-bit browser canvas.
    fn blend(&mut self, x: u32, y: u32, color: Color) {
        let a = self.global_alpha;
        let dst = self.image.get_pixel_mut(x, y);
        let mix = |src: u8, dst: u8| -> u8 {
            (src as f32 * a + dst as f32 * (1.0 - a)).round().clamp(0.0, 255.0) as u8
        };
        dst.0 = [
            mix(color.r, dst.0[0]),
            mix(color.g, dst.0[1]),
            mix(color.b, dst.0[2]),
            255,
        ];
    }

    /// Clip a half-open float span to pixel indices `[start, end)`.
    fn clip_span(min: f32, max: f32, limit: u32) -> (u32, u32) {
        let start = min.floor().max(0.0).min(limit as f32) as u32;
        let end = max.ceil().max(0.0).min(limit as f32) as u32;
        (start, end)
    }
}

impl Canvas for Framebuffer {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        if self.global_alpha <= 0.0 || width <= 0.0 || height <= 0.0 {
            return;
        }
        let (x0, x1) = Self::clip_span(x, x + width, self.width());
        let (y0, y1) = Self::clip_span(y, y + height, self.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if self.global_alpha <= 0.0 || radius <= 0.0 || !center.is_finite() {
            return;
        }
        let (x0, x1) = Self::clip_span(center.x - radius, center.x + radius, self.width());
        let (y0, y1) = Self::clip_span(center.y - radius, center.y + radius, self.height());
        let r2 = radius * radius;
        for py in y0..y1 {
            for px in x0..x1 {
                // Sample at the pixel centre.
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5) - center;
                if d.length_squared() <= r2 {
                    self.blend(px, py, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORANGE: Color = Color::rgb(255, 128, 24);

    #[test]
    fn test_new_is_black() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.size(), (4, 3));
        assert_eq!(fb.as_bytes().len(), 4 * 3 * 4);
        assert_eq!(fb.pixel(3, 2), Some(Color::BLACK));
        assert_eq!(fb.pixel(4, 0), None);
    }

    #[test]
    fn test_fill_circle_covers_centre_only() {
        let mut fb = Framebuffer::new(40, 40);
        fb.fill_circle(Vec2::new(20.0, 20.0), 2.0, ORANGE);

        assert_eq!(fb.pixel(20, 20), Some(ORANGE));
        assert_eq!(fb.pixel(19, 19), Some(ORANGE));
        assert_eq!(fb.pixel(24, 20), Some(Color::BLACK));
        assert_eq!(fb.pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_fill_circle_clips_at_edges() {
        let mut fb = Framebuffer::new(10, 10);
        fb.fill_circle(Vec2::new(-1.0, 11.0), 12.0, ORANGE);
        fb.fill_circle(Vec2::new(500.0, 500.0), 12.0, ORANGE);
        fb.fill_circle(Vec2::new(f32::NAN, 1.0), 12.0, ORANGE);
        assert_eq!(fb.pixel(0, 9), Some(ORANGE));
    }

    #[test]
    fn test_translucent_fill_fades() {
        let mut fb = Framebuffer::new(2, 2);
        fb.fill_rect(0.0, 0.0, 2.0, 2.0, Color::rgb(200, 100, 50));

        fb.set_global_alpha(0.1);
        fb.fill_rect(0.0, 0.0, 2.0, 2.0, Color::BLACK);
        fb.set_global_alpha(1.0);

        assert_eq!(fb.pixel(1, 1), Some(Color::rgb(180, 90, 45)));
    }

    #[test]
    fn test_global_alpha_is_clamped() {
        let mut fb = Framebuffer::new(1, 1);
        fb.set_global_alpha(3.0);
        assert_eq!(fb.global_alpha(), 1.0);
        fb.set_global_alpha(-1.0);
        assert_eq!(fb.global_alpha(), 0.0);

        fb.fill_rect(0.0, 0.0, 1.0, 1.0, ORANGE);
        assert_eq!(fb.pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_repeated_fade_settles_at_floor() {
        let mut fb = Framebuffer::new(2, 2);
        fb.fill_rect(0.0, 0.0, 2.0, 2.0, Color::rgb(255, 255, 255));
        fb.set_global_alpha(0.1);
        for _ in 0..1000 {
            fb.fill_rect(0.0, 0.0, 2.0, 2.0, Color::BLACK);
        }
        assert_eq!(fb.pixel(1, 1), Some(Color::rgb(5, 5, 5)));
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(64, 32, 24).to_string(), "rgb(64,32,24)");
    }
}
