//! Canvas pan and zoom.
//!
//! Screen space is what pointer events arrive in; page space is where
//! node transforms live. `screen = page * zoom + offset`.

use kurbo::{Affine, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the page origin.
    pub offset: (f32, f32),
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: (0.0, 0.0),
            zoom: 1.0,
            min_zoom: 0.02,
            max_zoom: 256.0,
        }
    }
}

impl Viewport {
    pub fn with_limits(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.offset = (x, y);
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    /// Clamped to the configured limits. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    /// Zoom by `factor` keeping the screen point `anchor` fixed.
    pub fn zoom_at(&mut self, factor: f32, anchor: (f32, f32)) {
        let before = self.screen_to_world(anchor.0, anchor.1);
        self.set_zoom(self.zoom * factor);
        self.offset = (
            anchor.0 - before.0 * self.zoom,
            anchor.1 - before.1 * self.zoom,
        );
    }

    pub fn reset(&mut self) {
        self.offset = (0.0, 0.0);
        self.zoom = 1.0;
    }

    pub fn screen_to_world(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.offset.0) / self.zoom, (y - self.offset.1) / self.zoom)
    }

    pub fn world_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.zoom + self.offset.0, y * self.zoom + self.offset.1)
    }

    /// Page → screen transform for the backend.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(Vec2::new(
            f64::from(self.offset.0),
            f64::from(self.offset.1),
        )) * Affine::scale(f64::from(self.zoom))
    }
}
