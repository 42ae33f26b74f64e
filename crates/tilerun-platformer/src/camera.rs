use serde::{Deserialize, Serialize};

use tilerun_core::geometry::{Rect, Vec2};

use crate::config::CameraConfig;

/// Scrolling camera. `pivot` is the world-space point subtracted from every
/// rendered position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pivot: Vec2,
    pub max_pivot: Vec2,
    /// Viewport size in screen pixels.
    pub viewport: Vec2,
    /// World size in world pixels.
    pub world: Vec2,
    offset: Vec2,
    box_size: Vec2,
    render_scale: f32,
}

impl Camera {
    pub fn new(cfg: &CameraConfig, world: Vec2) -> Self {
        let mut camera = Self {
            pivot: Vec2::ZERO,
            max_pivot: Vec2::ZERO,
            viewport: Vec2::new(cfg.viewport_width, cfg.viewport_height),
            world,
            offset: cfg.offset,
            box_size: Vec2::new(cfg.width, cfg.height),
            render_scale: cfg.render_scale,
        };
        camera.recompute_max_pivot();
        camera
    }

    /// New viewport size in screen pixels. A viewport larger than the
    /// rendered world pins that axis at 0.
    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.recompute_max_pivot();
        self.clamp();
        tracing::debug!(
            width = viewport.x,
            height = viewport.y,
            max_x = self.max_pivot.x,
            max_y = self.max_pivot.y,
            "viewport resized"
        );
    }

    fn recompute_max_pivot(&mut self) {
        let scale = self.render_scale;
        self.max_pivot = Vec2::new(
            ((self.world.x * scale - self.viewport.x) / scale).max(0.0),
            ((self.world.y * scale - self.viewport.y) / scale).max(0.0),
        );
    }

    /// Region around the hitbox the camera keeps visible.
    pub fn camerabox(&self, hitbox_position: Vec2) -> Rect {
        let origin = hitbox_position + self.offset;
        Rect::from_xywh(origin.x, origin.y, self.box_size.x, self.box_size.y)
    }

    /// Visible world region at the current pivot.
    pub fn viewport_bounds(&self) -> Rect {
        Rect::from_xywh(
            self.pivot.x,
            self.pivot.y,
            self.viewport.x / self.render_scale,
            self.viewport.y / self.render_scale,
        )
    }

    /// Pan just enough to bring the camerabox back inside the viewport, then
    /// clamp to the level edges.
    pub fn update(&mut self, hitbox_position: Vec2) {
        let cam = self.camerabox(hitbox_position);
        let view = self.viewport_bounds();

        if cam.top < view.top {
            self.pivot.y -= view.top - cam.top;
        } else if cam.bottom > view.bottom {
            self.pivot.y += cam.bottom - view.bottom;
        }

        if cam.left < view.left {
            self.pivot.x -= view.left - cam.left;
        } else if cam.right > view.right {
            self.pivot.x += cam.right - view.right;
        }

        self.clamp();
        tracing::trace!(pivot_x = self.pivot.x, pivot_y = self.pivot.y, "camera");
    }

    fn clamp(&mut self) {
        self.pivot.x = self.pivot.x.clamp(0.0, self.max_pivot.x);
        self.pivot.y = self.pivot.y.clamp(0.0, self.max_pivot.y);
    }
}
