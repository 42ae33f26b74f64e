use serde::{Deserialize, Serialize};

use tilerun_core::geometry::{Rect, Vec2};

use crate::config::PlayerPhysicsConfig;

/// Collision sub-rectangle of the player body.
///
/// Derived data: `position` is recomputed from the player position with
/// [`Hitbox::update`] and never set on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub offset: Vec2,
    pub width: f32,
    pub height: f32,
    /// Size of the visual body the hitbox is centred in.
    pub body: Vec2,
    /// World position of the hitbox top-left, as of the last update.
    pub position: Vec2,
}

impl Hitbox {
    pub fn new(cfg: &PlayerPhysicsConfig) -> Self {
        Self {
            offset: cfg.hitbox_offset,
            width: cfg.hitbox_width,
            height: cfg.hitbox_height,
            body: Vec2::new(cfg.body_width, cfg.body_height),
            position: Vec2::ZERO,
        }
    }

    /// Distance from the player position to the hitbox top-left.
    pub fn anchor(&self) -> Vec2 {
        Vec2::new(
            (self.body.x - self.width) / 2.0 + self.offset.x,
            (self.body.y - self.height) / 2.0 + self.offset.y,
        )
    }

    /// Recompute `position` from the player position. Idempotent.
    pub fn update(&mut self, player_position: Vec2) {
        self.position = player_position + self.anchor();
    }

    /// Bounds as of the last update.
    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(self.position.x, self.position.y, self.width, self.height)
    }

    /// Player x that puts the hitbox left edge at `left`.
    pub fn player_x_for_left(&self, left: f32) -> f32 {
        left - self.anchor().x
    }

    /// Player y that puts the hitbox top edge at `top`.
    pub fn player_y_for_top(&self, top: f32) -> f32 {
        top - self.anchor().y
    }
}
