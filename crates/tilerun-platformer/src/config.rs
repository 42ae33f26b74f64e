use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tilerun_core::geometry::Vec2;

use crate::animation::AnimationClip;
use crate::state::PlayerState;

/// Horizontal move speed (pixels per tick).
pub const MOVE_SPEED: f32 = 2.0;
/// Upward impulse applied when a jump starts on ground.
pub const JUMP_SPEED: f32 = 4.0;
/// Downward acceleration added to `vy` every airborne tick.
pub const GRAVITY: f32 = 0.1;
/// Default playback speed for every animation clip.
pub const ANIMATION_SPEED: f32 = 0.2;

/// Player movement and body geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerPhysicsConfig {
    pub move_speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    /// Size of the visual bounding box whose top-left is the player position.
    pub body_width: f32,
    pub body_height: f32,
    /// Hitbox offset from the centred position inside the body box.
    pub hitbox_offset: Vec2,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
}

impl Default for PlayerPhysicsConfig {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            jump_speed: JUMP_SPEED,
            gravity: GRAVITY,
            body_width: 40.0,
            body_height: 40.0,
            hitbox_offset: Vec2::new(0.0, 10.0),
            hitbox_width: 17.0,
            hitbox_height: 30.0,
        }
    }
}

/// Camera tracking box and viewport parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Offset of the camerabox from the hitbox position.
    pub offset: Vec2,
    pub width: f32,
    pub height: f32,
    /// Screen pixels per world pixel.
    pub render_scale: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec2::new(-42.0, -34.0),
            width: 100.0,
            height: 100.0,
            render_scale: 3.0,
            viewport_width: 1024.0,
            viewport_height: 768.0,
        }
    }
}

/// Session lifecycle limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// The session times out once the clock passes this value.
    pub max_time_ms: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_time_ms: 1_000_000.0,
        }
    }
}

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlatformerConfig {
    pub player: PlayerPhysicsConfig,
    pub camera: CameraConfig,
    pub session: SessionConfig,
    /// Animation clip per state key (`idle_left`, `run_right`, ...).
    pub animations: BTreeMap<String, AnimationClip>,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            player: PlayerPhysicsConfig::default(),
            camera: CameraConfig::default(),
            session: SessionConfig::default(),
            animations: default_animations(),
        }
    }
}

fn default_animations() -> BTreeMap<String, AnimationClip> {
    PlayerState::ALL
        .iter()
        .map(|state| {
            (
                state.key().to_string(),
                AnimationClip {
                    key: format!("warrior/{}", state.key()),
                    speed: ANIMATION_SPEED,
                },
            )
        })
        .collect()
}

impl PlatformerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("TILERUN_CONFIG")
            .unwrap_or_else(|_| "config/tilerun.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<PlatformerConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    PlatformerConfig::default()
                },
            },
            Err(_) => PlatformerConfig::default(),
        }
    }
}
