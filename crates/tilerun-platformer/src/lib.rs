pub mod animation;
pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod hitbox;
pub mod level;
pub mod physics;
pub mod state;

use serde::{Deserialize, Serialize};

use tilerun_core::game_trait::{SessionOutcome, Simulation};
use tilerun_core::geometry::Vec2;
use tilerun_core::input::{DirectionalInput, InputState};

use animation::{AnimationClip, AnimationSet};
use camera::Camera;
use config::PlatformerConfig;
use error::PlatformerError;
use events::GameEvent;
use level::Level;
use physics::{Player, step};
use state::{Facing, PlayerState};

/// Everything the render collaborator needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub position: Vec2,
    pub state: PlayerState,
    pub facing: Facing,
    /// Asset key of the clip for `state`.
    pub animation: String,
    pub animation_frame: f32,
    pub pivot: Vec2,
    pub elapsed_ms: f64,
    pub ended: bool,
    pub outcome: Option<SessionOutcome>,
}

/// One play session on one level.
pub struct Platformer {
    config: PlatformerConfig,
    level: Level,
    animations: AnimationSet<AnimationClip>,
    player: Player,
    camera: Camera,
    elapsed_ms: f64,
    ended: bool,
    outcome: Option<SessionOutcome>,
}

impl Platformer {
    /// Validate the level and animation table and place the player at spawn.
    pub fn new(config: PlatformerConfig, level: Level) -> Result<Self, PlatformerError> {
        level.validate()?;
        let animations = AnimationSet::from_named(config.animations.clone())?;
        let player = Player::new(level.spawn, &config.player);
        let mut camera = Camera::new(&config.camera, level.world_size());
        camera.update(player.hitbox.position);
        Ok(Self {
            config,
            level,
            animations,
            player,
            camera,
            elapsed_ms: 0.0,
            ended: false,
            outcome: None,
        })
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    pub fn animation(&self, state: PlayerState) -> &AnimationClip {
        self.animations.get(state)
    }

    /// Forward a viewport size change (screen pixels) to the camera.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(Vec2::new(width, height));
    }

    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            position: self.player.position,
            state: self.player.state,
            facing: self.player.state.facing(),
            animation: self.animation(self.player.state).key.clone(),
            animation_frame: self.player.animation.frame,
            pivot: self.camera.pivot,
            elapsed_ms: self.elapsed_ms,
            ended: self.ended,
            outcome: self.outcome,
        }
    }

    fn reached_goal(&self) -> bool {
        self.level
            .goal
            .is_some_and(|goal| goal.bounds().intersects(&self.player.hitbox.bounds()))
    }
}

impl Simulation for Platformer {
    type Event = GameEvent;

    fn tick(&mut self, delta_ms: f64, input: &dyn DirectionalInput) -> Vec<GameEvent> {
        if self.ended {
            return Vec::new();
        }

        self.elapsed_ms += delta_ms;
        if self.elapsed_ms > self.config.session.max_time_ms {
            self.end(false);
            return vec![GameEvent::SessionEnded {
                outcome: SessionOutcome::TimedOut,
            }];
        }

        let input = InputState::sample(input);
        let report = step(&mut self.player, &input, &self.level, &self.config.player);

        let mut events = Vec::new();
        if let Some((from, to)) = report.transition {
            events.push(GameEvent::StateChanged { from, to });
        }
        if report.jumped {
            events.push(GameEvent::Jumped);
        }
        if let Some(block) = report.wall {
            events.push(GameEvent::WallHit { block });
        }
        if let Some(block) = report.landed {
            events.push(GameEvent::Landed { block });
        }

        let speed = self.animation(self.player.state).speed;
        self.player.animation.advance(speed);

        self.camera.update(self.player.hitbox.position);

        if self.reached_goal() {
            self.end(true);
            events.push(GameEvent::SessionEnded {
                outcome: SessionOutcome::Won,
            });
        }

        events
    }

    fn restart(&mut self) {
        self.elapsed_ms = 0.0;
        self.ended = false;
        self.outcome = None;
        self.player.restart(self.level.spawn, &self.config.player);
        tracing::info!(
            spawn_x = self.level.spawn.x,
            spawn_y = self.level.spawn.y,
            "Session restarted"
        );
    }

    fn end(&mut self, success: bool) {
        let outcome = SessionOutcome::from_success(success);
        self.ended = true;
        self.outcome = Some(outcome);
        self.player.stop();
        tracing::info!(?outcome, elapsed_ms = self.elapsed_ms, "Session ended");
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    fn serialize_frame(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(&self.frame())
    }
}
