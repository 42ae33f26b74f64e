use serde::{Deserialize, Serialize};

use tilerun_core::geometry::{Rect, Vec2};
use tilerun_core::input::InputState;

use crate::animation::AnimationCursor;
use crate::config::PlayerPhysicsConfig;
use crate::hitbox::Hitbox;
use crate::level::{BlockId, BlockKind, CollisionBlock, Level};
use crate::state::{PlayerState, TransitionContext};

/// The player entity.
///
/// `position` and velocity change only in [`step`]; `state` only through
/// [`Player::handle_input`] and [`Player::restart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the visual body.
    pub position: Vec2,
    pub vx: f32,
    pub vy: f32,
    pub hitbox: Hitbox,
    pub state: PlayerState,
    pub animation: AnimationCursor,
    /// Block the player is resting on, if any.
    pub ground_block: Option<BlockId>,
}

/// What happened to the player during one [`step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub transition: Option<(PlayerState, PlayerState)>,
    /// A jump impulse was applied this tick.
    pub jumped: bool,
    /// Floor block that stopped horizontal motion.
    pub wall: Option<BlockId>,
    /// Block landed on after descending faster than one gravity step.
    pub landed: Option<BlockId>,
}

impl Player {
    pub fn new(spawn: Vec2, cfg: &PlayerPhysicsConfig) -> Self {
        let mut hitbox = Hitbox::new(cfg);
        hitbox.update(spawn);
        Self {
            position: spawn,
            vx: 0.0,
            vy: 0.0,
            hitbox,
            state: PlayerState::IdleRight,
            animation: AnimationCursor::new(PlayerState::IdleRight),
            ground_block: None,
        }
    }

    pub fn is_on_ground(&self) -> bool {
        self.ground_block.is_some()
    }

    /// Descending faster than a single gravity step.
    pub fn is_falling(&self, cfg: &PlayerPhysicsConfig) -> bool {
        self.vy > cfg.gravity
    }

    pub fn jump(&mut self, cfg: &PlayerPhysicsConfig) {
        self.vy = -cfg.jump_speed;
    }

    pub fn stop(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
    }

    /// Back to `spawn` at rest, facing right.
    pub fn restart(&mut self, spawn: Vec2, cfg: &PlayerPhysicsConfig) {
        self.stop();
        self.position = spawn;
        self.ground_block = None;
        self.hitbox.update(spawn);
        self.set_state(PlayerState::IdleRight, cfg);
    }

    /// Fresh hitbox bounds for the current position.
    pub fn hitbox_bounds(&mut self) -> Rect {
        self.hitbox.update(self.position);
        self.hitbox.bounds()
    }

    fn set_hitbox_left(&mut self, left: f32) {
        self.position.x = self.hitbox.player_x_for_left(left);
        self.hitbox.update(self.position);
    }

    fn set_hitbox_top(&mut self, top: f32) {
        self.position.y = self.hitbox.player_y_for_top(top);
        self.hitbox.update(self.position);
    }

    /// Enter `next`: switch its animation and, for jump states entered on
    /// ground, apply the jump impulse. Returns whether the impulse fired.
    pub fn set_state(&mut self, next: PlayerState, cfg: &PlayerPhysicsConfig) -> bool {
        tracing::debug!(from = %self.state, to = %next, "player state");
        self.state = next;
        self.animation.switch(next);
        if next.is_jump() && self.is_on_ground() {
            self.jump(cfg);
            return true;
        }
        false
    }

    /// Run one transition of the state machine against last tick's physics.
    /// Returns the transition and whether a jump impulse was applied.
    pub fn handle_input(
        &mut self,
        input: &InputState,
        cfg: &PlayerPhysicsConfig,
    ) -> (Option<(PlayerState, PlayerState)>, bool) {
        let ctx = TransitionContext {
            vy: self.vy,
            on_ground: self.is_on_ground(),
            falling: self.is_falling(cfg),
        };
        let from = self.state;
        let next = from.next(input, &ctx);
        if next == from {
            return (None, false);
        }
        let jumped = self.set_state(next, cfg);
        (Some((from, next)), jumped)
    }

    /// Stop against the first floor block the horizontal move would touch.
    /// Platforms never block sideways.
    fn resolve_horizontal(&mut self, floor: &[CollisionBlock]) -> Option<BlockId> {
        if self.vx == 0.0 {
            return None;
        }
        let projected = self.hitbox_bounds().translate_x(self.vx);
        for (index, block) in floor.iter().enumerate() {
            let b = block.bounds();
            if !(projected.overlaps_x_inclusive(&b) && projected.overlaps_y_strict(&b)) {
                continue;
            }
            if self.vx < 0.0 {
                self.set_hitbox_left(b.right);
            } else {
                self.set_hitbox_left(b.left - self.hitbox.width);
            }
            self.vx = 0.0;
            return Some(BlockId {
                kind: BlockKind::Floor,
                index,
            });
        }
        None
    }

    /// Land on the first block whose top edge the hitbox bottom crosses this
    /// tick (`bottom <= top < bottom + vy`). Floor blocks are checked before
    /// platforms.
    fn resolve_vertical(&mut self, level: &Level) -> Option<BlockId> {
        let bounds = self.hitbox_bounds();
        let next_bottom = bounds.bottom + self.vy;
        for kind in [BlockKind::Floor, BlockKind::Platform] {
            for (index, block) in level.blocks(kind).iter().enumerate() {
                let b = block.bounds();
                if !bounds.overlaps_x_inclusive(&b) {
                    continue;
                }
                if bounds.bottom <= b.top && next_bottom > b.top {
                    self.vy = 0.0;
                    self.set_hitbox_top(b.top - self.hitbox.height);
                    return Some(BlockId { kind, index });
                }
            }
        }
        None
    }

    /// Semi-implicit Euler: move with the current velocity, then accelerate.
    fn apply_gravity(&mut self, cfg: &PlayerPhysicsConfig) {
        self.position.y += self.vy;
        self.vy += cfg.gravity;
    }
}

/// Advance the player by one fixed step.
///
/// Order is load-bearing: state transition, horizontal velocity from input,
/// horizontal resolve, vertical resolve, gravity.
pub fn step(
    player: &mut Player,
    input: &InputState,
    level: &Level,
    cfg: &PlayerPhysicsConfig,
) -> StepReport {
    let (transition, jumped) = player.handle_input(input, cfg);

    player.vx = if input.left {
        -cfg.move_speed
    } else if input.right {
        cfg.move_speed
    } else {
        0.0
    };

    let wall = player.resolve_horizontal(&level.floor);
    if wall.is_none() {
        player.position.x += player.vx;
    }

    let descending = player.is_falling(cfg);
    player.ground_block = player.resolve_vertical(level);
    if player.ground_block.is_none() {
        player.apply_gravity(cfg);
    }
    player.hitbox.update(player.position);

    let landed = player.ground_block.filter(|_| descending);
    if let Some(block) = landed {
        tracing::debug!(?block, x = player.position.x, y = player.position.y, "landed");
    }
    if let Some(block) = wall {
        tracing::debug!(?block, x = player.position.x, "wall contact");
    }

    StepReport {
        transition,
        jumped,
        wall,
        landed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PlayerPhysicsConfig {
        PlayerPhysicsConfig::default()
    }

    /// Level with a single floor block at (100, 100), 100x20.
    fn ledge_level() -> Level {
        Level::new(
            vec![CollisionBlock::new(100.0, 100.0, 100.0, 20.0)],
            Vec::new(),
            Vec2::new(100.0, 50.0),
            400.0,
            300.0,
        )
    }

    /// Long ground at y=100 plus a wall 40px tall whose left edge is at x=200.
    fn wall_level() -> Level {
        Level::new(
            vec![
                CollisionBlock::new(0.0, 100.0, 400.0, 20.0),
                CollisionBlock::new(200.0, 60.0, 20.0, 40.0),
            ],
            Vec::new(),
            Vec2::new(100.0, 55.0),
            400.0,
            300.0,
        )
    }

    /// Step until the player rests on a block, with an upper bound.
    fn settle(player: &mut Player, level: &Level, input: &InputState) -> usize {
        for tick in 1..=500 {
            step(player, input, level, &cfg());
            if player.ground_block.is_some() {
                return tick;
            }
        }
        panic!("player never landed");
    }

    #[test]
    fn gravity_is_semi_implicit() {
        let level = Level::new(Vec::new(), Vec::new(), Vec2::ZERO, 100.0, 100.0);
        let mut player = Player::new(Vec2::new(0.0, 0.0), &cfg());
        for _ in 0..3 {
            step(&mut player, &InputState::NONE, &level, &cfg());
        }
        // Positions use the velocity from before each increment: 0 + 0.1 + 0.2
        assert!((player.position.y - 0.3).abs() < 1e-6, "y={}", player.position.y);
        assert!((player.vy - 0.3).abs() < 1e-6, "vy={}", player.vy);
        assert!(player.ground_block.is_none());
    }

    #[test]
    fn falling_player_lands_flush_on_floor() {
        let level = ledge_level();
        let mut player = Player::new(level.spawn, &cfg());
        settle(&mut player, &level, &InputState::NONE);

        assert_eq!(player.vy, 0.0);
        assert_eq!(player.hitbox.bounds().bottom, 100.0);
        assert_eq!(
            player.ground_block,
            Some(BlockId {
                kind: BlockKind::Floor,
                index: 0
            })
        );
        assert_eq!(player.position.y, 55.0);
    }

    #[test]
    fn landing_is_reported_once_for_a_real_fall() {
        let level = ledge_level();
        let mut player = Player::new(level.spawn, &cfg());
        let mut landings = 0;
        for _ in 0..200 {
            if step(&mut player, &InputState::NONE, &level, &cfg())
                .landed
                .is_some()
            {
                landings += 1;
            }
        }
        assert_eq!(landings, 1);
    }

    #[test]
    fn hitbox_already_below_top_edge_is_not_caught() {
        let level = ledge_level();
        // Hitbox bottom at 101, one pixel inside the block whose top is 100
        let mut player = Player::new(Vec2::new(100.0, 56.0), &cfg());
        player.vy = 1.0;
        step(&mut player, &InputState::NONE, &level, &cfg());

        assert_eq!(player.ground_block, None);
        assert_eq!(player.hitbox.bounds().bottom, 102.0);
    }

    #[test]
    fn resting_player_stays_on_block() {
        let level = ledge_level();
        let mut player = Player::new(level.spawn, &cfg());
        settle(&mut player, &level, &InputState::NONE);
        for _ in 0..50 {
            step(&mut player, &InputState::NONE, &level, &cfg());
            assert!(player.hitbox.bounds().bottom <= 100.0);
        }
        assert_eq!(player.position.y, 55.0);
    }

    #[test]
    fn running_into_wall_snaps_flush_and_stops() {
        let level = wall_level();
        let mut player = Player::new(level.spawn, &cfg());
        settle(&mut player, &level, &InputState::NONE);

        let mut hit = None;
        for _ in 0..100 {
            let report = step(&mut player, &InputState::RIGHT, &level, &cfg());
            if report.wall.is_some() {
                hit = report.wall;
                break;
            }
        }
        assert_eq!(
            hit,
            Some(BlockId {
                kind: BlockKind::Floor,
                index: 1
            })
        );
        assert_eq!(player.hitbox.bounds().right, 200.0);
        assert_eq!(player.vx, 0.0);

        let x = player.position.x;
        for _ in 0..30 {
            step(&mut player, &InputState::RIGHT, &level, &cfg());
            assert_eq!(player.vx, 0.0);
            assert_eq!(player.position.x, x, "Player must not pass the wall");
        }
    }

    #[test]
    fn running_left_into_wall_snaps_to_right_edge() {
        let level = wall_level();
        let mut player = Player::new(Vec2::new(230.0, 55.0), &cfg());
        settle(&mut player, &level, &InputState::NONE);
        for _ in 0..100 {
            step(&mut player, &InputState::LEFT, &level, &cfg());
        }
        assert_eq!(player.hitbox.bounds().left, 220.0);
        assert_eq!(player.vx, 0.0);
    }

    #[test]
    fn floor_under_feet_does_not_block_sideways() {
        let level = wall_level();
        let mut player = Player::new(level.spawn, &cfg());
        settle(&mut player, &level, &InputState::NONE);
        let x = player.position.x;
        let report = step(&mut player, &InputState::LEFT, &level, &cfg());
        assert_eq!(report.wall, None);
        assert_eq!(player.position.x, x - 2.0);
    }

    #[test]
    fn platforms_do_not_block_sideways() {
        let level = Level::new(
            Vec::new(),
            vec![CollisionBlock::new(130.0, 60.0, 16.0, 8.0)],
            Vec2::ZERO,
            400.0,
            300.0,
        );
        let mut player = Player::new(Vec2::new(100.0, 50.0), &cfg());
        let report = step(&mut player, &InputState::RIGHT, &level, &cfg());
        assert_eq!(report.wall, None);
        assert_eq!(player.position.x, 102.0);
    }

    #[test]
    fn platform_does_not_stop_upward_motion() {
        // Hitbox top at 65, platform just above it
        let level = Level::new(
            Vec::new(),
            vec![CollisionBlock::new(100.0, 50.0, 50.0, 8.0)],
            Vec2::ZERO,
            400.0,
            300.0,
        );
        let mut player = Player::new(Vec2::new(100.0, 50.0), &cfg());
        player.vy = -4.0;
        for _ in 0..10 {
            step(&mut player, &InputState::NONE, &level, &cfg());
            assert!(player.ground_block.is_none());
        }
        assert!(player.position.y < 50.0, "Player should pass through");
    }

    #[test]
    fn platform_catches_falling_player() {
        let level = Level::new(
            Vec::new(),
            vec![CollisionBlock::new(100.0, 100.0, 50.0, 8.0)],
            Vec2::ZERO,
            400.0,
            300.0,
        );
        let mut player = Player::new(Vec2::new(100.0, 20.0), &cfg());
        settle(&mut player, &level, &InputState::NONE);
        assert_eq!(
            player.ground_block,
            Some(BlockId {
                kind: BlockKind::Platform,
                index: 0
            })
        );
        assert_eq!(player.hitbox.bounds().bottom, 100.0);
        assert_eq!(player.vy, 0.0);
    }

    #[test]
    fn floor_wins_over_platform_at_same_height() {
        let level = Level::new(
            vec![CollisionBlock::new(100.0, 100.0, 50.0, 16.0)],
            vec![CollisionBlock::new(100.0, 100.0, 50.0, 8.0)],
            Vec2::ZERO,
            400.0,
            300.0,
        );
        let mut player = Player::new(Vec2::new(100.0, 50.0), &cfg());
        settle(&mut player, &level, &InputState::NONE);
        assert_eq!(player.ground_block.map(|b| b.kind), Some(BlockKind::Floor));
    }

    #[test]
    fn first_block_in_creation_order_wins() {
        let level = Level::new(
            vec![
                CollisionBlock::new(100.0, 100.0, 16.0, 16.0),
                CollisionBlock::new(110.0, 100.0, 16.0, 16.0),
            ],
            Vec::new(),
            Vec2::ZERO,
            400.0,
            300.0,
        );
        let mut player = Player::new(Vec2::new(100.0, 50.0), &cfg());
        settle(&mut player, &level, &InputState::NONE);
        assert_eq!(player.ground_block.map(|b| b.index), Some(0));
    }

    #[test]
    fn jump_from_ground_applies_impulse() {
        let level = ledge_level();
        let mut player = Player::new(level.spawn, &cfg());
        settle(&mut player, &level, &InputState::NONE);
        assert!(player.is_on_ground());
        assert_eq!(player.vy, 0.0);

        let report = step(&mut player, &InputState::UP, &level, &cfg());
        assert_eq!(
            report.transition,
            Some((PlayerState::IdleRight, PlayerState::JumpRight))
        );
        assert!(report.jumped);
        assert!(player.ground_block.is_none());
        // Moved up by the impulse, then gravity added once
        assert_eq!(player.position.y, 51.0);
        assert!((player.vy - (-3.9)).abs() < 1e-6);
    }

    #[test]
    fn entering_jump_in_air_does_not_impulse() {
        let mut player = Player::new(Vec2::ZERO, &cfg());
        player.vy = 1.0;
        assert!(!player.set_state(PlayerState::JumpLeft, &cfg()));
        assert_eq!(player.vy, 1.0);
        assert_eq!(player.animation.state, PlayerState::JumpLeft);
    }

    #[test]
    fn jump_arc_goes_through_fall_and_lands_running() {
        let level = ledge_level();
        let mut player = Player::new(level.spawn, &cfg());
        settle(&mut player, &level, &InputState::NONE);
        step(&mut player, &InputState::UP, &level, &cfg());

        let mut seen = vec![player.state];
        for _ in 0..200 {
            step(&mut player, &InputState::NONE, &level, &cfg());
            if seen.last() != Some(&player.state) {
                seen.push(player.state);
            }
        }
        assert_eq!(
            seen,
            vec![
                PlayerState::JumpRight,
                PlayerState::FallRight,
                PlayerState::RunRight,
                PlayerState::IdleRight,
            ]
        );
        assert_eq!(player.hitbox.bounds().bottom, 100.0);
    }

    #[test]
    fn restart_resets_motion_and_state() {
        let mut player = Player::new(Vec2::new(5.0, 5.0), &cfg());
        player.vx = 2.0;
        player.vy = 3.0;
        player.state = PlayerState::FallLeft;
        player.ground_block = Some(BlockId {
            kind: BlockKind::Floor,
            index: 0,
        });
        player.restart(Vec2::new(100.0, 50.0), &cfg());
        assert_eq!(player.position, Vec2::new(100.0, 50.0));
        assert_eq!((player.vx, player.vy), (0.0, 0.0));
        assert_eq!(player.state, PlayerState::IdleRight);
        assert_eq!(player.ground_block, None);
        assert_eq!(player.hitbox.position, Vec2::new(111.5, 65.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Whatever the drop height and horizontal placement, landing leaves
            // the hitbox bottom exactly on the block top with vy reset.
            #[test]
            fn landing_is_exact(
                top in 60u16..400,
                drop in 1u16..200,
                dx in -20i16..88,
            ) {
                let top = top as f32;
                let level = Level::new(
                    vec![CollisionBlock::new(100.0, top, 100.0, 20.0)],
                    Vec::new(),
                    Vec2::ZERO,
                    1000.0,
                    1000.0,
                );
                let anchor = Hitbox::new(&cfg()).anchor();
                let start_y = top - drop as f32 - 30.0 - anchor.y;
                let mut player = Player::new(Vec2::new(100.0 + dx as f32, start_y), &cfg());
                settle(&mut player, &level, &InputState::NONE);
                prop_assert_eq!(player.vy, 0.0);
                prop_assert_eq!(player.hitbox.bounds().bottom, top);
            }

            // Platforms can only be landed on while moving down.
            #[test]
            fn platforms_never_stop_rising_player(
                vy in -10.0f32..=0.0,
                y in 0.0f32..200.0,
            ) {
                let level = Level::new(
                    Vec::new(),
                    vec![CollisionBlock::new(0.0, 100.0, 400.0, 8.0)],
                    Vec2::ZERO,
                    400.0,
                    300.0,
                );
                let mut player = Player::new(Vec2::new(100.0, y), &cfg());
                player.vy = vy;
                player.state = PlayerState::JumpRight;
                let ground = player.resolve_vertical(&level);
                prop_assert!(ground.is_none());
                prop_assert_eq!(player.vy, vy);
            }
        }
    }
}
