use serde::{Deserialize, Serialize};

use tilerun_core::input::InputState;

/// Which way the player sprite faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// The eight player states. Each maps one-to-one to an animation clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    IdleLeft,
    IdleRight,
    RunLeft,
    RunRight,
    JumpLeft,
    JumpRight,
    FallLeft,
    FallRight,
}

/// Previous-tick physics facts the transition rules depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionContext {
    pub vy: f32,
    pub on_ground: bool,
    /// `vy > gravity`, i.e. descending.
    pub falling: bool,
}

impl PlayerState {
    pub const ALL: [PlayerState; 8] = [
        PlayerState::IdleLeft,
        PlayerState::IdleRight,
        PlayerState::RunLeft,
        PlayerState::RunRight,
        PlayerState::JumpLeft,
        PlayerState::JumpRight,
        PlayerState::FallLeft,
        PlayerState::FallRight,
    ];

    /// Position in [`PlayerState::ALL`].
    pub fn index(self) -> usize {
        match self {
            PlayerState::IdleLeft => 0,
            PlayerState::IdleRight => 1,
            PlayerState::RunLeft => 2,
            PlayerState::RunRight => 3,
            PlayerState::JumpLeft => 4,
            PlayerState::JumpRight => 5,
            PlayerState::FallLeft => 6,
            PlayerState::FallRight => 7,
        }
    }

    /// Stable snake_case name used for config keys and logs.
    pub fn key(self) -> &'static str {
        match self {
            PlayerState::IdleLeft => "idle_left",
            PlayerState::IdleRight => "idle_right",
            PlayerState::RunLeft => "run_left",
            PlayerState::RunRight => "run_right",
            PlayerState::JumpLeft => "jump_left",
            PlayerState::JumpRight => "jump_right",
            PlayerState::FallLeft => "fall_left",
            PlayerState::FallRight => "fall_right",
        }
    }

    pub fn from_key(key: &str) -> Option<PlayerState> {
        PlayerState::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn facing(self) -> Facing {
        match self {
            PlayerState::IdleLeft
            | PlayerState::RunLeft
            | PlayerState::JumpLeft
            | PlayerState::FallLeft => Facing::Left,
            PlayerState::IdleRight
            | PlayerState::RunRight
            | PlayerState::JumpRight
            | PlayerState::FallRight => Facing::Right,
        }
    }

    pub fn is_jump(self) -> bool {
        matches!(self, PlayerState::JumpLeft | PlayerState::JumpRight)
    }

    /// Decide the next state from this tick's input and the previous tick's
    /// physics. Returns `self` when no rule fires.
    pub fn next(self, input: &InputState, ctx: &TransitionContext) -> PlayerState {
        use PlayerState::*;

        let can_jump = input.up && ctx.vy == 0.0;
        match self {
            IdleLeft => {
                if can_jump {
                    if input.right { JumpRight } else { JumpLeft }
                } else if input.left {
                    RunLeft
                } else if input.right {
                    RunRight
                } else {
                    self
                }
            },
            IdleRight => {
                if can_jump {
                    if input.left { JumpLeft } else { JumpRight }
                } else if input.left {
                    RunLeft
                } else if input.right {
                    RunRight
                } else {
                    self
                }
            },
            RunLeft => {
                if can_jump {
                    if input.right { JumpRight } else { JumpLeft }
                } else if input.right {
                    RunRight
                } else if !input.left {
                    IdleLeft
                } else {
                    self
                }
            },
            RunRight => {
                if can_jump {
                    if input.left { JumpLeft } else { JumpRight }
                } else if input.left {
                    RunLeft
                } else if !input.right {
                    IdleRight
                } else {
                    self
                }
            },
            JumpLeft => {
                if ctx.falling {
                    if input.right { FallRight } else { FallLeft }
                } else if ctx.on_ground {
                    RunLeft
                } else if input.right {
                    JumpRight
                } else {
                    self
                }
            },
            JumpRight => {
                if ctx.falling {
                    if input.left { FallLeft } else { FallRight }
                } else if ctx.on_ground {
                    RunRight
                } else if input.left {
                    JumpLeft
                } else {
                    self
                }
            },
            FallLeft => {
                if ctx.on_ground {
                    RunLeft
                } else if input.right {
                    FallRight
                } else {
                    self
                }
            },
            FallRight => {
                if ctx.on_ground {
                    RunRight
                } else if input.left {
                    FallLeft
                } else {
                    self
                }
            },
        }
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
