use serde::{Deserialize, Serialize};

/// Read-only directional input capability, sampled fresh each tick.
///
/// The simulation never mutates input; hosts back this with whatever device
/// polling they have (keyboard, touch, a recorded script).
pub trait DirectionalInput {
    fn has_direction_left(&self) -> bool;
    fn has_direction_right(&self) -> bool;
    fn has_direction_up(&self) -> bool;
}

/// Plain snapshot of the three directional flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
}

impl InputState {
    pub const NONE: Self = Self::new(false, false, false);
    pub const LEFT: Self = Self::new(true, false, false);
    pub const RIGHT: Self = Self::new(false, true, false);
    pub const UP: Self = Self::new(false, false, true);

    /// Every combination of the three flags, in bit order (left = bit 0).
    pub const ALL: [Self; 8] = [
        Self::new(false, false, false),
        Self::new(true, false, false),
        Self::new(false, true, false),
        Self::new(true, true, false),
        Self::new(false, false, true),
        Self::new(true, false, true),
        Self::new(false, true, true),
        Self::new(true, true, true),
    ];

    pub const fn new(left: bool, right: bool, up: bool) -> Self {
        Self { left, right, up }
    }

    /// Capture the current flags of any input source.
    pub fn sample(input: &dyn DirectionalInput) -> Self {
        Self {
            left: input.has_direction_left(),
            right: input.has_direction_right(),
            up: input.has_direction_up(),
        }
    }
}

impl DirectionalInput for InputState {
    fn has_direction_left(&self) -> bool {
        self.left
    }

    fn has_direction_right(&self) -> bool {
        self.right
    }

    fn has_direction_up(&self) -> bool {
        self.up
    }
}
