use serde::{Deserialize, Serialize};

use crate::input::DirectionalInput;

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Won,
    TimedOut,
}

impl SessionOutcome {
    pub fn from_success(success: bool) -> Self {
        if success { Self::Won } else { Self::TimedOut }
    }

    pub fn is_success(self) -> bool {
        self == Self::Won
    }
}

/// Core trait for a tick-driven single-player session.
///
/// The host owns the frame scheduler and input devices; the simulation only
/// advances numeric state and reports events.
pub trait Simulation {
    /// Events emitted by a tick.
    type Event;

    /// Advance one frame. `delta_ms` feeds the session clock only.
    fn tick(&mut self, delta_ms: f64, input: &dyn DirectionalInput) -> Vec<Self::Event>;

    /// Reset clock, player and state without reloading level data.
    fn restart(&mut self);

    /// Freeze the simulation and record the outcome.
    fn end(&mut self, success: bool);

    fn is_ended(&self) -> bool;

    fn outcome(&self) -> Option<SessionOutcome>;

    /// Milliseconds accumulated since the last restart.
    fn elapsed_ms(&self) -> f64;

    /// Encode the render-facing view of the session as MessagePack.
    fn serialize_frame(&self) -> Result<Vec<u8>, rmp_serde::encode::Error>;
}
