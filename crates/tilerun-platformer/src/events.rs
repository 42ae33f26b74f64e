use serde::{Deserialize, Serialize};

use tilerun_core::game_trait::SessionOutcome;

use crate::level::BlockId;
use crate::state::PlayerState;

/// Events emitted by a session tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StateChanged { from: PlayerState, to: PlayerState },
    Jumped,
    Landed { block: BlockId },
    WallHit { block: BlockId },
    SessionEnded { outcome: SessionOutcome },
}
