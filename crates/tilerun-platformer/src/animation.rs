use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PlatformerError;
use crate::state::PlayerState;

/// Render-side animation handle: an asset key plus playback speed
/// (frames advanced per tick).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationClip {
    pub key: String,
    pub speed: f32,
}

/// One entry per player state. Construction fails unless all eight are
/// present, so lookups afterwards are infallible.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSet<T> {
    clips: Vec<T>,
}

impl<T> AnimationSet<T> {
    /// Build from a table keyed by [`PlayerState::key`].
    pub fn from_named(mut named: BTreeMap<String, T>) -> Result<Self, PlatformerError> {
        if let Some(unknown) = named.keys().find(|k| PlayerState::from_key(k).is_none()) {
            return Err(PlatformerError::UnknownAnimation(unknown.clone()));
        }
        let mut clips = Vec::with_capacity(PlayerState::ALL.len());
        for state in PlayerState::ALL {
            let clip = named
                .remove(state.key())
                .ok_or(PlatformerError::MissingAnimation(state))?;
            clips.push(clip);
        }
        Ok(Self { clips })
    }

    pub fn get(&self, state: PlayerState) -> &T {
        &self.clips[state.index()]
    }
}

/// Tracks which state's clip is showing and how far it has played.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationCursor {
    pub state: PlayerState,
    pub frame: f32,
}

impl AnimationCursor {
    pub fn new(state: PlayerState) -> Self {
        Self { state, frame: 0.0 }
    }

    /// Switch to the clip for `state`, rewinding to frame 0. Switching to the
    /// clip already playing is a no-op. Returns whether the clip changed.
    pub fn switch(&mut self, state: PlayerState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        self.frame = 0.0;
        true
    }

    pub fn advance(&mut self, speed: f32) {
        self.frame += speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_table() -> BTreeMap<String, u32> {
        PlayerState::ALL
            .iter()
            .map(|s| (s.key().to_string(), s.index() as u32 * 10))
            .collect()
    }

    #[test]
    fn full_table_builds_and_looks_up() {
        let set = AnimationSet::from_named(full_table()).unwrap();
        assert_eq!(*set.get(PlayerState::IdleLeft), 0);
        assert_eq!(*set.get(PlayerState::FallRight), 70);
    }

    #[test]
    fn missing_state_is_rejected() {
        let mut table = full_table();
        table.remove("jump_right");
        let err = AnimationSet::from_named(table).unwrap_err();
        assert!(matches!(
            err,
            PlatformerError::MissingAnimation(PlayerState::JumpRight)
        ));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut table = full_table();
        table.insert("crouch_left".to_string(), 99);
        let err = AnimationSet::from_named(table).unwrap_err();
        assert!(matches!(err, PlatformerError::UnknownAnimation(ref k) if k == "crouch_left"));
    }

    #[test]
    fn switching_to_same_clip_keeps_frame() {
        let mut cursor = AnimationCursor::new(PlayerState::IdleRight);
        cursor.advance(0.2);
        cursor.advance(0.2);
        assert!(!cursor.switch(PlayerState::IdleRight));
        assert!(cursor.frame > 0.0);

        assert!(cursor.switch(PlayerState::RunRight));
        assert_eq!(cursor.frame, 0.0);
        assert_eq!(cursor.state, PlayerState::RunRight);
    }
}
