use crate::level::BlockKind;
use crate::state::PlayerState;

/// Configuration and level-loading failures.
///
/// The per-tick simulation has no error path; everything here is raised
/// before the first tick.
#[derive(Debug)]
pub enum PlatformerError {
    /// A player state has no animation clip registered.
    MissingAnimation(PlayerState),
    /// An animation table key does not name a player state.
    UnknownAnimation(String),
    LevelIo {
        path: String,
        source: std::io::Error,
    },
    LevelParse {
        path: String,
        message: String,
    },
    InvalidBlock {
        kind: BlockKind,
        index: usize,
        reason: String,
    },
    InvalidLevel(String),
}

impl std::fmt::Display for PlatformerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAnimation(state) => {
                write!(f, "no animation registered for state {state}")
            },
            Self::UnknownAnimation(key) => write!(f, "unknown animation state key {key:?}"),
            Self::LevelIo { path, source } => write!(f, "failed to read level {path}: {source}"),
            Self::LevelParse { path, message } => {
                write!(f, "failed to parse level {path}: {message}")
            },
            Self::InvalidBlock {
                kind,
                index,
                reason,
            } => write!(f, "invalid {kind:?} block #{index}: {reason}"),
            Self::InvalidLevel(m) => write!(f, "invalid level: {m}"),
        }
    }
}

impl std::error::Error for PlatformerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LevelIo { source, .. } => Some(source),
            _ => None,
        }
    }
}
