//! Error types for the game core.
//!
//! Asset failures are fatal: they surface at load time and end the session.
//! Expected gameplay conditions (no target in range, cooldown pending) are
//! never errors.

use thiserror::Error;

/// A resource the asset collaborator could not provide.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("texture not found: {0}")]
    MissingTexture(String),
    #[error("sound not found: {0}")]
    MissingSound(String),
    #[error("font not found: {0}")]
    MissingFont(String),
    #[error("sprite sheet {path} is narrower than one {frame_width}px frame")]
    EmptySheet { path: String, frame_width: u32 },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("surface I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
