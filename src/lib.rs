//! Runtime core of a 2D arcade shooter.
//!
//! A [`Session`] owns every entity, the input state, score and the
//! progression state machine. A [`FrameScheduler`] drives it on a fixed
//! cadence against pluggable surface, input and audio collaborators.
//! Everything runs on one thread; entities are mutated only inside a tick.

pub mod animation;
pub mod arena;
pub mod assets;
pub mod behavior;
pub mod collision;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod logging;
pub mod progression;
pub mod scheduler;
pub mod session;

pub use arena::EntityHandle;
pub use config::GameConfig;
pub use entities::{Entity, EntityKind, SpawnParams, Vec2};
pub use error::{AssetError, GameError};
pub use progression::Progression;
pub use scheduler::FrameScheduler;
pub use session::{Session, Stage};
