//! Entity model: a closed set of kinds sharing one data layout.
//!
//! Per-kind behavior lives in [`crate::behavior`]; an entity only carries its
//! kind tag plus the bookkeeping its behavior functions read and write.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::time::{Duration, Instant};

use crate::animation::{Action, AnimatedAction, Completion, Timer};
use crate::assets::{AssetLoader, SoundHandle, SoundName, TextureHandle};
use crate::config::Blueprint;
use crate::error::AssetError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Boss,
    PlayerProjectile,
    EnemyProjectile,
    BossProjectile,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Player,
        EntityKind::Enemy,
        EntityKind::Boss,
        EntityKind::PlayerProjectile,
        EntityKind::EnemyProjectile,
        EntityKind::BossProjectile,
    ];

    pub fn is_projectile(self) -> bool {
        matches!(
            self,
            EntityKind::PlayerProjectile | EntityKind::EnemyProjectile | EntityKind::BossProjectile
        )
    }

    /// Kinds that count towards clearing a wave.
    pub fn is_hostile(self) -> bool {
        matches!(self, EntityKind::Enemy | EntityKind::Boss)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Player => "Player",
            EntityKind::Enemy => "Enemy",
            EntityKind::Boss => "Boss",
            EntityKind::PlayerProjectile => "Projectile",
            EntityKind::EnemyProjectile => "Enemy Projectile",
            EntityKind::BossProjectile => "Boss Projectile",
        })
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

// ── Auxiliary state ───────────────────────────────────────────────────────────

/// Named per-instance scalar used by behavior bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AuxValue {
    Int(i64),
    Float(f32),
}

impl AuxValue {
    pub fn as_int(self) -> i64 {
        match self {
            AuxValue::Int(v) => v,
            AuxValue::Float(v) => v as i64,
        }
    }

    pub fn as_float(self) -> f32 {
        match self {
            AuxValue::Int(v) => v as f32,
            AuxValue::Float(v) => v,
        }
    }
}

/// Per-instance parameters handed to the factory. They are written into the
/// new entity's auxiliary scalars before its startup behavior runs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnParams {
    pub position: Vec2,
    pub target: Option<Vec2>,
    pub index: u32,
}

impl SpawnParams {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn aimed(position: Vec2, target: Vec2) -> Self {
        Self {
            position,
            target: Some(target),
            index: 0,
        }
    }

    pub fn indexed(position: Vec2, index: u32) -> Self {
        Self {
            position,
            target: None,
            index,
        }
    }
}

pub mod aux {
    pub const SPAWN_X: &str = "spawn_x";
    pub const SPAWN_Y: &str = "spawn_y";
    pub const TARGET_X: &str = "target_x";
    pub const TARGET_Y: &str = "target_y";
    pub const INDEX: &str = "index";
}

// ── Entity ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Entity {
    id: String,
    kind: EntityKind,
    /// Sprite center in window pixels.
    pub position: Vec2,
    hit_points: u32,
    texture: TextureHandle,
    sound: Option<(SoundName, SoundHandle)>,
    frame_size: Vec2,
    frame_time: Duration,
    frame_count: u32,
    death_row: u32,
    vars: HashMap<&'static str, AuxValue>,
    stamps: HashMap<&'static str, Instant>,
    animation: AnimatedAction,
    timer: Option<Timer>,
    pin_movement: bool,
    destroy: bool,
    born_tick: u64,
}

impl Entity {
    /// Loads the blueprint's resources. Fails before any behavior can run.
    pub fn load(
        id: String,
        kind: EntityKind,
        blueprint: Blueprint,
        assets: &mut dyn AssetLoader,
    ) -> Result<Self, AssetError> {
        let texture = assets.load_texture(&blueprint.texture)?;
        let sound = match blueprint.sound {
            Some(name) => Some((name, assets.load_sound(&name.path())?)),
            None => None,
        };
        let frame_count = texture.width / blueprint.frame_width.max(1);
        if frame_count == 0 {
            return Err(AssetError::EmptySheet {
                path: blueprint.texture,
                frame_width: blueprint.frame_width,
            });
        }

        Ok(Self {
            id,
            kind,
            position: Vec2::default(),
            hit_points: blueprint.hit_points,
            texture: texture.handle,
            sound,
            frame_size: Vec2::new(blueprint.frame_width as f32, blueprint.frame_height as f32),
            frame_time: blueprint.frame_time,
            frame_count,
            death_row: blueprint.death_row,
            vars: HashMap::new(),
            stamps: HashMap::new(),
            animation: AnimatedAction::default(),
            timer: None,
            pin_movement: false,
            destroy: false,
            born_tick: 0,
        })
    }

    pub(crate) fn seed(&mut self, params: SpawnParams, born_tick: u64) {
        self.born_tick = born_tick;
        self.position = params.position;
        self.set_float(aux::SPAWN_X, params.position.x);
        self.set_float(aux::SPAWN_Y, params.position.y);
        self.set_int(aux::INDEX, i64::from(params.index));
        if let Some(target) = params.target {
            self.set_float(aux::TARGET_X, target.x);
            self.set_float(aux::TARGET_Y, target.y);
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn sound(&self) -> Option<SoundName> {
        self.sound.map(|(name, _)| name)
    }

    pub fn frame_size(&self) -> Vec2 {
        self.frame_size
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    pub fn death_row(&self) -> u32 {
        self.death_row
    }

    pub fn born_tick(&self) -> u64 {
        self.born_tick
    }

    // ── Hit points ────────────────────────────────────────────────────────────

    pub fn hit_points(&self) -> u32 {
        self.hit_points
    }

    pub fn set_hit_points(&mut self, value: u32) {
        self.hit_points = value;
    }

    /// Still counts for progression and can still be hit.
    pub fn is_alive(&self) -> bool {
        self.hit_points > 0 && !self.destroy
    }

    /// Out of hit points with its death sequence still on screen.
    pub fn is_dying(&self) -> bool {
        self.hit_points == 0
            && !self.destroy
            && self.animation.is_playing()
            && self.animation.action().destroy_on_finish
    }

    /// Collision radius: half the hitbox width.
    pub fn hit_radius(&self) -> f32 {
        self.frame_size.x / 2.0
    }

    // ── Lifetime flags ────────────────────────────────────────────────────────

    pub fn is_destroyed(&self) -> bool {
        self.destroy
    }

    /// Marks the entity for removal at the end of the logic sweep.
    pub fn destroy(&mut self) {
        self.destroy = true;
    }

    pub fn is_pinned(&self) -> bool {
        self.pin_movement
    }

    pub fn pin(&mut self) {
        self.pin_movement = true;
    }

    // ── Auxiliary scalars and timestamps ──────────────────────────────────────

    pub fn var(&self, name: &str) -> Option<AuxValue> {
        self.vars.get(name).copied()
    }

    pub fn int(&self, name: &str) -> i64 {
        self.var(name).map_or(0, AuxValue::as_int)
    }

    pub fn float(&self, name: &str) -> f32 {
        self.var(name).map_or(0.0, AuxValue::as_float)
    }

    pub fn set_int(&mut self, name: &'static str, value: i64) {
        self.vars.insert(name, AuxValue::Int(value));
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.vars.insert(name, AuxValue::Float(value));
    }

    pub fn stamp(&self, name: &str) -> Option<Instant> {
        self.stamps.get(name).copied()
    }

    pub fn set_stamp(&mut self, name: &'static str, at: Instant) {
        self.stamps.insert(name, at);
    }

    pub fn clear_stamp(&mut self, name: &str) {
        self.stamps.remove(name);
    }

    // ── Timer ─────────────────────────────────────────────────────────────────

    /// Arms a one-shot or repeating timer. A zero duration cancels it.
    pub fn set_timer(&mut self, duration: Duration, continuous: bool, now: Instant) {
        self.timer = if duration.is_zero() {
            None
        } else {
            Some(Timer::new(duration, continuous, now))
        };
    }

    /// True once per period. One-shot timers disarm after firing.
    pub fn timer_elapsed(&mut self, now: Instant) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return false;
        };
        if !timer.check(now) {
            return false;
        }
        if !timer.is_continuous() {
            self.timer = None;
        }
        true
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    // ── Animation ─────────────────────────────────────────────────────────────

    pub fn animation(&self) -> &AnimatedAction {
        &self.animation
    }

    /// Starts a new sequence, replacing whatever was playing.
    pub fn create_animated(&mut self, action: Action, now: Instant) {
        self.animation.arm(action, self.frame_count, now);
    }

    /// Per-tick poll. Sets the destroy flag when a destroy-on-finish pass
    /// completes and returns its completion hook for the caller to run.
    pub fn advance_animation(&mut self, now: Instant) -> Option<Completion> {
        let finished = self
            .animation
            .advance(now, self.frame_time, self.frame_count)?;
        if !finished.destroy {
            return None;
        }
        self.destroy = true;
        finished.on_complete
    }
}
