//! Game configuration.
//!
//! Gameplay tuning lives in one plain struct per entity type, built once
//! when the session starts and handed out by value. Runtime knobs can be
//! overridden from the environment.

use std::env;
use std::time::Duration;

use crate::assets::{SoundName, TEXTURE_DIR};
use crate::entities::EntityKind;

/// Fixed tick cadence (~16.67 ms).
pub const TICK_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);

const DEFAULT_FRAME_TIME: Duration = Duration::from_millis(166);

// ── Per-kind blueprints ───────────────────────────────────────────────────────

/// Everything the entity factory needs to build one kind of entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Blueprint {
    pub texture: String,
    pub sound: Option<SoundName>,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Duration of one full pass over a sheet row.
    pub frame_time: Duration,
    pub hit_points: u32,
    /// Sheet row played (once, destroying the entity) when hit points hit 0.
    pub death_row: u32,
}

impl Blueprint {
    fn sprite(texture: &str, sound: Option<SoundName>, hit_points: u32) -> Self {
        Self {
            texture: format!("{TEXTURE_DIR}/{texture}"),
            sound,
            frame_width: 32,
            frame_height: 32,
            frame_time: DEFAULT_FRAME_TIME,
            hit_points,
            death_row: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Blueprints {
    pub player: Blueprint,
    pub enemy: Blueprint,
    pub boss: Blueprint,
    pub player_projectile: Blueprint,
    pub enemy_projectile: Blueprint,
    pub boss_projectile: Blueprint,
}

impl Default for Blueprints {
    fn default() -> Self {
        Self {
            player: Blueprint::sprite("ship.png", None, 3),
            enemy: Blueprint::sprite("enemy-ship.png", None, 1),
            boss: Blueprint {
                frame_width: 128,
                frame_height: 128,
                ..Blueprint::sprite("boss.png", None, 20)
            },
            player_projectile: Blueprint::sprite(
                "projectile.png",
                Some(SoundName::PlayerShot),
                1,
            ),
            enemy_projectile: Blueprint::sprite(
                "enemy-projectile.png",
                Some(SoundName::EnemyShot),
                1,
            ),
            boss_projectile: Blueprint::sprite(
                "boss-projectile.png",
                Some(SoundName::EnemyShot),
                1,
            ),
        }
    }
}

// ── Tuning ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTuning {
    /// Horizontal pixels per tick.
    pub speed: f32,
    /// Spawn point as fractions of the window size.
    pub spawn: (f32, f32),
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 10.0,
            spawn: (0.5, 0.9),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTuning {
    /// Horizontal pixels per tick while patrolling.
    pub speed: f32,
    /// Ticks between patrol direction flips.
    pub flip_ticks: u32,
    /// Chance per tick that the enemy at the head of the firing order shoots.
    pub fire_chance: f64,
    pub columns: u32,
    pub rows: u32,
    /// Top-left grid slot, in pixels.
    pub origin: (f32, f32),
    pub spacing: (f32, f32),
    /// Number of recolor variants cycled across columns.
    pub palette: u32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 3.0,
            flip_ticks: 30,
            fire_chance: 0.05,
            columns: 4,
            rows: 4,
            origin: (160.0, 60.0),
            spacing: (80.0, 40.0),
            palette: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossTuning {
    pub speed: f32,
    /// Half-width of the patrol band around the spawn column.
    pub range: f32,
    pub spawn: (f32, f32),
    pub primary_cooldown_ticks: u32,
    pub spread_cooldown_ticks: u32,
    pub spread_offsets: [f32; 3],
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            speed: 4.0,
            range: 200.0,
            spawn: (0.5, 0.15),
            primary_cooldown_ticks: 45,
            spread_cooldown_ticks: 70,
            spread_offsets: [-120.0, 0.0, 120.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileTuning {
    /// Vertical pixels per tick; player shots travel up, the rest down.
    pub player_speed: f32,
    pub enemy_speed: f32,
    pub boss_speed: f32,
    /// Distance from the target's row under which hostile shots slow down.
    pub proximity_band: f32,
    pub slow_factor: f32,
    /// Sheet row played when a projectile hits something.
    pub impact_row: u32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            player_speed: 10.0,
            enemy_speed: 6.0,
            boss_speed: 7.0,
            proximity_band: 60.0,
            slow_factor: 0.5,
            impact_row: 1,
        }
    }
}

// ── Root config ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub tick_interval: Duration,
    pub respawn_delay_ticks: u32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub boss: BossTuning,
    pub projectile: ProjectileTuning,
    pub blueprints: Blueprints,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            tick_interval: TICK_INTERVAL,
            respawn_delay_ticks: 90,
            seed: None,
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            boss: BossTuning::default(),
            projectile: ProjectileTuning::default(),
            blueprints: Blueprints::default(),
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with `SPACE_INVADER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each override
    /// key. Values that do not parse, and window sizes that are not
    /// positive and finite, are ignored.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f32>().ok());
        let mut config = Self::default();
        if let Some(ms) = lookup("SPACE_INVADER_TICK_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            config.tick_interval = Duration::from_millis(ms);
        }
        if let Some(width) = parse("SPACE_INVADER_WIDTH").filter(|v| is_extent(*v)) {
            config.width = width;
        }
        if let Some(height) = parse("SPACE_INVADER_HEIGHT").filter(|v| is_extent(*v)) {
            config.height = height;
        }
        config.seed = lookup("SPACE_INVADER_SEED").and_then(|v| v.trim().parse().ok());
        config
    }

    pub fn blueprint(&self, kind: EntityKind) -> &Blueprint {
        match kind {
            EntityKind::Player => &self.blueprints.player,
            EntityKind::Enemy => &self.blueprints.enemy,
            EntityKind::Boss => &self.blueprints.boss,
            EntityKind::PlayerProjectile => &self.blueprints.player_projectile,
            EntityKind::EnemyProjectile => &self.blueprints.enemy_projectile,
            EntityKind::BossProjectile => &self.blueprints.boss_projectile,
        }
    }

    pub fn player_spawn(&self) -> (f32, f32) {
        (
            self.width * self.player.spawn.0,
            self.height * self.player.spawn.1,
        )
    }

    pub fn boss_spawn(&self) -> (f32, f32) {
        (self.width * self.boss.spawn.0, self.height * self.boss.spawn.1)
    }

    /// Ticks a player shot needs to cross from the spawn row to the top edge.
    pub fn player_fire_cooldown_ticks(&self) -> u32 {
        ticks_for(self.player_spawn().1, self.projectile.player_speed)
    }

    /// Half the ticks an enemy shot needs to reach the player's row.
    pub fn enemy_volley_ticks(&self) -> u32 {
        let distance = self.player_spawn().1 - self.enemy.origin.1;
        ticks_for(distance, self.projectile.enemy_speed) / 2
    }
}

fn ticks_for(distance: f32, speed: f32) -> u32 {
    if speed <= 0.0 {
        return 0;
    }
    (distance.max(0.0) / speed).ceil() as u32
}

fn is_extent(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
