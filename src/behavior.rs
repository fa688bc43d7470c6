//! Per-kind startup and logic functions.
//!
//! Each function gets the entity it runs for and the [`Stage`] for world
//! queries, spawning and sound. Neither reference outlives the call; any
//! per-instance state goes into the entity's auxiliary scalars and stamps.

use rand::Rng;

use crate::animation::{Action, Completion};
use crate::assets::SoundName;
use crate::collision::resolve_collision;
use crate::entities::{aux, Entity, EntityKind, SpawnParams, Vec2};
use crate::error::GameError;
use crate::input::Key;
use crate::session::Stage;

pub type BehaviorFn = fn(&mut Entity, &mut Stage) -> Result<(), GameError>;

/// Startup runs once inside the factory; logic runs once per unpaused tick.
#[derive(Clone, Copy)]
pub struct Behavior {
    pub startup: BehaviorFn,
    pub logic: BehaviorFn,
}

pub fn behavior(kind: EntityKind) -> Behavior {
    match kind {
        EntityKind::Player => Behavior {
            startup: player_startup,
            logic: player_logic,
        },
        EntityKind::Enemy => Behavior {
            startup: enemy_startup,
            logic: enemy_logic,
        },
        EntityKind::Boss => Behavior {
            startup: boss_startup,
            logic: boss_logic,
        },
        EntityKind::PlayerProjectile => Behavior {
            startup: player_projectile_startup,
            logic: player_projectile_logic,
        },
        EntityKind::EnemyProjectile => Behavior {
            startup: enemy_projectile_startup,
            logic: hostile_projectile_logic,
        },
        EntityKind::BossProjectile => Behavior {
            startup: boss_projectile_startup,
            logic: hostile_projectile_logic,
        },
    }
}

/// Auxiliary scalar and stamp names.
pub mod vars {
    pub const VX: &str = "vx";
    pub const VY: &str = "vy";
    pub const PATROL_TICKS: &str = "patrol_ticks";
    pub const VARIANT: &str = "variant";
    pub const MIN_X: &str = "min_x";
    pub const MAX_X: &str = "max_x";
    pub const SPREAD_INDEX: &str = "spread_index";
    pub const SLOWED: &str = "slowed";

    pub const FIRE: &str = "fire";
    pub const PRIMARY: &str = "primary";
    pub const SPREAD: &str = "spread";
}

/// Sheet rows shared by every sprite.
pub mod rows {
    pub const IDLE: u32 = 0;
    pub const ACTION: u32 = 1;
}

/// The one-shot sequence played when `entity` runs out of hit points.
pub fn death_action(entity: &Entity) -> Action {
    let action = Action::new(entity.death_row()).destroy_on_finish();
    let on_complete: Option<Completion> = match entity.kind() {
        EntityKind::Player => Some(player_died as Completion),
        EntityKind::Boss => Some(boss_died as Completion),
        _ => None,
    };
    match on_complete {
        Some(completion) => action.on_complete(completion),
        None => action,
    }
}

fn player_died(_: &mut Entity, stage: &mut Stage) {
    stage.play_sound(SoundName::PlayerDeath);
}

fn boss_died(_: &mut Entity, stage: &mut Stage) {
    stage.play_sound(SoundName::EnemyDeath);
}

fn spawn_point(entity: &Entity) -> Vec2 {
    Vec2::new(entity.float(aux::SPAWN_X), entity.float(aux::SPAWN_Y))
}

fn target_point(entity: &Entity) -> Option<Vec2> {
    let x = entity.var(aux::TARGET_X)?;
    let y = entity.var(aux::TARGET_Y)?;
    Some(Vec2::new(x.as_float(), y.as_float()))
}

// ── Player ────────────────────────────────────────────────────────────────────

fn player_startup(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    entity.position = spawn_point(entity);
    entity.clear_stamp(vars::FIRE);
    entity.create_animated(Action::new(rows::IDLE).looping(), stage.now());
    Ok(())
}

fn player_logic(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    if !entity.is_alive() {
        return Ok(());
    }

    // Clamp, never wrap.
    let step = stage.input().horizontal() as f32 * stage.config().player.speed;
    entity.position.x = (entity.position.x + step).clamp(0.0, stage.config().width);

    if !stage.input().is_pressed(Key::Fire) {
        return Ok(());
    }
    let cooldown = stage.config().player_fire_cooldown_ticks();
    let ready = entity
        .stamp(vars::FIRE)
        .map_or(true, |stamp| stage.is_expired(stamp, cooldown));
    if !ready {
        return Ok(());
    }

    let now = stage.now();
    entity.set_stamp(vars::FIRE, now);
    entity.create_animated(Action::new(rows::ACTION).rollback_to(rows::IDLE), now);
    stage.create_entity(EntityKind::PlayerProjectile, SpawnParams::at(entity.position))?;
    Ok(())
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

fn enemy_startup(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    let tuning = stage.config().enemy;
    let column = entity.int(aux::INDEX) % i64::from(tuning.columns.max(1));
    entity.set_int(vars::VARIANT, column % i64::from(tuning.palette.max(1)));

    entity.position = spawn_point(entity);
    entity.set_float(vars::VX, tuning.speed);
    entity.set_int(vars::PATROL_TICKS, 0);

    let now = stage.now();
    entity.set_timer(entity.frame_time() * 3, true, now);
    entity.create_animated(Action::new(rows::IDLE), now);
    Ok(())
}

fn enemy_logic(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    if !entity.is_alive() {
        return Ok(());
    }
    let tuning = stage.config().enemy;
    let width = stage.config().width;

    let mut vx = entity.float(vars::VX);
    let mut ticks = entity.int(vars::PATROL_TICKS) + 1;
    if ticks >= i64::from(tuning.flip_ticks) {
        vx = -vx;
        ticks = 0;
    }
    let next = entity.position.x + vx;
    if (0.0..=width).contains(&next) {
        entity.position.x = next;
    } else {
        vx = -vx;
    }
    entity.set_float(vars::VX, vx);
    entity.set_int(vars::PATROL_TICKS, ticks);

    let now = stage.now();
    if entity.timer_elapsed(now) {
        entity.create_animated(Action::new(rows::IDLE), now);
    }

    if !stage.is_next_shooter(entity.id()) || !stage.volley_ready() {
        return Ok(());
    }
    if !stage.rng().gen_bool(tuning.fire_chance) {
        return Ok(());
    }
    let Some(target) = stage.player_position() else {
        return Ok(());
    };
    stage.create_entity(
        EntityKind::EnemyProjectile,
        SpawnParams::aimed(entity.position, target),
    )?;
    stage.rotate_firing_order();
    Ok(())
}

// ── Boss ──────────────────────────────────────────────────────────────────────

fn boss_startup(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    let tuning = stage.config().boss;
    let width = stage.config().width;
    let center = spawn_point(entity);

    entity.position = center;
    entity.set_float(vars::MIN_X, (center.x - tuning.range).max(0.0));
    entity.set_float(vars::MAX_X, (center.x + tuning.range).min(width));
    entity.set_float(vars::VX, tuning.speed);
    entity.set_int(vars::SPREAD_INDEX, 0);

    let now = stage.now();
    entity.set_stamp(vars::PRIMARY, now);
    entity.set_stamp(vars::SPREAD, now);
    entity.create_animated(Action::new(rows::IDLE).looping(), now);
    Ok(())
}

fn boss_logic(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    if !entity.is_alive() {
        return Ok(());
    }
    let tuning = stage.config().boss;

    // Bounce inside the patrol band.
    let (min_x, max_x) = (entity.float(vars::MIN_X), entity.float(vars::MAX_X));
    let mut vx = entity.float(vars::VX);
    let next = entity.position.x + vx;
    if next < min_x || next > max_x {
        vx = -vx;
        entity.set_float(vars::VX, vx);
    }
    entity.position.x = (entity.position.x + vx).clamp(min_x, max_x);

    let Some(player) = stage.player_position() else {
        return Ok(());
    };
    let now = stage.now();

    let primary_ready = entity
        .stamp(vars::PRIMARY)
        .map_or(true, |stamp| stage.is_expired(stamp, tuning.primary_cooldown_ticks));
    if primary_ready {
        entity.set_stamp(vars::PRIMARY, now);
        stage.create_entity(
            EntityKind::BossProjectile,
            SpawnParams::aimed(entity.position, player),
        )?;
    }

    let spread_ready = entity
        .stamp(vars::SPREAD)
        .map_or(true, |stamp| stage.is_expired(stamp, tuning.spread_cooldown_ticks));
    if spread_ready {
        let offsets = tuning.spread_offsets;
        let index = entity.int(vars::SPREAD_INDEX).rem_euclid(offsets.len() as i64) as usize;
        let target = player + Vec2::new(offsets[index], 0.0);
        entity.set_stamp(vars::SPREAD, now);
        entity.set_int(vars::SPREAD_INDEX, ((index + 1) % offsets.len()) as i64);
        stage.create_entity(
            EntityKind::BossProjectile,
            SpawnParams::aimed(entity.position, target),
        )?;
    }
    Ok(())
}

// ── Projectiles ───────────────────────────────────────────────────────────────

fn player_projectile_startup(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    stage.play_sound(entity.sound().unwrap_or(SoundName::PlayerShot));
    let origin = spawn_point(entity);
    entity.position = Vec2::new(origin.x, origin.y - entity.frame_size().y);
    entity.set_float(vars::VX, 0.0);
    entity.set_float(vars::VY, -stage.config().projectile.player_speed);
    entity.create_animated(Action::new(rows::IDLE).looping(), stage.now());
    Ok(())
}

fn player_projectile_logic(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    if entity.is_pinned() {
        return Ok(());
    }
    entity.position.y += entity.float(vars::VY);
    if entity.position.y < 0.0 {
        entity.destroy();
        return Ok(());
    }
    let impact_row = stage.config().projectile.impact_row;
    resolve_collision(
        entity,
        stage,
        &[EntityKind::Enemy, EntityKind::Boss],
        Some(SoundName::EnemyDeath),
        impact_row,
    );
    Ok(())
}

fn enemy_projectile_startup(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    let speed = stage.config().projectile.enemy_speed;
    aimed_startup(entity, stage, speed)
}

fn boss_projectile_startup(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    let speed = stage.config().projectile.boss_speed;
    aimed_startup(entity, stage, speed)
}

/// Straight line towards the target's position at spawn time: the shot
/// reaches the target's x when it reaches the target's row.
fn aimed_startup(entity: &mut Entity, stage: &mut Stage, speed: f32) -> Result<(), GameError> {
    stage.play_sound(entity.sound().unwrap_or(SoundName::EnemyShot));
    let origin = spawn_point(entity);
    entity.position = origin;

    let vx = match target_point(entity) {
        Some(target) if target.y > origin.y => (target.x - origin.x) * speed / (target.y - origin.y),
        _ => 0.0,
    };
    entity.set_float(vars::VX, vx);
    entity.set_float(vars::VY, speed);
    entity.set_int(vars::SLOWED, 0);
    entity.create_animated(Action::new(rows::IDLE).looping(), stage.now());
    Ok(())
}

fn hostile_projectile_logic(entity: &mut Entity, stage: &mut Stage) -> Result<(), GameError> {
    if entity.is_pinned() {
        return Ok(());
    }
    let tuning = stage.config().projectile;

    let mut velocity = Vec2::new(entity.float(vars::VX), entity.float(vars::VY));
    if entity.int(vars::SLOWED) == 0 {
        if let Some(target) = target_point(entity) {
            if (target.y - entity.position.y).abs() <= tuning.proximity_band {
                velocity = velocity * tuning.slow_factor;
                entity.set_float(vars::VX, velocity.x);
                entity.set_float(vars::VY, velocity.y);
                entity.set_int(vars::SLOWED, 1);
            }
        }
    }
    entity.position += velocity;

    let (width, height) = (stage.config().width, stage.config().height);
    if entity.position.y > height || !(0.0..=width).contains(&entity.position.x) {
        entity.destroy();
        return Ok(());
    }
    resolve_collision(entity, stage, &[EntityKind::Player], None, tuning.impact_row);
    Ok(())
}
