mod common;

use space_invader::assets::SoundName;
use space_invader::behavior::rows;
use space_invader::collision::{overlaps, resolve_collision};
use space_invader::{EntityKind, SpawnParams, Vec2};

use common::Harness;

fn projectile_at(position: Vec2) -> space_invader::Entity {
    let mut shot = common::load(EntityKind::PlayerProjectile);
    shot.position = position;
    shot
}

// ── overlaps ──────────────────────────────────────────────────────────────────

#[test]
fn circle_uses_half_width_radius() {
    let mut enemy = common::load(EntityKind::Enemy);
    enemy.position = Vec2::new(100.0, 100.0);
    assert!(overlaps(Vec2::new(100.0, 116.0), &enemy)); // on the edge
    assert!(!overlaps(Vec2::new(100.0, 116.5), &enemy));
    // Rectangle corner is outside the circle
    assert!(!overlaps(Vec2::new(115.0, 115.0), &enemy));
    assert!(overlaps(Vec2::new(111.0, 111.0), &enemy));
}

// ── resolve_collision ─────────────────────────────────────────────────────────

#[test]
fn hit_kills_enemy_and_scores_once() {
    let mut h = Harness::new(common::test_config());
    let enemy = h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(400.0, 100.0)));

    let mut shot = projectile_at(Vec2::new(400.0, 110.0));
    let hit = resolve_collision(
        &mut shot,
        h.stage_mut(),
        &[EntityKind::Enemy],
        Some(SoundName::EnemyDeath),
        1,
    );
    assert_eq!(hit, Some(enemy));
    assert!(shot.is_pinned());
    assert_eq!(shot.animation().row(), 1);
    assert!(shot.animation().action().destroy_on_finish);

    let target = h.entity(enemy);
    assert_eq!(target.hit_points(), 0);
    assert!(!target.is_alive());
    assert_eq!(target.animation().row(), target.death_row());
    assert!(target.animation().action().destroy_on_finish);

    assert_eq!(h.stage().score(), 1);
    assert_eq!(h.stage().high_score(), 1);
    assert_eq!(h.stage_mut().take_cues(), vec![SoundName::EnemyDeath]);

    // Pinned: the same projectile never resolves again
    let again = resolve_collision(
        &mut shot,
        h.stage_mut(),
        &[EntityKind::Enemy],
        Some(SoundName::EnemyDeath),
        1,
    );
    assert_eq!(again, None);
    assert_eq!(h.stage().score(), 1);
}

#[test]
fn dead_target_cannot_be_hit_again() {
    let mut h = Harness::new(common::test_config());
    h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(400.0, 100.0)));

    let mut first = projectile_at(Vec2::new(400.0, 100.0));
    let mut second = projectile_at(Vec2::new(400.0, 100.0));
    assert!(resolve_collision(&mut first, h.stage_mut(), &[EntityKind::Enemy], None, 1).is_some());
    assert!(resolve_collision(&mut second, h.stage_mut(), &[EntityKind::Enemy], None, 1).is_none());
    assert!(!second.is_pinned());
    assert_eq!(h.stage().score(), 1);
}

#[test]
fn miss_leaves_everything_untouched() {
    let mut h = Harness::new(common::test_config());
    let enemy = h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(400.0, 100.0)));

    let mut shot = projectile_at(Vec2::new(400.0, 200.0));
    assert!(resolve_collision(&mut shot, h.stage_mut(), &[EntityKind::Enemy], None, 1).is_none());
    assert!(!shot.is_pinned());
    assert_eq!(h.entity(enemy).hit_points(), 1);
    assert_eq!(h.stage().score(), 0);
}

#[test]
fn wrong_target_group_is_ignored() {
    let mut h = Harness::new(common::test_config());
    h.spawn(EntityKind::Player, SpawnParams::at(Vec2::new(400.0, 540.0)));

    let mut shot = projectile_at(Vec2::new(400.0, 540.0));
    let hit = resolve_collision(
        &mut shot,
        h.stage_mut(),
        &[EntityKind::Enemy, EntityKind::Boss],
        None,
        1,
    );
    assert!(hit.is_none());
}

#[test]
fn first_overlapping_target_wins() {
    let mut h = Harness::new(common::test_config());
    let front = h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(400.0, 100.0)));
    let back = h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(405.0, 100.0)));

    let mut shot = projectile_at(Vec2::new(402.0, 100.0));
    let hit = resolve_collision(&mut shot, h.stage_mut(), &[EntityKind::Enemy], None, 1);
    assert_eq!(hit, Some(front));
    assert_eq!(h.entity(back).hit_points(), 1);
    assert_eq!(h.stage().score(), 1);
}

#[test]
fn boss_loses_one_hit_point_per_hit() {
    let mut h = Harness::new(common::test_config());
    let boss = h.spawn(EntityKind::Boss, SpawnParams::at(Vec2::new(400.0, 90.0)));

    for _ in 0..3 {
        let mut shot = projectile_at(Vec2::new(400.0, 120.0));
        assert!(resolve_collision(&mut shot, h.stage_mut(), &[EntityKind::Boss], None, 1).is_some());
    }
    assert_eq!(h.entity(boss).hit_points(), 17);
    assert!(h.entity(boss).is_alive());
    assert_eq!(h.entity(boss).animation().row(), rows::IDLE);
}

#[test]
fn boss_kill_does_not_score() {
    let mut h = Harness::new(common::test_config());
    let boss = h.spawn(EntityKind::Boss, SpawnParams::at(Vec2::new(400.0, 90.0)));
    h.entity_mut(boss).set_hit_points(1);

    let mut shot = projectile_at(Vec2::new(400.0, 90.0));
    assert!(resolve_collision(&mut shot, h.stage_mut(), &[EntityKind::Boss], None, 1).is_some());
    assert_eq!(h.entity(boss).hit_points(), 0);
    assert_eq!(h.entity(boss).animation().row(), h.entity(boss).death_row());
    assert_eq!(h.stage().score(), 0);
}

// ── In the tick loop ──────────────────────────────────────────────────────────

#[test]
fn projectile_hit_plays_out_and_both_entities_go() {
    let mut h = Harness::new(common::test_config());
    h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(400.0, 100.0)));
    // Spawns 32px above the origin, at y = 120
    h.spawn(
        EntityKind::PlayerProjectile,
        SpawnParams::at(Vec2::new(400.0, 152.0)),
    );

    h.step(); // moves to y = 110, hits
    assert_eq!(h.stage().score(), 1);
    assert_eq!(
        h.stage_mut().take_cues(),
        vec![SoundName::PlayerShot, SoundName::EnemyDeath]
    );
    let shot = h.first(EntityKind::PlayerProjectile).expect("impact playing");
    assert!(shot.is_pinned());
    assert_eq!(shot.position.y, 110.0);

    // Pinned shots stop moving and never score again
    h.steps(5);
    let shot = h.first(EntityKind::PlayerProjectile).expect("impact playing");
    assert_eq!(shot.position.y, 110.0);
    assert_eq!(h.stage().score(), 1);

    // Both one-shot sequences finish and the sweep removes them
    h.steps(20);
    assert!(h.stage().entities().is_empty());
    assert_eq!(h.stage().score(), 1);
}
