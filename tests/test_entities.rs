mod common;

use space_invader::assets::{Manifest, SoundName, TEXTURE_DIR};
use space_invader::entities::{aux, AuxValue};
use space_invader::{AssetError, Entity, EntityKind, GameConfig, SpawnParams, Vec2};

#[test]
fn kind_display_names() {
    let names: Vec<String> = EntityKind::ALL.iter().map(|k| k.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "Player",
            "Enemy",
            "Boss",
            "Projectile",
            "Enemy Projectile",
            "Boss Projectile"
        ]
    );
}

#[test]
fn kind_groups() {
    assert!(EntityKind::BossProjectile.is_projectile());
    assert!(!EntityKind::Boss.is_projectile());
    assert!(EntityKind::Enemy.is_hostile());
    assert!(EntityKind::Boss.is_hostile());
    assert!(!EntityKind::Player.is_hostile());
    assert!(!EntityKind::EnemyProjectile.is_hostile());
}

#[test]
fn vec2_arithmetic() {
    let a = Vec2::new(3.0, 4.0);
    let b = Vec2::new(1.0, 1.0);
    assert_eq!(a + b, Vec2::new(4.0, 5.0));
    assert_eq!(a - b, Vec2::new(2.0, 3.0));
    assert_eq!(a * 2.0, Vec2::new(6.0, 8.0));
    assert_eq!(a.length_squared(), 25.0);

    let mut c = a;
    c += b;
    assert_eq!(c, Vec2::new(4.0, 5.0));
}

#[test]
fn aux_value_conversions() {
    assert_eq!(AuxValue::Int(3).as_float(), 3.0);
    assert_eq!(AuxValue::Float(2.75).as_int(), 2);
    assert_eq!(AuxValue::Float(-1.5).as_float(), -1.5);
}

#[test]
fn load_slices_sheet_into_frames() {
    let enemy = common::load(EntityKind::Enemy);
    assert_eq!(enemy.frame_count(), 4); // 128px sheet / 32px frames
    assert_eq!(enemy.frame_size(), Vec2::new(32.0, 32.0));
    assert_eq!(enemy.hit_radius(), 16.0);
    assert_eq!(enemy.hit_points(), 1);
    assert!(enemy.is_alive());
    assert!(enemy.sound().is_none());

    let boss = common::load(EntityKind::Boss);
    assert_eq!(boss.frame_count(), 4); // 512 / 128
    assert_eq!(boss.hit_radius(), 64.0);
    assert_eq!(boss.hit_points(), 20);

    assert_eq!(common::load(EntityKind::Player).hit_points(), 3);
}

#[test]
fn projectiles_carry_firing_sound() {
    assert_eq!(
        common::load(EntityKind::PlayerProjectile).sound(),
        Some(SoundName::PlayerShot)
    );
    assert_eq!(
        common::load(EntityKind::EnemyProjectile).sound(),
        Some(SoundName::EnemyShot)
    );
    assert_eq!(
        common::load(EntityKind::BossProjectile).sound(),
        Some(SoundName::EnemyShot)
    );
}

#[test]
fn missing_texture_fails_load() {
    let config = GameConfig::default();
    let mut manifest = Manifest::builtin();
    let path = format!("{TEXTURE_DIR}/enemy-ship.png");
    manifest.forget(&path);

    let result = Entity::load(
        "0".to_string(),
        EntityKind::Enemy,
        config.blueprint(EntityKind::Enemy).clone(),
        &mut manifest,
    );
    assert!(matches!(result, Err(AssetError::MissingTexture(p)) if p == path));
}

#[test]
fn missing_sound_fails_load() {
    let config = GameConfig::default();
    let mut manifest = Manifest::builtin();
    manifest.forget(&SoundName::EnemyShot.path());

    let result = Entity::load(
        "0".to_string(),
        EntityKind::EnemyProjectile,
        config.blueprint(EntityKind::EnemyProjectile).clone(),
        &mut manifest,
    );
    assert!(matches!(result, Err(AssetError::MissingSound(_))));
}

#[test]
fn narrow_sheet_is_rejected() {
    let config = GameConfig::default();
    let mut manifest = Manifest::builtin();
    let path = format!("{TEXTURE_DIR}/ship.png");
    manifest.register_texture(&path, 16, 96);

    let result = Entity::load(
        "0".to_string(),
        EntityKind::Player,
        config.blueprint(EntityKind::Player).clone(),
        &mut manifest,
    );
    assert!(matches!(
        result,
        Err(AssetError::EmptySheet { frame_width: 32, .. })
    ));
}

#[test]
fn aux_scalars_and_stamps() {
    let mut enemy = common::load(EntityKind::Enemy);
    assert_eq!(enemy.int("missing"), 0);
    assert_eq!(enemy.float("missing"), 0.0);
    assert!(enemy.var("missing").is_none());

    enemy.set_int("count", 7);
    enemy.set_float("speed", 1.5);
    assert_eq!(enemy.int("count"), 7);
    assert_eq!(enemy.float("speed"), 1.5);

    let now = std::time::Instant::now();
    enemy.set_stamp("fire", now);
    assert_eq!(enemy.stamp("fire"), Some(now));
    enemy.clear_stamp("fire");
    assert!(enemy.stamp("fire").is_none());
}

#[test]
fn destroy_and_pin_flags() {
    let mut shot = common::load(EntityKind::PlayerProjectile);
    assert!(!shot.is_pinned());
    shot.pin();
    assert!(shot.is_pinned());
    assert!(shot.is_alive());
    shot.destroy();
    assert!(shot.is_destroyed());
    assert!(!shot.is_alive());
}

#[test]
fn factory_seeds_spawn_params() {
    let mut h = common::Harness::new(common::test_config());
    let handle = h.spawn(
        EntityKind::Enemy,
        SpawnParams::indexed(Vec2::new(240.0, 100.0), 5),
    );
    let enemy = h.entity(handle);
    assert_eq!(enemy.position, Vec2::new(240.0, 100.0));
    assert_eq!(enemy.int(aux::INDEX), 5);
    assert_eq!(enemy.float(aux::SPAWN_X), 240.0);
    assert!(enemy.var(aux::TARGET_X).is_none());
    assert_eq!(enemy.born_tick(), 0);
}

#[test]
fn ids_are_sequential_per_kind() {
    let mut h = common::Harness::new(common::test_config());
    let a = h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(100.0, 100.0)));
    let b = h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(200.0, 100.0)));
    let p = h.spawn(EntityKind::Player, SpawnParams::at(Vec2::new(400.0, 540.0)));
    assert_eq!(h.entity(a).id(), "0");
    assert_eq!(h.entity(b).id(), "1");
    assert_eq!(h.entity(p).id(), "0");
}

#[test]
fn animated_factory_arms_requested_sequence() {
    use space_invader::animation::Action;

    let mut h = common::Harness::new(common::test_config());
    let handle = h
        .stage_mut()
        .create_animated_entity(
            EntityKind::Enemy,
            SpawnParams::at(Vec2::new(100.0, 100.0)),
            Action::new(1).looping(),
        )
        .expect("builtin manifest has every sheet");
    let anim = h.entity(handle).animation();
    assert_eq!(anim.row(), 1);
    assert!(anim.action().looping);
    assert!(anim.is_playing());
}

#[test]
fn remove_by_id_drops_enemy_from_firing_order() {
    let mut h = common::Harness::new(common::test_config());
    h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(100.0, 100.0)));
    h.spawn(EntityKind::Enemy, SpawnParams::at(Vec2::new(200.0, 100.0)));
    h.stage_mut().shuffle_firing_order();

    let removed = h.stage_mut().remove_by_id(EntityKind::Enemy, "1");
    assert_eq!(removed.map(|e| e.position.x), Some(200.0));
    assert_eq!(h.stage().firing_order().collect::<Vec<_>>(), vec!["0"]);
    assert!(h.stage_mut().remove_by_id(EntityKind::Enemy, "1").is_none());
}
