mod common;

use std::time::{Duration, Instant};

use space_invader::animation::{is_expired, Action, AnimatedAction, Timer};
use space_invader::EntityKind;

const FRAME_TIME: Duration = Duration::from_millis(166);
const FRAMES: u32 = 4;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ── AnimatedAction ────────────────────────────────────────────────────────────

#[test]
fn arm_starts_at_first_column() {
    let t0 = Instant::now();
    let mut anim = AnimatedAction::default();
    anim.arm(Action::new(1).looping(), FRAMES, t0);
    assert!(anim.is_playing());
    assert_eq!(anim.row(), 1);
    assert_eq!(anim.column(), 0);
}

#[test]
fn column_waits_for_frame_period() {
    let t0 = Instant::now();
    let mut anim = AnimatedAction::default();
    anim.arm(Action::new(0).looping(), FRAMES, t0);

    // 166ms / 4 frames = 41.5ms per column
    assert!(anim.advance(t0 + ms(40), FRAME_TIME, FRAMES).is_none());
    assert_eq!(anim.column(), 0);
    anim.advance(t0 + ms(42), FRAME_TIME, FRAMES);
    assert_eq!(anim.column(), 1);
}

#[test]
fn looping_action_wraps_without_finishing() {
    let t0 = Instant::now();
    let mut anim = AnimatedAction::default();
    anim.arm(Action::new(0).looping(), FRAMES, t0);

    let mut columns = Vec::new();
    for i in 1..=5 {
        assert!(anim.advance(t0 + ms(42 * i), FRAME_TIME, FRAMES).is_none());
        columns.push(anim.column());
    }
    assert_eq!(columns, vec![1, 2, 3, 0, 1]);
    assert!(anim.is_playing());
}

#[test]
fn one_shot_action_stops_after_one_pass() {
    let t0 = Instant::now();
    let mut anim = AnimatedAction::default();
    anim.arm(Action::new(1), FRAMES, t0);

    for i in 1..=3 {
        assert!(anim.advance(t0 + ms(42 * i), FRAME_TIME, FRAMES).is_none());
    }
    let finished = anim.advance(t0 + ms(42 * 4), FRAME_TIME, FRAMES);
    let finished = finished.expect("pass completes on the wrap");
    assert!(!finished.destroy);
    assert!(!anim.is_playing());
    assert_eq!(anim.column(), 0);

    // Stopped: no further steps
    assert!(anim.advance(t0 + ms(42 * 6), FRAME_TIME, FRAMES).is_none());
    assert_eq!(anim.column(), 0);
}

#[test]
fn rollback_resumes_looping_on_fallback_row() {
    let t0 = Instant::now();
    let mut anim = AnimatedAction::default();
    anim.arm(Action::new(1).rollback_to(0), FRAMES, t0);

    for i in 1..=4 {
        anim.advance(t0 + ms(42 * i), FRAME_TIME, FRAMES);
    }
    assert!(anim.is_playing());
    assert_eq!(anim.row(), 0);
    assert!(anim.action().looping);
}

#[test]
fn rearming_replaces_running_sequence() {
    let t0 = Instant::now();
    let mut anim = AnimatedAction::default();
    anim.arm(Action::new(0).looping(), FRAMES, t0);
    anim.advance(t0 + ms(42), FRAME_TIME, FRAMES);
    anim.advance(t0 + ms(84), FRAME_TIME, FRAMES);
    assert_eq!(anim.column(), 2);

    anim.arm(Action::new(2).destroy_on_finish(), FRAMES, t0 + ms(90));
    assert_eq!(anim.row(), 2);
    assert_eq!(anim.column(), 0);
    assert!(!anim.action().looping);
}

#[test]
fn stop_freezes_animation() {
    let t0 = Instant::now();
    let mut anim = AnimatedAction::default();
    anim.arm(Action::new(0).looping(), FRAMES, t0);
    anim.stop();
    assert!(!anim.is_playing());
    assert!(anim.advance(t0 + ms(500), FRAME_TIME, FRAMES).is_none());
    assert_eq!(anim.column(), 0);
}

// ── Entity animation ──────────────────────────────────────────────────────────

#[test]
fn destroy_on_finish_flags_entity() {
    let t0 = Instant::now();
    let mut enemy = common::load(EntityKind::Enemy);
    enemy.create_animated(Action::new(enemy.death_row()).destroy_on_finish(), t0);

    for i in 1..=3 {
        assert!(enemy.advance_animation(t0 + ms(42 * i)).is_none());
        assert!(!enemy.is_destroyed());
    }
    // No completion hook, but the destroy flag is raised
    assert!(enemy.advance_animation(t0 + ms(42 * 4)).is_none());
    assert!(enemy.is_destroyed());
    assert!(!enemy.is_alive());
}

#[test]
fn finished_pass_without_destroy_keeps_entity() {
    let t0 = Instant::now();
    let mut enemy = common::load(EntityKind::Enemy);
    enemy.create_animated(Action::new(0), t0);
    for i in 1..=6 {
        enemy.advance_animation(t0 + ms(42 * i));
    }
    assert!(!enemy.is_destroyed());
    assert!(!enemy.animation().is_playing());
}

// ── Timers ────────────────────────────────────────────────────────────────────

#[test]
fn one_shot_timer_fires_at_period() {
    let t0 = Instant::now();
    let mut timer = Timer::new(ms(100), false, t0);
    assert!(!timer.check(t0 + ms(99)));
    assert!(timer.check(t0 + ms(100)));
}

#[test]
fn continuous_timer_reanchors_to_now() {
    let t0 = Instant::now();
    let mut timer = Timer::new(ms(100), true, t0);
    // Late check at 150ms: next deadline is 250ms, not 200ms
    assert!(timer.check(t0 + ms(150)));
    assert!(!timer.check(t0 + ms(200)));
    assert!(!timer.check(t0 + ms(249)));
    assert!(timer.check(t0 + ms(250)));
}

#[test]
fn entity_one_shot_timer_disarms_after_firing() {
    let t0 = Instant::now();
    let mut enemy = common::load(EntityKind::Enemy);
    enemy.set_timer(ms(50), false, t0);
    assert!(enemy.has_timer());
    assert!(!enemy.timer_elapsed(t0 + ms(10)));
    assert!(enemy.timer_elapsed(t0 + ms(50)));
    assert!(!enemy.has_timer());
    assert!(!enemy.timer_elapsed(t0 + ms(500)));
}

#[test]
fn entity_continuous_timer_keeps_firing() {
    let t0 = Instant::now();
    let mut enemy = common::load(EntityKind::Enemy);
    enemy.set_timer(ms(50), true, t0);
    assert!(enemy.timer_elapsed(t0 + ms(50)));
    assert!(enemy.timer_elapsed(t0 + ms(100)));
    assert!(enemy.has_timer());
}

#[test]
fn zero_duration_cancels_timer() {
    let t0 = Instant::now();
    let mut enemy = common::load(EntityKind::Enemy);
    enemy.set_timer(ms(50), true, t0);
    enemy.set_timer(Duration::ZERO, true, t0);
    assert!(!enemy.has_timer());
    assert!(!enemy.timer_elapsed(t0 + ms(100)));
}

// ── Cooldown gate ─────────────────────────────────────────────────────────────

#[test]
fn is_expired_counts_whole_ticks() {
    let t0 = Instant::now();
    let interval = ms(10);
    assert!(!is_expired(t0, 3, interval, t0 + ms(29)));
    assert!(is_expired(t0, 3, interval, t0 + ms(30)));
    assert!(is_expired(t0, 0, interval, t0));
}
