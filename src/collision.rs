//! Projectile-versus-target resolution.
//!
//! A hit is a circle test: the projectile's center against each live
//! target's center with the target's half-width as radius. Targets are
//! scanned in collection order and only the first match is resolved.

use log::trace;

use crate::animation::Action;
use crate::arena::EntityHandle;
use crate::assets::SoundName;
use crate::behavior::death_action;
use crate::entities::{Entity, EntityKind, Vec2};
use crate::session::Stage;

pub fn overlaps(point: Vec2, target: &Entity) -> bool {
    let radius = target.hit_radius();
    (point - target.position).length_squared() <= radius * radius
}

/// Tests `projectile` against live entities of `targets` and resolves the
/// first hit. A pinned projectile is already playing its impact and never
/// scores again. Returns the handle of the entity that was hit.
pub fn resolve_collision(
    projectile: &mut Entity,
    stage: &mut Stage,
    targets: &[EntityKind],
    impact: Option<SoundName>,
    impact_row: u32,
) -> Option<EntityHandle> {
    if projectile.is_pinned() {
        return None;
    }
    let center = projectile.position;
    let hit = stage
        .entities()
        .iter()
        .find(|(_, target)| {
            targets.contains(&target.kind()) && target.is_alive() && overlaps(center, target)
        })
        .map(|(handle, _)| handle)?;

    let now = stage.now();
    let target = stage.entities_mut().get_mut(hit)?;
    let remaining = target.hit_points().saturating_sub(1);
    target.set_hit_points(remaining);
    if remaining == 0 {
        let action = death_action(target);
        target.create_animated(action, now);
    }
    let kind = target.kind();
    trace!(
        "{} {} hit {} {} ({} hp left)",
        projectile.kind(),
        projectile.id(),
        kind,
        target.id(),
        remaining
    );

    projectile.pin();
    projectile.create_animated(Action::new(impact_row).destroy_on_finish(), now);
    if let Some(sound) = impact {
        stage.play_sound(sound);
    }
    if remaining == 0 && kind == EntityKind::Enemy {
        stage.add_score(1);
    }
    Some(hit)
}
