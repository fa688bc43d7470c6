#![allow(dead_code)]

use std::time::Instant;

use space_invader::assets::Manifest;
use space_invader::input::{InputEvent, Key};
use space_invader::{Entity, EntityHandle, EntityKind, GameConfig, Session, SpawnParams, Stage};

/// Defaults with a fixed seed, a frozen enemy grid that never shoots and a
/// short respawn intermission.
pub fn test_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.seed = Some(42);
    config.enemy.speed = 0.0;
    config.enemy.fire_chance = 0.0;
    config.respawn_delay_ticks = 3;
    config
}

pub fn load(kind: EntityKind) -> Entity {
    let config = GameConfig::default();
    let mut manifest = Manifest::builtin();
    Entity::load(
        "0".to_string(),
        kind,
        config.blueprint(kind).clone(),
        &mut manifest,
    )
    .expect("builtin manifest has every sheet")
}

/// A session on a synthetic clock: tick `n` happens at `base + n * interval`.
pub struct Harness {
    pub session: Session,
    base: Instant,
    ticks: u32,
}

impl Harness {
    pub fn new(config: GameConfig) -> Self {
        space_invader::logging::init(false);
        let base = Instant::now();
        let session = Session::new(config, Box::new(Manifest::builtin()), base)
            .expect("builtin manifest has the font");
        Self {
            session,
            base,
            ticks: 0,
        }
    }

    pub fn at(&self, tick: u32) -> Instant {
        self.base + self.session.stage().frame_interval() * tick
    }

    pub fn now(&self) -> Instant {
        self.at(self.ticks)
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Logic and animation only; progression is left alone.
    pub fn step(&mut self) {
        self.ticks += 1;
        let now = self.at(self.ticks);
        self.session.begin_tick(now);
        self.session.step_logic().expect("logic step");
        self.session.step_animation();
    }

    pub fn steps(&mut self, n: u32) {
        for _ in 0..n {
            self.step();
        }
    }

    /// A full headless tick, progression and pause included.
    pub fn tick(&mut self) {
        self.ticks += 1;
        let now = self.at(self.ticks);
        self.session.tick(now).expect("tick");
    }

    pub fn tick_n(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Presses confirm on the menu and lets the first wave spawn.
    pub fn start(&mut self) {
        self.press(Key::Confirm);
        self.tick();
        self.release(Key::Confirm);
    }

    pub fn stage(&self) -> &Stage {
        self.session.stage()
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        self.session.stage_mut()
    }

    pub fn spawn(&mut self, kind: EntityKind, params: SpawnParams) -> EntityHandle {
        self.stage_mut()
            .create_entity(kind, params)
            .expect("builtin manifest has every sheet")
    }

    pub fn entity(&self, handle: EntityHandle) -> &Entity {
        self.stage().entities().get(handle).expect("entity is stored")
    }

    pub fn entity_mut(&mut self, handle: EntityHandle) -> &mut Entity {
        self.stage_mut()
            .entities_mut()
            .get_mut(handle)
            .expect("entity is stored")
    }

    pub fn press(&mut self, key: Key) {
        self.session.apply_input(InputEvent::Pressed(key));
    }

    pub fn release(&mut self, key: Key) {
        self.session.apply_input(InputEvent::Released(key));
    }

    /// Stored entities of `kind`, destroyed or not.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.stage().entities().of_kind(kind).count()
    }

    pub fn first(&self, kind: EntityKind) -> Option<&Entity> {
        self.stage().entities().of_kind(kind).map(|(_, e)| e).next()
    }

    /// Marks every entity of `kind` for removal.
    pub fn destroy_all(&mut self, kind: EntityKind) {
        for (_, entity) in self.stage_mut().entities_mut().iter_mut() {
            if entity.kind() == kind {
                entity.destroy();
            }
        }
    }
}
