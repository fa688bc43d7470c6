//! World/session state.
//!
//! [`Stage`] is the world as behavior functions see it: the entity arena,
//! input, score, sound cues and the factory. [`Session`] wraps it with the
//! progression state machine, the pause latch and the per-tick steps the
//! frame scheduler sequences.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::animation::{is_expired, Action};
use crate::arena::{EntityArena, EntityHandle};
use crate::assets::{AssetLoader, FontHandle, SoundName, FONT_PATH};
use crate::behavior;
use crate::config::GameConfig;
use crate::entities::{Entity, EntityKind, SpawnParams, Vec2};
use crate::error::GameError;
use crate::input::{InputEvent, InputState, Key};
use crate::progression::{self, Census, PauseLatch, Progression, Signals, Transition};
use crate::scheduler::{Drawable, SpriteFrame, TextLine, TextStyle};

// ── Stage ─────────────────────────────────────────────────────────────────────

pub struct Stage {
    config: GameConfig,
    entities: EntityArena,
    input: InputState,
    score: u32,
    high_score: u32,
    cues: Vec<SoundName>,
    assets: Box<dyn AssetLoader>,
    rng: StdRng,
    now: Instant,
    tick: u64,
    firing_order: VecDeque<String>,
    last_volley: Option<Instant>,
    next_ids: HashMap<EntityKind, u64>,
}

impl Stage {
    pub fn new(config: GameConfig, assets: Box<dyn AssetLoader>, now: Instant) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            entities: EntityArena::new(),
            input: InputState::new(),
            score: 0,
            high_score: 0,
            cues: Vec::new(),
            assets,
            rng,
            now,
            tick: 0,
            firing_order: VecDeque::new(),
            last_volley: None,
            next_ids: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn frame_interval(&self) -> Duration {
        self.config.tick_interval
    }

    /// Cooldown gate: `ticks` frame intervals since `stamp`.
    pub fn is_expired(&self, stamp: Instant, ticks: u32) -> bool {
        is_expired(stamp, ticks, self.config.tick_interval, self.now)
    }

    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityArena {
        &mut self.entities
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // ── Score ─────────────────────────────────────────────────────────────────

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// The high score follows the best value ever set.
    pub fn set_score(&mut self, score: u32) {
        self.score = score;
        self.high_score = self.high_score.max(score);
    }

    pub fn add_score(&mut self, points: u32) {
        self.set_score(self.score.saturating_add(points));
    }

    // ── Sound ─────────────────────────────────────────────────────────────────

    pub fn play_sound(&mut self, sound: SoundName) {
        self.cues.push(sound);
    }

    pub fn take_cues(&mut self) -> Vec<SoundName> {
        std::mem::take(&mut self.cues)
    }

    // ── Factory ───────────────────────────────────────────────────────────────

    fn next_id(&mut self, kind: EntityKind) -> String {
        let counter = self.next_ids.entry(kind).or_insert(0);
        let id = counter.to_string();
        *counter += 1;
        id
    }

    /// Builds an entity, runs its startup behavior and stores it. The new
    /// entity gets its first logic call on the next tick.
    pub fn create_entity(
        &mut self,
        kind: EntityKind,
        params: SpawnParams,
    ) -> Result<EntityHandle, GameError> {
        let blueprint = self.config.blueprint(kind).clone();
        let id = self.next_id(kind);
        let mut entity = Entity::load(id, kind, blueprint, self.assets.as_mut())?;
        entity.seed(params, self.tick);
        (behavior::behavior(kind).startup)(&mut entity, self)?;
        debug!("created {} {}", kind, entity.id());
        Ok(self.entities.insert(entity))
    }

    pub fn create_animated_entity(
        &mut self,
        kind: EntityKind,
        params: SpawnParams,
        action: Action,
    ) -> Result<EntityHandle, GameError> {
        let handle = self.create_entity(kind, params)?;
        let now = self.now;
        if let Some(entity) = self.entities.get_mut(handle) {
            entity.create_animated(action, now);
        }
        Ok(handle)
    }

    /// Flags the entity for removal at the end of the sweep.
    pub fn destroy_entity(&mut self, handle: EntityHandle) -> bool {
        match self.entities.get_mut(handle) {
            Some(entity) => {
                entity.destroy();
                true
            }
            None => false,
        }
    }

    /// Removes the entity right away. Not for use on checked-out entities.
    pub fn remove_entity(&mut self, handle: EntityHandle) -> Option<Entity> {
        let entity = self.entities.remove(handle)?;
        self.forget(&entity);
        Some(entity)
    }

    pub fn remove_by_id(&mut self, kind: EntityKind, id: &str) -> Option<Entity> {
        let handle = self.entities.find(kind, id)?;
        self.remove_entity(handle)
    }

    fn forget(&mut self, entity: &Entity) {
        if entity.kind() == EntityKind::Enemy {
            self.firing_order.retain(|id| id != entity.id());
        }
    }

    fn clear_entities(&mut self) {
        self.entities.clear();
        self.firing_order.clear();
        self.last_volley = None;
        self.next_ids.clear();
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Position of the first live player.
    pub fn player_position(&self) -> Option<Vec2> {
        self.entities
            .of_kind(EntityKind::Player)
            .find(|(_, e)| e.is_alive())
            .map(|(_, e)| e.position)
    }

    pub fn census(&self) -> Census {
        Census {
            players: self.entities.live_count(EntityKind::Player),
            enemies: self.entities.live_count(EntityKind::Enemy),
            bosses: self.entities.live_count(EntityKind::Boss),
            dying: self
                .entities
                .iter()
                .filter(|(_, e)| e.kind().is_hostile() && e.is_dying())
                .count(),
        }
    }

    // ── Enemy firing order ────────────────────────────────────────────────────

    /// Shuffles the current enemies into a fresh round-robin firing order.
    pub fn shuffle_firing_order(&mut self) {
        let mut ids: Vec<String> = self
            .entities
            .of_kind(EntityKind::Enemy)
            .map(|(_, e)| e.id().to_string())
            .collect();
        ids.shuffle(&mut self.rng);
        debug!("enemy firing order: {ids:?}");
        self.firing_order = ids.into();
    }

    pub fn firing_order(&self) -> impl Iterator<Item = &str> {
        self.firing_order.iter().map(String::as_str)
    }

    pub fn is_next_shooter(&self, id: &str) -> bool {
        self.firing_order.front().is_some_and(|front| front == id)
    }

    /// Moves the head of the firing order to the back and stamps the volley.
    pub fn rotate_firing_order(&mut self) {
        self.firing_order.rotate_left(1.min(self.firing_order.len()));
        self.last_volley = Some(self.now);
    }

    pub fn volley_ready(&self) -> bool {
        self.last_volley
            .map_or(true, |stamp| self.is_expired(stamp, self.config.enemy_volley_ticks()))
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

pub struct Session {
    stage: Stage,
    progression: Progression,
    pause: PauseLatch,
    wave: u32,
    respawn_since: Option<Instant>,
    font: FontHandle,
    last_frame: Option<Instant>,
}

impl Session {
    pub fn new(
        config: GameConfig,
        mut assets: Box<dyn AssetLoader>,
        now: Instant,
    ) -> Result<Self, GameError> {
        let font = assets.load_font(FONT_PATH)?;
        Ok(Self {
            stage: Stage::new(config, assets, now),
            progression: Progression::Menu,
            pause: PauseLatch::default(),
            wave: 0,
            respawn_since: None,
            font,
            last_frame: None,
        })
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn progression(&self) -> Progression {
        self.progression
    }

    pub fn pause(&self) -> PauseLatch {
        self.pause
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn score(&self) -> u32 {
        self.stage.score()
    }

    pub fn high_score(&self) -> u32 {
        self.stage.high_score()
    }

    pub fn apply_input(&mut self, event: InputEvent) {
        self.stage.input.apply(event);
    }

    pub fn take_cues(&mut self) -> Vec<SoundName> {
        self.stage.take_cues()
    }

    // ── Frame pacing ──────────────────────────────────────────────────────────

    pub fn frame_due(&self, now: Instant) -> bool {
        self.last_frame.map_or(true, |last| {
            now.saturating_duration_since(last) >= self.stage.config.tick_interval
        })
    }

    pub fn next_frame_at(&self) -> Option<Instant> {
        self.last_frame
            .map(|last| last + self.stage.config.tick_interval)
    }

    pub fn mark_frame(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    // ── Tick steps ────────────────────────────────────────────────────────────

    /// Runs one tick without a presentation backend: progression, pause,
    /// logic, animation.
    pub fn tick(&mut self, now: Instant) -> Result<(), GameError> {
        self.begin_tick(now);
        self.check_progression()?;
        if !self.update_pause() {
            self.step_logic()?;
            self.step_animation();
        } else if self.progression == Progression::GameOver {
            self.step_death_sequences();
        }
        Ok(())
    }

    pub fn begin_tick(&mut self, now: Instant) {
        self.stage.now = now;
        self.stage.tick += 1;
    }

    /// Applies at most one progression transition.
    pub fn check_progression(&mut self) -> Result<Transition, GameError> {
        let input = &self.stage.input;
        let signals = Signals {
            start: input.is_pressed(Key::Confirm) || input.is_pressed(Key::Fire),
            confirm: input.is_pressed(Key::Confirm),
            respawn_ready: self.respawn_since.map_or(false, |since| {
                self.stage
                    .is_expired(since, self.stage.config.respawn_delay_ticks)
            }),
        };
        let transition = progression::evaluate(self.progression, self.stage.census(), signals);

        match transition {
            Transition::Stay => return Ok(transition),
            Transition::StartGame | Transition::Restart => self.start_game()?,
            Transition::SpawnBoss => self.spawn_boss()?,
            Transition::WaveCleared => {
                self.stage.play_sound(SoundName::Win);
                self.stage.clear_entities();
                self.respawn_since = Some(self.stage.now);
            }
            Transition::NextWave => {
                self.respawn_since = None;
                self.wave += 1;
                self.spawn_wave()?;
            }
            Transition::GameOver => {
                self.stage.play_sound(SoundName::Lose);
                self.pause.force();
            }
        }

        if let Some(next) = transition.target() {
            info!(
                "{} -> {} (wave {}, score {}, high score {})",
                self.progression,
                next,
                self.wave,
                self.stage.score,
                self.stage.high_score
            );
            self.progression = next;
        }
        Ok(transition)
    }

    /// Feeds the pause key into the latch. Returns whether logic is frozen.
    pub fn update_pause(&mut self) -> bool {
        if self.progression == Progression::GameOver {
            self.pause.force();
        } else {
            self.pause.update(self.stage.input.is_pressed(Key::Pause));
        }
        self.pause.is_paused()
    }

    /// Runs each entity's logic once, then drops everything flagged for
    /// destruction. Entities created during the sweep wait for the next tick.
    pub fn step_logic(&mut self) -> Result<(), GameError> {
        let tick = self.stage.tick;
        for handle in self.stage.entities.handles() {
            let Some(mut entity) = self.stage.entities.checkout(handle) else {
                continue;
            };
            let result = if entity.born_tick() == tick || entity.is_destroyed() {
                Ok(())
            } else {
                (behavior::behavior(entity.kind()).logic)(&mut entity, &mut self.stage)
            };
            self.stage.entities.restore(handle, entity);
            result?;
        }

        self.compact();
        Ok(())
    }

    pub fn step_animation(&mut self) {
        self.advance_animations(|_| true);
    }

    /// Used while a game over freezes logic: only death sequences keep
    /// playing, and what they finish is removed.
    pub fn step_death_sequences(&mut self) {
        self.advance_animations(Entity::is_dying);
        self.compact();
    }

    fn advance_animations(&mut self, select: impl Fn(&Entity) -> bool) {
        let now = self.stage.now;
        for handle in self.stage.entities.handles() {
            let Some(mut entity) = self.stage.entities.checkout(handle) else {
                continue;
            };
            if select(&entity) {
                if let Some(on_complete) = entity.advance_animation(now) {
                    on_complete(&mut entity, &mut self.stage);
                }
            }
            self.stage.entities.restore(handle, entity);
        }
    }

    fn compact(&mut self) {
        for entity in self.stage.entities.compact() {
            debug!("removed {} {}", entity.kind(), entity.id());
            self.stage.forget(&entity);
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    fn start_game(&mut self) -> Result<(), GameError> {
        info!("starting new game");
        self.stage.set_score(0);
        self.stage.clear_entities();
        self.pause.reset();
        self.respawn_since = None;
        self.wave = 1;
        self.spawn_wave()
    }

    /// Player plus the enemy grid, then a fresh firing order.
    pub fn spawn_wave(&mut self) -> Result<(), GameError> {
        let (px, py) = self.stage.config.player_spawn();
        self.stage
            .create_entity(EntityKind::Player, SpawnParams::at(Vec2::new(px, py)))?;

        let grid = self.stage.config.enemy;
        for index in 0..grid.columns * grid.rows {
            let column = index % grid.columns;
            let row = index / grid.columns;
            let position = Vec2::new(
                grid.origin.0 + column as f32 * grid.spacing.0,
                grid.origin.1 + row as f32 * grid.spacing.1,
            );
            self.stage
                .create_entity(EntityKind::Enemy, SpawnParams::indexed(position, index))?;
        }
        self.stage.shuffle_firing_order();
        debug!(
            "wave {} spawned with {} enemies",
            self.wave,
            grid.columns * grid.rows
        );
        Ok(())
    }

    fn spawn_boss(&mut self) -> Result<(), GameError> {
        let (bx, by) = self.stage.config.boss_spawn();
        self.stage
            .create_entity(EntityKind::Boss, SpawnParams::at(Vec2::new(bx, by)))?;
        debug!("boss spawned for wave {}", self.wave);
        Ok(())
    }

    // ── Render list ───────────────────────────────────────────────────────────

    pub fn drawables(&self) -> Vec<Drawable> {
        let mut items: Vec<Drawable> = self
            .stage
            .entities
            .iter()
            .filter(|(_, e)| !e.is_destroyed())
            .map(|(_, e)| {
                Drawable::Sprite(SpriteFrame {
                    kind: e.kind(),
                    texture: e.texture(),
                    position: e.position,
                    size: e.frame_size(),
                    row: e.animation().row(),
                    column: e.animation().column(),
                    variant: e.int(behavior::vars::VARIANT) as u32,
                })
            })
            .collect();

        items.push(Drawable::Text(TextLine {
            font: self.font,
            text: format!(
                "Score {:>4}  Hi {:>4}  Wave {}",
                self.stage.score, self.stage.high_score, self.wave
            ),
            position: Vec2::new(8.0, 8.0),
            style: TextStyle::Hud,
        }));

        if let Some(text) = self.banner() {
            items.push(Drawable::Text(TextLine {
                font: self.font,
                text,
                position: Vec2::new(self.stage.config.width / 2.0, self.stage.config.height / 2.0),
                style: TextStyle::Banner,
            }));
        }
        items
    }

    /// Centered message for the current state, if any.
    pub fn banner(&self) -> Option<String> {
        match self.progression {
            Progression::Menu => Some("PRESS ENTER TO START".to_string()),
            Progression::Respawn => Some(format!("WAVE {} CLEARED", self.wave)),
            Progression::GameOver => Some("GAME OVER - PRESS ENTER".to_string()),
            _ if self.pause.is_paused() => Some("PAUSED".to_string()),
            _ => None,
        }
    }
}
