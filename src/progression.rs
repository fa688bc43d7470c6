//! Session flow: menu, waves, boss, respawn and game over, plus the pause
//! latch that runs alongside it.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Progression {
    Menu,
    NormalWave,
    BossPhase,
    Respawn,
    GameOver,
}

impl Progression {
    /// States in which entities fight.
    pub fn is_gameplay(self) -> bool {
        matches!(self, Progression::NormalWave | Progression::BossPhase)
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Progression::Menu => "menu",
            Progression::NormalWave => "normal wave",
            Progression::BossPhase => "boss phase",
            Progression::Respawn => "respawn",
            Progression::GameOver => "game over",
        })
    }
}

/// Live entity counts taken at the start of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Census {
    pub players: usize,
    pub enemies: usize,
    pub bosses: usize,
    /// Hostiles whose death sequence has not finished yet.
    pub dying: usize,
}

/// Inputs the transition rules read besides the census.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signals {
    /// Fire or confirm held.
    pub start: bool,
    pub confirm: bool,
    /// The respawn intermission has run its course.
    pub respawn_ready: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Stay,
    StartGame,
    SpawnBoss,
    WaveCleared,
    NextWave,
    GameOver,
    Restart,
}

impl Transition {
    /// State entered, if any.
    pub fn target(self) -> Option<Progression> {
        match self {
            Transition::Stay => None,
            Transition::StartGame | Transition::NextWave | Transition::Restart => {
                Some(Progression::NormalWave)
            }
            Transition::SpawnBoss => Some(Progression::BossPhase),
            Transition::WaveCleared => Some(Progression::Respawn),
            Transition::GameOver => Some(Progression::GameOver),
        }
    }
}

/// The transition rules, evaluated once per tick.
pub fn evaluate(state: Progression, census: Census, signals: Signals) -> Transition {
    match state {
        Progression::Menu if signals.start => Transition::StartGame,
        Progression::NormalWave | Progression::BossPhase if census.players == 0 => {
            Transition::GameOver
        }
        Progression::NormalWave if census.enemies == 0 => Transition::SpawnBoss,
        Progression::BossPhase if census.enemies + census.bosses + census.dying == 0 => {
            Transition::WaveCleared
        }
        Progression::Respawn if signals.respawn_ready => Transition::NextWave,
        Progression::GameOver if signals.confirm => Transition::Restart,
        _ => Transition::Stay,
    }
}

// ── Pause ─────────────────────────────────────────────────────────────────────

/// Four-phase debounce for the pause key: 0 running, 1 key down on the way
/// to paused, 2 paused, 3 key down on the way back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PauseLatch {
    phase: u8,
}

impl PauseLatch {
    pub fn phase(self) -> u8 {
        self.phase
    }

    pub fn update(&mut self, pressed: bool) {
        self.phase = match (self.phase, pressed) {
            (0, true) => 1,
            (1, false) => 2,
            (2, true) => 3,
            (3, false) => 0,
            (phase, _) => phase,
        };
    }

    /// Pause engages on the first press and lifts on the second release.
    pub fn is_paused(self) -> bool {
        self.phase != 0
    }

    pub fn force(&mut self) {
        self.phase = 2;
    }

    pub fn reset(&mut self) {
        self.phase = 0;
    }
}
