//! Fixed-cadence frame loop and the collaborator traits it drives.
//!
//! Each frame runs, in order: progression check, surface clear, input
//! capture, pause check, logic step, animation step, render, present. Sound
//! cues raised during the frame go to the audio sink after present.

use std::time::Instant;

use log::{info, warn};

use crate::assets::{FontHandle, SoundName, TextureHandle};
use crate::entities::{EntityKind, Vec2};
use crate::error::GameError;
use crate::input::InputEvent;
use crate::progression::{Progression, Transition};
use crate::session::Session;

// ── Render list ───────────────────────────────────────────────────────────────

/// One sheet cell to blit, centered on `position`.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteFrame {
    pub kind: EntityKind,
    pub texture: TextureHandle,
    pub position: Vec2,
    pub size: Vec2,
    pub row: u32,
    pub column: u32,
    /// Recolor variant (enemies only; 0 otherwise).
    pub variant: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStyle {
    Hud,
    /// Centered on `position`.
    Banner,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub font: FontHandle,
    pub text: String,
    pub position: Vec2,
    pub style: TextStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    Sprite(SpriteFrame),
    Text(TextLine),
}

// ── Collaborators ─────────────────────────────────────────────────────────────

pub trait Surface {
    fn clear(&mut self) -> Result<(), GameError>;
    fn draw(&mut self, item: &Drawable) -> Result<(), GameError>;
    fn display(&mut self) -> Result<(), GameError>;
}

pub trait InputSource {
    /// Appends every event received since the last poll. Never blocks.
    fn poll(&mut self, events: &mut Vec<InputEvent>);
}

pub trait AudioSink {
    fn play(&mut self, sound: SoundName);
}

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep_until(&self, deadline: Instant);
}

/// Monotonic wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub transition: Transition,
    pub progression: Progression,
    pub paused: bool,
    pub drawn: usize,
}

pub struct FrameScheduler<S, I, A> {
    surface: S,
    input: I,
    audio: A,
    events: Vec<InputEvent>,
    closed: bool,
}

impl<S: Surface, I: InputSource, A: AudioSink> FrameScheduler<S, I, A> {
    pub fn new(surface: S, input: I, audio: A) -> Self {
        Self {
            surface,
            input,
            audio,
            events: Vec::new(),
            closed: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Runs frames on tick boundaries until the input source reports a
    /// close. Returns the number of frames run.
    pub fn run<C: Clock>(&mut self, session: &mut Session, clock: &C) -> Result<u64, GameError> {
        let budget = session.stage().frame_interval();
        let mut frames = 0;
        while !self.closed {
            let now = clock.now();
            if !session.frame_due(now) {
                if let Some(deadline) = session.next_frame_at() {
                    clock.sleep_until(deadline);
                }
                continue;
            }
            session.mark_frame(now);
            self.run_frame(session, now)?;
            frames += 1;

            let spent = clock.now().saturating_duration_since(now);
            if spent > budget {
                warn!("frame {frames} overran its budget: {spent:?} > {budget:?}");
            }
        }
        info!("window closed after {frames} frames");
        Ok(frames)
    }

    /// Exactly one tick.
    pub fn run_frame(&mut self, session: &mut Session, now: Instant) -> Result<FrameReport, GameError> {
        session.begin_tick(now);
        let transition = session.check_progression()?;

        self.surface.clear()?;
        self.capture_input(session);

        let paused = session.update_pause();
        if !paused {
            session.step_logic()?;
            session.step_animation();
        } else if session.progression() == Progression::GameOver {
            session.step_death_sequences();
        }

        let items = session.drawables();
        for item in &items {
            self.surface.draw(item)?;
        }
        self.surface.display()?;

        for cue in session.take_cues() {
            self.audio.play(cue);
        }

        Ok(FrameReport {
            transition,
            progression: session.progression(),
            paused,
            drawn: items.len(),
        })
    }

    fn capture_input(&mut self, session: &mut Session) {
        self.events.clear();
        self.input.poll(&mut self.events);
        for event in self.events.drain(..) {
            match event {
                InputEvent::Closed => self.closed = true,
                other => session.apply_input(other),
            }
        }
    }
}
