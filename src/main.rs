mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{debug, error, info};

use space_invader::assets::{Manifest, SoundName};
use space_invader::input::{InputEvent, Key};
use space_invader::scheduler::{AudioSink, InputSource, SystemClock};
use space_invader::{logging, FrameScheduler, GameConfig, GameError, Session, Vec2};

use display::TerminalSurface;

/// A key counts as held if its last press/repeat event arrived within this
/// many frames. Covers terminals that never report key releases: the OS
/// key-repeat keeps refreshing a held key well inside the window.
const HOLD_WINDOW: u64 = 4;

// ── Keyboard ──────────────────────────────────────────────────────────────────

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Char(' ') => Some(Key::Fire),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Key::Pause),
        KeyCode::Enter => Some(Key::Confirm),
        _ => None,
    }
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Turns raw terminal events into debounced press/release events.
///
/// Keyboard-enhancement terminals (kitty protocol) report releases directly.
/// Elsewhere only presses arrive, repeated by the OS while the key is down,
/// so a key is released once it has been silent for `HOLD_WINDOW` frames.
struct KeyboardInput {
    rx: mpsc::Receiver<Event>,
    key_frame: HashMap<Key, u64>,
    frame: u64,
}

impl KeyboardInput {
    fn new(rx: mpsc::Receiver<Event>) -> Self {
        Self {
            rx,
            key_frame: HashMap::new(),
            frame: 0,
        }
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self, events: &mut Vec<InputEvent>) {
        self.frame += 1;

        // Drain all pending input events (non-blocking)
        while let Ok(event) = self.rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            else {
                continue;
            };
            if kind == KeyEventKind::Press && is_quit(code, modifiers) {
                events.push(InputEvent::Closed);
                continue;
            }
            let Some(key) = map_key(code) else {
                continue;
            };
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if self.key_frame.insert(key, self.frame).is_none() {
                        events.push(InputEvent::Pressed(key));
                    }
                }
                KeyEventKind::Release => {
                    if self.key_frame.remove(&key).is_some() {
                        events.push(InputEvent::Released(key));
                    }
                }
            }
        }

        // Expire keys that stopped repeating
        let frame = self.frame;
        let stale: Vec<Key> = self
            .key_frame
            .iter()
            .filter(|&(_, &last)| frame.saturating_sub(last) > HOLD_WINDOW)
            .map(|(&key, _)| key)
            .collect();
        for key in stale {
            self.key_frame.remove(&key);
            events.push(InputEvent::Released(key));
        }
    }
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// The terminal has no mixer; cues are logged and losing rings the bell.
struct TerminalAudio;

impl AudioSink for TerminalAudio {
    fn play(&mut self, sound: SoundName) {
        debug!("sound cue {sound}");
        if sound == SoundName::Lose {
            print!("\x07");
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn log_path() -> PathBuf {
    std::env::var_os("SPACE_INVADER_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("space_invader.log"))
}

fn main() -> Result<(), GameError> {
    let verbose = std::env::var_os("SPACE_INVADER_VERBOSE").is_some();
    logging::init_to_file(verbose, &log_path())?;

    let config = GameConfig::from_env();
    let world = Vec2::new(config.width, config.height);
    let mut session = Session::new(config, Box::new(Manifest::builtin()), Instant::now())?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking event reads live on their own thread and reach the tick
    // thread only through the channel.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    info!("starting, keyboard enhancement: {keyboard_enhanced}");
    let result = TerminalSurface::new(BufWriter::new(stdout()), world)
        .map_err(GameError::from)
        .and_then(|surface| {
            let mut scheduler =
                FrameScheduler::new(surface, KeyboardInput::new(rx), TerminalAudio);
            scheduler.run(&mut session, &SystemClock)
        });

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    match result {
        Ok(frames) => {
            info!(
                "session ended after {frames} frames, high score {}",
                session.high_score()
            );
            Ok(())
        }
        Err(err) => {
            error!("session aborted: {err}");
            Err(err)
        }
    }
}
