use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use octet_common::{App, Key};
use octet_vm::app::FRAME_RATE_HZ;
use octet_vm::EmulatorApp;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct TerminalOptions {
    /// Stop after this many frames even if the program is still running.
    #[builder(default, setter(strip_option))]
    pub max_frames: Option<u64>,
    /// Frames a key stays down after a press. Most terminals never report
    /// releases, so presses are let go on this timer instead.
    #[builder(default = 6)]
    pub hold_frames: u32,
    #[builder(default = true)]
    pub realtime: bool,
}

/// A key report read from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Press(Key),
    Release(Key),
}

/// Source of key reports, polled once per frame.
pub trait KeySource {
    /// Drain everything reported since the last call without blocking.
    fn poll_keys(&mut self) -> Result<Vec<KeyInput>>;
}

/// Reads keys from the controlling terminal.
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn poll_keys(&mut self) -> Result<Vec<KeyInput>> {
        let mut keys = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                keys.extend(map_key_event(key));
            }
        }
        Ok(keys)
    }
}

/// Raw mode swallows Ctrl-C, so it is treated like Escape.
pub fn map_key_event(event: KeyEvent) -> Option<KeyInput> {
    let key = match event.code {
        KeyCode::Esc => Key::Escape,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Key::Escape,
        KeyCode::Char(c) => Key::from_char(c),
        _ => return None,
    };
    if key == Key::None {
        return None;
    }
    match event.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => Some(KeyInput::Press(key)),
        KeyEventKind::Release => Some(KeyInput::Release(key)),
    }
}

/// Keys currently held down and the frames left before they are released.
struct HeldKeys {
    hold_frames: u32,
    held: Vec<(Key, u32)>,
}

impl HeldKeys {
    fn new(hold_frames: u32) -> Self {
        Self {
            hold_frames: hold_frames.max(1),
            held: Vec::new(),
        }
    }

    fn apply(&mut self, input: KeyInput, app: &mut EmulatorApp) {
        match input {
            KeyInput::Press(key) => {
                if key.to_keypad().is_some() {
                    self.held.retain(|&(held, _)| held != key);
                    self.held.push((key, self.hold_frames));
                }
                app.handle_key_event(key, true);
            }
            KeyInput::Release(key) => {
                self.held.retain(|&(held, _)| held != key);
                app.handle_key_event(key, false);
            }
        }
    }

    fn tick(&mut self, app: &mut EmulatorApp) {
        let mut idx = 0;
        while idx < self.held.len() {
            self.held[idx].1 -= 1;
            if self.held[idx].1 == 0 {
                let (key, _) = self.held.swap_remove(idx);
                app.handle_key_event(key, false);
            } else {
                idx += 1;
            }
        }
    }
}

/// Puts the terminal in raw mode on an alternate screen until dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        crossterm::terminal::enable_raw_mode()
            .context("terminal frontend needs a TTY, try --headless")?;
        let mut out = io::stdout();
        crossterm::execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = crossterm::execute!(out, Show, LeaveAlternateScreen);
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

/// Runs an app in the terminal: keys from the keyboard, screen as text.
pub struct TerminalContext;

impl TerminalContext {
    pub fn run(options: TerminalOptions, app: &mut EmulatorApp) -> Result<()> {
        let _guard = TerminalGuard::enter()?;
        let mut out = io::stdout();
        Self::run_with(options, app, &mut CrosstermKeys, &mut out)
    }

    pub fn run_with<W: Write>(
        options: TerminalOptions,
        app: &mut EmulatorApp,
        keys: &mut dyn KeySource,
        out: &mut W,
    ) -> Result<()> {
        let frame = Duration::from_secs(1) / FRAME_RATE_HZ;
        let mut screen_state = vec![0u8; (app.width() * app.height() * 3) as usize];
        let mut held = HeldKeys::new(options.hold_frames);
        let mut shown = String::new();

        app.init();
        loop {
            if app.should_exit() {
                break;
            }
            if options.max_frames.is_some_and(|max| app.frames() >= max) {
                log::info!("frame limit reached");
                break;
            }
            let started = Instant::now();
            for input in keys.poll_keys()? {
                held.apply(input, app);
            }
            app.update(&mut screen_state);
            held.tick(app);

            let text = app.machine.screen().to_text();
            if text != shown {
                draw(out, &text)?;
                shown = text;
            }
            if options.realtime {
                std::thread::sleep(frame.saturating_sub(started.elapsed()));
            }
        }
        app.exit();
        Ok(())
    }
}

/// Raw mode does not return the carriage on newline, so every row is
/// placed explicitly.
fn draw<W: Write>(out: &mut W, text: &str) -> Result<()> {
    for (row, line) in text.lines().enumerate() {
        crossterm::queue!(out, MoveTo(0, row as u16), Print(line))?;
    }
    out.flush()?;
    Ok(())
}
