use octet_common::{App, Color, Key};
use typed_builder::TypedBuilder;

use crate::error::{Result, VmError};
use crate::machine::Machine;
use crate::{SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};

/// Timer and frame rate.
pub const FRAME_RATE_HZ: u32 = 60;

/// Host-side scheduling options.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct AppConfig {
    #[builder(default = 500)]
    pub instructions_per_second: u32,
    #[builder(default = false)]
    pub sound: bool,
    /// Log every instruction with the machine state.
    #[builder(default = false)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Audio hook, called once per 60 Hz tick while the sound timer runs.
pub trait Beeper {
    fn beep(&mut self);
}

/// Beeper that only records and logs ticks; there is no synthesis.
#[derive(Debug, Default)]
pub struct LogBeeper {
    pub ticks: u64,
}

impl Beeper for LogBeeper {
    fn beep(&mut self) {
        self.ticks += 1;
        log::trace!("beep ({} ticks)", self.ticks);
    }
}

/// Drives a [`Machine`] one 60 Hz frame at a time for a frontend.
pub struct EmulatorApp {
    should_exit: bool,
    pub machine: Machine,
    config: AppConfig,
    beeper: Box<dyn Beeper>,
    error: Option<VmError>,
    frames: u64,
    lit: Color,
    unlit: Color,
}

impl EmulatorApp {
    pub fn new(machine: Machine, config: AppConfig) -> Self {
        Self {
            should_exit: false,
            machine,
            config,
            beeper: Box::<LogBeeper>::default(),
            error: None,
            frames: 0,
            lit: Color::PHOSPHOR,
            unlit: Color::BLACK,
        }
    }

    pub fn with_beeper(mut self, beeper: Box<dyn Beeper>) -> Self {
        self.beeper = beeper;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cycles_per_frame(&self) -> u32 {
        (self.config.instructions_per_second / FRAME_RATE_HZ).max(1)
    }

    /// The error that stopped the run, if any.
    pub fn error(&self) -> Option<&VmError> {
        self.error.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Execute one frame's worth of instructions, then tick the timers.
    pub fn run_frame(&mut self) -> Result<()> {
        for _ in 0..self.cycles_per_frame() {
            if self.machine.exit_code().is_some() {
                break;
            }
            if self.config.debug {
                self.trace_next()?;
            }
            self.machine.step()?;
        }

        if self.machine.decrement_timers() && self.config.sound {
            self.beeper.beep();
        }
        self.frames += 1;
        Ok(())
    }

    fn trace_next(&mut self) -> Result<()> {
        let pc = self.machine.pc();
        if let Some(instruction) = self.machine.peek_instruction()? {
            log::info!("{:03X}  {:<16} {}", pc, instruction.to_string(), self.machine.snapshot());
        }
        Ok(())
    }

    /// Render the screen into an RGB24 buffer.
    pub fn render(&self, screen_state: &mut [u8]) {
        for (idx, &pixel) in self.machine.screen().pixels().iter().enumerate() {
            let color = if pixel { self.lit } else { self.unlit };
            color.write_rgb24(screen_state, idx);
        }
    }
}

impl App for EmulatorApp {
    fn init(&mut self) {
        log::info!(
            "Octet init, {} instructions/s ({} per frame)",
            self.config.instructions_per_second,
            self.cycles_per_frame()
        );
    }

    fn update(&mut self, screen_state: &mut [u8]) {
        if self.should_exit() {
            return;
        }
        if let Err(err) = self.run_frame() {
            log::error!("machine stopped at {:#05X}: {}", self.machine.pc(), err);
            self.error = Some(err);
            self.should_exit = true;
        }
        if self.machine.screen_mut().take_dirty() {
            self.render(screen_state);
        }
    }

    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        log::debug!("key event: {:?} pressed={}", key, is_down);
        if key == Key::Escape && is_down {
            self.should_exit = true;
            return;
        }
        if let Some(hex) = key.to_keypad() {
            let result = if is_down {
                self.machine.key_down(hex)
            } else {
                self.machine.key_up(hex)
            };
            if let Err(err) = result {
                log::warn!("{}", err);
            }
        }
    }

    fn should_exit(&self) -> bool {
        self.should_exit || self.machine.exit_code().is_some()
    }

    fn exit(&mut self) {
        log::info!("Octet exit after {} frames", self.frames);
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        SCREEN_SCALE
    }

    fn title(&self) -> String {
        "Octet CHIP-8".to_string()
    }
}
