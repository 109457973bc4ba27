use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use octet::headless::HeadlessOptions;
use octet::terminal::TerminalOptions;
use octet::Frontend;
use octet_vm::{AppConfig, BcdEncoding, MachineConfig, ShiftSource};

/// A CHIP-8 interpreter.
///
/// Keypad layout:
///
///   CHIP-8      keyboard
///   1 2 3 C     1 2 3 4
///   4 5 6 D     Q W E R
///   7 8 9 E     A S D F
///   A 0 B F     Z X C V
#[derive(Parser, Debug)]
#[command(version, about, verbatim_doc_comment)]
struct Args {
    /// File with the CHIP-8 program
    program: PathBuf,

    /// Enable sound
    #[arg(short, long)]
    sound: bool,

    /// Log every instruction with the machine state
    #[arg(short, long)]
    debug: bool,

    /// Make FX55/FX65 advance I like the COSMAC VIP
    #[arg(short, long)]
    compatibility: bool,

    /// Instructions executed per second
    #[arg(short, long, default_value_t = 500)]
    frequency: u32,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Run without input or a live screen, printing the final screen
    #[arg(long, conflicts_with = "terminal")]
    headless: bool,

    /// Play in the terminal even when SDL2 support is built in
    #[arg(long)]
    #[cfg_attr(not(feature = "sdl2"), allow(dead_code))]
    terminal: bool,

    /// Store raw decimal digits with FX33 instead of font addresses
    #[arg(long)]
    raw_bcd: bool,

    /// Shift VY into VX with 8XY6/8XYE instead of shifting VX in place
    #[arg(long)]
    shift_vy: bool,
}

impl Args {
    fn frontend(&self) -> Frontend {
        if self.headless {
            let mut options = HeadlessOptions::builder().build();
            options.max_frames = self.frames;
            return Frontend::Headless(options);
        }
        #[cfg(feature = "sdl2")]
        if !self.terminal {
            return Frontend::Sdl;
        }
        let mut options = TerminalOptions::builder().build();
        options.max_frames = self.frames;
        Frontend::Terminal(options)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    log::info!("Playing program: '{}'", args.program.display());
    let rom = std::fs::read(&args.program)
        .with_context(|| format!("failed to read {}", args.program.display()))?;

    let machine_config = MachineConfig::builder()
        .compatibility_load_store(args.compatibility)
        .bcd_encoding(if args.raw_bcd {
            BcdEncoding::RawDigits
        } else {
            BcdEncoding::FontAddress
        })
        .shift_source(if args.shift_vy {
            ShiftSource::Vy
        } else {
            ShiftSource::Vx
        })
        .build();
    let app_config = AppConfig::builder()
        .instructions_per_second(args.frequency)
        .sound(args.sound)
        .debug(args.debug)
        .build();

    let code = octet::run(args.frontend(), machine_config, app_config, &rom)?;
    std::process::exit(code);
}
