use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use octet_common::App;
use octet_vm::app::FRAME_RATE_HZ;
use octet_vm::EmulatorApp;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct HeadlessOptions {
    /// Stop after this many frames even if the program is still running.
    #[builder(default, setter(strip_option))]
    pub max_frames: Option<u64>,
    /// Pace frames at 60 Hz instead of running flat out.
    #[builder(default = true)]
    pub realtime: bool,
    /// Print the final screen as text.
    #[builder(default = true)]
    pub print_screen: bool,
}

/// Runs an app without a window.
pub struct HeadlessContext;

impl HeadlessContext {
    pub fn run(options: HeadlessOptions, app: &mut EmulatorApp) -> Result<()> {
        let frame = Duration::from_secs(1) / FRAME_RATE_HZ;
        let mut screen_state = vec![0u8; (app.width() * app.height() * 3) as usize];

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
            app.update(&mut screen_state);
            if options.realtime {
                std::thread::sleep(frame.saturating_sub(started.elapsed()));
            }
        }
        app.exit();

        if options.print_screen {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(app.machine.screen().to_text().as_bytes())?;
            stdout.flush()?;
        }
        Ok(())
    }
}
