use anyhow::{Context, Result};
#[cfg(feature = "sdl2")]
use octet_common::App;
use octet_vm::{AppConfig, EmulatorApp, Machine, MachineConfig};

pub mod headless;
#[cfg(feature = "sdl2")]
pub mod sdl;
pub mod terminal;

use headless::{HeadlessContext, HeadlessOptions};
use terminal::{TerminalContext, TerminalOptions};

pub enum Frontend {
    Headless(HeadlessOptions),
    Terminal(TerminalOptions),
    #[cfg(feature = "sdl2")]
    Sdl,
}

/// Build a machine, load `rom_data` and run it on `frontend`.
///
/// Returns the program's exit code, or 0 when the run was cut short.
pub fn run(
    frontend: Frontend,
    machine_config: MachineConfig,
    app_config: AppConfig,
    rom_data: &[u8],
) -> Result<i32> {
    let mut machine = Machine::new(machine_config).context("invalid machine configuration")?;
    machine
        .load_program(rom_data)
        .context("failed to load program")?;
    let mut app = EmulatorApp::new(machine, app_config);

    match frontend {
        Frontend::Headless(options) => HeadlessContext::run(options, &mut app)?,
        Frontend::Terminal(options) => TerminalContext::run(options, &mut app)?,
        #[cfg(feature = "sdl2")]
        Frontend::Sdl => {
            let init_info = sdl::SdlInitInfo::builder()
                .width(app.width())
                .height(app.height())
                .scale(app.scale())
                .title(app.title())
                .build();
            sdl::SdlContext::run(init_info, &mut app)?;
        }
    }

    if let Some(err) = app.error() {
        return Err(anyhow::Error::new(err.clone()).context(format!(
            "program stopped at {:#05X}",
            app.machine.pc()
        )));
    }
    Ok(app.machine.exit_code().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless(frames: u64) -> Frontend {
        Frontend::Headless(
            HeadlessOptions::builder()
                .max_frames(frames)
                .realtime(false)
                .print_screen(false)
                .build(),
        )
    }

    fn seeded() -> MachineConfig {
        MachineConfig::builder().rng_seed(11).build()
    }

    #[test]
    fn halting_program_reports_exit_code() {
        let code = run(headless(10), seeded(), AppConfig::default(), &[0x60, 0x01]).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn vm_errors_become_run_errors() {
        let err = run(headless(10), seeded(), AppConfig::default(), &[0x01, 0x23]).unwrap_err();
        assert!(err.to_string().contains("program stopped at 0x200"));
        assert!(err.downcast_ref::<octet_vm::VmError>().is_some());
    }

    #[test]
    fn oversized_program_is_rejected() {
        let rom = vec![0u8; 8192];
        assert!(run(headless(1), seeded(), AppConfig::default(), &rom).is_err());
    }
}
