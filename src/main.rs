//! ccdbg - In-circuit debug tool for ChipCon-style targets
//!
//! Thin CLI over the `ccdbg-core` driver. Each invocation opens the
//! lines, enters debug mode, runs one operation and detaches, leaving the
//! target running (except `halt`, which stays out of the way so the
//! target remains halted in debug mode).

mod cli;

use clap::Parser;
use cli::{Cli, Commands};

use ccdbg_core::{Debugger, LineController};
use ccdbg_dummy::DummyTarget;
use ccdbg_linux_gpio::{GpioLines, GpioLinesConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let lines: Box<dyn LineController> = if cli.device == "dummy" {
        log::info!("using emulated target");
        Box::new(DummyTarget::new_default())
    } else {
        let mut config = GpioLinesConfig::new(cli.device.clone());
        if let Some(rst) = cli.rst {
            config = config.with_rst(rst);
        }
        if let Some(dc) = cli.dc {
            config = config.with_dc(dc);
        }
        if let Some(dd) = cli.dd {
            config = config.with_dd(dd);
        }
        Box::new(GpioLines::open(&config)?)
    };

    let mut dbg = Debugger::new(lines);
    dbg.enter()?;

    let result = run_command(&mut dbg, &cli.command);

    // Detach and let the target run, unless the point was to stop it
    if !matches!(cli.command, Commands::Halt) {
        dbg.set_active(false);
    }

    result
}

fn run_command(
    dbg: &mut Debugger<Box<dyn LineController>>,
    command: &Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Id => println!("chip ID: {:04x}", dbg.chip_id()?),
        Commands::Pc => println!("PC: {:04x}", dbg.pc()?),
        Commands::Status => println!("status: {:02x}", dbg.read_status()?),
        Commands::Halt => {
            dbg.halt()?;
            println!("halted at {:04x}", dbg.pc()?);
        }
        Commands::Resume => {
            dbg.resume()?;
            println!("resumed");
        }
        Commands::Step => {
            dbg.step()?;
            println!("stepped to {:04x}", dbg.pc()?);
        }
        Commands::Config { value } => match value {
            Some(v) => println!("config: {:02x}", dbg.write_config(*v)?),
            None => println!("config: {:02x}", dbg.read_config()?),
        },
        Commands::Exec { bytes } => {
            let acc = match bytes.as_slice() {
                [a] => dbg.exec(*a)?,
                [a, b] => dbg.exec2(*a, *b)?,
                [a, b, c] => dbg.exec3(*a, *b, *c)?,
                _ => unreachable!(), // clap enforces 1..=3 bytes
            };
            println!("accumulator: {:02x}", acc);
        }
        Commands::Erase => {
            log::warn!("mass-erasing flash, configuration and lock bits");
            println!("status: {:02x}", dbg.chip_erase()?);
        }
    }
    Ok(())
}
