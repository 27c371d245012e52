use std::process;
use std::time::Instant;

use structopt::StructOpt;

use chip_os::config::{populate_disk, Config};
use chip_os::emulator::input::DummyInput;
use chip_os::emulator::output::DummyOutput;
use chip_os::emulator::timers::tick_interval;
use chip_os::emulator::{Emulator, Halt, Lifecycle, Selection};

/// Run a ROM from the virtual disk without any screen or keyboard.
#[derive(StructOpt)]
struct Opt {
    #[structopt(flatten)]
    config: Config,

    /// Disk entry to run, exits right after booting if absent
    #[structopt(long)]
    select: Option<String>,

    /// Stop after this many frames
    #[structopt(long)]
    frames: Option<u64>,

    /// Print the screen when done
    #[structopt(long)]
    dump_screen: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let opt = Opt::from_args();
    let config = &opt.config;

    let mut emulator = match config.seed {
        Some(seed) => Emulator::with_seed(seed),
        None => Emulator::new(),
    };
    populate_disk(emulator.disk_mut(), &config.roms)?;
    emulator.boot()?;

    let selection = match &opt.select {
        Some(name) => Selection::Rom(name.clone()),
        None => Selection::Exit,
    };
    emulator.apply_selection(&selection)?;

    let mut input = DummyInput;
    let mut output = DummyOutput::new();
    let frame = tick_interval(config.frame_rate);
    let mut frames = 0;

    // Start execution
    while let Lifecycle::UserRunning = emulator.lifecycle() {
        if opt.frames.map_or(false, |max| frames >= max) {
            emulator.request_exit();
            break;
        }
        let started = Instant::now();
        emulator.poll_input(&mut input);
        if emulator.run_frame(config.cycles_per_frame).is_err() {
            break; // Reported below
        }
        emulator.present(&mut output)?;
        frames += 1;
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    if opt.dump_screen {
        print!("{}", emulator.framebuffer());
    }
    log::info!("Ran {} frames", output.frames());

    match emulator.lifecycle() {
        Lifecycle::Halted(Halt::Fault(fault)) => {
            eprintln!("Machine fault: {}", fault);
            process::exit(2);
        }
        _ => Ok(()),
    }
}
