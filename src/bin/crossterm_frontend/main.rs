use std::io::{self, BufRead, Write};
use std::process;
use std::time::{Duration, Instant};

use structopt::StructOpt;

use chip_os::config::{populate_disk, Config};
use chip_os::emulator::disk::VirtualDisk;
use chip_os::emulator::timers::tick_interval;
use chip_os::emulator::{Emulator, Halt, Lifecycle, Selection};

mod crossterm_io;
mod key_buffer;
mod key_manager;
use crossterm_io::{CrosstermInput, CrosstermOutput};
use key_manager::KeyManager;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get configuration and read the ROMs onto the disk
    let config = Config::from_args();
    let mut emulator = match config.seed {
        Some(seed) => Emulator::with_seed(seed),
        None => Emulator::new(),
    };
    populate_disk(emulator.disk_mut(), &config.roms)?;
    emulator.boot()?;

    // Keep asking until something could be loaded
    loop {
        let selection = prompt_selection(emulator.disk())?;
        match emulator.apply_selection(&selection) {
            Ok(()) => break,
            Err(e) => println!("{}", e),
        }
    }
    if emulator.lifecycle() != Lifecycle::UserRunning {
        return Ok(());
    }

    let result = run(&mut emulator, &config);

    match emulator.lifecycle() {
        Lifecycle::Halted(Halt::Fault(fault)) => {
            eprintln!("Machine fault at {:#06x}: {}", emulator.program_counter(), fault);
            process::exit(2);
        }
        _ => result,
    }
}

/// Run until escape is pressed or the machine halts.
fn run(emulator: &mut Emulator, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let key_manager = KeyManager::new(Duration::from_millis(config.key_timeout_ms));
    let mut input = CrosstermInput::new(key_manager.key_buffer());
    let mut output = CrosstermOutput::new()?;
    let frame = tick_interval(config.frame_rate);

    // Start execution
    while !key_manager.quit_requested() {
        let started = Instant::now();
        emulator.poll_input(&mut input);
        if emulator.run_frame(config.cycles_per_frame).is_err() {
            break;
        }
        emulator.present(&mut output)?;
        if let Lifecycle::Halted(_) = emulator.lifecycle() {
            break;
        }
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    emulator.request_exit();
    Ok(())
}

/// Show the ROM menu and read a choice: `1..=n` picks a ROM, `n + 1` exits.
fn prompt_selection(disk: &VirtualDisk) -> io::Result<Selection> {
    let entries: Vec<(String, bool)> = disk
        .entries()
        .map(|(_, e)| (e.name().to_string(), e.is_loaded()))
        .collect();

    println!("**********CHIP_OS**********");
    println!("*******ROMs Available******");
    for (i, (name, loaded)) in entries.iter().enumerate() {
        println!("{}. {}{}", i + 1, name, if *loaded { "" } else { " (missing)" });
    }
    println!("{}. Exit", entries.len() + 1);
    println!("******Input Selection******");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(Selection::Exit);
        }
        match line.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= entries.len() => {
                return Ok(Selection::Rom(entries[n - 1].0.clone()))
            }
            Ok(n) if n == entries.len() + 1 => return Ok(Selection::Exit),
            _ => println!(
                "Invalid command entered. Please enter number 1 through {}",
                entries.len() + 1
            ),
        }
    }
}
