//! Command line configuration shared by the frontends, and populating the disk from it.

use std::path::{Path, PathBuf};

use structopt::StructOpt;

use crate::emulator::disk::{VirtualDisk, MAX_ENTRIES};
use crate::emulator::error::DiskError;

/// The program options.
#[derive(StructOpt, Debug)]
pub struct Config {
    /// ROM images to put on the virtual disk, at most four
    #[structopt(parse(from_os_str))]
    pub roms: Vec<PathBuf>,

    /// Instructions executed per frame
    #[structopt(long, default_value = "9")]
    pub cycles_per_frame: u32,

    /// Frames per second, which is also the timer rate
    #[structopt(long, default_value = "60")]
    pub frame_rate: u32,

    /// Seed for the random number generator
    #[structopt(long)]
    pub seed: Option<u64>,

    /// How long a key counts as held after the terminal reported it
    #[structopt(long, default_value = "250")]
    pub key_timeout_ms: u64,
}

/// The disk name for a ROM file: its stem with the first letter upper-cased.
pub fn rom_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => stem,
    }
}

/// Put every readable ROM in `paths` on `disk`.
/// A ROM that cannot be read still gets a slot, just without data.
pub fn populate_disk(disk: &mut VirtualDisk, paths: &[PathBuf]) -> Result<(), DiskError> {
    if paths.len() > MAX_ENTRIES {
        log::warn!("Only the first {} of {} ROMs fit on the disk", MAX_ENTRIES, paths.len());
    }
    for path in paths.iter().take(MAX_ENTRIES) {
        let name = rom_name(path);
        match std::fs::read(path) {
            Ok(data) => disk.insert(&name, &data)?,
            Err(e) => {
                log::warn!("Failed to open {:?}: {}", path, e);
                disk.insert_missing(&name)?
            }
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_come_from_file_stems() {
        assert_eq!(rom_name(Path::new("./roms/breakout.ch8")), "Breakout");
        assert_eq!(rom_name(Path::new("tetris")), "Tetris");
        assert_eq!(rom_name(Path::new("")), "");
    }

    #[test]
    fn unreadable_roms_leave_empty_slots() {
        let mut disk = VirtualDisk::new();
        let paths = vec![PathBuf::from("/definitely/not/here/pong.ch8")];
        populate_disk(&mut disk, &paths).unwrap();
        let (_, entry) = disk.find("Pong").unwrap();
        assert!(!entry.is_loaded());
    }

    #[test]
    fn defaults() {
        let config = Config::from_iter(vec!["chip-os", "a.ch8"]);
        assert_eq!(config.roms, vec![PathBuf::from("a.ch8")]);
        assert_eq!(config.cycles_per_frame, 9);
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.seed, None);
    }
}
