//! The virtual disk: a small table of named ROM images.
//!
//! The disk is populated once before the first load and only read afterwards.

use crate::emulator::error::DiskError;

pub const MAX_ENTRIES: usize = 4;
/// Capacity of a single entry in bytes.
pub const ENTRY_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskEntry {
    name: String,
    data: Vec<u8>,
    loaded: bool,
}

impl DiskEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// False for a slot whose source could not be read.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VirtualDisk {
    entries: [Option<DiskEntry>; MAX_ENTRIES],
}

impl VirtualDisk {
    pub fn new() -> VirtualDisk {
        VirtualDisk::default()
    }

    /// Store `data` under `name` in the first free slot, returning the slot index.
    pub fn insert(&mut self, name: &str, data: &[u8]) -> Result<usize, DiskError> {
        if data.len() > ENTRY_CAPACITY {
            return Err(DiskError::TooLarge {
                name: name.to_string(),
                size: data.len(),
                max: ENTRY_CAPACITY,
            });
        }
        let index = self.claim(name, data.to_vec(), true)?;
        log::info!("Loaded {} to the virtual disk, {} bytes", name, data.len());
        Ok(index)
    }

    /// Claim a slot for `name` whose source could not be read. It is listed but cannot be loaded.
    pub fn insert_missing(&mut self, name: &str) -> Result<usize, DiskError> {
        let index = self.claim(name, Vec::new(), false)?;
        log::warn!("{} is on the virtual disk without any data", name);
        Ok(index)
    }

    fn claim(&mut self, name: &str, data: Vec<u8>, loaded: bool) -> Result<usize, DiskError> {
        if self.find(name).is_some() {
            return Err(DiskError::DuplicateName(name.to_string()));
        }
        let index = self
            .entries
            .iter()
            .position(Option::is_none)
            .ok_or(DiskError::Full(MAX_ENTRIES))?;
        self.entries[index] = Some(DiskEntry {
            name: name.to_string(),
            data,
            loaded,
        });
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Option<&DiskEntry> {
        self.entries.get(index)?.as_ref()
    }

    pub fn find(&self, name: &str) -> Option<(usize, &DiskEntry)> {
        self.entries().find(|(_, entry)| entry.name == name)
    }

    /// Claimed slots with their index, loaded or not.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &DiskEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_ref().map(|e| (i, e)))
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_found_by_name_and_index() {
        let mut disk = VirtualDisk::new();
        assert_eq!(disk.insert("Breakout", &[1, 2, 3]), Ok(0));
        assert_eq!(disk.insert("Tetris", &[4, 5]), Ok(1));

        let (index, entry) = disk.find("Tetris").unwrap();
        assert_eq!(index, 1);
        assert_eq!(entry.data(), &[4, 5]);
        assert_eq!(disk.get(0).map(DiskEntry::name), Some("Breakout"));
        assert!(disk.find("Pong").is_none());
        assert!(disk.get(7).is_none());
        assert_eq!(disk.len(), 2);
    }

    #[test]
    fn at_most_four_entries() {
        let mut disk = VirtualDisk::new();
        for name in &["A", "B", "C", "D"] {
            disk.insert(name, &[]).unwrap();
        }
        assert_eq!(disk.insert("E", &[]), Err(DiskError::Full(4)));
    }

    #[test]
    fn oversized_and_duplicate_entries_are_refused() {
        let mut disk = VirtualDisk::new();
        disk.insert("Breakout", &[0; ENTRY_CAPACITY]).unwrap();
        assert_eq!(
            disk.insert("Big", &[0; ENTRY_CAPACITY + 1]),
            Err(DiskError::TooLarge {
                name: "Big".to_string(),
                size: ENTRY_CAPACITY + 1,
                max: ENTRY_CAPACITY
            })
        );
        assert_eq!(
            disk.insert("Breakout", &[]),
            Err(DiskError::DuplicateName("Breakout".to_string()))
        );
        assert!(disk.get(1).is_none());
    }

    #[test]
    fn missing_sources_leave_an_unloaded_slot() {
        let mut disk = VirtualDisk::new();
        assert_eq!(disk.insert_missing("Tetris"), Ok(0));
        let (_, entry) = disk.find("Tetris").unwrap();
        assert!(!entry.is_loaded());
        assert_eq!(entry.size(), 0);
        assert_eq!(disk.insert("Breakout", &[1]), Ok(1));
        assert!(disk.get(1).unwrap().is_loaded());
    }
}
