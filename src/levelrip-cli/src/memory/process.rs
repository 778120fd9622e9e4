//! Live Process Memory Source
//!
//! Finds a running game that matches a known profile and reads its memory.

use super::region::{covers_readable, module_base, MemoryRegion};

use anyhow::{bail, Context, Result};
use levelrip::profile::RootMode;
use levelrip::{GameProfile, MemoryError, MemorySource};
use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};
use std::fs;
use sysinfo::System;

/// An attached game process
pub struct GameProcess {
    pub pid: u32,
    pub profile: &'static GameProfile,
    pub regions: Vec<MemoryRegion>,
    handle: ProcessHandle,
    base: usize,
}

impl MemorySource for GameProcess {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, MemoryError> {
        // Sizes come from game memory; check them before allocating
        if !covers_readable(&self.regions, address, size) {
            return Err(MemoryError::Read {
                address,
                size,
                reason: "not inside a readable mapping".to_string(),
            });
        }
        let mut buffer = vec![0u8; size];
        self.handle
            .copy_address(address, &mut buffer)
            .map_err(|e| MemoryError::Read {
                address,
                size,
                reason: e.to_string(),
            })?;
        Ok(buffer)
    }

    fn base_address(&self) -> usize {
        self.base
    }
}

impl GameProcess {
    /// Attach to the first running process that matches a profile
    pub fn attach() -> Result<Self> {
        let (pid, profile) = find_game_process()?;
        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .context("Failed to attach to process. Try running with sudo.")?;

        let regions = parse_maps(pid)?;
        let module = format!("{}.exe", profile.process);
        let base = match (module_base(&regions, &module), profile.roots) {
            (Some(base), _) => base,
            (None, RootMode::Absolute) => 0,
            (None, RootMode::ModuleRelative) => {
                bail!("Could not find {} in the memory map of PID {}", module, pid)
            }
        };

        tracing::debug!(pid, base, regions = regions.len(), "attached to game process");

        Ok(GameProcess {
            pid,
            profile,
            regions,
            handle,
            base,
        })
    }

    /// Get process info summary
    pub fn info(&self) -> String {
        let readable = self.regions.iter().filter(|r| r.is_readable()).count();
        format!(
            "PID: {}\nProcess: {}\nModule Base: {:#x}\nMemory Regions: {} ({} readable)",
            self.pid,
            self.profile.process,
            self.base,
            self.regions.len(),
            readable
        )
    }
}

/// Last path component, for either separator
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Find a running process whose name matches a profile
///
/// The kernel truncates process names, so the first command-line argument is
/// tried as well. Threads collapse onto their thread group and the largest
/// resident candidate wins.
pub fn find_game_process() -> Result<(u32, &'static GameProfile)> {
    let mut system = System::new_all();
    system.refresh_all();

    let mut candidates: Vec<(u32, u64, &'static GameProfile)> = Vec::new();

    for process in system.processes().values() {
        let pid = process.pid().as_u32();
        let name = process.name().to_string_lossy();
        let command = process
            .cmd()
            .first()
            .map(|arg| arg.to_string_lossy().into_owned());

        let profile = levelrip::lookup(file_name(&name))
            .or_else(|| command.as_deref().and_then(|c| levelrip::lookup(file_name(c))));

        if let Some(profile) = profile {
            let tgid = get_tgid(pid).unwrap_or(pid);
            candidates.push((tgid, process.memory(), profile));
        }
    }

    if let Some((pid, memory, profile)) = candidates.into_iter().max_by_key(|c| c.1) {
        eprintln!(
            "Found {} process: PID {} (memory: {} MB)",
            profile.process,
            pid,
            memory / 1_000_000
        );
        return Ok((pid, profile));
    }

    bail!("Failed to find a supported game, please ensure one of them is running.")
}

/// Get the thread group ID (main process) for a given PID/TID
pub fn get_tgid(pid: u32) -> Option<u32> {
    let status = fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    status
        .lines()
        .find(|line| line.starts_with("Tgid:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|tgid| tgid.parse().ok())
}

/// Parse /proc/pid/maps to get memory regions
pub fn parse_maps(pid: u32) -> Result<Vec<MemoryRegion>> {
    let maps_path = format!("/proc/{}/maps", pid);
    let contents = fs::read_to_string(&maps_path)
        .with_context(|| format!("Failed to open {}. Do you have permission?", maps_path))?;

    let mut regions: Vec<MemoryRegion> = contents.lines().filter_map(MemoryRegion::parse).collect();
    regions.sort_by_key(|r| r.start);
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("iw4mp.exe"), "iw4mp.exe");
        assert_eq!(file_name("/games/mw2/iw4mp.exe"), "iw4mp.exe");
        assert_eq!(file_name("C:\\Games\\WWII\\s2_mp64_ship.exe"), "s2_mp64_ship.exe");
    }

    #[test]
    fn test_command_line_names_resolve() {
        let profile = levelrip::lookup(file_name("Z:\\steam\\BlackOps3.exe")).unwrap();
        assert_eq!(profile.process, "BlackOps3");
        // Truncated kernel name does not match
        assert!(levelrip::lookup("s2_mp64_ship.ex").is_none());
    }

    #[test]
    fn test_own_maps_parse() {
        let regions = parse_maps(std::process::id()).unwrap();
        assert!(!regions.is_empty());
        assert!(regions.iter().any(|r| r.is_readable()));
        assert!(regions.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn test_unmapped_read_fails_before_allocating() {
        let pid = std::process::id();
        let process = GameProcess {
            pid,
            profile: levelrip::lookup("iw4mp").unwrap(),
            regions: parse_maps(pid).unwrap(),
            handle: (pid as process_memory::Pid).try_into_process_handle().unwrap(),
            base: 0,
        };

        let local = [7u8; 4];
        let address = local.as_ptr() as usize;
        assert_eq!(process.read_bytes(address, 4).unwrap(), vec![7; 4]);

        match process.read_bytes(address, usize::MAX / 2) {
            Err(MemoryError::Read { reason, .. }) => assert_eq!(reason, "not inside a readable mapping"),
            other => panic!("expected a read error, got {other:?}"),
        }
        assert!(process.read_bytes(0, 16).is_err());
    }

    #[test]
    fn test_own_tgid() {
        let pid = std::process::id();
        assert_eq!(get_tgid(pid), Some(pid));
    }
}
