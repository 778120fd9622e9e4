//! Supported game builds
//!
//! A static table from process name to root table addresses and the schema
//! used to decode them. Adding a build means adding a row here.

use crate::memory::{MemorySource, PointerWidth};
use crate::schema::{Family, Schema, BLACK_OPS_3, MODERN_WARFARE_2, WORLD_WAR_2};

/// How a profile's root addresses are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMode {
    /// Fixed virtual addresses
    Absolute,
    /// Offsets from the main module's load address
    ModuleRelative,
}

/// One supported executable
#[derive(Debug)]
pub struct GameProfile {
    /// Process name without any `.exe` suffix
    pub process: &'static str,
    /// Asset pool table
    pub pools: usize,
    /// Asset pool size table
    pub sizes: usize,
    /// Game mode used in output paths (`mp`, `sp`, `core`)
    pub mode: &'static str,
    pub roots: RootMode,
    pub schema: &'static Schema,
}

impl GameProfile {
    pub fn family(&self) -> Family {
        self.schema.family
    }

    pub fn width(&self) -> PointerWidth {
        self.schema.width
    }

    fn resolve(&self, source: &dyn MemorySource, root: usize) -> usize {
        match self.roots {
            RootMode::Absolute => root,
            RootMode::ModuleRelative => source.base_address() + root,
        }
    }

    /// Address of the asset pool table in `source`
    pub fn pools_address(&self, source: &dyn MemorySource) -> usize {
        self.resolve(source, self.pools)
    }
}

pub static PROFILES: &[GameProfile] = &[
    GameProfile {
        process: "iw4mp",
        pools: 0x6F81D0,
        sizes: 0x6F7F08,
        mode: "mp",
        roots: RootMode::Absolute,
        schema: &MODERN_WARFARE_2,
    },
    GameProfile {
        process: "iw4sp",
        pools: 0x7307F8,
        sizes: 0x730510,
        mode: "sp",
        roots: RootMode::Absolute,
        schema: &MODERN_WARFARE_2,
    },
    GameProfile {
        process: "BlackOps3",
        pools: 0x94073F0,
        sizes: 0,
        mode: "core",
        roots: RootMode::ModuleRelative,
        schema: &BLACK_OPS_3,
    },
    GameProfile {
        process: "s2_mp64_ship",
        pools: 0xC08470,
        sizes: 0xEB0C30,
        mode: "mp",
        roots: RootMode::ModuleRelative,
        schema: &WORLD_WAR_2,
    },
    GameProfile {
        process: "s2_sp64_ship",
        pools: 0x94FD10,
        sizes: 0xBD65E0,
        mode: "sp",
        roots: RootMode::ModuleRelative,
        schema: &WORLD_WAR_2,
    },
];

/// Find the profile for a process name
///
/// Matching is exact and case-sensitive; only a trailing `.exe` is ignored.
pub fn lookup(process_name: &str) -> Option<&'static GameProfile> {
    let name = process_name.strip_suffix(".exe").unwrap_or(process_name);
    PROFILES.iter().find(|p| p.process == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::mock::MockMemorySource;

    #[test]
    fn test_lookup_exact() {
        assert_eq!(lookup("iw4mp").map(|p| p.mode), Some("mp"));
        assert_eq!(lookup("iw4mp.exe").map(|p| p.mode), Some("mp"));
        assert_eq!(lookup("BlackOps3").map(|p| p.family()), Some(Family::BlackOps3));
        assert!(lookup("IW4MP").is_none());
        assert!(lookup("iw4").is_none());
        assert!(lookup("iw4mp_patched").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_process_names_unique() {
        for (i, a) in PROFILES.iter().enumerate() {
            for b in &PROFILES[i + 1..] {
                assert_ne!(a.process, b.process);
            }
        }
    }

    #[test]
    fn test_root_resolution() {
        let mut source = MockMemorySource::new(vec![0; 4], 0x1000);
        source.module_base = 0x1_4000_0000;

        let mw2 = lookup("iw4sp").unwrap();
        assert_eq!(mw2.pools_address(&source), 0x7307F8);
        assert_eq!(mw2.width(), PointerWidth::Bits32);

        let ww2 = lookup("s2_sp64_ship").unwrap();
        assert_eq!(ww2.pools_address(&source), 0x1_4000_0000 + 0x94FD10);
        assert_eq!(ww2.width(), PointerWidth::Bits64);
    }
}
