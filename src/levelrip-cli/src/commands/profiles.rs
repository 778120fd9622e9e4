//! Supported build listing

use levelrip::memory::PointerWidth;
use levelrip::profile::RootMode;
use levelrip::{GameProfile, PROFILES};

/// One table row for a profile
fn describe(profile: &GameProfile) -> String {
    let bits = match profile.width() {
        PointerWidth::Bits32 => "32-bit",
        PointerWidth::Bits64 => "64-bit",
    };
    let roots = match profile.roots {
        RootMode::Absolute => "absolute",
        RootMode::ModuleRelative => "module-relative",
    };
    format!(
        "{:<16} {:<28} {:<5} {:<7} {:<16} pools {:#x}",
        format!("{}.exe", profile.process),
        profile.family().title(),
        profile.mode,
        bits,
        roots,
        profile.pools
    )
}

/// Handle the profiles command
pub fn handle() {
    println!("Supported builds:");
    for profile in PROFILES {
        println!("  {}", describe(profile));
    }
}
