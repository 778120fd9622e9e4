//! Level editor `.map` output
//!
//! A `worldspawn` entity followed by one `misc_model` per placement, in the
//! `iwmap 4` text layout read by the mod tools.

use std::io::{self, Write};

use crate::transform::Placement;

/// Write a `.map` file for `placements`
///
/// Angles are written pitch yaw roll, taken from the decoded (x, y, z)
/// rotation as (y, z, x).
pub fn write_map<W: Write>(out: &mut W, placements: &[Placement], precision: usize) -> io::Result<()> {
    let p = precision;
    writeln!(out, "iwmap 4")?;
    writeln!(out, "// entity 0")?;
    writeln!(out, "{{")?;
    writeln!(out, "\"classname\" \"worldspawn\"")?;
    writeln!(out, "}}")?;

    for (i, placement) in placements.iter().enumerate() {
        let [px, py, pz] = placement.position;
        let [rx, ry, rz] = placement.rotation;

        writeln!(out, "// entity {}", i + 1)?;
        writeln!(out, "{{")?;
        writeln!(out, "\"classname\" \"misc_model\"")?;
        writeln!(out, "\"model\" \"{}\"", placement.name)?;
        writeln!(out, "\"origin\" \"{:.*} {:.*} {:.*}\"", p, px, p, py, p, pz)?;
        writeln!(out, "\"angles\" \"{:.*} {:.*} {:.*}\"", p, ry, p, rz, p, rx)?;
        writeln!(out, "\"modelscale\" \"{:.*}\"", p, placement.scale)?;
        writeln!(out, "}}")?;
    }

    Ok(())
}
