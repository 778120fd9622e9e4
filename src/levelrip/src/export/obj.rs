//! Wavefront OBJ and MTL output

use std::collections::HashSet;
use std::io::{self, Write};

use crate::material::{Material, TextureRole};
use crate::scene::Scene;

/// MTL statement for each texture role
fn mtl_key(role: TextureRole) -> &'static str {
    match role {
        TextureRole::Diffuse => "map_Kd",
        TextureRole::Normal => "map_bump",
        TextureRole::Specular => "map_Ks",
        TextureRole::Height => "disp",
        TextureRole::Emission => "map_Ke",
        TextureRole::Occlusion => "map_ao",
    }
}

/// Write the mesh
///
/// Every vertex carries a position, UV and normal at the same index, so
/// faces reference all three with one 1-based index.
pub fn write_obj<W: Write>(
    out: &mut W,
    scene: &Scene,
    mtl_name: &str,
    precision: usize,
) -> io::Result<()> {
    let p = precision;
    writeln!(out, "# levelrip")?;
    writeln!(out, "# {}", scene.info.asset_name)?;
    writeln!(out, "mtllib {}", mtl_name)?;

    for v in &scene.vertices {
        let [x, y, z] = v.position;
        writeln!(out, "v {:.*} {:.*} {:.*}", p, x, p, y, p, z)?;
    }
    for v in &scene.vertices {
        let [u, w] = v.uv;
        writeln!(out, "vt {:.*} {:.*}", p, u, p, w)?;
    }
    for v in &scene.vertices {
        let [x, y, z] = v.normal;
        writeln!(out, "vn {:.*} {:.*} {:.*}", p, x, p, y, p, z)?;
    }

    for group in &scene.groups {
        writeln!(out, "g {}", group.material)?;
        writeln!(out, "usemtl {}", group.material)?;
        for [a, b, c] in &group.faces {
            let (a, b, c) = (a + 1, b + 1, c + 1);
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
    }

    Ok(())
}

/// Write the material library; a name seen twice keeps its first entry
pub fn write_mtl<W: Write>(out: &mut W, materials: &[Material]) -> io::Result<()> {
    let mut written = HashSet::new();

    for material in materials {
        if !written.insert(material.name.as_str()) {
            continue;
        }
        writeln!(out, "newmtl {}", material.name)?;
        writeln!(out, "Ka 0 0 0")?;
        writeln!(out, "Kd 1 1 1")?;
        writeln!(out, "Ks 0 0 0")?;
        for (role, path) in &material.textures {
            if !path.is_empty() {
                writeln!(out, "{} {}", mtl_key(*role), path)?;
            }
        }
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::{extracted, mw2_level, Level};

    #[test]
    fn test_obj_layout() {
        let scene = extracted(&mw2_level(Level::default()));
        let mut out = Vec::new();
        write_obj(&mut out, &scene, "mp_test.mtl", 2).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 6);
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 6);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 6);
        assert!(text.contains("v 0.00 25.40 254.00\n"));
        assert!(text.contains("vt 0.25 0.25\n"));
        assert!(text.contains("usemtl mtl_floor\nf 4/4/4 6/6/6 5/5/5\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 3);
    }

    #[test]
    fn test_mtl_roles_and_duplicates() {
        let mut brick = Material {
            name: "mtl_brick".to_string(),
            ..Material::default()
        };
        brick.textures.insert(TextureRole::Diffuse, "brick_c".to_string());
        brick.textures.insert(TextureRole::Normal, "brick_n".to_string());
        brick.textures.insert(TextureRole::Occlusion, "brick_ao".to_string());
        let duplicate = Material {
            name: "mtl_brick".to_string(),
            ..Material::default()
        };

        let mut out = Vec::new();
        write_mtl(&mut out, &[brick, duplicate]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.matches("newmtl mtl_brick").count(), 1);
        assert!(text.contains("map_Kd brick_c\n"));
        assert!(text.contains("map_bump brick_n\n"));
        assert!(text.contains("map_ao brick_ao\n"));
    }
}
