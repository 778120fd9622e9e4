//! Static model placements
//!
//! Decodes placement records (origin, 3x3 basis, scale, model pointer) into
//! positioned model references and applies the inclusion filter shared by
//! every build.

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::memory::{MemoryError, StructReader};
use crate::schema::PlacementSchema;

/// Time budget for cleaning a single model name
pub const SANITIZE_BUDGET: Duration = Duration::from_millis(1500);

/// Characters checked between clock reads while sanitizing
const SANITIZE_STRIDE: usize = 1024;

/// Everything but word characters, `.`, `@` and `-`
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w.@-]+").expect("name filter pattern is valid"));

/// Smallest and largest scale a kept placement may carry
pub const SCALE_RANGE: std::ops::RangeInclusive<f32> = 0.001..=10.0;

/// A model placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub name: String,
    pub position: [f32; 3],
    /// Euler angles in degrees (x, y, z)
    pub rotation: [f32; 3],
    pub scale: f32,
}

/// Decompose a row-major 3x3 basis into Euler angles in degrees
///
/// Near gimbal lock (the first row's planar length vanishes) the z angle is
/// pinned to zero and x absorbs the remaining rotation.
pub fn euler_degrees(m: &[f32; 9]) -> [f32; 3] {
    let m = m.map(f64::from);
    let (m00, m01, m02) = (m[0], m[1], m[2]);
    let (m11, m12) = (m[4], m[5]);
    let (m21, m22) = (m[7], m[8]);

    let sy = (m00 * m00 + m01 * m01).sqrt();
    let (x, y, z) = if sy > 1e-6 {
        (m12.atan2(m22), (-m02).atan2(sy), m01.atan2(m00))
    } else {
        ((-m21).atan2(m11), (-m02).atan2(sy), 0.0)
    };

    [x.to_degrees() as f32, y.to_degrees() as f32, z.to_degrees() as f32]
}

/// Whether a raw placement is dropped before any name rewriting
pub fn is_excluded(name: &str, scale: f32) -> bool {
    name.is_empty()
        || name.contains(['?', '\'', '\\', '*'])
        || name.contains("fx")
        || name.contains("viewmodel")
        || !SCALE_RANGE.contains(&scale)
}

/// Keep Unicode word characters and `.`, `@`, `-`; drop everything else
///
/// The name is filtered in fixed-size runs of characters with a
/// clock check before each run. Returns an empty string once the scan is
/// past `budget`.
pub fn sanitize_model_name(name: &str, budget: Duration) -> String {
    let started = Instant::now();
    let mut bounds: Vec<usize> = name
        .char_indices()
        .step_by(SANITIZE_STRIDE)
        .map(|(i, _)| i)
        .collect();
    bounds.push(name.len());

    let mut clean = String::with_capacity(name.len());
    for run in bounds.windows(2) {
        if started.elapsed() >= budget {
            tracing::warn!(length = name.len(), "model name sanitizing timed out");
            return String::new();
        }
        clean.push_str(&DISALLOWED.replace_all(&name[run[0]..run[1]], ""));
    }

    clean
}

/// Apply a build's substring rewrites in order
pub fn apply_rewrites(name: &str, rewrites: &[(&str, &str)]) -> String {
    let mut name = name.to_string();
    for (from, to) in rewrites {
        if name.contains(from) {
            name = name.replace(from, to);
        }
    }
    name
}

/// Filter, rewrite and sanitize one raw placement
///
/// Exclusion looks at the name as read. A kept placement whose name
/// sanitizes away entirely stays in, with an empty name.
pub fn admit(raw: Placement, rewrites: &[(&str, &str)], budget: Duration) -> Option<Placement> {
    if is_excluded(&raw.name, raw.scale) {
        return None;
    }
    let name = sanitize_model_name(&apply_rewrites(&raw.name, rewrites), budget);
    Some(Placement { name, ..raw })
}

/// Filter a list of raw placements, preserving order
pub fn filter_placements(
    raw: impl IntoIterator<Item = Placement>,
    rewrites: &[(&str, &str)],
    budget: Duration,
) -> Vec<Placement> {
    raw.into_iter()
        .filter_map(|p| admit(p, rewrites, budget))
        .collect()
}

/// Read `count` raw placement records
pub fn read_placements(
    reader: &StructReader<'_>,
    schema: &PlacementSchema,
    address: usize,
    count: usize,
) -> Result<Vec<Placement>, MemoryError> {
    let records = reader.read_array(address, schema.stride, count)?;
    let mut placements = Vec::with_capacity(records.len());

    for record in records.iter() {
        let model = record.get_usize(schema.model);
        let name = if model == 0 {
            String::new()
        } else {
            reader.read_string_at(model)?
        };

        placements.push(Placement {
            name,
            position: record.f32s::<3>(schema.origin),
            rotation: euler_degrees(&record.f32s::<9>(schema.axis)),
            scale: record.f32_at(schema.scale),
        });
    }

    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::mock::ImageBuilder;
    use crate::memory::PointerWidth;
    use crate::schema::MODERN_WARFARE_2;

    const IDENTITY: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

    fn raw(name: &str, scale: f32) -> Placement {
        Placement {
            name: name.to_string(),
            position: [1.0, 2.0, 3.0],
            rotation: [0.0; 3],
            scale,
        }
    }

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn test_euler_identity() {
        assert!(close(euler_degrees(&IDENTITY), [0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_euler_yaw_90() {
        // Forward axis turned onto +Y
        let m = [0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert!(close(euler_degrees(&m), [0.0, 0.0, 90.0]));
    }

    #[test]
    fn test_euler_gimbal_lock() {
        // Forward axis pointing straight down
        let m = [0.0, 0.0, -1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let angles = euler_degrees(&m);
        assert!(close(angles, [0.0, 90.0, 0.0]), "{angles:?}");
    }

    #[test]
    fn test_exclusion_rules() {
        assert!(is_excluded("", 1.0));
        assert!(is_excluded("what?", 1.0));
        assert!(is_excluded("it's", 1.0));
        assert!(is_excluded("dir\\model", 1.0));
        assert!(is_excluded("*wild", 1.0));
        assert!(is_excluded("fx_smoke", 1.0));
        assert!(is_excluded("viewmodel_m4", 1.0));
        assert!(is_excluded("crate", 0.0005));
        assert!(is_excluded("crate", 10.5));
        assert!(!is_excluded("crate", 0.001));
        assert!(!is_excluded("crate", 10.0));
    }

    #[test]
    fn test_sanitize_keeps_word_characters() {
        let budget = SANITIZE_BUDGET;
        assert_eq!(sanitize_model_name("com_crate-01.b@lod", budget), "com_crate-01.b@lod");
        assert_eq!(sanitize_model_name("a b/c\"d", budget), "abcd");
        assert_eq!(sanitize_model_name("", budget), "");
    }

    #[test]
    fn test_sanitize_pathological_input_returns_empty() {
        let name = "x".repeat(SANITIZE_STRIDE * 8);
        let started = Instant::now();
        assert_eq!(sanitize_model_name(&name, Duration::ZERO), "");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_sanitize_within_budget_is_complete() {
        let name = "y".repeat(SANITIZE_STRIDE * 4);
        assert_eq!(sanitize_model_name(&name, SANITIZE_BUDGET), name);
    }

    #[test]
    fn test_rewrites_apply_before_sanitizing() {
        let kept = admit(raw("vehicle_mlv_truck", 1.0), &[("mlv", "")], SANITIZE_BUDGET).unwrap();
        assert_eq!(kept.name, "vehicle__truck");

        let bo3 = [("\"ml", "\""), ("\"mv", "\"")];
        let kept = admit(raw("\"mlcrate", 1.0), &bo3, SANITIZE_BUDGET);
        // Quote survives the rewrite but not the sanitizer
        assert_eq!(kept.unwrap().name, "crate");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let input = vec![
            raw("crate_a", 1.0),
            raw("fx_spark", 1.0),
            raw("barrel b", 2.0),
            raw("tiny", 0.0001),
            raw("pipe@2.lod-1", 0.5),
        ];
        let once = filter_placements(input, &[], SANITIZE_BUDGET);
        let twice = filter_placements(once.clone(), &[], SANITIZE_BUDGET);

        assert_eq!(once, twice);
        let names: Vec<&str> = once.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["crate_a", "barrelb", "pipe@2.lod-1"]);
    }

    #[test]
    fn test_name_sanitized_to_nothing_is_kept() {
        let kept = filter_placements(vec![raw("!!!", 1.0), raw("crate", 1.0)], &[], SANITIZE_BUDGET);

        let names: Vec<&str> = kept.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["", "crate"]);
        assert_eq!(kept[0].scale, 1.0);
        assert_eq!(kept[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sanitize_uses_unicode_word_class() {
        // Superscript two is a number but not a word character; the
        // undertie is connector punctuation and is one
        assert_eq!(sanitize_model_name("m\u{b2}_\u{203f}x", SANITIZE_BUDGET), "m_\u{203f}x");
        assert_eq!(sanitize_model_name("caf\u{e9}_\u{0301}1", SANITIZE_BUDGET), "caf\u{e9}_\u{0301}1");
    }

    #[test]
    fn test_sanitize_across_run_boundaries() {
        let name = format!("{}#{}", "a".repeat(SANITIZE_STRIDE - 1), "b".repeat(SANITIZE_STRIDE + 3));
        let clean = sanitize_model_name(&name, SANITIZE_BUDGET);
        assert_eq!(clean.len(), SANITIZE_STRIDE * 2 + 2);
        assert!(!clean.contains('#'));
    }

    #[test]
    fn test_read_placements() {
        let schema = &MODERN_WARFARE_2.placement;
        let mut image = ImageBuilder::new(0x20000, PointerWidth::Bits32);
        let model = image.put_named_asset("com_barrel", 8);
        let table = image.alloc(schema.stride * 2);
        image.put_f32s(table + schema.origin, &[10.0, 20.0, 30.0]);
        image.put_f32s(table + schema.axis, &IDENTITY);
        image.put_f32(table + schema.scale, 1.5);
        image.put_ptr(table + schema.model.offset, model);
        let source = image.build();
        let reader = StructReader::new(&source, PointerWidth::Bits32);

        let placements = read_placements(&reader, schema, table, 2).unwrap();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].name, "com_barrel");
        assert_eq!(placements[0].position, [10.0, 20.0, 30.0]);
        assert_eq!(placements[0].scale, 1.5);
        assert_eq!(placements[1].name, "");
    }
}
