//! Entity text parsing
//!
//! The level's entity blob is a run of brace-delimited blocks of
//! `"key" "value"` lines. The first block describes the world itself; later
//! blocks that spawn script models are promoted to placements.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::schema::{EntityRules, SCRIPT_MODEL_MARKER};
use crate::transform::Placement;

/// Separator between two entity blocks
pub const BLOCK_BOUNDARY: &str = "\n}\n{";

/// Scale given to every entity-derived record
pub const ENTITY_SCALE: &str = "1.0000";

static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(.*?)"\s"(.*?)""#).expect("key/value pattern is valid"));

/// Insertion-ordered string record
///
/// Keys keep their first value; later inserts of an existing key are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRecord {
    fields: Vec<(String, String)>,
}

impl EntityRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the key is already present
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.get(&key).is_some() {
            return false;
        }
        self.fields.push((key, value.into()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Model name, if the record names one
    pub fn name(&self) -> Option<&str> {
        self.get("Name")
    }

    /// Promote a dynamic-model record to a placement
    ///
    /// Requires a name; missing or unparseable numeric fields read as zero,
    /// and the scale as one.
    pub fn to_placement(&self) -> Option<Placement> {
        let name = self.name()?.to_string();
        let num = |key: &str, default: f32| {
            self.get(key)
                .and_then(|v| v.trim().parse::<f32>().ok())
                .unwrap_or(default)
        };
        Some(Placement {
            name,
            position: [num("PosX", 0.0), num("PosY", 0.0), num("PosZ", 0.0)],
            rotation: [num("RotX", 0.0), num("RotY", 0.0), num("RotZ", 0.0)],
            scale: num("Scale", 1.0),
        })
    }
}

impl Serialize for EntityRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Split a blob into its entity blocks
pub fn split_blocks(blob: &str) -> impl Iterator<Item = &str> {
    blob.split(BLOCK_BOUNDARY)
}

/// All `"key" "value"` pairs of a block, in order
pub fn key_values(block: &str) -> impl Iterator<Item = (&str, &str)> {
    block
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .flat_map(|line| {
            KEY_VALUE.captures_iter(line).filter_map(|caps| {
                let key = caps.get(1)?.as_str();
                let value = caps.get(2)?.as_str();
                Some((key, value))
            })
        })
}

/// Whether a block spawns a script model that is not filtered out
pub fn is_dynamic_model(block: &str, rules: &EntityRules) -> bool {
    block.contains(SCRIPT_MODEL_MARKER)
        && block.contains("\"model\"")
        && !rules.denylist.iter().any(|deny| block.contains(deny))
}

/// Collapse vehicle variants onto their whole model
///
/// Returns `None` for a vehicle that names neither variant.
fn remap_vehicle(model: &str) -> Option<String> {
    if !model.contains("veh") {
        return Some(model.to_string());
    }
    if model.contains("static") {
        Some(model.replace("static", "whole"))
    } else if model.contains("radiant") {
        Some(model.replace("radiant", "whole"))
    } else {
        None
    }
}

/// Parse one dynamic-model block
pub fn parse_model_block(block: &str, rules: &EntityRules) -> EntityRecord {
    let mut record = EntityRecord::new();

    for (key, value) in key_values(block) {
        match key {
            "model" => {
                let name = if rules.vehicle_remap {
                    remap_vehicle(value)
                } else {
                    Some(value.to_string())
                };
                if let Some(name) = name {
                    record.insert("Name", name);
                }
            }
            "origin" => {
                let parts: Vec<&str> = value.split(' ').collect();
                if let [x, y, z, ..] = parts[..] {
                    record.insert("PosX", x);
                    record.insert("PosY", y);
                    record.insert("PosZ", z);
                }
            }
            "angles" => {
                if rules.skip_exponent_angles && value.contains('e') {
                    continue;
                }
                let parts: Vec<&str> = value.split(' ').collect();
                if let [pitch, yaw, roll, ..] = parts[..] {
                    record.insert("RotX", roll);
                    record.insert("RotY", pitch);
                    record.insert("RotZ", yaw);
                }
            }
            _ => {}
        }
    }

    record.insert("Scale", ENTITY_SCALE);
    record
}

/// Parse every dynamic-model block of a blob, in blob order
pub fn parse_dynamic_models(blob: &str, rules: &EntityRules) -> Vec<EntityRecord> {
    split_blocks(blob)
        .filter(|block| is_dynamic_model(block, rules))
        .map(|block| parse_model_block(block, rules))
        .collect()
}

/// Collect the world block's settings; the first value of a key wins
pub fn parse_world(blob: &str) -> EntityRecord {
    let mut world = EntityRecord::new();
    if let Some(first) = split_blocks(blob).next() {
        for (key, value) in key_values(first) {
            world.insert(key, value);
        }
    }
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BLACK_OPS_3, MODERN_WARFARE_2};

    fn mw2_rules() -> EntityRules {
        MODERN_WARFARE_2.entities.unwrap()
    }

    fn bo3_rules() -> EntityRules {
        BLACK_OPS_3.entities.unwrap()
    }

    const BLOB: &str = "{\n\"classname\" \"worldspawn\"\n\"sundirection\" \"-30 200 0\"\n\"classname\" \"ignored\"\n}\n{\n\"classname\" \"script_model\"\n\"model\" \"foo\"\n\"origin\" \"1 2 3\"\n\"angles\" \"4 5 6\"\n}\n{\n\"classname\" \"info_player_start\"\n\"origin\" \"0 0 0\"\n}";

    #[test]
    fn test_single_script_model() {
        let models = parse_dynamic_models(BLOB, &mw2_rules());
        assert_eq!(models.len(), 1);

        let record = &models[0];
        let fields: Vec<(&str, &str)> = record.iter().collect();
        assert_eq!(
            fields,
            vec![
                ("Name", "foo"),
                ("PosX", "1"),
                ("PosY", "2"),
                ("PosZ", "3"),
                ("RotX", "6"),
                ("RotY", "4"),
                ("RotZ", "5"),
                ("Scale", "1.0000"),
            ]
        );
    }

    #[test]
    fn test_world_block_first_value_wins() {
        let world = parse_world(BLOB);
        assert_eq!(world.get("classname"), Some("worldspawn"));
        assert_eq!(world.get("sundirection"), Some("-30 200 0"));
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_denylist_and_required_keys() {
        let rules = mw2_rules();
        assert!(!is_dynamic_model("\"classname\" \"script_model\"\n\"model\" \"x\"\n\"script_gameobjectname\" \"hq\"", &rules));
        assert!(!is_dynamic_model("\"classname\" \"script_model\"\n\"model\" \"fx_smoke\"", &rules));
        assert!(!is_dynamic_model("\"classname\" \"script_model\"\n\"origin\" \"0 0 0\"", &rules));
        assert!(is_dynamic_model("\"classname\" \"script_model\"\n\"model\" \"crate\"", &rules));

        // The effects entry is specific to one build
        assert!(is_dynamic_model("\"classname\" \"script_model\"\n\"model\" \"fx_smoke\"", &bo3_rules()));
    }

    #[test]
    fn test_vehicle_remap() {
        let rules = mw2_rules();
        let block = "\"classname\" \"script_model\"\n\"model\" \"vehicle_hummer_static\"";
        assert_eq!(parse_model_block(block, &rules).name(), Some("vehicle_hummer_whole"));

        let block = "\"classname\" \"script_model\"\n\"model\" \"vehicle_van_radiant\"";
        assert_eq!(parse_model_block(block, &rules).name(), Some("vehicle_van_whole"));

        let block = "\"classname\" \"script_model\"\n\"model\" \"vehicle_bike\"";
        let record = parse_model_block(block, &rules);
        assert_eq!(record.name(), None);
        assert_eq!(record.get("Scale"), Some("1.0000"));

        // Remap is off for other builds
        let block = "\"classname\" \"script_model\"\n\"model\" \"veh_static\"";
        assert_eq!(parse_model_block(block, &bo3_rules()).name(), Some("veh_static"));
    }

    #[test]
    fn test_exponent_angles_skipped() {
        let block = "\"classname\" \"script_model\"\n\"model\" \"m\"\n\"angles\" \"1.5e-05 90 0\"";
        let record = parse_model_block(block, &bo3_rules());
        assert_eq!(record.get("RotX"), None);

        let record = parse_model_block(block, &mw2_rules());
        assert_eq!(record.get("RotX"), Some("0"));
        assert_eq!(record.get("RotY"), Some("1.5e-05"));
    }

    #[test]
    fn test_uppercase_exponent_angles_kept() {
        let block = "\"classname\" \"script_model\"\n\"model\" \"m\"\n\"angles\" \"1E5 2 3\"";
        let record = parse_model_block(block, &bo3_rules());
        assert_eq!(record.get("RotX"), Some("3"));
        assert_eq!(record.get("RotY"), Some("1E5"));
        assert_eq!(record.get("RotZ"), Some("2"));
    }

    #[test]
    fn test_short_vectors_ignored() {
        let block = "\"classname\" \"script_model\"\n\"model\" \"m\"\n\"origin\" \"1 2\"";
        let record = parse_model_block(block, &mw2_rules());
        assert_eq!(record.get("PosX"), None);
    }

    #[test]
    fn test_crlf_lines() {
        let block = "\"classname\" \"script_model\"\r\n\"model\" \"m\"\r\n\"origin\" \"7 8 9\"\r\n";
        let record = parse_model_block(block, &mw2_rules());
        assert_eq!(record.get("PosZ"), Some("9"));
    }

    #[test]
    fn test_to_placement() {
        let models = parse_dynamic_models(BLOB, &mw2_rules());
        let placement = models[0].to_placement().unwrap();
        assert_eq!(placement.name, "foo");
        assert_eq!(placement.position, [1.0, 2.0, 3.0]);
        assert_eq!(placement.rotation, [6.0, 4.0, 5.0]);
        assert_eq!(placement.scale, 1.0);

        assert!(EntityRecord::new().to_placement().is_none());
    }

    #[test]
    fn test_record_serializes_in_order() {
        let mut record = EntityRecord::new();
        record.insert("Name", "b");
        record.insert("PosX", "1");
        assert!(!record.insert("Name", "c"));

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Name":"b","PosX":"1"}"#);
    }

    #[test]
    fn test_empty_blob() {
        assert!(parse_world("").is_empty());
        assert!(parse_dynamic_models("", &mw2_rules()).is_empty());
    }
}
