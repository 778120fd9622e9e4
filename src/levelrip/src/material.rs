//! Material resolution
//!
//! A material record names itself and points at a table of image slots. Each
//! slot carries a 32-bit semantic hash saying what the image is for; only the
//! hashes a build exposes are bound, everything else is ignored.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::memory::{MemoryError, StructReader};
use crate::schema::MaterialSchema;

/// Semantic texture role of an image slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureRole {
    Diffuse,
    Normal,
    Specular,
    Height,
    Emission,
    Occlusion,
}

impl TextureRole {
    pub const ALL: [TextureRole; 6] = [
        TextureRole::Diffuse,
        TextureRole::Normal,
        TextureRole::Specular,
        TextureRole::Height,
        TextureRole::Emission,
        TextureRole::Occlusion,
    ];

    /// Semantic hash stored in image slots for this role
    pub const fn hash(self) -> u32 {
        match self {
            TextureRole::Diffuse => 0xA0AB1041,
            TextureRole::Normal => 0x59D30D0F,
            TextureRole::Specular => 0x34ECCCB3,
            TextureRole::Height => 0x34D849D5,
            TextureRole::Emission => 0x34614347,
            TextureRole::Occlusion => 0x6001F931,
        }
    }

    pub fn from_hash(hash: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.hash() == hash)
    }
}

/// A resolved material and its bound images
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Material {
    pub name: String,
    pub textures: BTreeMap<TextureRole, String>,
}

impl Material {
    pub fn texture(&self, role: TextureRole) -> Option<&str> {
        self.textures.get(&role).map(String::as_str)
    }
}

/// Strip wildcard markers and reduce an asset path to its base name
///
/// `"*mc/mtl_wall.dds"` becomes `"mtl_wall"`.
pub fn clean_material_name(raw: &str) -> String {
    let stripped = raw.replace('*', "");
    file_stem(&stripped).to_string()
}

/// Base name of a path with directories and the last extension removed
pub fn file_stem(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}

/// Read one material record and bind its image slots
///
/// Slots are visited in table order; when two slots carry the same role the
/// later one wins.
pub fn resolve(
    reader: &StructReader<'_>,
    schema: &MaterialSchema,
    address: usize,
) -> Result<Material, MemoryError> {
    let record = reader.read_record(address, schema.size)?;
    let view = record.view();

    let name = clean_material_name(&reader.read_string(view.get_usize(schema.name))?);
    let count = view.get_usize(schema.image_count);
    let table = view.get_usize(schema.image_table);

    let mut textures = BTreeMap::new();
    let slots = reader.read_array(table, schema.slot_stride, count)?;
    for slot in slots.iter() {
        let Some(role) = TextureRole::from_hash(slot.get(schema.slot_hash) as u32) else {
            continue;
        };
        if !schema.roles.contains(&role) {
            continue;
        }
        let image = slot.get_usize(schema.slot_image);
        let path = reader.read_string_at(image + schema.image_name)?;
        textures.insert(role, path);
    }

    Ok(Material { name, textures })
}

/// Resolves each material address once per extraction run
///
/// Materials are kept in the order their addresses were first seen.
pub struct MaterialCache<'s> {
    schema: &'s MaterialSchema,
    slots: HashMap<usize, usize>,
    materials: Vec<Material>,
}

impl<'s> MaterialCache<'s> {
    pub fn new(schema: &'s MaterialSchema) -> Self {
        Self {
            schema,
            slots: HashMap::new(),
            materials: Vec::new(),
        }
    }

    pub fn get(
        &mut self,
        reader: &StructReader<'_>,
        address: usize,
    ) -> Result<&Material, MemoryError> {
        let slot = match self.slots.get(&address) {
            Some(&slot) => slot,
            None => {
                let material = resolve(reader, self.schema, address)?;
                tracing::debug!(address, name = %material.name, "resolved material");
                self.materials.push(material);
                self.slots.insert(address, self.materials.len() - 1);
                self.materials.len() - 1
            }
        };
        Ok(&self.materials[slot])
    }

    pub fn into_materials(self) -> Vec<Material> {
        self.materials
    }
}
