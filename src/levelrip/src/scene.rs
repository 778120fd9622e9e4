//! Scene assembly
//!
//! Runs one extraction against a matched profile: checks the build
//! signature, reads the world header, then decodes vertices, indices,
//! surfaces, materials, placements and entities in that order. The result
//! is a [`Scene`] owned wholly by the caller.
//!
//! Memory is read live with no snapshot. A level change mid-read can
//! produce garbage or a read failure; the latter aborts the run.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use thiserror::Error;

use crate::entity::{self, EntityRecord};
use crate::geometry::{GeometryError, MeshBuilder, Surface, TriangleGroup, Vertex, POSITION_SCALE};
use crate::material::{self, Material, MaterialCache};
use crate::memory::{MemoryError, Record, RecordBuffer, StructReader};
use crate::profile::GameProfile;
use crate::schema::{Family, RecordRef, Schema, VertexBase, VertexStream};
use crate::transform::{self, Placement, SANITIZE_BUDGET};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Memory access failed: {0}")]
    Memory(#[from] MemoryError),

    #[error("Geometry reconstruction failed: {0}")]
    Geometry(#[from] GeometryError),
}

/// Result of a run that did not fail
#[derive(Debug)]
pub enum Outcome {
    Extracted(Box<Scene>),
    /// The profile matched but the running build is a different one
    Unsupported(String),
    /// The game is at a menu with no level resident
    NoLevelLoaded,
}

/// Identity of the extracted level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapInfo {
    /// World asset name, e.g. `maps/mp/mp_rust.d3dbsp`
    pub asset_name: String,
    /// Short map name, e.g. `mp_rust`
    pub map_name: String,
    pub family: Family,
    pub mode: &'static str,
}

/// Everything extracted from one level
#[derive(Debug, Clone)]
pub struct Scene {
    pub info: MapInfo,
    pub vertices: Vec<Vertex>,
    /// Kept triangles grouped per material name, first-seen order
    pub groups: Vec<TriangleGroup>,
    /// Resolved materials, first-seen order
    pub materials: Vec<Material>,
    /// Static placements that passed the filter
    pub placements: Vec<Placement>,
    /// Script-model entity records
    pub entities: Vec<EntityRecord>,
    /// Settings from the world entity block
    pub world: EntityRecord,
    /// The entity blob as read
    pub raw_entities: String,
}

impl Scene {
    pub fn face_count(&self) -> usize {
        self.groups.iter().map(|g| g.faces.len()).sum()
    }

    /// Static placements as string records, followed by the entity records
    pub fn placement_records(&self, precision: usize) -> Vec<EntityRecord> {
        let num = |v: f32| format!("{:.*}", precision, v);

        let mut records: Vec<EntityRecord> = self
            .placements
            .iter()
            .map(|p| {
                let mut record = EntityRecord::new();
                record.insert("Name", p.name.as_str());
                record.insert("PosX", num(p.position[0]));
                record.insert("PosY", num(p.position[1]));
                record.insert("PosZ", num(p.position[2]));
                record.insert("RotX", num(p.rotation[0]));
                record.insert("RotY", num(p.rotation[1]));
                record.insert("RotZ", num(p.rotation[2]));
                record.insert("Scale", num(p.scale));
                record
            })
            .collect();

        records.extend(self.entities.iter().cloned());
        records
    }

    /// Unique model names across placements and entities, first-seen order
    pub fn model_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.placements
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.entities.iter().filter_map(EntityRecord::name))
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect()
    }

    /// Comma-joined model names with the count as the final entry
    pub fn model_list(&self) -> String {
        let mut names = self.model_names();
        names.push(names.len().to_string());
        names.join(",")
    }

    /// Comma-joined unique texture base names, for asset lookup tools
    pub fn texture_search_string(&self) -> String {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for material in &self.materials {
            for path in material.textures.values() {
                let stem = material::file_stem(path);
                if !stem.is_empty() && seen.insert(stem) {
                    names.push(stem);
                }
            }
        }
        names.join(",")
    }

    /// Static placements plus entity records that name a model
    pub fn all_placements(&self) -> Vec<Placement> {
        self.placements
            .iter()
            .cloned()
            .chain(self.entities.iter().filter_map(EntityRecord::to_placement))
            .collect()
    }
}

/// Counts read from the world header
struct Counts {
    vertices: usize,
    indices: usize,
    surfaces: usize,
    statics: usize,
}

/// Header and zone records of the resident level
struct Roots {
    header: Record,
    zone: Option<Record>,
}

impl Roots {
    fn get_usize(&self, field: RecordRef) -> Result<usize, MemoryError> {
        match field {
            RecordRef::Header(field) => Ok(self.header.view().get_usize(field)),
            RecordRef::Zone(field) => self
                .zone
                .as_ref()
                .map(|zone| zone.view().get_usize(field))
                .ok_or(MemoryError::NullPointer { what: "zone" }),
        }
    }
}

fn seconds(started: Instant) -> String {
    format!("{:.2}", started.elapsed().as_secs_f64())
}

/// Whether the build's signature asset carries the expected name
fn signature_matches(
    reader: &StructReader<'_>,
    schema: &Schema,
    pools: usize,
) -> Result<bool, MemoryError> {
    let sig = &schema.signature;
    let pool = reader.read_pointer(pools + sig.pool_slot)?;
    if pool == 0 {
        return Ok(false);
    }
    let name = reader.read_string_at(pool + sig.name_offset)?;
    tracing::debug!(found = %name, expected = sig.expected, "build signature");
    Ok(name == sig.expected)
}

/// Read the entity blob, empty when the build has none
fn read_entity_blob(
    reader: &StructReader<'_>,
    schema: &Schema,
    pools: usize,
) -> Result<String, MemoryError> {
    let Some(ents) = schema.map_ents else {
        return Ok(String::new());
    };
    let address = reader.read_pointer(pools + ents.pool_slot)?;
    tracing::debug!(address, "map entities");
    if address == 0 {
        return Ok(String::new());
    }
    let record = reader.read_record(address, ents.size)?;
    reader.read_string(record.view().get_usize(ents.data))
}

/// Decode `count` vertices, reading each distinct stream buffer once
fn read_vertices(
    reader: &StructReader<'_>,
    schema: &Schema,
    roots: &Roots,
    count: usize,
) -> Result<Vec<Vertex>, MemoryError> {
    let layout = &schema.vertices;
    let mut buffers: HashMap<(usize, usize), RecordBuffer> = HashMap::new();

    let mut load = |stream: &VertexStream, what: &'static str| -> Result<(usize, usize), MemoryError> {
        let address = roots.get_usize(stream.buffer)?;
        if address == 0 && count > 0 {
            return Err(MemoryError::NullPointer { what });
        }
        let key = (address, stream.stride);
        if !buffers.contains_key(&key) {
            buffers.insert(key, reader.read_array(address, stream.stride, count)?);
        }
        Ok(key)
    };

    let positions = load(&layout.position, "vertex position")?;
    let uvs = load(&layout.uv, "vertex uv")?;
    let normals = load(&layout.normal, "vertex normal")?;

    let element = |key: (usize, usize), i: usize| {
        buffers
            .get(&key)
            .and_then(|buffer| buffer.get(i))
            .ok_or_else(|| MemoryError::Read {
                address: key.0 + i * key.1,
                size: key.1,
                reason: "vertex stream shorter than vertex count".to_string(),
            })
    };

    let mut vertices = Vec::with_capacity(count);
    for i in 0..count {
        let [x, y, z] = element(positions, i)?.f32s::<3>(layout.position.offset);
        let [u, v] = element(uvs, i)?.f32s::<2>(layout.uv.offset);
        let packed = element(normals, i)?.u32_at(layout.normal.offset);

        vertices.push(Vertex {
            position: [x * POSITION_SCALE, y * POSITION_SCALE, z * POSITION_SCALE],
            uv: [u, 1.0 - v],
            normal: layout.codec.decode(packed),
        });
    }

    Ok(vertices)
}

fn read_surfaces(
    reader: &StructReader<'_>,
    schema: &Schema,
    address: usize,
    count: usize,
) -> Result<Vec<Surface>, MemoryError> {
    let layout = &schema.surface;
    let records = reader.read_array(address, layout.stride, count)?;

    Ok(records
        .iter()
        .map(|r| {
            let vertex_base = match layout.vertex_base {
                VertexBase::Index(field) => r.get(field) as u32,
                VertexBase::ByteOffset { field, stride } => r.get(field) as u32 / stride,
            };
            Surface {
                vertex_base,
                face_index: r.get(layout.face_index) as u32,
                vertex_count: r.get(layout.vertex_count) as u16,
                face_count: r.get(layout.face_count) as u16,
                material: r.get_usize(layout.material),
            }
        })
        .collect())
}

/// Extract the resident level described by `profile`
///
/// Progress and reported outcomes go through `narrate`. A failed memory
/// read or an out-of-range vertex index aborts the run.
pub fn extract(
    source: &dyn crate::memory::MemorySource,
    profile: &GameProfile,
    narrate: &mut dyn FnMut(&str),
) -> Result<Outcome, ExtractError> {
    let schema = profile.schema;
    let title = schema.family.title();
    narrate(&format!("Found supported game: {}", title));

    let reader = StructReader::new(source, schema.width);
    let pools = profile.pools_address(source);
    tracing::debug!(process = profile.process, pools, "resolved asset pools");

    if !signature_matches(&reader, schema, pools)? {
        let reason = format!("{} is supported, but this build is not.", title);
        narrate(&reason);
        return Ok(Outcome::Unsupported(reason));
    }

    let layout = &schema.header;
    let header_address = reader.read_pointer(pools + layout.pool_slot)?;
    if header_address == 0 {
        narrate("No BSP loaded. Enter Main Menu or a Map to load in the required assets.");
        return Ok(Outcome::NoLevelLoaded);
    }
    let header = reader.read_record(header_address, layout.size)?;
    let asset_name = reader.read_string(header.view().get_usize(layout.name))?;
    if asset_name.trim().is_empty() {
        narrate("No BSP loaded. Enter Main Menu or a Map to load in the required assets.");
        return Ok(Outcome::NoLevelLoaded);
    }
    let map_name = reader.read_string(header.view().get_usize(layout.map_name))?;

    let zone = match schema.zone {
        Some(zone) => {
            let address = reader.read_pointer(pools + zone.pool_slot)?;
            if address == 0 {
                return Err(MemoryError::NullPointer { what: "zone" }.into());
            }
            Some(reader.read_record(address + zone.skip, zone.size)?)
        }
        None => None,
    };
    let roots = Roots { header, zone };
    let raw_entities = read_entity_blob(&reader, schema, pools)?;

    let view = roots.header.view();
    let counts = Counts {
        vertices: roots.get_usize(schema.vertices.count)?,
        indices: view.get_usize(layout.index_count),
        surfaces: view.get_usize(layout.surface_count),
        statics: view.get_usize(layout.static_count),
    };

    narrate(&format!("Loaded Gfx Map     -   {}", asset_name));
    narrate(&format!("Loaded Map         -   {}", map_name));
    narrate(&format!("Vertex Count       -   {}", counts.vertices));
    narrate(&format!("Indices Count      -   {}", counts.indices));
    narrate(&format!("Surface Count      -   {}", counts.surfaces));
    narrate(&format!("Model Count        -   {}", counts.statics));

    let started = Instant::now();
    narrate("Parsing vertex data....");
    let vertices = read_vertices(&reader, schema, &roots, counts.vertices)?;
    narrate(&format!("Parsed vertex data in {} seconds.", seconds(started)));

    let started = Instant::now();
    narrate("Parsing surface indices....");
    let indices = reader.read_u16_array(view.get_usize(layout.indices), counts.indices)?;
    narrate(&format!("Parsed indices in {} seconds.", seconds(started)));

    let started = Instant::now();
    narrate("Parsing surfaces....");
    let surfaces = read_surfaces(&reader, schema, view.get_usize(layout.surfaces), counts.surfaces)?;
    narrate(&format!("Parsed surfaces in {} seconds.", seconds(started)));

    let started = Instant::now();
    narrate("Building mesh....");
    let mut materials = MaterialCache::new(&schema.material);
    let mut mesh = MeshBuilder::new(&indices, vertices.len());
    for surface in &surfaces {
        let name = materials.get(&reader, surface.material)?.name.clone();
        mesh.add_surface(surface, &name)?;
    }
    if mesh.rejected() > 0 {
        tracing::warn!(rejected = mesh.rejected(), "surfaces with out-of-range index windows skipped");
    }
    let groups = mesh.finish();
    narrate(&format!("Built mesh in {} seconds.", seconds(started)));

    let started = Instant::now();
    narrate("Parsing static models....");
    let raw = transform::read_placements(
        &reader,
        &schema.placement,
        view.get_usize(layout.statics),
        counts.statics,
    )?;
    let placements = transform::filter_placements(raw, schema.placement.rewrites, SANITIZE_BUDGET);

    let (entities, world) = match schema.entities {
        Some(rules) => (
            entity::parse_dynamic_models(&raw_entities, &rules),
            entity::parse_world(&raw_entities),
        ),
        None => (Vec::new(), EntityRecord::new()),
    };
    narrate(&format!(
        "Parsed {} static models and {} entity models in {} seconds.",
        placements.len(),
        entities.len(),
        seconds(started)
    ));

    let scene = Scene {
        info: MapInfo {
            asset_name,
            map_name,
            family: schema.family,
            mode: profile.mode,
        },
        vertices,
        groups,
        materials: materials.into_materials(),
        placements,
        entities,
        world,
        raw_entities,
    };

    Ok(Outcome::Extracted(Box::new(scene)))
}
