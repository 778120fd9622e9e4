//! Versioned record layouts
//!
//! One [`Schema`] per engine family describes every fixed-layout record the
//! extractor touches: the world header, the optional zone record, surfaces,
//! materials and their image slots, vertex streams and static placements.
//! Layouts are asserted, not discovered; nothing in memory describes itself.
//!
//! Offsets were recovered by hand from shipping builds. Bytes between the
//! listed fields are never read.

mod bo3;
mod mw2;
mod ww2;

pub use bo3::BLACK_OPS_3;
pub use mw2::MODERN_WARFARE_2;
pub use ww2::WORLD_WAR_2;

use crate::material::TextureRole;
use crate::memory::{Field, PointerWidth};
use crate::normal::NormalCodec;

/// Engine family a schema belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    ModernWarfare2,
    BlackOps3,
    WorldWar2,
}

impl Family {
    /// Display title used in narration
    pub fn title(self) -> &'static str {
        match self {
            Family::ModernWarfare2 => "Call of Duty: Modern Warfare 2",
            Family::BlackOps3 => "Call of Duty: Black Ops 3",
            Family::WorldWar2 => "Call of Duty: World War II",
        }
    }

    /// Directory name used for exported files
    pub fn dir_name(self) -> &'static str {
        match self {
            Family::ModernWarfare2 => "modern_warfare_2",
            Family::BlackOps3 => "black_ops_3",
            Family::WorldWar2 => "world_war_2",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Which already-read record a field lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef {
    Header(Field),
    Zone(Field),
}

/// Build check: the first asset name in a pool must equal a constant
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    /// Offset of the pool pointer in the asset pool table
    pub pool_slot: usize,
    /// Offset of the name pointer from the start of the pool
    pub name_offset: usize,
    pub expected: &'static str,
}

/// The world (GfxMap-style) header record
#[derive(Debug, Clone, Copy)]
pub struct HeaderSchema {
    pub pool_slot: usize,
    pub size: usize,
    pub name: Field,
    pub map_name: Field,
    pub surface_count: Field,
    pub index_count: Field,
    pub indices: Field,
    pub static_count: Field,
    pub surfaces: Field,
    pub statics: Field,
}

/// Secondary record carrying vertex streams on some builds
#[derive(Debug, Clone, Copy)]
pub struct ZoneSchema {
    pub pool_slot: usize,
    /// Added to the pool pointer to reach the record
    pub skip: usize,
    pub size: usize,
}

/// Record holding the entity text blob
#[derive(Debug, Clone, Copy)]
pub struct MapEntsSchema {
    pub pool_slot: usize,
    pub size: usize,
    pub data: Field,
}

/// One attribute stream of the vertex buffer
#[derive(Debug, Clone, Copy)]
pub struct VertexStream {
    /// Pointer to the stream's buffer
    pub buffer: RecordRef,
    pub stride: usize,
    /// Offset of the attribute inside one element
    pub offset: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct VertexSchema {
    pub count: RecordRef,
    pub position: VertexStream,
    pub uv: VertexStream,
    pub normal: VertexStream,
    pub codec: NormalCodec,
}

/// How a surface names the first vertex its local indices refer to
#[derive(Debug, Clone, Copy)]
pub enum VertexBase {
    /// Direct vertex index
    Index(Field),
    /// Byte offset into the position buffer, divided by the position stride
    ByteOffset { field: Field, stride: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct SurfaceSchema {
    pub stride: usize,
    pub vertex_base: VertexBase,
    pub vertex_count: Field,
    pub face_count: Field,
    pub face_index: Field,
    pub material: Field,
}

#[derive(Debug, Clone, Copy)]
pub struct MaterialSchema {
    pub size: usize,
    pub name: Field,
    pub image_count: Field,
    pub image_table: Field,
    pub slot_stride: usize,
    pub slot_hash: Field,
    pub slot_image: Field,
    /// Offset of the name pointer inside an image asset
    pub image_name: usize,
    /// Texture roles this build exposes
    pub roles: &'static [TextureRole],
}

#[derive(Debug, Clone, Copy)]
pub struct PlacementSchema {
    pub stride: usize,
    /// Three floats
    pub origin: usize,
    /// Nine floats, three rows of the orientation basis
    pub axis: usize,
    pub scale: usize,
    /// Pointer to the model asset; its first field names it
    pub model: Field,
    /// Substring replacements applied to model names before sanitizing
    pub rewrites: &'static [(&'static str, &'static str)],
}

/// Per-build inclusion rules for entity blocks
#[derive(Debug, Clone, Copy)]
pub struct EntityRules {
    /// A block containing any of these is not a dynamic model
    pub denylist: &'static [&'static str],
    /// Collapse vehicle variants to their "whole" model
    pub vehicle_remap: bool,
    /// Drop `angles` values written in scientific notation
    pub skip_exponent_angles: bool,
}

/// Complete layout description for one engine family
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub family: Family,
    pub width: PointerWidth,
    pub signature: Signature,
    pub header: HeaderSchema,
    pub zone: Option<ZoneSchema>,
    pub map_ents: Option<MapEntsSchema>,
    pub vertices: VertexSchema,
    pub surface: SurfaceSchema,
    pub material: MaterialSchema,
    pub placement: PlacementSchema,
    pub entities: Option<EntityRules>,
}

/// Entity marker shared by every family
pub const SCRIPT_MODEL_MARKER: &str = "script_model";
