//! World War II layouts, 64-bit
//!
//! Vertex streams live in the transient zone record rather than the world
//! header, and the build has no entity blob.

use super::*;

pub static WORLD_WAR_2: Schema = Schema {
    family: Family::WorldWar2,
    width: PointerWidth::Bits64,
    signature: Signature {
        pool_slot: 0x50,
        name_offset: 8,
        expected: "empty_model",
    },
    header: HeaderSchema {
        pool_slot: 0x138,
        size: 0xFC0,
        name: Field::ptr(0x0),
        map_name: Field::ptr(0x8),
        surface_count: Field::u32(0x1C),
        index_count: Field::u64(0x3C8),
        indices: Field::ptr(0x3D0),
        static_count: Field::u64(0xB28),
        surfaces: Field::ptr(0xF98),
        statics: Field::ptr(0xFB8),
    },
    zone: Some(ZoneSchema {
        pool_slot: 0x140,
        skip: 8,
        size: 0xD8,
    }),
    map_ents: None,
    vertices: VertexSchema {
        count: RecordRef::Zone(Field::u32(0xA4)),
        position: VertexStream {
            buffer: RecordRef::Zone(Field::ptr(0xA8)),
            stride: 12,
            offset: 0x0,
        },
        uv: VertexStream {
            buffer: RecordRef::Zone(Field::ptr(0xC0)),
            stride: 8,
            offset: 0x0,
        },
        normal: VertexStream {
            buffer: RecordRef::Zone(Field::ptr(0xD0)),
            stride: 4,
            offset: 0x0,
        },
        codec: NormalCodec::UnsignedTen,
    },
    surface: SurfaceSchema {
        stride: 56,
        vertex_base: VertexBase::Index(Field::u32(0x4)),
        vertex_count: Field::u16(0x8),
        face_count: Field::u16(0xA),
        face_index: Field::u32(0x18),
        material: Field::ptr(0x20),
    },
    material: MaterialSchema {
        size: 0xC8,
        name: Field::ptr(0x0),
        image_count: Field::u8(0xA2),
        image_table: Field::ptr(0xC0),
        slot_stride: 16,
        slot_hash: Field::u32(0x0),
        slot_image: Field::ptr(0x8),
        image_name: 0x60,
        roles: &[TextureRole::Diffuse],
    },
    placement: PlacementSchema {
        stride: 0x80,
        origin: 0x0,
        axis: 0xC,
        scale: 0x30,
        model: Field::ptr(0x48),
        rewrites: &[("mlv", "")],
    },
    entities: None,
};
