//! Modern Warfare 2 (IW4) layouts, 32-bit

use super::*;

pub static MODERN_WARFARE_2: Schema = Schema {
    family: Family::ModernWarfare2,
    width: PointerWidth::Bits32,
    // XModel pool, first entry after the free-list head
    signature: Signature {
        pool_slot: 0x10,
        name_offset: 4,
        expected: "void",
    },
    header: HeaderSchema {
        pool_slot: 0x15 * 4,
        size: 0x228,
        name: Field::ptr(0x0),
        map_name: Field::ptr(0x4),
        surface_count: Field::u32(0x10),
        index_count: Field::u32(0x90),
        indices: Field::ptr(0x94),
        static_count: Field::u32(0x1C8),
        surfaces: Field::ptr(0x21C),
        statics: Field::ptr(0x224),
    },
    zone: None,
    map_ents: Some(MapEntsSchema {
        pool_slot: 0x13 * 4,
        size: 0x8,
        data: Field::ptr(0x4),
    }),
    // Interleaved: one 44-byte vertex carries every attribute
    vertices: VertexSchema {
        count: RecordRef::Header(Field::u32(0x78)),
        position: VertexStream {
            buffer: RecordRef::Header(Field::ptr(0x7C)),
            stride: 44,
            offset: 0x0,
        },
        uv: VertexStream {
            buffer: RecordRef::Header(Field::ptr(0x7C)),
            stride: 44,
            offset: 0x14,
        },
        normal: VertexStream {
            buffer: RecordRef::Header(Field::ptr(0x7C)),
            stride: 44,
            offset: 0x24,
        },
        codec: NormalCodec::ScaledBytes,
    },
    surface: SurfaceSchema {
        stride: 24,
        vertex_base: VertexBase::Index(Field::u32(0x4)),
        vertex_count: Field::u16(0x8),
        face_count: Field::u16(0xA),
        face_index: Field::u32(0xC),
        material: Field::ptr(0x10),
    },
    material: MaterialSchema {
        size: 0x58,
        name: Field::ptr(0x0),
        image_count: Field::u8(0x48),
        image_table: Field::ptr(0x54),
        slot_stride: 12,
        slot_hash: Field::u32(0x0),
        slot_image: Field::ptr(0x8),
        image_name: 0x1C,
        roles: &[
            TextureRole::Diffuse,
            TextureRole::Normal,
            TextureRole::Specular,
        ],
    },
    placement: PlacementSchema {
        stride: 0x38,
        origin: 0x0,
        axis: 0xC,
        scale: 0x30,
        model: Field::ptr(0x34),
        rewrites: &[("mlv", "")],
    },
    entities: Some(EntityRules {
        denylist: &[
            "\"hq\"",
            "\"sab\"",
            "\"ctf\"",
            "\"sd\"",
            "\"special",
            "\"model\" \"fx",
        ],
        vehicle_remap: true,
        skip_exponent_angles: false,
    }),
};
