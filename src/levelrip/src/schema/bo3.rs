//! Black Ops III layouts, 64-bit

use super::*;

pub static BLACK_OPS_3: Schema = Schema {
    family: Family::BlackOps3,
    width: PointerWidth::Bits64,
    signature: Signature {
        pool_slot: 0x80,
        name_offset: 0,
        expected: "void",
    },
    header: HeaderSchema {
        pool_slot: 16 * 0x20,
        size: 0x444,
        name: Field::ptr(0x0),
        map_name: Field::ptr(0x8),
        surface_count: Field::u32(0x18),
        index_count: Field::u64(0x298),
        indices: Field::ptr(0x2A0),
        static_count: Field::u32(0x2FC),
        surfaces: Field::ptr(0x430),
        statics: Field::ptr(0x438),
    },
    zone: None,
    // Found by scanning pool offsets until the blob parsed; may move between builds
    map_ents: Some(MapEntsSchema {
        pool_slot: 0x1E0,
        size: 0x10,
        data: Field::ptr(0x8),
    }),
    // Positions in their own buffer, everything else in a packed attribute buffer
    vertices: VertexSchema {
        count: RecordRef::Header(Field::u32(0x268)),
        position: VertexStream {
            buffer: RecordRef::Header(Field::ptr(0x270)),
            stride: 12,
            offset: 0x0,
        },
        uv: VertexStream {
            buffer: RecordRef::Header(Field::ptr(0x288)),
            stride: 20,
            offset: 0x4,
        },
        normal: VertexStream {
            buffer: RecordRef::Header(Field::ptr(0x288)),
            stride: 20,
            offset: 0xC,
        },
        codec: NormalCodec::SignedTen,
    },
    surface: SurfaceSchema {
        stride: 96,
        vertex_base: VertexBase::ByteOffset {
            field: Field::u32(0xC),
            stride: 12,
        },
        vertex_count: Field::u16(0x28),
        face_count: Field::u16(0x2A),
        face_index: Field::u32(0x2C),
        material: Field::ptr(0x48),
    },
    material: MaterialSchema {
        size: 0x288,
        name: Field::ptr(0x0),
        image_count: Field::u8(0x270),
        image_table: Field::ptr(0x280),
        slot_stride: 0x20,
        slot_hash: Field::u32(0x8),
        slot_image: Field::ptr(0x0),
        image_name: 0xF8,
        roles: &[
            TextureRole::Diffuse,
            TextureRole::Normal,
            TextureRole::Specular,
            TextureRole::Height,
            TextureRole::Emission,
            TextureRole::Occlusion,
        ],
    },
    placement: PlacementSchema {
        stride: 0x98,
        origin: 0x0,
        axis: 0xC,
        scale: 0x30,
        model: Field::ptr(0x58),
        rewrites: &[("\"ml", "\""), ("\"mv", "\"")],
    },
    entities: Some(EntityRules {
        denylist: &["\"hq\"", "\"sab\"", "\"ctf\"", "\"sd\"", "\"special"],
        vehicle_remap: false,
        skip_exponent_angles: true,
    }),
};
