//! Packed vertex normal decoding
//!
//! Each engine family stores world vertex normals in its own 32-bit packing.
//! Every codec is total: any bit pattern decodes to a 3-vector without
//! failing. Well-formed input comes out unit length; a pattern that unpacks
//! to the zero vector stays zero rather than producing NaNs.

/// Packed normal encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalCodec {
    /// Three biased bytes (x, y, z around 127) with a shared scale in the
    /// fourth byte.
    ScaledBytes,
    /// 10:10:10 unsigned fields mapped linearly onto [-1, 1].
    UnsignedTen,
    /// 10:10:10 two's-complement fields scaled by 1/511.
    SignedTen,
}

impl NormalCodec {
    /// Decode a packed normal into a unit vector
    pub fn decode(self, packed: u32) -> [f32; 3] {
        let raw = match self {
            NormalCodec::ScaledBytes => unpack_scaled_bytes(packed),
            NormalCodec::UnsignedTen => unpack_unsigned_ten(packed),
            NormalCodec::SignedTen => unpack_signed_ten(packed),
        };
        normalize(raw)
    }
}

fn unpack_scaled_bytes(packed: u32) -> [f32; 3] {
    let [x, y, z, w] = packed.to_le_bytes();
    let scale = (w as f32 + 192.0) / 32385.0;
    [
        (x as f32 - 127.0) * scale,
        (y as f32 - 127.0) * scale,
        (z as f32 - 127.0) * scale,
    ]
}

fn unpack_unsigned_ten(packed: u32) -> [f32; 3] {
    let field = |shift: u32| ((packed >> shift) & 0x3FF) as f32 / 1023.0 * 2.0 - 1.0;
    [field(0), field(10), field(20)]
}

fn unpack_signed_ten(packed: u32) -> [f32; 3] {
    // Shift the 10-bit field to the top and back down to sign-extend it
    let field = |shift: u32| (((packed >> shift) << 22) as i32 >> 22) as f32 / 511.0;
    [field(0), field(10), field(20)]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length > f32::EPSILON {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        v
    }
}
