//! Struct Reader
//!
//! Reads fixed-layout records and record arrays out of a [`MemorySource`].
//! All pointer-width and endianness decisions live here; callers only deal
//! in [`Field`] descriptors and native addresses.

use super::source::{MemoryError, MemorySource, MAX_STRING_LEN};

use byteorder::{ByteOrder, LE};

/// Width of a pointer in the target address space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    /// Size of a pointer in bytes
    pub const fn size(self) -> usize {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }
}

/// Storage type of a field inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    U64,
    /// Pointer at the profile's width, zero-extended to `usize`
    Pointer,
}

/// A typed field at a byte offset within a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub kind: FieldKind,
}

impl Field {
    pub const fn u8(offset: usize) -> Self {
        Self { offset, kind: FieldKind::U8 }
    }

    pub const fn u16(offset: usize) -> Self {
        Self { offset, kind: FieldKind::U16 }
    }

    pub const fn u32(offset: usize) -> Self {
        Self { offset, kind: FieldKind::U32 }
    }

    pub const fn u64(offset: usize) -> Self {
        Self { offset, kind: FieldKind::U64 }
    }

    pub const fn ptr(offset: usize) -> Self {
        Self { offset, kind: FieldKind::Pointer }
    }

    /// Byte size of the field at the given pointer width
    pub const fn size(&self, width: PointerWidth) -> usize {
        match self.kind {
            FieldKind::U8 => 1,
            FieldKind::U16 => 2,
            FieldKind::U32 => 4,
            FieldKind::U64 => 8,
            FieldKind::Pointer => width.size(),
        }
    }

    /// Offset one past the last byte of the field
    pub const fn end(&self, width: PointerWidth) -> usize {
        self.offset + self.size(width)
    }
}

/// Borrowed view of one record's bytes
///
/// Offsets come from compiled-in schemas whose fields are checked against the
/// record sizes in tests, so accessors index directly.
#[derive(Clone, Copy)]
pub struct RecordView<'a> {
    bytes: &'a [u8],
    width: PointerWidth,
}

impl<'a> RecordView<'a> {
    pub fn new(bytes: &'a [u8], width: PointerWidth) -> Self {
        Self { bytes, width }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn u8_at(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    pub fn u16_at(&self, offset: usize) -> u16 {
        LE::read_u16(&self.bytes[offset..offset + 2])
    }

    pub fn u32_at(&self, offset: usize) -> u32 {
        LE::read_u32(&self.bytes[offset..offset + 4])
    }

    pub fn u64_at(&self, offset: usize) -> u64 {
        LE::read_u64(&self.bytes[offset..offset + 8])
    }

    pub fn f32_at(&self, offset: usize) -> f32 {
        LE::read_f32(&self.bytes[offset..offset + 4])
    }

    /// Read `N` consecutive floats
    pub fn f32s<const N: usize>(&self, offset: usize) -> [f32; N] {
        let mut values = [0.0; N];
        for (i, value) in values.iter_mut().enumerate() {
            *value = self.f32_at(offset + i * 4);
        }
        values
    }

    pub fn pointer_at(&self, offset: usize) -> usize {
        match self.width {
            PointerWidth::Bits32 => self.u32_at(offset) as usize,
            PointerWidth::Bits64 => self.u64_at(offset) as usize,
        }
    }

    /// Read a typed field, widened to u64
    pub fn get(&self, field: Field) -> u64 {
        match field.kind {
            FieldKind::U8 => self.u8_at(field.offset) as u64,
            FieldKind::U16 => self.u16_at(field.offset) as u64,
            FieldKind::U32 => self.u32_at(field.offset) as u64,
            FieldKind::U64 => self.u64_at(field.offset),
            FieldKind::Pointer => self.pointer_at(field.offset) as u64,
        }
    }

    /// Read a typed field as an address or count
    pub fn get_usize(&self, field: Field) -> usize {
        self.get(field) as usize
    }
}

/// One record read from memory
#[derive(Debug)]
pub struct Record {
    bytes: Vec<u8>,
    width: PointerWidth,
}

impl Record {
    pub fn view(&self) -> RecordView<'_> {
        RecordView::new(&self.bytes, self.width)
    }
}

/// A contiguous array of fixed-stride records read in one go
#[derive(Debug)]
pub struct RecordBuffer {
    bytes: Vec<u8>,
    stride: usize,
    width: PointerWidth,
}

impl RecordBuffer {
    pub fn len(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.bytes.len() / self.stride
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<RecordView<'_>> {
        let start = index.checked_mul(self.stride)?;
        let bytes = self.bytes.get(start..start + self.stride)?;
        Some(RecordView::new(bytes, self.width))
    }

    pub fn iter(&self) -> impl Iterator<Item = RecordView<'_>> {
        self.bytes
            .chunks_exact(self.stride.max(1))
            .map(move |bytes| RecordView::new(bytes, self.width))
    }
}

/// Reads records from a memory source at a fixed pointer width
pub struct StructReader<'a> {
    source: &'a dyn MemorySource,
    width: PointerWidth,
}

impl<'a> StructReader<'a> {
    pub fn new(source: &'a dyn MemorySource, width: PointerWidth) -> Self {
        Self { source, width }
    }

    /// Read a pointer-sized value and zero-extend it to a native address
    pub fn read_pointer(&self, address: usize) -> Result<usize, MemoryError> {
        match self.width {
            PointerWidth::Bits32 => Ok(self.source.read_u32(address)? as usize),
            PointerWidth::Bits64 => Ok(self.source.read_u64(address)? as usize),
        }
    }

    /// Read one record of `size` bytes
    pub fn read_record(&self, address: usize, size: usize) -> Result<Record, MemoryError> {
        let bytes = self.source.read_bytes(address, size)?;
        Ok(Record {
            bytes,
            width: self.width,
        })
    }

    /// Read `count` records of `stride` bytes
    ///
    /// `count` always comes from a count field read earlier; nothing in the
    /// array itself is trusted for its length.
    pub fn read_array(
        &self,
        address: usize,
        stride: usize,
        count: usize,
    ) -> Result<RecordBuffer, MemoryError> {
        let size = count
            .checked_mul(stride)
            .ok_or(MemoryError::SizeOverflow {
                address,
                count,
                stride,
            })?;

        let bytes = if size == 0 {
            Vec::new()
        } else {
            self.source.read_bytes(address, size)?
        };

        Ok(RecordBuffer {
            bytes,
            stride,
            width: self.width,
        })
    }

    /// Read a flat array of little-endian u16 values
    pub fn read_u16_array(&self, address: usize, count: usize) -> Result<Vec<u16>, MemoryError> {
        let buffer = self.read_array(address, 2, count)?;
        Ok(buffer.iter().map(|r| r.u16_at(0)).collect())
    }

    /// Read a null-terminated string; a null address reads as empty
    pub fn read_string(&self, address: usize) -> Result<String, MemoryError> {
        if address == 0 {
            return Ok(String::new());
        }
        self.source.read_cstring(address, MAX_STRING_LEN)
    }

    /// Follow the pointer stored at `address` and read the string it names
    pub fn read_string_at(&self, address: usize) -> Result<String, MemoryError> {
        let pointer = self.read_pointer(address)?;
        self.read_string(pointer)
    }
}
