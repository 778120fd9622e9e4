//! Mock Memory Source
//!
//! A contiguous byte image at a fixed base address, plus a builder for laying
//! out synthetic game structures in tests.

use super::{MemoryError, MemorySource, PointerWidth};

/// A mock memory source for decoder and pipeline tests
pub struct MockMemorySource {
    /// Image bytes, the first of which lives at `base_address`
    pub data: Vec<u8>,
    pub base_address: usize,
    /// Reported module base
    pub module_base: usize,
}

impl MockMemorySource {
    /// Image at `base_address`, reporting the same address as module base
    pub fn new(data: Vec<u8>, base_address: usize) -> Self {
        Self {
            data,
            base_address,
            module_base: base_address,
        }
    }
}

impl MemorySource for MockMemorySource {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, MemoryError> {
        if address < self.base_address {
            return Err(MemoryError::Read {
                address,
                size,
                reason: format!("below base {:#x}", self.base_address),
            });
        }

        let offset = address - self.base_address;
        if offset + size > self.data.len() {
            return Err(MemoryError::Read {
                address,
                size,
                reason: format!("exceeds data size {}", self.data.len()),
            });
        }

        Ok(self.data[offset..offset + size].to_vec())
    }

    fn base_address(&self) -> usize {
        self.module_base
    }
}

/// Lays out a synthetic memory image
///
/// Allocations are 8-byte aligned and zero-filled. Fixed addresses (root
/// tables) can be reserved explicitly; everything else is bump-allocated
/// past the highest byte written so far.
pub struct ImageBuilder {
    base: usize,
    data: Vec<u8>,
    width: PointerWidth,
}

impl ImageBuilder {
    pub fn new(base: usize, width: PointerWidth) -> Self {
        Self {
            base,
            data: Vec::new(),
            width,
        }
    }

    /// Make sure `[address, address + size)` is backed by the image
    pub fn reserve(&mut self, address: usize, size: usize) {
        let end = address - self.base + size;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
    }

    /// Allocate `size` zeroed bytes and return their address
    pub fn alloc(&mut self, size: usize) -> usize {
        let start = (self.data.len() + 7) & !7;
        self.data.resize(start + size.max(1), 0);
        self.base + start
    }

    pub fn put_bytes(&mut self, address: usize, bytes: &[u8]) {
        self.reserve(address, bytes.len());
        let offset = address - self.base;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn put_u8(&mut self, address: usize, value: u8) {
        self.put_bytes(address, &[value]);
    }

    pub fn put_u16(&mut self, address: usize, value: u16) {
        self.put_bytes(address, &value.to_le_bytes());
    }

    pub fn put_u32(&mut self, address: usize, value: u32) {
        self.put_bytes(address, &value.to_le_bytes());
    }

    pub fn put_u64(&mut self, address: usize, value: u64) {
        self.put_bytes(address, &value.to_le_bytes());
    }

    pub fn put_f32(&mut self, address: usize, value: f32) {
        self.put_bytes(address, &value.to_le_bytes());
    }

    pub fn put_f32s(&mut self, address: usize, values: &[f32]) {
        for (i, value) in values.iter().enumerate() {
            self.put_f32(address + i * 4, *value);
        }
    }

    /// Write a pointer at the image's pointer width
    pub fn put_ptr(&mut self, address: usize, value: usize) {
        match self.width {
            PointerWidth::Bits32 => self.put_u32(address, value as u32),
            PointerWidth::Bits64 => self.put_u64(address, value as u64),
        }
    }

    /// Allocate a null-terminated string and return its address
    pub fn put_str(&mut self, value: &str) -> usize {
        let address = self.alloc(value.len() + 1);
        self.put_bytes(address, value.as_bytes());
        address
    }

    /// Allocate a pointer slot holding the address of a new string
    ///
    /// Matches the asset layout where the first field of a record is a pointer
    /// to its name.
    pub fn put_named_asset(&mut self, name: &str, size: usize) -> usize {
        let name_address = self.put_str(name);
        let asset = self.alloc(size.max(self.width.size()));
        self.put_ptr(asset, name_address);
        asset
    }

    pub fn build(self) -> MockMemorySource {
        MockMemorySource::new(self.data, self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_inside_image() {
        let source = MockMemorySource::new(vec![0xD0, 0x81, 0x6F, 0x00, 0xAA, 0xBB], 0x6F0000);

        assert_eq!(source.read_u32(0x6F0000).unwrap(), 0x6F81D0);
        assert_eq!(source.read_bytes(0x6F0004, 2).unwrap(), vec![0xAA, 0xBB]);
        assert_eq!(source.read_bytes(0x6F0005, 1).unwrap(), vec![0xBB]);
    }

    #[test]
    fn test_reads_outside_image_fail() {
        let source = MockMemorySource::new(vec![0; 4], 0x6F0000);

        assert!(matches!(
            source.read_bytes(0x6F0002, 4),
            Err(MemoryError::Read { address: 0x6F0002, size: 4, .. })
        ));
        assert!(source.read_u32(0x6EFFFC).is_err());
    }

    #[test]
    fn test_module_base_defaults_to_image_base() {
        let mut source = MockMemorySource::new(vec![0; 4], 0x140000000);
        assert_eq!(source.base_address(), 0x140000000);

        source.module_base = 0x7FF600000000;
        assert_eq!(source.base_address(), 0x7FF600000000);
        assert_eq!(source.base_address, 0x140000000);
    }

    #[test]
    fn test_read_cstring_at_end_of_image() {
        // No room for a full page chunk after the string
        let data = b"xxHello\0".to_vec();
        let source = MockMemorySource::new(data, 0x1000);

        assert_eq!(source.read_cstring(0x1002, 1024).unwrap(), "Hello");
    }

    #[test]
    fn test_read_cstring_unterminated_fails() {
        let data = b"Hello".to_vec();
        let source = MockMemorySource::new(data, 0x1000);

        assert!(source.read_cstring(0x1000, 1024).is_err());
    }

    #[test]
    fn test_read_cstring_respects_max_len() {
        let data = b"Hello World\0".to_vec();
        let source = MockMemorySource::new(data, 0x1000);

        assert_eq!(source.read_cstring(0x1000, 5).unwrap(), "Hello");
    }

    #[test]
    fn test_image_builder_layout() {
        let mut image = ImageBuilder::new(0x10000, PointerWidth::Bits32);
        image.reserve(0x10000, 0x10);
        let name = image.put_str("void");
        image.put_ptr(0x10004, name);
        let source = image.build();

        let ptr = source.read_u32(0x10004).unwrap() as usize;
        assert_eq!(ptr, name);
        assert_eq!(source.read_cstring(ptr, 64).unwrap(), "void");
        assert_eq!(name % 8, 0);
    }
}
