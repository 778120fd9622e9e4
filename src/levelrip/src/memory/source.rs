//! Memory Source Trait
//!
//! Core abstraction over a readable address space (live process, test image).

use byteorder::{ByteOrder, LE};
use thiserror::Error;

/// Largest string read through [`MemorySource::read_cstring`] by default.
/// Entity blobs for large levels run to a few hundred KB.
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Page granularity used to keep chunked reads from straddling an unmapped page.
const PAGE_SIZE: usize = 0x1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Failed to read {size} bytes at {address:#x}: {reason}")]
    Read {
        address: usize,
        size: usize,
        reason: String,
    },

    #[error("Null {what} pointer")]
    NullPointer { what: &'static str },

    #[error("Read of {count} x {stride} bytes at {address:#x} overflows the address space")]
    SizeOverflow {
        address: usize,
        count: usize,
        stride: usize,
    },
}

/// Trait for reading memory from a target address space
pub trait MemorySource {
    /// Read bytes from a virtual address
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, MemoryError>;

    /// Load address of the target's main module (for profiles with relative roots)
    fn base_address(&self) -> usize;

    /// Read a u32 from memory
    fn read_u32(&self, address: usize) -> Result<u32, MemoryError> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(LE::read_u32(&bytes))
    }

    /// Read a u64 from memory
    fn read_u64(&self, address: usize) -> Result<u64, MemoryError> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(LE::read_u64(&bytes))
    }

    /// Read a null-terminated string from memory
    ///
    /// Reads page-aligned chunks so a string ending just before an unmapped
    /// page is still readable. When a chunk fails the remainder of it is
    /// retried byte by byte; the error only surfaces if no terminator is
    /// reached before an unreadable byte.
    fn read_cstring(&self, address: usize, max_len: usize) -> Result<String, MemoryError> {
        let mut bytes = Vec::new();
        let mut cursor = address;

        while bytes.len() < max_len {
            let to_page_end = PAGE_SIZE - (cursor % PAGE_SIZE);
            let chunk_len = to_page_end.min(max_len - bytes.len());

            let chunk = match self.read_bytes(cursor, chunk_len) {
                Ok(chunk) => chunk,
                Err(err) => {
                    for offset in 0..chunk_len {
                        let byte = match self.read_bytes(cursor + offset, 1) {
                            Ok(b) => b[0],
                            Err(_) => return Err(err),
                        };
                        if byte == 0 {
                            return Ok(String::from_utf8_lossy(&bytes).to_string());
                        }
                        bytes.push(byte);
                    }
                    cursor += chunk_len;
                    continue;
                }
            };

            if let Some(end) = chunk.iter().position(|&b| b == 0) {
                bytes.extend_from_slice(&chunk[..end]);
                return Ok(String::from_utf8_lossy(&bytes).to_string());
            }

            bytes.extend_from_slice(&chunk);
            cursor += chunk_len;
        }

        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}
