//! Memory access for level extraction
//!
//! - `source` - the read capability every extraction runs against
//! - `reader` - fixed-layout record decoding at a profile's pointer width
//! - `mock` - in-memory images for tests

#[cfg(test)]
pub mod mock;
mod reader;
mod source;

pub use reader::{Field, FieldKind, PointerWidth, Record, RecordBuffer, RecordView, StructReader};
pub use source::{MemoryError, MemorySource, MAX_STRING_LEN};
