//! Attribute sidecar binary format (.attrdata)
//!
//! Per-object, per-attribute vertex data exported from a DCC tool. All values
//! are little-endian; there is no magic, only a version number.
//!
//! # Layout
//! ```text
//! i32 version                      (== ATTRDATA_VERSION)
//! i32 object_count
//! object_count × {
//!   string name
//!   i32    source_channel          correspondence UV channel
//!   i32    source_component        0 = X, 1 = Y
//!   i32    record_count
//!   record_count × {
//!     string attribute_name
//!     i32    vertex_count
//!     i32    dimensions            1..=4
//!     f32    data[vertex_count * dimensions]
//!   }
//! }
//! ```
//!
//! Strings are an `i32` byte length, the UTF-8 bytes, then zero padding up to
//! the next 4-byte boundary.

mod helpers;
mod reader;
mod scan;

#[cfg(test)]
pub(crate) mod testing;


use std::path::{Path, PathBuf};

pub use reader::AttrDataReader;
pub use scan::{AttributeInfo, ContainerSummary, scan_container};

/// Container version understood by the reader
pub const ATTRDATA_VERSION: i32 = 1;

/// Sidecar file extension
pub const ATTRDATA_EXT: &str = "attrdata";

/// Maximum components per attribute (destination channels hold 4)
pub const MAX_DIMENSIONS: u8 = 4;

/// Container header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: i32,
    pub object_count: u32,
}

impl ContainerHeader {
    pub const SIZE: usize = 8;
}

/// UV channel and component that carry the bit-cast source vertex index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelSource {
    pub channel: i32,
    pub component: i32,
}

/// Per-object header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Object (mesh) name from the DCC scene
    pub name: String,
    /// Where the correspondence indices were written
    pub source: ChannelSource,
    /// Number of attribute records that follow
    pub record_count: u32,
}

/// Per-record header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub attribute_name: String,
    /// Number of source vertices in this record
    pub vertex_count: u32,
    /// Components per vertex (1-4)
    pub dimensions: u8,
}

impl RecordHeader {
    /// Number of f32 values in the record body
    pub fn float_count(&self) -> u64 {
        u64::from(self.vertex_count) * u64::from(self.dimensions)
    }

    /// Size of the record body in bytes
    pub fn data_len(&self) -> u64 {
        self.float_count() * 4
    }
}

/// Sidecar path for a model file (`models/cube.fbx` -> `models/cube.attrdata`)
pub fn sidecar_path(model: impl AsRef<Path>) -> PathBuf {
    model.as_ref().with_extension(ATTRDATA_EXT)
}
