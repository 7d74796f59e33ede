//! attr-import: vertex attribute sidecar importer
//!
//! Decodes `.attrdata` sidecar files written by a DCC exporter and remaps each
//! attribute onto a mesh's UV and vertex color channels.
//!
//! # Pipeline
//!
//! - [`format`] - Streaming `.attrdata` reader (header, objects, records, peek)
//! - [`correspondence`] - Recovers source vertex indices smuggled through a UV channel
//! - [`remap`] - Accumulates attribute components into destination channels
//! - [`import`] - Drives the above for every object in a container
//!
//! Supporting modules:
//!
//! - [`config`] - TOML attribute configuration and import settings
//! - [`target`] - Destination channel/component addressing
//! - [`mesh`] - The mesh-side collaborator traits and an in-memory mesh
//!
//! # Usage
//!
//! ```ignore
//! use attr_import::{AttributeConfigSet, AttributeImporter, MeshBuffers, SingleMesh};
//!
//! let configs = AttributeConfigSet::load("attributes.toml")?;
//! let importer = AttributeImporter::from_config_set(&configs);
//!
//! let mut meshes = SingleMesh(mesh);
//! let report = importer.import_file("cube.attrdata", &mut meshes)?;
//! println!("{} records applied", report.records_applied);
//! ```

pub mod config;
pub mod correspondence;
mod error;
pub mod format;
pub mod import;
pub mod mesh;
pub mod remap;
pub mod target;

pub use config::{
    AttributeConfig, AttributeConfigSet, ConfigError, ImportSettings, SyncReport, Verbosity,
    VertexTransform,
};
pub use correspondence::{
    CorrespondenceError, IndexCorrespondence, bits_from_index, index_from_bits,
};
pub use error::{FormatError, ImportIssue};
pub use format::{
    ATTRDATA_EXT, ATTRDATA_VERSION, AttrDataReader, AttributeInfo, ChannelSource,
    ContainerHeader, ContainerSummary, MAX_DIMENSIONS, ObjectHeader, RecordHeader, scan_container,
    sidecar_path,
};
pub use import::{AttributeImporter, ImportReport};
pub use mesh::{MeshBuffers, MeshChannels, MeshProvider, NamedMeshes, Rgba, SingleMesh};
pub use remap::AttributeRemapper;
pub use target::{
    AttributeTarget, ColorComponent, DestinationChannel, UvChannel, UvComponent,
};
