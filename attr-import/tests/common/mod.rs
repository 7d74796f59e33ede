//! Fixture helpers shared by the integration tests

use attr_import::{ATTRDATA_VERSION, MeshBuffers, bits_from_index};
use glam::Vec2;

/// Minimal `.attrdata` writer
pub struct Writer {
    version: i32,
    body: Vec<u8>,
    objects: i32,
}

impl Writer {
    pub fn new() -> Self {
        Self::with_version(ATTRDATA_VERSION)
    }

    pub fn with_version(version: i32) -> Self {
        Self {
            version,
            body: Vec::new(),
            objects: 0,
        }
    }

    /// Append an object whose indices live in `uv{channel}.x`; each record is
    /// `(name, dimensions, data)`
    pub fn object(self, name: &str, channel: i32, records: &[(&str, i32, &[f32])]) -> Self {
        self.object_with_source(name, channel, 0, records)
    }

    pub fn object_with_source(
        mut self,
        name: &str,
        channel: i32,
        component: i32,
        records: &[(&str, i32, &[f32])],
    ) -> Self {
        self.string(name);
        self.int(channel);
        self.int(component);
        self.int(records.len() as i32);
        for (attribute, dimensions, data) in records {
            self.string(attribute);
            self.int(data.len() as i32 / dimensions);
            self.int(*dimensions);
            for value in *data {
                self.body.extend_from_slice(&value.to_le_bytes());
            }
        }
        self.objects += 1;
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.objects.to_le_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }

    fn int(&mut self, value: i32) {
        self.body.extend_from_slice(&value.to_le_bytes());
    }

    fn string(&mut self, value: &str) {
        self.int(value.len() as i32);
        self.body.extend_from_slice(value.as_bytes());
        let padding = (4 - value.len() % 4) % 4;
        self.body.resize(self.body.len() + padding, 0);
    }
}

/// Mesh whose uv1.x carries `indices` as bit-cast floats
pub fn indexed_mesh(name: &str, indices: &[i32]) -> MeshBuffers {
    let uvs: Vec<Vec2> = indices
        .iter()
        .map(|&index| Vec2::new(bits_from_index(index), 0.0))
        .collect();
    MeshBuffers::new(name, indices.len()).with_uv2(1, &uvs)
}
