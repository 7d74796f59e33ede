//! Mesh-side collaborators
//!
//! The importer never owns a mesh. It reads and writes vertex channels through
//! [`MeshChannels`] and finds the mesh for each object through [`MeshProvider`].
//! [`MeshBuffers`] is a plain in-memory implementation.

use glam::{Vec2, Vec4};
use hashbrown::HashMap;

use crate::target::UvChannel;

/// Number of UV channels a mesh may carry (correspondence can live in any of them)
pub const MAX_UV_CHANNELS: usize = 8;

/// Linear RGBA vertex color
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Vec4> for Rgba {
    fn from(value: Vec4) -> Self {
        Self::new(value.x, value.y, value.z, value.w)
    }
}

impl From<Rgba> for Vec4 {
    fn from(color: Rgba) -> Self {
        Vec4::new(color.r, color.g, color.b, color.a)
    }
}

/// Per-vertex channel access on a destination mesh
pub trait MeshChannels {
    /// Display name, used in diagnostics
    fn name(&self) -> &str;

    fn vertex_count(&self) -> usize;

    /// Two-component view of a UV channel; empty if the channel is unset
    fn uv2(&self, channel: usize) -> Vec<Vec2>;

    /// Four-component view of a UV channel; empty if the channel is unset
    fn uv4(&self, channel: UvChannel) -> Vec<Vec4>;

    fn set_uv4(&mut self, channel: UvChannel, values: Vec<Vec4>);

    /// Vertex colors; empty if the mesh has none
    fn colors(&self) -> Vec<Rgba>;

    fn set_colors(&mut self, colors: Vec<Rgba>);
}

/// Finds the destination mesh for each object in a container
pub trait MeshProvider {
    type Mesh: MeshChannels;

    fn mesh_for(&mut self, object_name: &str) -> Option<&mut Self::Mesh>;

    /// Names that matched more than one mesh when the provider was built
    fn name_collisions(&self) -> &[String] {
        &[]
    }
}

/// In-memory mesh channels
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffers {
    name: String,
    vertex_count: usize,
    uvs: Vec<Vec<Vec4>>,
    colors: Vec<Rgba>,
}

impl MeshBuffers {
    pub fn new(name: impl Into<String>, vertex_count: usize) -> Self {
        Self {
            name: name.into(),
            vertex_count,
            uvs: vec![Vec::new(); MAX_UV_CHANNELS],
            colors: Vec::new(),
        }
    }

    /// Set a UV channel from four-component values
    ///
    /// # Panics
    /// If `channel >= MAX_UV_CHANNELS`.
    pub fn with_uv(mut self, channel: usize, values: Vec<Vec4>) -> Self {
        self.uvs[channel] = values;
        self
    }

    /// Set a UV channel from two-component values (z and w are zero)
    pub fn with_uv2(self, channel: usize, values: &[Vec2]) -> Self {
        let values = values.iter().map(|uv| uv.extend(0.0).extend(0.0)).collect();
        self.with_uv(channel, values)
    }

    pub fn with_colors(mut self, colors: Vec<Rgba>) -> Self {
        self.colors = colors;
        self
    }

    /// Raw UV channel contents
    pub fn uv(&self, channel: usize) -> &[Vec4] {
        self.uvs.get(channel).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn color_values(&self) -> &[Rgba] {
        &self.colors
    }
}

impl MeshChannels for MeshBuffers {
    fn name(&self) -> &str {
        &self.name
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn uv2(&self, channel: usize) -> Vec<Vec2> {
        self.uv(channel).iter().map(|uv| uv.truncate().truncate()).collect()
    }

    fn uv4(&self, channel: UvChannel) -> Vec<Vec4> {
        self.uv(channel.index()).to_vec()
    }

    fn set_uv4(&mut self, channel: UvChannel, values: Vec<Vec4>) {
        self.uvs[channel.index()] = values;
    }

    fn colors(&self) -> Vec<Rgba> {
        self.colors.clone()
    }

    fn set_colors(&mut self, colors: Vec<Rgba>) {
        self.colors = colors;
    }
}

/// Meshes looked up by name; the first mesh with a given name wins
#[derive(Debug, Clone)]
pub struct NamedMeshes<M> {
    meshes: Vec<M>,
    index: HashMap<String, usize>,
    collisions: Vec<String>,
}

impl<M: MeshChannels> NamedMeshes<M> {
    pub fn new(meshes: impl IntoIterator<Item = M>) -> Self {
        let meshes: Vec<M> = meshes.into_iter().collect();
        let mut index = HashMap::with_capacity(meshes.len());
        let mut collisions = Vec::new();

        for (position, mesh) in meshes.iter().enumerate() {
            if index.contains_key(mesh.name()) {
                collisions.push(mesh.name().to_string());
            } else {
                index.insert(mesh.name().to_string(), position);
            }
        }

        Self {
            meshes,
            index,
            collisions,
        }
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.index.get(name).map(|&position| &self.meshes[position])
    }

    /// All meshes, including ones shadowed by a name collision
    pub fn into_meshes(self) -> Vec<M> {
        self.meshes
    }
}

impl<M: MeshChannels> MeshProvider for NamedMeshes<M> {
    type Mesh = M;

    fn mesh_for(&mut self, object_name: &str) -> Option<&mut M> {
        let position = *self.index.get(object_name)?;
        self.meshes.get_mut(position)
    }

    fn name_collisions(&self) -> &[String] {
        &self.collisions
    }
}

/// One mesh that receives every object
///
/// Used when the model has no hierarchy and the exported object names cannot
/// be matched.
#[derive(Debug, Clone)]
pub struct SingleMesh<M>(pub M);

impl<M> SingleMesh<M> {
    pub fn into_inner(self) -> M {
        self.0
    }
}

impl<M: MeshChannels> MeshProvider for SingleMesh<M> {
    type Mesh = M;

    fn mesh_for(&mut self, _object_name: &str) -> Option<&mut M> {
        Some(&mut self.0)
    }
}
