//! Source vertex correspondence
//!
//! Mesh processing after export (normal splitting, welding, reordering) changes
//! the vertex count and order. To undo that, the exporter stores each vertex's
//! original index in a spare UV component by writing the `i32`'s raw bits as an
//! `f32`. Recovering the index is a bit-cast, never a numeric conversion:
//! index 5 is stored as the denormal `7.0e-45`, which rounds to 0.

use glam::Vec2;

use crate::format::ChannelSource;
use crate::mesh::{MAX_UV_CHANNELS, MeshChannels};

/// Reinterpret a correspondence scalar's bits as the source vertex index
pub fn index_from_bits(value: f32) -> i32 {
    bytemuck::cast(value)
}

/// Inverse of [`index_from_bits`], for building meshes that carry indices
pub fn bits_from_index(index: i32) -> f32 {
    bytemuck::cast(index)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorrespondenceError {
    #[error("source channel {0} is not a UV channel")]
    InvalidChannel(i32),

    #[error("source component {0} is not X (0) or Y (1)")]
    InvalidComponent(i32),

    #[error("uv{channel} has {found} values, expected {expected}")]
    ChannelLength {
        channel: usize,
        expected: usize,
        found: usize,
    },
}

/// Component of a UV pair that carries the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn from_component(component: i32) -> Option<Self> {
        match component {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            _ => None,
        }
    }

    fn pick(self, uv: Vec2) -> f32 {
        match self {
            Self::X => uv.x,
            Self::Y => uv.y,
        }
    }
}

/// Recovered source vertex index for every destination vertex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCorrespondence {
    indices: Vec<i32>,
}

impl IndexCorrespondence {
    /// Read the correspondence channel named by an object header
    pub fn resolve<M: MeshChannels + ?Sized>(
        mesh: &M,
        source: ChannelSource,
    ) -> Result<Self, CorrespondenceError> {
        let channel = usize::try_from(source.channel)
            .ok()
            .filter(|&channel| channel < MAX_UV_CHANNELS)
            .ok_or(CorrespondenceError::InvalidChannel(source.channel))?;

        let axis = Axis::from_component(source.component)
            .ok_or(CorrespondenceError::InvalidComponent(source.component))?;

        let scalars = mesh.uv2(channel);
        if scalars.len() != mesh.vertex_count() {
            return Err(CorrespondenceError::ChannelLength {
                channel,
                expected: mesh.vertex_count(),
                found: scalars.len(),
            });
        }

        Ok(Self::from_scalars(&scalars, axis))
    }

    fn from_scalars(values: &[Vec2], axis: Axis) -> Self {
        let indices = values
            .iter()
            .map(|&uv| index_from_bits(axis.pick(uv)))
            .collect();
        Self { indices }
    }

    pub fn from_indices(indices: Vec<i32>) -> Self {
        Self { indices }
    }

    pub fn indices(&self) -> &[i32] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Source index of `vertex` if it addresses one of `record_len` vertices
    ///
    /// On failure returns the offending raw index.
    pub fn source_index(&self, vertex: usize, record_len: usize) -> Result<usize, i32> {
        let index = self.indices[vertex];
        usize::try_from(index)
            .ok()
            .filter(|&source| source < record_len)
            .ok_or(index)
    }
}
