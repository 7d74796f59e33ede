//! Per-object channel accumulation
//!
//! Several attributes may write into different components of the same UV
//! channel, or into the vertex color. The remapper holds one buffer per
//! destination channel for the whole object so those writes compose, and hands
//! every buffer to the mesh exactly once in [`AttributeRemapper::flush`].

use glam::Vec4;

use crate::config::AttributeConfig;
use crate::error::ImportIssue;
use crate::mesh::{MeshChannels, Rgba};
use crate::target::{AttributeTarget, DestinationChannel, UvChannel};

#[derive(Debug)]
pub struct AttributeRemapper {
    mesh: String,
    vertex_count: usize,
    uv_buffers: [Option<Vec<Vec4>>; 4],
    /// Claimed UV channels in the order they were first referenced
    uv_order: Vec<UvChannel>,
    colors: Option<Vec<Vec4>>,
    issues: Vec<ImportIssue>,
}

impl AttributeRemapper {
    /// Claim every channel targeted by `configs`, seeded from the mesh
    pub fn new<'a, M>(mesh: &M, configs: impl IntoIterator<Item = &'a AttributeConfig>) -> Self
    where
        M: MeshChannels + ?Sized,
    {
        let mut remapper = Self {
            mesh: mesh.name().to_string(),
            vertex_count: mesh.vertex_count(),
            uv_buffers: Default::default(),
            uv_order: Vec::new(),
            colors: None,
            issues: Vec::new(),
        };

        let destinations = configs
            .into_iter()
            .flat_map(|config| config.targets.iter())
            .filter_map(AttributeTarget::destination);

        for destination in destinations {
            remapper.claim(mesh, destination);
        }
        remapper
    }

    /// Set one component of one vertex
    ///
    /// Writes to channels that were not claimed at construction are dropped.
    pub fn write(&mut self, target: AttributeTarget, vertex: usize, value: f32) {
        let (buffer, component) = match target {
            AttributeTarget::None => return,
            AttributeTarget::Uv { channel, component } => {
                (self.uv_buffers[channel.index()].as_mut(), component.index())
            }
            AttributeTarget::Color { component } => (self.colors.as_mut(), component.index()),
        };

        let Some(buffer) = buffer else {
            tracing::warn!(mesh = %self.mesh, %target, "write to unclaimed channel ignored");
            return;
        };

        if let Some(slot) = buffer.get_mut(vertex) {
            slot[component] = value;
        }
    }

    /// Channels this remapper will write on flush, UV channels first
    pub fn claimed_channels(&self) -> Vec<DestinationChannel> {
        let mut channels: Vec<_> = self
            .uv_order
            .iter()
            .copied()
            .map(DestinationChannel::Uv)
            .collect();
        if self.colors.is_some() {
            channels.push(DestinationChannel::Color);
        }
        channels
    }

    /// Issues raised while seeding buffers
    pub fn take_issues(&mut self) -> Vec<ImportIssue> {
        std::mem::take(&mut self.issues)
    }

    /// Hand every claimed buffer to the mesh
    pub fn flush<M: MeshChannels + ?Sized>(mut self, mesh: &mut M) {
        for channel in self.uv_order {
            if let Some(values) = self.uv_buffers[channel.index()].take() {
                mesh.set_uv4(channel, values);
            }
        }

        if let Some(colors) = self.colors {
            mesh.set_colors(colors.into_iter().map(Rgba::from).collect());
        }
    }

    fn claim<M: MeshChannels + ?Sized>(&mut self, mesh: &M, destination: DestinationChannel) {
        match destination {
            DestinationChannel::Uv(channel) => {
                if self.uv_buffers[channel.index()].is_some() {
                    return;
                }
                let existing = mesh.uv4(channel);
                let buffer = self.seed(destination, existing);
                self.uv_buffers[channel.index()] = Some(buffer);
                self.uv_order.push(channel);
            }
            DestinationChannel::Color => {
                if self.colors.is_some() {
                    return;
                }
                let existing = mesh.colors().into_iter().map(Vec4::from).collect();
                self.colors = Some(self.seed(destination, existing));
            }
        }
    }

    fn seed(&mut self, channel: DestinationChannel, existing: Vec<Vec4>) -> Vec<Vec4> {
        if existing.len() == self.vertex_count {
            return existing;
        }

        if existing.is_empty() {
            tracing::debug!(mesh = %self.mesh, %channel, "channel has no data; starting from zero");
        } else {
            self.issues.push(ImportIssue::ChannelSizeMismatch {
                mesh: self.mesh.clone(),
                channel,
                expected: self.vertex_count,
                found: existing.len(),
            });
        }
        vec![Vec4::ZERO; self.vertex_count]
    }
}
