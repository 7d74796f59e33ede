//! Destination channel addressing
//!
//! Every component of an attribute is routed by an [`AttributeTarget`]: nowhere,
//! into one component of a UV channel, or into one vertex color component.

use std::fmt;

use serde::{Deserialize, Serialize};

/// UV channels that can receive attribute data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UvChannel {
    Uv0,
    Uv1,
    Uv2,
    Uv3,
}

impl UvChannel {
    pub const ALL: [Self; 4] = [Self::Uv0, Self::Uv1, Self::Uv2, Self::Uv3];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for UvChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uv{}", self.index())
    }
}

/// Component of a UV channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UvComponent {
    X,
    Y,
    Z,
    W,
}

impl UvComponent {
    pub const ALL: [Self; 4] = [Self::X, Self::Y, Self::Z, Self::W];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for UvComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::W => "w",
        })
    }
}

/// Component of the vertex color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorComponent {
    R,
    G,
    B,
    A,
}

impl ColorComponent {
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::R => "r",
            Self::G => "g",
            Self::B => "b",
            Self::A => "a",
        })
    }
}

/// Where one component of an attribute is written
///
/// Serialized with an internal `kind` tag:
///
/// ```toml
/// targets = [
///     { kind = "uv", channel = "uv1", component = "x" },
///     { kind = "color", component = "a" },
///     { kind = "none" },
/// ]
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AttributeTarget {
    /// Component is dropped
    #[default]
    None,
    Uv {
        channel: UvChannel,
        component: UvComponent,
    },
    Color {
        component: ColorComponent,
    },
}

impl AttributeTarget {
    /// Default target for the `index`th component of a new attribute (`uv1.x`, `uv1.y`, ...)
    pub fn default_for_component(index: usize) -> Self {
        match UvComponent::from_index(index) {
            Some(component) => Self::Uv {
                channel: UvChannel::Uv1,
                component,
            },
            None => Self::None,
        }
    }

    /// Channel this target writes into, if any
    pub fn destination(&self) -> Option<DestinationChannel> {
        match self {
            Self::None => None,
            Self::Uv { channel, .. } => Some(DestinationChannel::Uv(*channel)),
            Self::Color { .. } => Some(DestinationChannel::Color),
        }
    }
}

impl fmt::Display for AttributeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Uv { channel, component } => write!(f, "{channel}.{component}"),
            Self::Color { component } => write!(f, "color.{component}"),
        }
    }
}

/// A per-vertex 4-component buffer on the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationChannel {
    Uv(UvChannel),
    Color,
}

impl fmt::Display for DestinationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uv(channel) => fmt::Display::fmt(channel, f),
            Self::Color => f.write_str("color"),
        }
    }
}
