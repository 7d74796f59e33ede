//! Error types for `.attrdata` decoding and import

use std::io;

use crate::config::Verbosity;
use crate::correspondence::CorrespondenceError;
use crate::target::DestinationChannel;

/// Stream-level decode errors
///
/// Every variant is fatal for the stream it came from: once a reader has
/// returned one of these (other than [`FormatError::OutOfOrder`]) no further
/// reads are attempted.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Container version does not match [`crate::ATTRDATA_VERSION`]
    #[error("expected attrdata version {expected}, but the file's version is {found}")]
    UnsupportedVersion { expected: i32, found: i32 },

    /// The stream ended in the middle of a value
    #[error("unexpected end of attrdata stream")]
    Truncated,

    /// A count or string length was negative
    #[error("negative {field}: {value}")]
    NegativeLength { field: &'static str, value: i32 },

    /// Record dimensions outside 1-4
    #[error("attribute `{attribute}` has {dimensions} dimensions (must be 1-4)")]
    InvalidDimensions { attribute: String, dimensions: i32 },

    /// A reader call was made in the wrong protocol state
    #[error("{operation}() called while reader is {phase}")]
    OutOfOrder {
        operation: &'static str,
        phase: &'static str,
    },

    /// IO error from the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Non-fatal problems found while importing
///
/// Issues are scoped to a single record or object; the import continues with
/// the next unit after one is reported.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportIssue {
    /// A record's attribute has no config; the record was skipped
    #[error("no config for attribute `{attribute}` on `{object}`; skipping record")]
    MissingConfig { object: String, attribute: String },

    /// A recovered index fell outside the record; the record was not applied
    #[error(
        "bogus index of {index} at vertex {vertex} of `{mesh}`; `{attribute}` only has {vertex_count} vertices. Did the correspondence channel get overwritten?"
    )]
    IndexOutOfRange {
        mesh: String,
        attribute: String,
        vertex: usize,
        index: i32,
        vertex_count: usize,
    },

    /// Existing channel data had the wrong length and was discarded
    #[error("expected {expected} values in {channel} of `{mesh}`, found {found}; ignoring existing data")]
    ChannelSizeMismatch {
        mesh: String,
        channel: DestinationChannel,
        expected: usize,
        found: usize,
    },

    /// Two meshes share a name; the first one is used
    #[error("name collision: `{name}`; keeping the first mesh")]
    NameCollision { name: String },

    /// No mesh matched an object's name; the object was skipped
    #[error("no mesh named `{object}`; skipping object")]
    MeshNotFound { object: String },

    /// The correspondence channel could not be read; the object was skipped
    #[error("cannot resolve vertex correspondence for `{object}`: {reason}")]
    CorrespondenceUnavailable {
        object: String,
        reason: CorrespondenceError,
    },
}

impl ImportIssue {
    /// Verbosity level an issue is logged at
    pub fn severity(&self) -> Verbosity {
        match self {
            Self::IndexOutOfRange { .. }
            | Self::MeshNotFound { .. }
            | Self::CorrespondenceUnavailable { .. } => Verbosity::Error,
            Self::MissingConfig { .. }
            | Self::ChannelSizeMismatch { .. }
            | Self::NameCollision { .. } => Verbosity::Warning,
        }
    }
}
