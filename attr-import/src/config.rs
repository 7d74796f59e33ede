//! Attribute configuration (attributes.toml)
//!
//! Maps each attribute name in a sidecar to up to four [`AttributeTarget`]s,
//! one per decoded component, plus optional per-vertex transforms.
//!
//! ```toml
//! [settings]
//! verbosity = "debug"
//!
//! [[attribute]]
//! name = "temperature"
//! targets = [{ kind = "uv", channel = "uv0", component = "x" }]
//! transforms = [{ op = "scale", factor = [0.01, 1.0, 1.0, 1.0] }]
//! ```

use std::path::{Path, PathBuf};

use glam::Vec4;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::MAX_DIMENSIONS;
use crate::format::ContainerSummary;
use crate::target::AttributeTarget;

/// Errors loading or validating an attribute config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid attribute config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize attribute config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("attribute `{name}` has {count} targets (max 4)")]
    TooManyTargets { name: String, count: usize },

    #[error("attribute `{0}` is configured more than once")]
    DuplicateAttribute(String),
}

/// How much the importer logs
///
/// Ordered from quietest to loudest; each level includes the ones before it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Silent,
    Error,
    #[default]
    Warning,
    Debug,
}

impl Verbosity {
    /// Whether messages at `level` should be emitted
    pub fn allows(self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self >= level
    }
}

/// Settings passed to the importer at construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    #[serde(default)]
    pub verbosity: Verbosity,
}

impl ImportSettings {
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// Per-vertex transform applied to an attribute before it is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum VertexTransform {
    /// Multiply each component
    Scale { factor: [f32; 4] },
    /// Add to each component
    Offset { amount: [f32; 4] },
}

impl VertexTransform {
    pub fn apply(&self, values: &mut [Vec4]) {
        match self {
            Self::Scale { factor } => {
                let factor = Vec4::from_array(*factor);
                values.iter_mut().for_each(|value| *value *= factor);
            }
            Self::Offset { amount } => {
                let amount = Vec4::from_array(*amount);
                values.iter_mut().for_each(|value| *value += amount);
            }
        }
    }
}

/// Routing for a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeConfig {
    /// Attribute name as written by the exporter
    pub name: String,

    /// Target for each decoded component, in component order
    #[serde(default)]
    pub targets: Vec<AttributeTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<VertexTransform>,

    /// Whether the attribute was present in the last synced sidecar
    #[serde(default)]
    pub exists: bool,
}

impl AttributeConfig {
    pub fn new(name: impl Into<String>, targets: Vec<AttributeTarget>) -> Self {
        Self {
            name: name.into(),
            targets,
            transforms: Vec::new(),
            exists: true,
        }
    }

    pub fn with_transform(mut self, transform: VertexTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.len() > usize::from(MAX_DIMENSIONS) {
            return Err(ConfigError::TooManyTargets {
                name: self.name.clone(),
                count: self.targets.len(),
            });
        }
        Ok(())
    }

    /// Trim or pad targets to `dimensions`; returns true if anything changed
    ///
    /// New slots get the default target for their component index.
    fn fit_to(&mut self, dimensions: u8) -> bool {
        let dimensions = usize::from(dimensions);
        if self.targets.len() == dimensions {
            return false;
        }
        self.targets.truncate(dimensions);
        for index in self.targets.len()..dimensions {
            self.targets
                .push(AttributeTarget::default_for_component(index));
        }
        true
    }
}

/// What [`AttributeConfigSet::sync_with`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Configs created for newly discovered attributes
    pub created: Vec<String>,
    /// Existing configs whose target count was adjusted
    pub resized: Vec<String>,
    /// Configs whose attribute is no longer in the sidecar
    pub missing: Vec<String>,
}

impl SyncReport {
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.resized.is_empty()
    }
}

/// A full attributes.toml file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeConfigSet {
    #[serde(default)]
    pub settings: ImportSettings,

    #[serde(default, rename = "attribute")]
    pub attributes: Vec<AttributeConfig>,
}

impl AttributeConfigSet {
    pub fn new(attributes: Vec<AttributeConfig>) -> Self {
        Self {
            settings: ImportSettings::default(),
            attributes,
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let set: Self = toml::from_str(content)?;
        set.validate()?;
        Ok(set)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check target counts and name uniqueness
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for config in &self.attributes {
            config.validate()?;
            if !names.insert(config.name.as_str()) {
                return Err(ConfigError::DuplicateAttribute(config.name.clone()));
            }
        }
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&AttributeConfig> {
        self.attributes.iter().find(|config| config.name == name)
    }

    /// Bring the configs in line with what a sidecar actually contains
    ///
    /// Every discovered attribute gets a config (created with default targets
    /// if missing) whose target count is fitted to the largest dimension count
    /// seen for that attribute. `exists` is refreshed on every config; configs
    /// for absent attributes are kept so hand-authored routing survives a
    /// re-export.
    pub fn sync_with(&mut self, summary: &ContainerSummary) -> SyncReport {
        let mut report = SyncReport::default();
        let mut seen = HashSet::new();

        for info in &summary.attributes {
            if !seen.insert(info.name.as_str()) {
                continue;
            }
            let dimensions = summary
                .dimensions_of(&info.name)
                .unwrap_or(info.dimensions);

            let position = self
                .attributes
                .iter()
                .position(|config| config.name == info.name);

            let config = match position {
                Some(position) => &mut self.attributes[position],
                None => {
                    self.attributes
                        .push(AttributeConfig::new(info.name.clone(), Vec::new()));
                    report.created.push(info.name.clone());
                    let last = self.attributes.len() - 1;
                    &mut self.attributes[last]
                }
            };

            if config.fit_to(dimensions) && position.is_some() {
                report.resized.push(info.name.clone());
            }
        }

        for config in &mut self.attributes {
            config.exists = summary.contains_attribute(&config.name);
            if !config.exists {
                report.missing.push(config.name.clone());
            }
        }

        report
    }

    /// Configs for attributes present in `summary`, in discovery order
    pub fn active_configs(&self, summary: &ContainerSummary) -> Vec<AttributeConfig> {
        let mut seen = HashSet::new();
        summary
            .attributes
            .iter()
            .filter(|info| seen.insert(info.name.as_str()))
            .filter_map(|info| self.find(&info.name).cloned())
            .collect()
    }
}
