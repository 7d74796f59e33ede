//! Whole-container scan for object and attribute discovery

use std::io::{Read, Seek};

use hashbrown::HashSet;

use super::AttrDataReader;
use crate::error::FormatError;

/// An attribute present somewhere in a container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeInfo {
    pub name: String,
    pub dimensions: u8,
}

/// Everything a container holds, without the vertex data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSummary {
    /// Object names in file order
    pub object_names: Vec<String>,
    /// Distinct (name, dimensions) pairs in first-seen order
    pub attributes: Vec<AttributeInfo>,
}

impl ContainerSummary {
    /// Whether any object carries an attribute with this name
    pub fn contains_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|info| info.name == name)
    }

    /// Largest dimension count seen for an attribute name
    pub fn dimensions_of(&self, name: &str) -> Option<u8> {
        self.attributes
            .iter()
            .filter(|info| info.name == name)
            .map(|info| info.dimensions)
            .max()
    }
}

/// Read every header in a container, skipping all record data
///
/// The reader must be fresh; it is left at the end of the container.
pub fn scan_container<R: Read + Seek>(
    reader: &mut AttrDataReader<R>,
) -> Result<ContainerSummary, FormatError> {
    let header = reader.open_header()?;

    let mut summary = ContainerSummary::default();
    let mut seen = HashSet::new();

    for _ in 0..header.object_count {
        let object = reader.begin_object()?;
        summary.object_names.push(object.name);

        for _ in 0..object.record_count {
            let record = reader.begin_record()?;
            let info = AttributeInfo {
                name: record.attribute_name,
                dimensions: record.dimensions,
            };
            if seen.insert(info.clone()) {
                summary.attributes.push(info);
            }
            reader.skip_record()?;
        }
    }

    Ok(summary)
}
