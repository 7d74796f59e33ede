//! Test-only container encoder

use super::ATTRDATA_VERSION;

/// One record to encode
pub(crate) struct TestRecord<'a> {
    pub name: &'a str,
    pub dimensions: i32,
    pub data: &'a [f32],
}

impl<'a> TestRecord<'a> {
    pub fn new(name: &'a str, dimensions: i32, data: &'a [f32]) -> Self {
        Self {
            name,
            dimensions,
            data,
        }
    }

    fn vertex_count(&self) -> i32 {
        if self.dimensions <= 0 {
            0
        } else {
            self.data.len() as i32 / self.dimensions
        }
    }
}

/// Builds `.attrdata` bytes object by object
pub(crate) struct AttrDataBuilder {
    version: i32,
    objects: Vec<u8>,
    object_count: i32,
}

impl AttrDataBuilder {
    pub fn new() -> Self {
        Self::with_version(ATTRDATA_VERSION)
    }

    pub fn with_version(version: i32) -> Self {
        Self {
            version,
            objects: Vec::new(),
            object_count: 0,
        }
    }

    pub fn object(
        mut self,
        name: &str,
        source_channel: i32,
        source_component: i32,
        records: &[TestRecord<'_>],
    ) -> Self {
        write_string(&mut self.objects, name);
        self.objects.extend_from_slice(&source_channel.to_le_bytes());
        self.objects.extend_from_slice(&source_component.to_le_bytes());
        self.objects
            .extend_from_slice(&(records.len() as i32).to_le_bytes());

        for record in records {
            write_string(&mut self.objects, record.name);
            self.objects
                .extend_from_slice(&record.vertex_count().to_le_bytes());
            self.objects
                .extend_from_slice(&record.dimensions.to_le_bytes());
            for value in record.data {
                self.objects.extend_from_slice(&value.to_le_bytes());
            }
        }

        self.object_count += 1;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.objects.len());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.object_count.to_le_bytes());
        bytes.extend_from_slice(&self.objects);
        bytes
    }
}

/// Append a length-prefixed, padded string
pub(crate) fn write_string(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as i32).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    let padding = (4 - value.len() % 4) % 4;
    out.extend(std::iter::repeat_n(0u8, padding));
}
