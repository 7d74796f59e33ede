//! Streaming `.attrdata` reader

use std::io::{Read, Seek, SeekFrom};

use glam::Vec4;

use super::helpers::{read_count, read_i32, read_string, read_vectors};
use super::{
    ATTRDATA_VERSION, ChannelSource, ContainerHeader, MAX_DIMENSIONS, ObjectHeader, RecordHeader,
};
use crate::error::FormatError;

/// Where the reader is in the container protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Container header not read yet
    Idle,
    /// Between objects; the next call opens an object
    HeaderRead,
    /// Object header read and records remain
    ObjectOpen,
    /// Record header read; its data must be read or skipped
    RecordOpen { vertex_count: u32, dimensions: u8 },
    /// Every object consumed
    Done,
    /// A decode error left the stream position untrusted
    Failed,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::HeaderRead => "between objects",
            Self::ObjectOpen => "inside an object",
            Self::RecordOpen { .. } => "inside a record",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// Sequential decoder over an `.attrdata` stream
///
/// Calls must follow the container structure: [`open_header`](Self::open_header)
/// once, then for each object [`begin_object`](Self::begin_object) followed by
/// exactly `record_count` cycles of [`begin_record`](Self::begin_record) and
/// either [`read_record_vectors`](Self::read_record_vectors) or
/// [`skip_record`](Self::skip_record). A call made out of order returns
/// [`FormatError::OutOfOrder`] without touching the stream.
///
/// Any other error is fatal: the reader refuses every later call.
pub struct AttrDataReader<R> {
    inner: R,
    /// Total stream length, for bounds-checking skips
    len: u64,
    phase: Phase,
    objects_remaining: u32,
    records_remaining: u32,
    /// True between `begin_object` and the first `begin_record`
    at_object_start: bool,
}

impl<R: Read + Seek> AttrDataReader<R> {
    /// Wrap a stream positioned at the start of a container
    pub fn new(mut inner: R) -> Result<Self, FormatError> {
        let start = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(start))?;

        Ok(Self {
            inner,
            len,
            phase: Phase::Idle,
            objects_remaining: 0,
            records_remaining: 0,
            at_object_start: false,
        })
    }

    /// Read the container header. Must be called exactly once, first.
    pub fn open_header(&mut self) -> Result<ContainerHeader, FormatError> {
        self.expect(Phase::Idle, "open_header")?;

        let result = Self::read_container_header(&mut self.inner);
        let header = self.check(result)?;

        self.objects_remaining = header.object_count;
        self.phase = if header.object_count == 0 {
            Phase::Done
        } else {
            Phase::HeaderRead
        };
        Ok(header)
    }

    /// Start reading the next object
    pub fn begin_object(&mut self) -> Result<ObjectHeader, FormatError> {
        self.expect(Phase::HeaderRead, "begin_object")?;

        let result = Self::read_object_header(&mut self.inner);
        let header = self.check(result)?;

        self.objects_remaining -= 1;
        self.records_remaining = header.record_count;
        self.at_object_start = true;
        self.phase = Phase::ObjectOpen;
        if header.record_count == 0 {
            self.close_object();
        }
        Ok(header)
    }

    /// Names of every attribute in the current object, in record order
    ///
    /// Reads each record header and skips its data, then seeks back to the
    /// exact byte it started at. Only valid directly after
    /// [`begin_object`](Self::begin_object).
    pub fn peek_attribute_names(&mut self) -> Result<Vec<String>, FormatError> {
        if !self.at_object_start || self.phase == Phase::Failed {
            return Err(FormatError::OutOfOrder {
                operation: "peek_attribute_names",
                phase: self.phase.name(),
            });
        }

        let result = self.peek_records();
        self.check(result)
    }

    /// Read the next record's header
    pub fn begin_record(&mut self) -> Result<RecordHeader, FormatError> {
        self.expect(Phase::ObjectOpen, "begin_record")?;

        let result = Self::read_record_header(&mut self.inner);
        let header = self.check(result)?;

        self.at_object_start = false;
        self.phase = Phase::RecordOpen {
            vertex_count: header.vertex_count,
            dimensions: header.dimensions,
        };
        Ok(header)
    }

    /// Decode the current record's data, one vector per source vertex
    ///
    /// Consumes exactly `vertex_count * dimensions * 4` bytes.
    pub fn read_record_vectors(&mut self) -> Result<Vec<Vec4>, FormatError> {
        let (vertex_count, dimensions) = self.open_record("read_record_vectors")?;

        let result = read_vectors(&mut self.inner, vertex_count, dimensions);
        let vectors = self.check(result)?;

        self.finish_record();
        Ok(vectors)
    }

    /// Skip the current record's data without decoding it
    pub fn skip_record(&mut self) -> Result<(), FormatError> {
        let (vertex_count, dimensions) = self.open_record("skip_record")?;

        let len = u64::from(vertex_count) * u64::from(dimensions) * 4;
        let result = self.skip_bytes(len);
        self.check(result)?;

        self.finish_record();
        Ok(())
    }

    /// Skip whatever is left of the current object
    ///
    /// Returns the number of records skipped, including an open record.
    pub fn skip_object(&mut self) -> Result<u32, FormatError> {
        let mut skipped = 0;
        if matches!(self.phase, Phase::RecordOpen { .. }) {
            self.skip_record()?;
            skipped += 1;
        }
        while self.phase == Phase::ObjectOpen {
            self.begin_record()?;
            self.skip_record()?;
            skipped += 1;
        }
        Ok(skipped)
    }

    /// Objects not yet opened
    pub fn objects_remaining(&self) -> u32 {
        self.objects_remaining
    }

    /// Records of the current object not yet opened
    pub fn records_remaining(&self) -> u32 {
        self.records_remaining
    }

    /// True once every object has been consumed
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Current byte offset in the stream
    pub fn position(&mut self) -> Result<u64, FormatError> {
        Ok(self.inner.stream_position()?)
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> R {
        self.inner
    }

    // ========================================================================
    // Protocol state
    // ========================================================================

    fn expect(&self, phase: Phase, operation: &'static str) -> Result<(), FormatError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(FormatError::OutOfOrder {
                operation,
                phase: self.phase.name(),
            })
        }
    }

    fn open_record(&self, operation: &'static str) -> Result<(u32, u8), FormatError> {
        match self.phase {
            Phase::RecordOpen {
                vertex_count,
                dimensions,
            } => Ok((vertex_count, dimensions)),
            phase => Err(FormatError::OutOfOrder {
                operation,
                phase: phase.name(),
            }),
        }
    }

    /// Poison the reader if a decode step failed
    fn check<T>(&mut self, result: Result<T, FormatError>) -> Result<T, FormatError> {
        if result.is_err() {
            self.phase = Phase::Failed;
            self.at_object_start = false;
        }
        result
    }

    fn finish_record(&mut self) {
        self.records_remaining -= 1;
        if self.records_remaining == 0 {
            self.close_object();
        } else {
            self.phase = Phase::ObjectOpen;
        }
    }

    fn close_object(&mut self) {
        self.phase = if self.objects_remaining == 0 {
            Phase::Done
        } else {
            Phase::HeaderRead
        };
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    fn read_container_header(inner: &mut R) -> Result<ContainerHeader, FormatError> {
        let version = read_i32(inner)?;
        if version != ATTRDATA_VERSION {
            return Err(FormatError::UnsupportedVersion {
                expected: ATTRDATA_VERSION,
                found: version,
            });
        }

        let object_count = read_count(inner, "object count")?;
        Ok(ContainerHeader {
            version,
            object_count,
        })
    }

    fn read_object_header(inner: &mut R) -> Result<ObjectHeader, FormatError> {
        let name = read_string(inner)?;
        let channel = read_i32(inner)?;
        let component = read_i32(inner)?;
        let record_count = read_count(inner, "record count")?;

        Ok(ObjectHeader {
            name,
            source: ChannelSource { channel, component },
            record_count,
        })
    }

    fn read_record_header(inner: &mut R) -> Result<RecordHeader, FormatError> {
        let attribute_name = read_string(inner)?;
        let vertex_count = read_count(inner, "vertex count")?;
        let dimensions = read_i32(inner)?;

        let dimensions = match u8::try_from(dimensions) {
            Ok(dims) if (1..=MAX_DIMENSIONS).contains(&dims) => dims,
            _ => {
                return Err(FormatError::InvalidDimensions {
                    attribute: attribute_name,
                    dimensions,
                });
            }
        };

        Ok(RecordHeader {
            attribute_name,
            vertex_count,
            dimensions,
        })
    }

    fn skip_bytes(&mut self, len: u64) -> Result<(), FormatError> {
        let position = self.inner.stream_position()?;
        let target = position.checked_add(len).ok_or(FormatError::Truncated)?;
        if target > self.len {
            return Err(FormatError::Truncated);
        }
        self.inner.seek(SeekFrom::Start(target))?;
        Ok(())
    }

    fn peek_records(&mut self) -> Result<Vec<String>, FormatError> {
        let start = self.inner.stream_position()?;

        let mut names = Vec::new();
        for _ in 0..self.records_remaining {
            let header = Self::read_record_header(&mut self.inner)?;
            self.skip_bytes(header.data_len())?;
            names.push(header.attribute_name);
        }

        self.inner.seek(SeekFrom::Start(start))?;
        Ok(names)
    }
}
