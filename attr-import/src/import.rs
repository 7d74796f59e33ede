//! Sidecar import driver
//!
//! Walks a container object by object: finds the mesh, recovers the vertex
//! correspondence, then routes each configured record through an
//! [`AttributeRemapper`] that is flushed once per object.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use glam::Vec4;

use crate::config::{AttributeConfig, AttributeConfigSet, ImportSettings, Verbosity};
use crate::correspondence::IndexCorrespondence;
use crate::error::{FormatError, ImportIssue};
use crate::format::{AttrDataReader, ObjectHeader, RecordHeader};
use crate::mesh::{MeshChannels, MeshProvider};
use crate::remap::AttributeRemapper;

/// Outcome of one import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Objects whose channels were flushed to a mesh
    pub objects_imported: usize,
    /// Objects skipped because no mesh or correspondence was available
    pub objects_skipped: usize,
    pub records_applied: usize,
    pub records_skipped: usize,
    /// Every issue raised, in order, regardless of verbosity
    pub issues: Vec<ImportIssue>,
}

impl ImportReport {
    /// True if any issue is error severity
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity() == Verbosity::Error)
    }
}

/// Applies `.attrdata` containers to meshes
#[derive(Debug, Clone, Default)]
pub struct AttributeImporter {
    configs: Vec<AttributeConfig>,
    settings: ImportSettings,
}

impl AttributeImporter {
    pub fn new(configs: Vec<AttributeConfig>, settings: ImportSettings) -> Self {
        Self { configs, settings }
    }

    pub fn from_config_set(set: &AttributeConfigSet) -> Self {
        Self::new(set.attributes.clone(), set.settings.clone())
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn config_for(&self, attribute: &str) -> Option<&AttributeConfig> {
        self.configs.iter().find(|config| config.name == attribute)
    }

    /// Import the container at `path`
    pub fn import_file<P: MeshProvider>(
        &self,
        path: impl AsRef<Path>,
        meshes: &mut P,
    ) -> Result<ImportReport, FormatError> {
        let file = File::open(path.as_ref())?;
        let mut reader = AttrDataReader::new(BufReader::new(file))?;
        self.import(&mut reader, meshes)
    }

    /// Import every object in a fresh reader
    ///
    /// Stream errors abort the import; everything else is collected in the
    /// returned report and the import moves on to the next record or object.
    pub fn import<R, P>(
        &self,
        reader: &mut AttrDataReader<R>,
        meshes: &mut P,
    ) -> Result<ImportReport, FormatError>
    where
        R: Read + Seek,
        P: MeshProvider,
    {
        let mut report = ImportReport::default();

        for name in meshes.name_collisions().to_vec() {
            self.report(&mut report, ImportIssue::NameCollision { name });
        }

        let header = reader.open_header()?;
        if self.debug_enabled() {
            tracing::debug!(objects = header.object_count, "opened attrdata container");
        }

        while !reader.is_done() {
            let object = reader.begin_object()?;
            self.import_object(reader, meshes, &object, &mut report)?;
        }

        Ok(report)
    }

    fn import_object<R, P>(
        &self,
        reader: &mut AttrDataReader<R>,
        meshes: &mut P,
        object: &ObjectHeader,
        report: &mut ImportReport,
    ) -> Result<(), FormatError>
    where
        R: Read + Seek,
        P: MeshProvider,
    {
        let Some(mesh) = meshes.mesh_for(&object.name) else {
            self.report(report, ImportIssue::MeshNotFound {
                object: object.name.clone(),
            });
            return Self::skip_object(reader, report);
        };

        let correspondence = match IndexCorrespondence::resolve(&*mesh, object.source) {
            Ok(correspondence) => correspondence,
            Err(reason) => {
                self.report(report, ImportIssue::CorrespondenceUnavailable {
                    object: object.name.clone(),
                    reason,
                });
                return Self::skip_object(reader, report);
            }
        };

        if self.debug_enabled() {
            tracing::debug!(
                object = %object.name,
                mesh = %mesh.name(),
                records = object.record_count,
                vertices = mesh.vertex_count(),
                objects_left = reader.objects_remaining(),
                "importing object"
            );
        }

        let names = reader.peek_attribute_names()?;
        let configs: Vec<&AttributeConfig> = self
            .configs
            .iter()
            .filter(|config| names.contains(&config.name))
            .collect();

        let mut remapper = AttributeRemapper::new(&*mesh, configs.iter().copied());
        for issue in remapper.take_issues() {
            self.report(report, issue);
        }

        while reader.records_remaining() > 0 {
            let record = reader.begin_record()?;

            let Some(config) = configs
                .iter()
                .find(|config| config.name == record.attribute_name)
            else {
                self.report(report, ImportIssue::MissingConfig {
                    object: object.name.clone(),
                    attribute: record.attribute_name.clone(),
                });
                reader.skip_record()?;
                report.records_skipped += 1;
                continue;
            };

            let values = reader.read_record_vectors()?;
            match Self::map_record(mesh.name(), &correspondence, &record, &values) {
                Ok(mut mapped) => {
                    for transform in &config.transforms {
                        transform.apply(&mut mapped);
                    }
                    self.write_record(&mut remapper, config, &record, &mapped);
                    report.records_applied += 1;
                }
                Err(issue) => {
                    self.report(report, issue);
                    report.records_skipped += 1;
                }
            }
        }

        remapper.flush(mesh);
        report.objects_imported += 1;
        Ok(())
    }

    /// Gather each destination vertex's value from its source vertex
    ///
    /// Fails on the first index outside the record, before anything is written.
    fn map_record(
        mesh: &str,
        correspondence: &IndexCorrespondence,
        record: &RecordHeader,
        values: &[Vec4],
    ) -> Result<Vec<Vec4>, ImportIssue> {
        (0..correspondence.len())
            .map(|vertex| {
                correspondence
                    .source_index(vertex, values.len())
                    .map(|source| values[source])
                    .map_err(|index| ImportIssue::IndexOutOfRange {
                        mesh: mesh.to_string(),
                        attribute: record.attribute_name.clone(),
                        vertex,
                        index,
                        vertex_count: values.len(),
                    })
            })
            .collect()
    }

    fn write_record(
        &self,
        remapper: &mut AttributeRemapper,
        config: &AttributeConfig,
        record: &RecordHeader,
        mapped: &[Vec4],
    ) {
        if self.debug_enabled() {
            let routing: Vec<String> = config.targets.iter().map(ToString::to_string).collect();
            tracing::debug!(
                attribute = %record.attribute_name,
                dimensions = record.dimensions,
                targets = %routing.join(", "),
                "applying record"
            );
        }

        // Target i takes component i; components past the record's
        // dimensions are zero
        for (vertex, value) in mapped.iter().enumerate() {
            for (target, component) in config.targets.iter().zip(value.to_array()) {
                remapper.write(*target, vertex, component);
            }
        }
    }

    fn skip_object<R: Read + Seek>(
        reader: &mut AttrDataReader<R>,
        report: &mut ImportReport,
    ) -> Result<(), FormatError> {
        let skipped = reader.skip_object()?;
        report.records_skipped += skipped as usize;
        report.objects_skipped += 1;
        Ok(())
    }

    fn debug_enabled(&self) -> bool {
        self.settings.verbosity.allows(Verbosity::Debug)
    }

    fn report(&self, report: &mut ImportReport, issue: ImportIssue) {
        let severity = issue.severity();
        if self.settings.verbosity.allows(severity) {
            match severity {
                Verbosity::Error => tracing::error!("{issue}"),
                _ => tracing::warn!("{issue}"),
            }
        }
        report.issues.push(issue);
    }
}
