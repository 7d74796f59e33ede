//! End-to-end import tests: encoded container -> importer -> mesh channels

mod common;

use std::io::Cursor;

use attr_import::{
    AttrDataReader, AttributeConfig, AttributeConfigSet, AttributeImporter, AttributeTarget,
    ColorComponent, FormatError, ImportIssue, ImportSettings, MeshBuffers, NamedMeshes, Rgba,
    SingleMesh, UvChannel, UvComponent, bits_from_index,
};
use common::{Writer, indexed_mesh};
use glam::{Vec2, Vec4};
use tempfile::tempdir;

fn uv(channel: UvChannel, component: UvComponent) -> AttributeTarget {
    AttributeTarget::Uv { channel, component }
}

fn reader(bytes: Vec<u8>) -> AttrDataReader<Cursor<Vec<u8>>> {
    AttrDataReader::new(Cursor::new(bytes)).expect("Failed to wrap stream")
}

/// Reversed correspondence: destination vertex i came from source vertex 7 - i
#[test]
fn test_cube_temperature() {
    let temperature: Vec<f32> = (0..8).map(|i| i as f32).collect();
    let bytes = Writer::new()
        .object("Cube", 1, &[("temperature", 1, temperature.as_slice())])
        .finish();

    let indices: Vec<i32> = (0..8).rev().collect();
    let mut meshes = NamedMeshes::new([indexed_mesh("Cube", &indices)]);

    let importer = AttributeImporter::new(
        vec![AttributeConfig::new(
            "temperature",
            vec![uv(UvChannel::Uv0, UvComponent::X)],
        )],
        ImportSettings::default(),
    );
    let report = importer
        .import(&mut reader(bytes), &mut meshes)
        .expect("Import failed");

    assert_eq!(report.objects_imported, 1);
    assert_eq!(report.records_applied, 1);
    assert!(report.issues.is_empty());

    let mesh = meshes.get("Cube").unwrap();
    for (vertex, value) in mesh.uv(0).iter().enumerate() {
        assert_eq!(value.x, (7 - vertex) as f32, "vertex {vertex}");
        assert_eq!(value.y, 0.0);
    }
}

/// Indices carried in uv2.y; uv2.x holds unrelated data
#[test]
fn test_correspondence_from_y_component() {
    let bytes = Writer::new()
        .object_with_source("Cube", 2, 1, &[("heat", 1, &[10.0, 20.0, 30.0])])
        .finish();

    let uvs: Vec<Vec2> = [2, 0, 1]
        .iter()
        .map(|&index| Vec2::new(0.75, bits_from_index(index)))
        .collect();
    let mesh = MeshBuffers::new("Cube", 3).with_uv2(2, &uvs);

    let importer = AttributeImporter::new(
        vec![AttributeConfig::new(
            "heat",
            vec![uv(UvChannel::Uv0, UvComponent::W)],
        )],
        ImportSettings::default(),
    );
    let mut meshes = SingleMesh(mesh);
    let report = importer.import(&mut reader(bytes), &mut meshes).unwrap();
    assert!(report.issues.is_empty());

    let mesh = meshes.into_inner();
    let w: Vec<f32> = mesh.uv(0).iter().map(|uv| uv.w).collect();
    assert_eq!(w, vec![30.0, 10.0, 20.0]);
}

/// Two attributes share uv0 and the color; neither clobbers the other
#[test]
fn test_co_written_channels() {
    let bytes = Writer::new()
        .object(
            "Cube",
            1,
            &[
                ("temperature", 1, &[1.0, 2.0]),
                ("flow", 2, &[10.0, 20.0, 30.0, 40.0]),
            ],
        )
        .finish();

    let importer = AttributeImporter::new(
        vec![
            AttributeConfig::new(
                "temperature",
                vec![AttributeTarget::Color {
                    component: ColorComponent::R,
                }],
            ),
            AttributeConfig::new(
                "flow",
                vec![
                    uv(UvChannel::Uv0, UvComponent::Z),
                    AttributeTarget::Color {
                        component: ColorComponent::G,
                    },
                ],
            ),
        ],
        ImportSettings::default(),
    );

    let mut meshes = SingleMesh(indexed_mesh("Cube", &[0, 1]));
    importer.import(&mut reader(bytes), &mut meshes).unwrap();
    let mesh = meshes.into_inner();

    assert_eq!(
        mesh.uv(0),
        &[Vec4::new(0.0, 0.0, 10.0, 0.0), Vec4::new(0.0, 0.0, 30.0, 0.0)]
    );
    assert_eq!(
        mesh.color_values(),
        &[Rgba::new(1.0, 20.0, 0.0, 0.0), Rgba::new(2.0, 40.0, 0.0, 0.0)]
    );
}

#[test]
fn test_missing_config_does_not_affect_other_records() {
    let bytes = Writer::new()
        .object(
            "Cube",
            1,
            &[
                ("unconfigured", 3, &[9.0; 6]),
                ("temperature", 1, &[5.0, 6.0]),
            ],
        )
        .finish();

    let importer = AttributeImporter::new(
        vec![AttributeConfig::new(
            "temperature",
            vec![uv(UvChannel::Uv2, UvComponent::X)],
        )],
        ImportSettings::default(),
    );

    let mut meshes = SingleMesh(indexed_mesh("Cube", &[1, 0]));
    let report = importer.import(&mut reader(bytes), &mut meshes).unwrap();

    assert_eq!(report.records_skipped, 1);
    assert_eq!(report.records_applied, 1);
    assert_eq!(
        report.issues,
        vec![ImportIssue::MissingConfig {
            object: "Cube".to_string(),
            attribute: "unconfigured".to_string(),
        }]
    );

    let mesh = meshes.into_inner();
    let x: Vec<f32> = mesh.uv(2).iter().map(|uv| uv.x).collect();
    assert_eq!(x, vec![6.0, 5.0]);
}

#[test]
fn test_index_out_of_range_aborts_record() {
    let bytes = Writer::new()
        .object(
            "Cube",
            1,
            &[("bad", 1, &[1.0, 2.0]), ("good", 1, &[3.0, 4.0, 5.0])],
        )
        .finish();

    let importer = AttributeImporter::new(
        vec![
            AttributeConfig::new("bad", vec![uv(UvChannel::Uv0, UvComponent::X)]),
            AttributeConfig::new("good", vec![uv(UvChannel::Uv0, UvComponent::Y)]),
        ],
        ImportSettings::default(),
    );

    // Vertex 1 claims source vertex 2, which only "good" has
    let mut meshes = SingleMesh(indexed_mesh("Cube", &[0, 2]));
    let report = importer.import(&mut reader(bytes), &mut meshes).unwrap();

    assert!(report.has_errors());
    assert_eq!(report.records_applied, 1);
    assert_eq!(report.records_skipped, 1);
    assert!(matches!(
        &report.issues[0],
        ImportIssue::IndexOutOfRange {
            attribute,
            vertex: 1,
            index: 2,
            vertex_count: 2,
            ..
        } if attribute == "bad"
    ));

    // Nothing from "bad" was written, not even vertex 0
    let mesh = meshes.into_inner();
    assert_eq!(
        mesh.uv(0),
        &[Vec4::new(0.0, 3.0, 0.0, 0.0), Vec4::new(0.0, 5.0, 0.0, 0.0)]
    );
}

#[test]
fn test_named_meshes_collision_and_missing() {
    let bytes = Writer::new()
        .object("Cube", 1, &[("temperature", 1, &[1.0])])
        .object("Ghost", 1, &[("temperature", 1, &[2.0])])
        .finish();

    let importer = AttributeImporter::new(
        vec![AttributeConfig::new(
            "temperature",
            vec![uv(UvChannel::Uv0, UvComponent::X)],
        )],
        ImportSettings::default(),
    );

    let mut meshes = NamedMeshes::new([indexed_mesh("Cube", &[0]), indexed_mesh("Cube", &[0])]);
    let report = importer.import(&mut reader(bytes), &mut meshes).unwrap();

    assert_eq!(
        report.issues,
        vec![
            ImportIssue::NameCollision {
                name: "Cube".to_string()
            },
            ImportIssue::MeshNotFound {
                object: "Ghost".to_string()
            },
        ]
    );
    assert_eq!(report.objects_imported, 1);
    assert_eq!(report.objects_skipped, 1);

    let all = meshes.into_meshes();
    assert_eq!(all[0].uv(0), &[Vec4::new(1.0, 0.0, 0.0, 0.0)]);
    assert!(all[1].uv(0).is_empty());
}

#[test]
fn test_version_mismatch_is_fatal() {
    let bytes = Writer::with_version(7)
        .object("Cube", 1, &[("temperature", 1, &[1.0])])
        .finish();

    let importer = AttributeImporter::default();
    let mut meshes = SingleMesh(indexed_mesh("Cube", &[0]));
    let err = importer
        .import(&mut reader(bytes), &mut meshes)
        .unwrap_err();

    assert!(matches!(
        err,
        FormatError::UnsupportedVersion {
            expected: 1,
            found: 7
        }
    ));
    assert!(meshes.into_inner().uv(0).is_empty());
}

#[test]
fn test_truncated_file_is_fatal() {
    let mut bytes = Writer::new()
        .object("Cube", 1, &[("temperature", 1, &[1.0, 2.0])])
        .finish();
    bytes.truncate(bytes.len() - 3);

    let importer = AttributeImporter::new(
        vec![AttributeConfig::new(
            "temperature",
            vec![uv(UvChannel::Uv0, UvComponent::X)],
        )],
        ImportSettings::default(),
    );
    let mut meshes = SingleMesh(indexed_mesh("Cube", &[0, 1]));

    assert!(matches!(
        importer.import(&mut reader(bytes), &mut meshes),
        Err(FormatError::Truncated)
    ));
}

#[test]
fn test_import_file_with_toml_config() {
    let dir = tempdir().expect("Failed to create temp dir");
    let model = dir.path().join("cube.fbx");
    let sidecar = attr_import::sidecar_path(&model);
    let config_path = dir.path().join("attributes.toml");

    std::fs::write(
        &sidecar,
        Writer::new()
            .object("Cube", 1, &[("wetness", 2, &[0.25, 0.5, 0.75, 1.0])])
            .finish(),
    )
    .expect("Failed to write sidecar");

    std::fs::write(
        &config_path,
        r#"
        [settings]
        verbosity = "silent"

        [[attribute]]
        name = "wetness"
        targets = [
            { kind = "uv", channel = "uv3", component = "w" },
            { kind = "none" },
        ]
        "#,
    )
    .expect("Failed to write config");

    let configs = AttributeConfigSet::load(&config_path).expect("Failed to load config");
    let importer = AttributeImporter::from_config_set(&configs);

    let mut meshes = SingleMesh(indexed_mesh("Cube", &[1, 1, 0]));
    let report = importer
        .import_file(&sidecar, &mut meshes)
        .expect("Import failed");
    assert_eq!(report.records_applied, 1);

    let mesh: MeshBuffers = meshes.into_inner();
    let w: Vec<f32> = mesh.uv(3).iter().map(|uv| uv.w).collect();
    assert_eq!(w, vec![0.75, 0.75, 0.25]);
    assert!(mesh.uv(3).iter().all(|uv| uv.x == 0.0));
}
