// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Export tests for computed meshes and saved studies

use anyhow::Result;
use approx::assert_relative_eq;
use parmesh::io::{self, ExportFormat, MeshDocument};
use parmesh::mesh::analyze;
use parmesh::script::{sweep, sweep_name};
use parmesh::study::{EntryData, FORMAT_VERSION};
use parmesh::{Hypothesis, RectangleParams, ScriptOptions, Study, StudyError};
use tempfile::TempDir;

fn options() -> ScriptOptions {
    ScriptOptions {
        hypothesis: Hypothesis::with_max_size(0.25),
        ..ScriptOptions::default()
    }
}

#[test]
fn test_stl_export_of_procedure_mesh() -> Result<()> {
    let (output, _) = parmesh::run(&options())?;
    let mesh = output.mesh.mesh().expect("mesh computed");

    let dir = TempDir::new()?;
    let path = io::export_mesh(mesh, "Mesh_1", dir.path(), ExportFormat::Stl)?;
    assert_eq!(path.file_name().unwrap(), "Mesh_1.stl");

    let loaded = io::import_stl(&path)?;
    assert_eq!(loaded.triangle_count(), mesh.triangle_count());
    // STL stores single precision coordinates
    assert_relative_eq!(analyze(&loaded).area, 3.0, epsilon = 1e-4);
    Ok(())
}

#[test]
fn test_json_export_keeps_boundary_groups() -> Result<()> {
    let (output, _) = parmesh::run(&options())?;
    let mesh = output.mesh.mesh().expect("mesh computed");

    let dir = TempDir::new()?;
    let path = io::export_mesh(mesh, "Mesh_1", dir.path(), ExportFormat::Json)?;
    let document: MeshDocument = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    assert_eq!(document.nodes.len(), mesh.node_count());
    assert_eq!(document.groups.len(), 4);
    // 3 x 1 face at h = 0.25: 12 segments on the long sides, 4 on the short ones
    let counts: Vec<usize> = document.groups.iter().map(|g| g.edges.len()).collect();
    assert_eq!(counts, vec![12, 4, 12, 4]);
    assert_relative_eq!(document.stats.boundary_length, 8.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_study_round_trip() -> Result<()> {
    let (output, study) = parmesh::run(&options())?;

    let dir = TempDir::new()?;
    let path = dir.path().join("study.json");
    study.save(&path)?;
    let loaded = Study::load(&path)?;

    assert_eq!(loaded, study);
    assert_eq!(loaded.shape("Translation_1"), Some(&output.shapes.translation));
    match &loaded.find("Mesh_1").expect("mesh published").data {
        EntryData::Mesh(record) => {
            assert!(record.status.is_done());
            assert_eq!(record.triangle_count, output.report.unwrap().triangle_count);
            assert_eq!(record.target, loaded.find("Translation_1").map(|e| e.id));
        }
        other => panic!("expected mesh record, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_study_load_rejects_newer_version() -> Result<()> {
    let (_, study) = parmesh::run(&options())?;
    let json = study.to_json()?;
    let newer = json.replacen(
        &format!("\"version\": {}", FORMAT_VERSION),
        &format!("\"version\": {}", FORMAT_VERSION + 1),
        1,
    );

    let dir = TempDir::new()?;
    let path = dir.path().join("study.json");
    std::fs::write(&path, newer)?;
    assert!(matches!(Study::load(&path), Err(StudyError::FutureVersion { .. })));
    assert!(matches!(
        Study::load(dir.path().join("missing.json")),
        Err(StudyError::Io(_))
    ));
    Ok(())
}

#[test]
fn test_sweep_family_exports() -> Result<()> {
    let dims = [(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (4.0, 5.0)];
    let results = sweep(&dims, &ScriptOptions::default());

    let dir = TempDir::new()?;
    for result in &results {
        let output = result.outcome.as_ref().map_err(|e| anyhow::anyhow!("{}", e))?;
        let mesh = output.mesh.as_ref().expect("mesh computed");
        assert_relative_eq!(
            analyze(mesh).area,
            result.params.l_x * result.params.l_y,
            epsilon = 1e-9
        );
        io::export_mesh(mesh, &result.name, dir.path(), ExportFormat::Stl)?;
    }

    let expected = sweep_name(&RectangleParams::new(4.0, 5.0));
    assert!(dir.path().join(format!("{}.stl", expected)).exists());
    Ok(())
}
