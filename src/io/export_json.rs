// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON mesh export with named boundary groups

use crate::mesh::{analyze, MeshStats, SurfaceMesh};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Boundary edges sharing a side tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryGroup {
    pub name: String,
    pub side: u32,
    pub edges: Vec<[usize; 2]>,
}

/// Serialized form of a computed mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDocument {
    pub name: String,
    pub nodes: Vec<[f64; 3]>,
    pub triangles: Vec<[usize; 3]>,
    pub groups: Vec<BoundaryGroup>,
    pub stats: MeshStats,
}

impl MeshDocument {
    pub fn from_mesh(name: &str, mesh: &SurfaceMesh) -> Self {
        let mut sides: BTreeMap<u32, Vec<[usize; 2]>> = BTreeMap::new();
        for edge in &mesh.boundary_edges {
            sides.entry(edge.side).or_default().push(edge.nodes);
        }

        Self {
            name: name.to_string(),
            nodes: mesh
                .nodes
                .iter()
                .map(|n| [n.position.x, n.position.y, n.position.z])
                .collect(),
            triangles: mesh.triangles.iter().map(|t| t.indices).collect(),
            groups: sides
                .into_iter()
                .map(|(side, edges)| BoundaryGroup {
                    name: format!("side_{}", side),
                    side,
                    edges,
                })
                .collect(),
            stats: analyze(mesh),
        }
    }
}

/// Export a mesh with its boundary groups and statistics as JSON
pub fn export_json(name: &str, mesh: &SurfaceMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let document = MeshDocument::from_mesh(name, mesh);
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, json).context(format!("Failed to write JSON mesh: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Face, Orientation};
    use crate::mesh::{FaceMesher, Hypothesis};
    use nalgebra::Point3;
    use tempfile::TempDir;

    #[test]
    fn test_json_document_groups_sides() -> Result<()> {
        let (u, v) = Orientation::Oxy.axes();
        let face = Face::rectangle(Point3::origin(), u, v, 3.0, 1.0);
        let mesh = FaceMesher::for_face(&face, &Hypothesis::with_max_size(0.5))?.mesh(&face)?;

        let dir = TempDir::new()?;
        let path = dir.path().join("Mesh_1.json");
        export_json("Mesh_1", &mesh, &path)?;

        let document: MeshDocument = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(document.name, "Mesh_1");
        assert_eq!(document.triangles.len(), mesh.triangle_count());
        let names: Vec<&str> = document.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["side_1", "side_2", "side_3", "side_4"]);
        assert_eq!(document.groups[0].edges.len(), 6);
        Ok(())
    }
}
