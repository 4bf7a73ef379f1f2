// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL export and import

use crate::mesh::{Node, SurfaceMesh, Triangle};
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Write `mesh` as binary STL to `writer`
pub fn write_stl<W: Write>(mesh: &SurfaceMesh, writer: &mut W) -> Result<()> {
    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|tri| {
            // Facet normals come from the triangle winding
            let normal = mesh.triangle_normal(tri);
            let [v0, v1, v2] = mesh.positions(tri);
            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    StlVertex::new([v0.x as f32, v0.y as f32, v0.z as f32]),
                    StlVertex::new([v1.x as f32, v1.y as f32, v1.z as f32]),
                    StlVertex::new([v2.x as f32, v2.y as f32, v2.z as f32]),
                ],
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter()).context("Failed to write STL data")?;
    Ok(())
}

/// Export mesh to a binary STL file
pub fn export_stl(mesh: &SurfaceMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).context(format!("Failed to create STL file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_stl(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Load an STL file into a surface mesh.
///
/// STL carries no boundary information, so no node is flagged as boundary
/// and no boundary edges are recorded.
pub fn import_stl(path: impl AsRef<Path>) -> Result<SurfaceMesh> {
    let path = path.as_ref();
    let mut file = File::open(path).context(format!("Failed to open STL file: {:?}", path))?;
    let stl = stl_io::read_stl(&mut file).context("Failed to read STL file")?;

    let mut mesh = SurfaceMesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for v in &stl.vertices {
        mesh.add_node(Node::new(
            Point3::new(v[0] as f64, v[1] as f64, v[2] as f64),
            false,
        ));
    }
    for face in &stl.faces {
        mesh.add_triangle(Triangle::new(face.vertices));
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;
    use crate::geometry::Face;
    use crate::mesh::{FaceMesher, Hypothesis};
    use tempfile::TempDir;

    #[test]
    fn test_stl_export_preserves_triangles() -> Result<()> {
        let (u, v) = Orientation::Oxy.axes();
        let face = Face::rectangle(Point3::origin(), u, v, 2.0, 1.0);
        let mesh = FaceMesher::for_face(&face, &Hypothesis::with_max_size(0.5))?.mesh(&face)?;

        let dir = TempDir::new()?;
        let path = dir.path().join("plate.stl");
        export_stl(&mesh, &path)?;

        // 80 byte header, 4 byte count, 50 bytes per facet
        let size = std::fs::metadata(&path)?.len();
        assert_eq!(size, 84 + 50 * mesh.triangle_count() as u64);

        let loaded = import_stl(&path)?;
        assert_eq!(loaded.triangle_count(), mesh.triangle_count());
        assert_eq!(loaded.node_count(), mesh.node_count());
        Ok(())
    }
}
