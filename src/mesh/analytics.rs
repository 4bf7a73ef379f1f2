// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh analytics and quality measures

use super::SurfaceMesh;
use serde::{Deserialize, Serialize};

/// Mesh statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    /// Total area in square units
    pub area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Area-weighted centroid [x, y, z]
    pub centroid: [f64; 3],
    pub node_count: usize,
    pub triangle_count: usize,
    pub boundary_edge_count: usize,
    /// Total length of the boundary edges
    pub boundary_length: f64,
    pub min_edge_length: f64,
    pub max_edge_length: f64,
    /// Worst radius ratio `2·r_in / r_circ` (1 for an equilateral triangle)
    pub min_quality: f64,
    pub mean_quality: f64,
}

impl MeshStats {
    pub fn empty() -> Self {
        Self {
            area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            node_count: 0,
            triangle_count: 0,
            boundary_edge_count: 0,
            boundary_length: 0.0,
            min_edge_length: 0.0,
            max_edge_length: 0.0,
            min_quality: 0.0,
            mean_quality: 0.0,
        }
    }

    /// Pretty print statistics
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║                   MESH ANALYTICS                         ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Area:            {:>10.4}                              ║", self.area);
        println!(
            "║ Centroid:        ({:>7.3}, {:>7.3}, {:>7.3})            ║",
            self.centroid[0], self.centroid[1], self.centroid[2]
        );
        println!(
            "║ Size:            {:>7.3} × {:>7.3} × {:>7.3}            ║",
            self.bbox[3] - self.bbox[0],
            self.bbox[4] - self.bbox[1],
            self.bbox[5] - self.bbox[2]
        );
        println!("║                                                          ║");
        println!("║ Nodes:           {:>10}                              ║", self.node_count);
        println!("║ Triangles:       {:>10}                              ║", self.triangle_count);
        println!(
            "║ Boundary edges:  {:>10}                              ║",
            self.boundary_edge_count
        );
        println!(
            "║ Edge length:     {:>8.4} .. {:<8.4}                      ║",
            self.min_edge_length, self.max_edge_length
        );
        println!(
            "║ Quality:         min {:>6.3}  mean {:>6.3}                 ║",
            self.min_quality, self.mean_quality
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

/// Analyze a surface mesh
pub fn analyze(mesh: &SurfaceMesh) -> MeshStats {
    if mesh.nodes.is_empty() || mesh.triangles.is_empty() {
        return MeshStats::empty();
    }

    let bbox = mesh.bounding_box();
    let mut area = 0.0;
    let mut weighted = nalgebra::Vector3::zeros();
    let mut min_quality = f64::INFINITY;
    let mut quality_sum = 0.0;

    for triangle in &mesh.triangles {
        let [p0, p1, p2] = mesh.positions(triangle);
        let a = mesh.triangle_area(triangle);
        area += a;
        weighted += (p0.coords + p1.coords + p2.coords) / 3.0 * a;

        let q = radius_ratio((p1 - p0).norm(), (p2 - p1).norm(), (p0 - p2).norm(), a);
        min_quality = min_quality.min(q);
        quality_sum += q;
    }

    let mut min_edge_length = f64::INFINITY;
    let mut max_edge_length: f64 = 0.0;
    for &(a, b) in mesh.edge_usage().keys() {
        let len = (mesh.nodes[b].position - mesh.nodes[a].position).norm();
        min_edge_length = min_edge_length.min(len);
        max_edge_length = max_edge_length.max(len);
    }

    let boundary_length = mesh
        .boundary_edges
        .iter()
        .map(|e| (mesh.nodes[e.nodes[1]].position - mesh.nodes[e.nodes[0]].position).norm())
        .sum();

    let centroid = if area > 0.0 { weighted / area } else { weighted };

    MeshStats {
        area,
        bbox: [
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z,
        ],
        centroid: [centroid.x, centroid.y, centroid.z],
        node_count: mesh.node_count(),
        triangle_count: mesh.triangle_count(),
        boundary_edge_count: mesh.boundary_edges.len(),
        boundary_length,
        min_edge_length,
        max_edge_length,
        min_quality,
        mean_quality: quality_sum / mesh.triangle_count() as f64,
    }
}

/// Normalized radius ratio of a triangle with sides a, b, c and area `area`
fn radius_ratio(a: f64, b: f64, c: f64, area: f64) -> f64 {
    let s = 0.5 * (a + b + c);
    if area <= 0.0 || s <= 0.0 {
        return 0.0;
    }
    let r_in = area / s;
    let r_circ = a * b * c / (4.0 * area);
    2.0 * r_in / r_circ
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Node, Triangle};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_equilateral_quality() {
        let mut mesh = SurfaceMesh::new();
        mesh.add_node(Node::new(Point3::new(0.0, 0.0, 0.0), true));
        mesh.add_node(Node::new(Point3::new(1.0, 0.0, 0.0), true));
        mesh.add_node(Node::new(Point3::new(0.5, 3f64.sqrt() / 2.0, 0.0), true));
        mesh.add_triangle(Triangle::new([0, 1, 2]));

        let stats = analyze(&mesh);
        assert_relative_eq!(stats.min_quality, 1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.area, 3f64.sqrt() / 4.0, epsilon = 1e-12);
        assert_relative_eq!(stats.min_edge_length, 1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.centroid[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_right_triangle_quality() {
        // Isosceles right triangle: 2·r_in/r_circ = 2(√2 − 1)
        assert_relative_eq!(
            radius_ratio(1.0, 1.0, 2f64.sqrt(), 0.5),
            2.0 * (2f64.sqrt() - 1.0),
            epsilon = 1e-12
        );
        assert_eq!(radius_ratio(1.0, 1.0, 2.0, 0.0), 0.0);
    }

    #[test]
    fn test_empty_mesh() {
        assert_eq!(analyze(&SurfaceMesh::new()), MeshStats::empty());
    }
}
