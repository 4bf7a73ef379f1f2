// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangular surface mesh

use crate::geometry::BoundingBox;
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Mesh node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub position: Point3<f64>,
    /// True for nodes on the face boundary
    pub on_boundary: bool,
}

impl Node {
    pub fn new(position: Point3<f64>, on_boundary: bool) -> Self {
        Self {
            position,
            on_boundary,
        }
    }
}

/// Triangle defined by three node indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    /// Edges as (start, end) node pairs following the winding
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Boundary segment tagged with the face side it lies on (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryEdge {
    pub nodes: [usize; 2],
    pub side: u32,
}

/// Triangular surface mesh of a planar face
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub nodes: Vec<Node>,
    pub triangles: Vec<Triangle>,
    pub boundary_edges: Vec<BoundaryEdge>,
}

impl SurfaceMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(node_count: usize, triangle_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
            triangles: Vec::with_capacity(triangle_count),
            boundary_edges: Vec::new(),
        }
    }

    /// Add a node and return its index
    pub fn add_node(&mut self, node: Node) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.nodes.iter().map(|n| &n.position))
    }

    pub fn positions(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        triangle.indices.map(|i| self.nodes[i].position)
    }

    /// Unnormalized normal of a triangle (length is twice its area)
    pub fn triangle_normal(&self, triangle: &Triangle) -> Vector3<f64> {
        let [p0, p1, p2] = self.positions(triangle);
        (p1 - p0).cross(&(p2 - p0))
    }

    pub fn triangle_area(&self, triangle: &Triangle) -> f64 {
        0.5 * self.triangle_normal(triangle).norm()
    }

    /// Number of triangles using each undirected edge
    pub fn edge_usage(&self) -> AHashMap<(usize, usize), usize> {
        let mut usage = AHashMap::new();
        for triangle in &self.triangles {
            for (a, b) in triangle.edges() {
                let key = if a < b { (a, b) } else { (b, a) };
                *usage.entry(key).or_insert(0) += 1;
            }
        }
        usage
    }

    /// Edges used by exactly one triangle, oriented as in that triangle
    pub fn free_edges(&self) -> Vec<(usize, usize)> {
        let usage = self.edge_usage();
        let mut edges = Vec::new();
        for triangle in &self.triangles {
            for (a, b) in triangle.edges() {
                let key = if a < b { (a, b) } else { (b, a) };
                if usage.get(&key) == Some(&1) {
                    edges.push((a, b));
                }
            }
        }
        edges
    }

    /// Nodes sharing an edge with each node
    pub fn neighbours(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for triangle in &self.triangles {
            for (a, b) in triangle.edges() {
                if !adjacency[a].contains(&b) {
                    adjacency[a].push(b);
                }
                if !adjacency[b].contains(&a) {
                    adjacency[b].push(a);
                }
            }
        }
        adjacency
    }

    /// Boundary edges lying on a given side
    pub fn boundary_group(&self, side: u32) -> impl Iterator<Item = &BoundaryEdge> {
        self.boundary_edges.iter().filter(move |e| e.side == side)
    }

    /// Remove nodes no triangle references, remapping indices
    pub fn remove_orphaned_nodes(&mut self) -> usize {
        let mut used = vec![false; self.nodes.len()];
        for triangle in &self.triangles {
            for &i in &triangle.indices {
                used[i] = true;
            }
        }

        let mut remap = vec![usize::MAX; self.nodes.len()];
        let mut kept = Vec::with_capacity(self.nodes.len());
        for (old, node) in self.nodes.iter().enumerate() {
            if used[old] {
                remap[old] = kept.len();
                kept.push(*node);
            }
        }

        for triangle in &mut self.triangles {
            triangle.indices = triangle.indices.map(|i| remap[i]);
        }
        self.boundary_edges.retain(|e| used[e.nodes[0]] && used[e.nodes[1]]);
        for edge in &mut self.boundary_edges {
            edge.nodes = edge.nodes.map(|i| remap[i]);
        }

        let removed = self.nodes.len() - kept.len();
        self.nodes = kept;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square split along its diagonal
    fn square() -> SurfaceMesh {
        let mut mesh = SurfaceMesh::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            mesh.add_node(Node::new(Point3::new(x, y, 0.0), true));
        }
        mesh.add_triangle(Triangle::new([0, 1, 2]));
        mesh.add_triangle(Triangle::new([0, 2, 3]));
        mesh
    }

    #[test]
    fn test_edge_usage_and_free_edges() {
        let mesh = square();
        let usage = mesh.edge_usage();
        assert_eq!(usage.get(&(0, 2)), Some(&2));
        assert_eq!(mesh.free_edges().len(), 4);
        assert_eq!(mesh.triangle_area(&mesh.triangles[0]), 0.5);
        assert!(mesh.triangle_normal(&mesh.triangles[1]).z > 0.0);
    }

    #[test]
    fn test_neighbours() {
        let neighbours = square().neighbours();
        assert_eq!(neighbours[0].len(), 3);
        assert_eq!(neighbours[1].len(), 2);
    }

    #[test]
    fn test_remove_orphaned_nodes() {
        let mut mesh = square();
        mesh.add_node(Node::new(Point3::new(5.0, 5.0, 0.0), false));
        mesh.triangles[1] = Triangle::new([0, 2, 4]);
        mesh.boundary_edges.push(BoundaryEdge { nodes: [3, 0], side: 4 });
        mesh.boundary_edges.push(BoundaryEdge { nodes: [0, 1], side: 1 });

        assert_eq!(mesh.remove_orphaned_nodes(), 1);
        assert_eq!(mesh.node_count(), 4);
        assert_eq!(mesh.triangles[1].indices, [0, 2, 3]);
        assert_eq!(mesh.boundary_edges.len(), 1);
        assert_eq!(mesh.boundary_group(1).count(), 1);
    }
}
