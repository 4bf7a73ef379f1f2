// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face mesher: boundary discretization, interior seeding, Delaunay
//! triangulation and Laplacian smoothing

use super::algorithm::Hypothesis;
use super::delaunay::{orient2d, triangulate};
use super::mesh::{BoundaryEdge, Node, SurfaceMesh, Triangle};
use crate::error::MeshError;
use crate::geometry::Face;
use nalgebra::{Point2, Vector2};
use tracing::{debug, warn};

/// Default number of smoothing passes over interior nodes
const SMOOTHING_PASSES: usize = 3;

/// Triangulates convex planar faces at a fixed element size
#[derive(Debug, Clone, Copy)]
pub struct FaceMesher {
    pub element_size: f64,
    pub smoothing_passes: usize,
}

impl FaceMesher {
    /// Mesher for `face` with the size resolved from `hypothesis`
    pub fn for_face(face: &Face, hypothesis: &Hypothesis) -> Result<Self, MeshError> {
        Ok(Self {
            element_size: hypothesis.element_size(face)?,
            smoothing_passes: SMOOTHING_PASSES,
        })
    }

    pub fn mesh(&self, face: &Face) -> Result<SurfaceMesh, MeshError> {
        let area = face.area();
        let perimeter = face.perimeter();
        if !area.is_finite() || area <= 1e-12 * perimeter * perimeter {
            return Err(MeshError::DegenerateFace { area });
        }
        if !face.is_convex() {
            return Err(MeshError::TriangulationFailed(
                "only convex faces can be meshed".to_string(),
            ));
        }

        let h = self.element_size;
        let (mut points, boundary_count) = self.boundary_points(face);
        points.extend(self.interior_points(face));
        debug!(
            element_size = h,
            boundary = boundary_count,
            interior = points.len() - boundary_count,
            "seeded face points"
        );

        let raw = triangulate(&points)?;
        let min_area = 1e-12 * h * h;
        let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(raw.len());
        let mut dropped = 0usize;
        for tri in raw {
            let [a, b, c] = tri.map(|i| points[i]);
            let centroid = Point2::from((a.coords + b.coords + c.coords) / 3.0);
            if 0.5 * orient2d(&a, &b, &c) > min_area && face.contains_local(&centroid, 1e-9 * h) {
                triangles.push(tri);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(dropped, "removed degenerate or exterior triangles");
        }
        if triangles.is_empty() {
            return Err(MeshError::TriangulationFailed(
                "no triangles inside the face".to_string(),
            ));
        }

        let mut mesh = SurfaceMesh::with_capacity(points.len(), triangles.len());
        for (i, p) in points.iter().enumerate() {
            mesh.add_node(Node::new(face.to_world(p), i < boundary_count));
        }
        for tri in &triangles {
            mesh.add_triangle(Triangle::new(*tri));
        }

        self.smooth(&mut points, &mesh, boundary_count);
        for (node, p) in mesh.nodes.iter_mut().zip(&points) {
            node.position = face.to_world(p);
        }
        mesh.boundary_edges = self.tag_boundary(face, &points, &mesh)?;

        let orphans = mesh.remove_orphaned_nodes();
        if orphans > 0 {
            debug!(orphans, "removed unused nodes");
        }
        Ok(mesh)
    }

    /// Evenly spaced points along each side, corners included once
    fn boundary_points(&self, face: &Face) -> (Vec<Point2<f64>>, usize) {
        let mut points = Vec::new();
        for (a, b) in face.edges() {
            let len = (b - a).norm();
            let segments = ((len / self.element_size) - 1e-9).ceil().max(1.0) as usize;
            for i in 0..segments {
                let t = i as f64 / segments as f64;
                points.push(a + (b - a) * t);
            }
        }
        let count = points.len();
        (points, count)
    }

    /// Equilateral lattice clipped to the face, kept half an element away from the boundary
    fn interior_points(&self, face: &Face) -> Vec<Point2<f64>> {
        let h = self.element_size;
        let row_step = h * 3f64.sqrt() / 2.0;
        let (min, max) = face.outer.iter().fold(
            (
                Point2::new(f64::INFINITY, f64::INFINITY),
                Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(lo, hi), p| {
                (
                    Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                    Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
                )
            },
        );

        let mut points = Vec::new();
        let mut row = 0usize;
        loop {
            let y = min.y + row as f64 * row_step;
            if y > max.y {
                break;
            }
            let offset = if row % 2 == 1 { 0.5 * h } else { 0.0 };
            let mut x = min.x + offset;
            while x <= max.x {
                let p = Point2::new(x, y);
                if distance_to_boundary(face, &p) >= 0.5 * h {
                    points.push(p);
                }
                x += h;
            }
            row += 1;
        }
        points
    }

    /// Laplacian smoothing of interior nodes, undoing any pass that inverts a triangle
    fn smooth(&self, points: &mut [Point2<f64>], mesh: &SurfaceMesh, boundary_count: usize) {
        if self.smoothing_passes == 0 {
            return;
        }
        let neighbours = mesh.neighbours();

        for pass in 0..self.smoothing_passes {
            let previous = points.to_vec();
            for i in boundary_count..points.len() {
                if neighbours[i].is_empty() {
                    continue;
                }
                let sum = neighbours[i]
                    .iter()
                    .fold(Vector2::zeros(), |acc, &j| acc + previous[j].coords);
                points[i] = Point2::from(sum / neighbours[i].len() as f64);
            }

            let inverted = mesh.triangles.iter().any(|t| {
                let [a, b, c] = t.indices;
                orient2d(&points[a], &points[b], &points[c]) <= 0.0
            });
            if inverted {
                warn!(pass, "smoothing inverted a triangle, keeping previous positions");
                points.copy_from_slice(&previous);
                break;
            }
        }
    }

    fn tag_boundary(
        &self,
        face: &Face,
        points: &[Point2<f64>],
        mesh: &SurfaceMesh,
    ) -> Result<Vec<BoundaryEdge>, MeshError> {
        let tol = 1e-9 * self.element_size.max(face.perimeter());
        let sides: Vec<(Point2<f64>, Point2<f64>)> = face.edges().collect();

        mesh.free_edges()
            .into_iter()
            .map(|(a, b)| {
                let side = sides
                    .iter()
                    .position(|(s, e)| {
                        distance_to_segment(&points[a], s, e) <= tol
                            && distance_to_segment(&points[b], s, e) <= tol
                    })
                    .ok_or_else(|| {
                        MeshError::TriangulationFailed(format!(
                            "free edge ({}, {}) does not lie on the face boundary",
                            a, b
                        ))
                    })?;
                Ok(BoundaryEdge {
                    nodes: [a, b],
                    side: side as u32 + 1,
                })
            })
            .collect()
    }
}

/// Smallest distance from an interior point to the sides of a convex face
fn distance_to_boundary(face: &Face, p: &Point2<f64>) -> f64 {
    face.edges()
        .map(|(a, b)| {
            let edge = b - a;
            let len = edge.norm();
            let to_p = p - a;
            (edge.x * to_p.y - edge.y * to_p.x) / len
        })
        .fold(f64::INFINITY, f64::min)
}

fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}
