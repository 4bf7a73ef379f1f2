// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh object: a target shape, its algorithm, and the computed result

use super::algorithm::{Algorithm, AlgorithmKind};
use super::mesher::FaceMesher;
use super::SurfaceMesh;
use crate::error::MeshError;
use crate::geometry::Shape;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// State of the last computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComputeStatus {
    NotComputed,
    Done,
    Failed(String),
}

impl ComputeStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, ComputeStatus::Done)
    }
}

/// Summary of a successful computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeReport {
    pub node_count: usize,
    pub triangle_count: usize,
    pub boundary_edge_count: usize,
    pub element_size: f64,
    pub elapsed: Duration,
}

/// Mesh built on a geometric shape
#[derive(Debug, Clone)]
pub struct MeshObject {
    target: Shape,
    name: Option<String>,
    algorithm: Option<Algorithm>,
    result: Option<SurfaceMesh>,
    status: ComputeStatus,
    fail_next: bool,
}

impl MeshObject {
    pub fn new(target: &Shape) -> Self {
        Self {
            target: target.clone(),
            name: None,
            algorithm: None,
            result: None,
            status: ComputeStatus::NotComputed,
            fail_next: false,
        }
    }

    /// Assign a 2D triangulation algorithm, replacing any previous one
    pub fn triangle(&mut self, kind: AlgorithmKind) -> &mut Algorithm {
        self.algorithm.insert(Algorithm::new(kind))
    }

    pub fn algorithm(&self) -> Option<&Algorithm> {
        self.algorithm.as_ref()
    }

    pub fn algorithm_mut(&mut self) -> Option<&mut Algorithm> {
        self.algorithm.as_mut()
    }

    pub fn target(&self) -> &Shape {
        &self.target
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn status(&self) -> &ComputeStatus {
        &self.status
    }

    /// Computed mesh, if the last computation succeeded
    pub fn mesh(&self) -> Option<&SurfaceMesh> {
        self.result.as_ref()
    }

    /// Make the next `compute` fail with `MeshError::Forced`
    pub fn force_failure(&mut self) {
        self.fail_next = true;
    }

    /// Compute the mesh.
    ///
    /// On failure any previous result is discarded and the status records
    /// the error.
    #[instrument(skip(self), fields(name = self.name.as_deref().unwrap_or("<unnamed>")))]
    pub fn compute(&mut self) -> Result<ComputeReport, MeshError> {
        let start = Instant::now();
        match self.run() {
            Ok((mesh, element_size)) => {
                let report = ComputeReport {
                    node_count: mesh.node_count(),
                    triangle_count: mesh.triangle_count(),
                    boundary_edge_count: mesh.boundary_edges.len(),
                    element_size,
                    elapsed: start.elapsed(),
                };
                info!(
                    nodes = report.node_count,
                    triangles = report.triangle_count,
                    element_size,
                    "mesh computed"
                );
                self.result = Some(mesh);
                self.status = ComputeStatus::Done;
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, "mesh computation failed");
                self.result = None;
                self.status = ComputeStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<(SurfaceMesh, f64), MeshError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(MeshError::Forced);
        }

        let algorithm = self.algorithm.as_ref().ok_or(MeshError::NoAlgorithm)?;
        let face = self
            .target
            .as_face()
            .ok_or_else(|| MeshError::NotAFace(self.target.kind.type_name().to_string()))?;

        match algorithm.kind {
            AlgorithmKind::Triangle2D => {
                let mesher = FaceMesher::for_face(face, &algorithm.hypothesis)?;
                Ok((mesher.mesh(face)?, mesher.element_size))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeomBuilder;
    use crate::notebook::Notebook;

    fn face() -> Shape {
        let notebook = Notebook::new();
        GeomBuilder::new(&notebook).make_face_hw(3.0, 1.0, 1).unwrap()
    }

    #[test]
    fn test_compute_requires_algorithm() {
        let mut mesh = MeshObject::new(&face());
        assert_eq!(mesh.compute().unwrap_err(), MeshError::NoAlgorithm);
        assert!(matches!(mesh.status(), ComputeStatus::Failed(_)));
        assert!(mesh.mesh().is_none());
    }

    #[test]
    fn test_compute_triangulates_face() {
        let mut mesh = MeshObject::new(&face());
        mesh.triangle(AlgorithmKind::Triangle2D);
        let report = mesh.compute().unwrap();
        assert!(mesh.status().is_done());
        assert_eq!(report.triangle_count, mesh.mesh().unwrap().triangle_count());
        assert!(report.triangle_count > 0);
    }

    #[test]
    fn test_forced_failure_clears_result() {
        let mut mesh = MeshObject::new(&face());
        mesh.triangle(AlgorithmKind::Triangle2D);
        mesh.compute().unwrap();

        mesh.force_failure();
        assert_eq!(mesh.compute().unwrap_err(), MeshError::Forced);
        assert!(mesh.mesh().is_none());

        // The hook only affects one computation
        assert!(mesh.compute().is_ok());
    }

    #[test]
    fn test_non_face_target() {
        let notebook = Notebook::new();
        let vertex = GeomBuilder::new(&notebook).make_vertex(0, 0, 0).unwrap();
        let mut mesh = MeshObject::new(&vertex);
        mesh.triangle(AlgorithmKind::Triangle2D);
        assert_eq!(
            mesh.compute().unwrap_err(),
            MeshError::NotAFace("VERTEX".to_string())
        );
    }

    #[test]
    fn test_reassigning_algorithm_keeps_one() {
        let mut mesh = MeshObject::new(&face());
        mesh.triangle(AlgorithmKind::Triangle2D).set_max_size(0.5);
        mesh.triangle(AlgorithmKind::Triangle2D);
        assert_eq!(mesh.algorithm().unwrap().hypothesis.max_size, None);
    }
}
