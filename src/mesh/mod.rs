// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh module - surface meshes, 2D algorithms and mesh objects

mod algorithm;
mod analytics;
mod delaunay;
#[allow(clippy::module_inception)]
mod mesh;
mod mesher;
mod object;

pub use algorithm::{Algorithm, AlgorithmKind, Hypothesis};
pub use analytics::{analyze, MeshStats};
pub use delaunay::{in_circle, orient2d, triangulate};
pub use mesh::{BoundaryEdge, Node, SurfaceMesh, Triangle};
pub use mesher::FaceMesher;
pub use object::{ComputeReport, ComputeStatus, MeshObject};
