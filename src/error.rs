// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types shared across the kernel

use thiserror::Error;

/// Errors raised while defining or evaluating notebook variables
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotebookError {
    #[error("unknown notebook variable: {0}")]
    UnknownVariable(String),

    #[error("invalid variable name: {0:?}")]
    InvalidName(String),

    #[error("failed to parse expression {expression:?}: {message}")]
    Parse { expression: String, message: String },

    #[error("cyclic dependency between notebook variables: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("variable {name} evaluates to a non-finite value ({value})")]
    NonFinite { name: String, value: f64 },

    #[error("unknown function: {0}")]
    UnknownFunction(String),
}

/// Errors raised by the geometry builder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{what} must be a positive finite number, got {value}")]
    NonPositiveDimension { what: &'static str, value: f64 },

    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("invalid face orientation {0} (expected 1 = OXY, 2 = OYZ, 3 = OZX)")]
    InvalidOrientation(i32),

    #[error("vector has zero length")]
    ZeroVector,

    #[error(transparent)]
    Notebook(#[from] NotebookError),
}

/// Errors raised by the study (document tree)
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("name {0:?} is already used in the study")]
    DuplicateName(String),

    #[error("name must not be empty")]
    EmptyName,

    #[error("no study entry with id {0}")]
    UnknownEntry(u64),

    #[error("mesh has no algorithm to name")]
    NoAlgorithm,

    #[error("unknown study format: {0}")]
    UnknownFormat(String),

    #[error("study version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("failed to parse study: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while computing a mesh
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("mesh target {0} is not a face")]
    NotAFace(String),

    #[error("no meshing algorithm assigned")]
    NoAlgorithm,

    #[error("face is degenerate (area {area})")]
    DegenerateFace { area: f64 },

    #[error("invalid hypothesis: {0}")]
    InvalidHypothesis(String),

    #[error("triangulation failed: {0}")]
    TriangulationFailed(String),

    #[error("mesh computation was forced to fail")]
    Forced,
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Notebook(#[from] NotebookError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Study(#[from] StudyError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

pub type Result<T> = std::result::Result<T, Error>;
