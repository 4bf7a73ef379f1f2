// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! parmesh
//!
//! Parametric face modelling and 2D triangulation. A notebook of named
//! variables drives geometry constructors; shapes are published in a study
//! and meshed with a Delaunay-based surface mesher.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod notebook;
pub mod script;
pub mod session;
pub mod study;

pub use config::ParmeshConfig;
pub use error::{Error, GeometryError, MeshError, NotebookError, Result, StudyError};
pub use geometry::{GeomBuilder, Shape, ShapeKind};
pub use io::{export_json, export_stl, ExportFormat};
pub use mesh::{AlgorithmKind, ComputeReport, ComputeStatus, Hypothesis, MeshObject, SurfaceMesh};
pub use notebook::{Notebook, RectangleParams, Scalar, VarValue};
pub use script::{run_parametric_square, sweep, ScriptOptions, ScriptOutput, SweepResult};
pub use session::{Desktop, RecordingDesktop, Session};
pub use study::{Component, Study, StudyEntry};

/// Run the parametric square procedure in a fresh headless session
pub fn run(options: &ScriptOptions) -> Result<(ScriptOutput, Study)> {
    let mut session = Session::init();
    let output = run_parametric_square(&mut session, options)?;
    Ok((output, session.shutdown()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run() {
        let (output, study) = run(&ScriptOptions::default()).unwrap();
        assert!(output.is_done());
        assert_eq!(study.len(), 8);
    }
}
