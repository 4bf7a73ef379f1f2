// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! The parametric square procedure
//!
//! Builds a rectangular face sized by the notebook variables `l_x` and
//! `l_y`, moves it so that its lower left corner sits at the origin,
//! publishes every entity in the study and triangulates the face. A failed
//! mesh computation does not abort the procedure; it is reported in the
//! returned [`ScriptOutput`].

use crate::config::ParmeshConfig;
use crate::error::Result;
use crate::geometry::Shape;
use crate::mesh::{AlgorithmKind, ComputeReport, ComputeStatus, Hypothesis, MeshObject, SurfaceMesh};
use crate::notebook::{NotebookValues, RectangleParams, VarValue};
use crate::session::Session;
use crate::study::{EntryId, Study};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Study names used by the procedure
pub mod names {
    pub const ORIGIN: &str = "O";
    pub const AXIS_X: &str = "OX";
    pub const AXIS_Y: &str = "OY";
    pub const AXIS_Z: &str = "OZ";
    pub const FACE: &str = "Face_1";
    pub const TRANSLATION: &str = "Translation_1";
    pub const ALGORITHM: &str = "NETGEN 2D";
    pub const MESH: &str = "Mesh_1";
}

/// Inputs of the procedure
#[derive(Debug, Clone, Default)]
pub struct ScriptOptions {
    /// Rectangle dimensions written to the notebook
    pub params: RectangleParams,
    /// Extra notebook assignments applied after `params`
    pub variables: BTreeMap<String, VarValue>,
    /// Element size controls of the 2D algorithm
    pub hypothesis: Hypothesis,
    /// Make the mesh computation fail
    pub force_mesh_failure: bool,
}

impl ScriptOptions {
    pub fn new(params: RectangleParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ParmeshConfig) -> Self {
        Self {
            params: RectangleParams::default(),
            variables: config.variables.clone(),
            hypothesis: config.hypothesis(),
            force_mesh_failure: false,
        }
    }
}

/// Shapes built by the procedure
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptShapes {
    pub origin: Shape,
    pub axis_x: Shape,
    pub axis_y: Shape,
    pub axis_z: Shape,
    pub face: Shape,
    pub translation: Shape,
}

/// Outcome of the procedure
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// Notebook values at construction time
    pub values: NotebookValues,
    pub shapes: ScriptShapes,
    pub mesh: MeshObject,
    pub mesh_entry: EntryId,
    pub status: ComputeStatus,
    /// Present when the computation succeeded
    pub report: Option<ComputeReport>,
    /// Whether an attached desktop was refreshed
    pub browser_refreshed: bool,
}

impl ScriptOutput {
    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }
}

/// Run the procedure in `session`
#[instrument(skip_all, fields(l_x = options.params.l_x, l_y = options.params.l_y))]
pub fn run_parametric_square(session: &mut Session, options: &ScriptOptions) -> Result<ScriptOutput> {
    // Notebook
    let notebook = session.notebook_mut();
    options.params.write_to(notebook)?;
    for (name, value) in &options.variables {
        notebook.set(name, value.clone())?;
    }
    let values = session.notebook().evaluate()?;
    info!(variables = values.len(), "notebook evaluated");

    // Geometry
    let shapes = {
        let geom = session.geom();
        let origin = geom.make_vertex(0, 0, 0)?;
        let axis_x = geom.make_vector_dxdydz(1, 0, 0)?;
        let axis_y = geom.make_vector_dxdydz(0, 1, 0)?;
        let axis_z = geom.make_vector_dxdydz(0, 0, 1)?;
        let face = geom.make_face_hw(RectangleParams::L_X, RectangleParams::L_Y, 1)?;
        let translation = geom.make_translation(
            &face,
            RectangleParams::L_X_HALF,
            RectangleParams::L_Y_HALF,
            0,
        )?;
        ScriptShapes {
            origin,
            axis_x,
            axis_y,
            axis_z,
            face,
            translation,
        }
    };

    let study = session.study_mut();
    study.add_to_study(&shapes.origin, names::ORIGIN)?;
    study.add_to_study(&shapes.axis_x, names::AXIS_X)?;
    study.add_to_study(&shapes.axis_y, names::AXIS_Y)?;
    study.add_to_study(&shapes.axis_z, names::AXIS_Z)?;
    study.add_to_study(&shapes.face, names::FACE)?;
    study.add_to_study(&shapes.translation, names::TRANSLATION)?;

    // Mesh
    let mut mesh = MeshObject::new(&shapes.translation);
    mesh.triangle(AlgorithmKind::Triangle2D).hypothesis = options.hypothesis;
    if options.force_mesh_failure {
        mesh.force_failure();
    }
    let report = match mesh.compute() {
        Ok(report) => Some(report),
        Err(err) => {
            warn!(error = %err, "procedure continues without a mesh");
            None
        }
    };

    let study = session.study_mut();
    study.set_algorithm_name(&mut mesh, names::ALGORITHM)?;
    let mesh_entry = study.set_mesh_name(&mut mesh, names::MESH)?;

    let browser_refreshed = session.has_desktop() && session.update_object_browser();

    Ok(ScriptOutput {
        values,
        shapes,
        status: mesh.status().clone(),
        mesh,
        mesh_entry,
        report,
        browser_refreshed,
    })
}

/// Mesh and study produced by one sweep point
#[derive(Debug, Clone)]
pub struct SweepOutput {
    pub status: ComputeStatus,
    pub report: Option<ComputeReport>,
    pub mesh: Option<SurfaceMesh>,
    pub study: Study,
}

/// Result of one sweep point
#[derive(Debug)]
pub struct SweepResult {
    /// `parametric_square_<lx>x<ly>`
    pub name: String,
    pub params: RectangleParams,
    pub outcome: Result<SweepOutput>,
}

/// Output name for a pair of dimensions
pub fn sweep_name(params: &RectangleParams) -> String {
    format!("parametric_square_{}x{}", params.l_x, params.l_y)
}

/// Run the procedure once per `(l_x, l_y)` pair, each in its own session
pub fn sweep(dims: &[(f64, f64)], options: &ScriptOptions) -> Vec<SweepResult> {
    sweep_with_progress(dims, options, |_| {})
}

/// Like [`sweep`], calling `on_done` as each point finishes
pub fn sweep_with_progress<F>(dims: &[(f64, f64)], options: &ScriptOptions, on_done: F) -> Vec<SweepResult>
where
    F: Fn(&SweepResult) + Sync,
{
    info!(points = dims.len(), "starting sweep");
    dims.par_iter()
        .map(|&(l_x, l_y)| {
            let params = RectangleParams::new(l_x, l_y);
            let point_options = ScriptOptions {
                params,
                ..options.clone()
            };

            let mut session = Session::init();
            let outcome = run_parametric_square(&mut session, &point_options).map(|output| SweepOutput {
                status: output.status,
                report: output.report,
                mesh: output.mesh.mesh().cloned(),
                study: session.shutdown(),
            });

            let result = SweepResult {
                name: sweep_name(&params),
                params,
                outcome,
            };
            on_done(&result);
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::study::Component;

    #[test]
    fn test_study_holds_procedure_entities() {
        let mut session = Session::init();
        let output = run_parametric_square(&mut session, &ScriptOptions::default()).unwrap();
        assert!(output.is_done());
        assert!(!output.browser_refreshed);

        let study = session.study();
        let geometry: Vec<&str> = study
            .component(Component::Geometry)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(geometry, vec!["O", "OX", "OY", "OZ", "Face_1", "Translation_1"]);
        let mesh: Vec<&str> = study.component(Component::Mesh).map(|e| e.name.as_str()).collect();
        assert_eq!(mesh, vec!["NETGEN 2D", "Mesh_1"]);
    }

    #[test]
    fn test_running_twice_in_one_session_collides() {
        let mut session = Session::init();
        run_parametric_square(&mut session, &ScriptOptions::default()).unwrap();
        assert!(run_parametric_square(&mut session, &ScriptOptions::default()).is_err());
    }

    #[test]
    fn test_sweep_names() {
        assert_eq!(sweep_name(&RectangleParams::new(1.0, 2.0)), "parametric_square_1x2");
        assert_eq!(sweep_name(&RectangleParams::new(2.5, 1.0)), "parametric_square_2.5x1");
    }

    #[test]
    fn test_sweep_keeps_input_order() {
        let dims = [(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (4.0, 5.0)];
        let results = sweep(&dims, &ScriptOptions::default());
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "parametric_square_1x1",
                "parametric_square_1x2",
                "parametric_square_2x2",
                "parametric_square_4x5"
            ]
        );
        for result in &results {
            let output = result.outcome.as_ref().unwrap();
            assert!(output.status.is_done());
            assert!(output.mesh.is_some());
        }
    }

    #[test]
    fn test_sweep_reports_invalid_dimensions() {
        let results = sweep(&[(0.0, 1.0)], &ScriptOptions::default());
        assert!(results[0].outcome.is_err());
    }
}
