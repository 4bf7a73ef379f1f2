// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry builder
//!
//! Constructors take literal numbers or notebook expressions. Expressions
//! are resolved once, when the shape is built; later notebook changes do
//! not affect shapes that already exist.

use super::shape::{Argument, Construction, Face, Orientation, Shape, ShapeKind};
use crate::error::GeometryError;
use crate::notebook::{Notebook, Scalar};
use nalgebra::{Point3, Vector3};
use tracing::{info, instrument};

/// Builds shapes against a notebook
pub struct GeomBuilder<'a> {
    notebook: &'a Notebook,
}

impl<'a> GeomBuilder<'a> {
    pub fn new(notebook: &'a Notebook) -> Self {
        Self { notebook }
    }

    fn resolve(&self, name: &str, scalar: Scalar) -> Result<Argument, GeometryError> {
        let resolved = self.notebook.resolve(&scalar)?;
        if !resolved.is_finite() {
            return Err(GeometryError::NonFinite {
                what: "argument",
                value: resolved,
            });
        }
        Ok(Argument {
            name: name.to_string(),
            given: scalar,
            resolved,
        })
    }

    /// Point at (x, y, z)
    pub fn make_vertex(
        &self,
        x: impl Into<Scalar>,
        y: impl Into<Scalar>,
        z: impl Into<Scalar>,
    ) -> Result<Shape, GeometryError> {
        let args = vec![
            self.resolve("x", x.into())?,
            self.resolve("y", y.into())?,
            self.resolve("z", z.into())?,
        ];
        let point = Point3::new(args[0].resolved, args[1].resolved, args[2].resolved);
        info!(point = ?[point.x, point.y, point.z], "creating vertex");

        Ok(Shape {
            kind: ShapeKind::Vertex(point),
            construction: Construction {
                operation: "MakeVertex".to_string(),
                arguments: args,
            },
        })
    }

    /// Vector from the origin along (dx, dy, dz)
    pub fn make_vector_dxdydz(
        &self,
        dx: impl Into<Scalar>,
        dy: impl Into<Scalar>,
        dz: impl Into<Scalar>,
    ) -> Result<Shape, GeometryError> {
        let args = vec![
            self.resolve("dx", dx.into())?,
            self.resolve("dy", dy.into())?,
            self.resolve("dz", dz.into())?,
        ];
        let direction = Vector3::new(args[0].resolved, args[1].resolved, args[2].resolved);
        if direction.norm() <= f64::EPSILON {
            return Err(GeometryError::ZeroVector);
        }
        info!(direction = ?[direction.x, direction.y, direction.z], "creating vector");

        Ok(Shape {
            kind: ShapeKind::Vector {
                origin: Point3::origin(),
                direction,
            },
            construction: Construction {
                operation: "MakeVectorDXDYDZ".to_string(),
                arguments: args,
            },
        })
    }

    /// Rectangular face of height `h` and width `w` centered on the origin.
    ///
    /// `orientation` selects the plane: 1 = OXY (h along X), 2 = OYZ
    /// (h along Y), 3 = OZX (h along Z).
    #[instrument(skip(self, h, w))]
    pub fn make_face_hw(
        &self,
        h: impl Into<Scalar>,
        w: impl Into<Scalar>,
        orientation: i32,
    ) -> Result<Shape, GeometryError> {
        let orientation = Orientation::try_from(orientation)?;
        let h = self.resolve("h", h.into())?;
        let w = self.resolve("w", w.into())?;

        for (what, arg) in [("face height", &h), ("face width", &w)] {
            if arg.resolved <= 0.0 {
                return Err(GeometryError::NonPositiveDimension {
                    what,
                    value: arg.resolved,
                });
            }
        }

        info!(h = h.resolved, w = w.resolved, ?orientation, "creating rectangular face");
        let (u, v) = orientation.axes();
        let face = Face::rectangle(Point3::origin(), u, v, h.resolved, w.resolved);

        Ok(Shape {
            kind: ShapeKind::Face(face),
            construction: Construction {
                operation: "MakeFaceHW".to_string(),
                arguments: vec![
                    h,
                    w,
                    Argument {
                        name: "orientation".to_string(),
                        given: Scalar::Value(orientation as i32 as f64),
                        resolved: orientation as i32 as f64,
                    },
                ],
            },
        })
    }

    /// Translated copy of `shape`
    pub fn make_translation(
        &self,
        shape: &Shape,
        dx: impl Into<Scalar>,
        dy: impl Into<Scalar>,
        dz: impl Into<Scalar>,
    ) -> Result<Shape, GeometryError> {
        let args = vec![
            self.resolve("dx", dx.into())?,
            self.resolve("dy", dy.into())?,
            self.resolve("dz", dz.into())?,
        ];
        let offset = Vector3::new(args[0].resolved, args[1].resolved, args[2].resolved);
        info!(
            offset = ?[offset.x, offset.y, offset.z],
            source = shape.kind.type_name(),
            "creating translation"
        );

        let kind = match &shape.kind {
            ShapeKind::Vertex(p) => ShapeKind::Vertex(p + offset),
            ShapeKind::Vector { origin, direction } => ShapeKind::Vector {
                origin: origin + offset,
                direction: *direction,
            },
            ShapeKind::Face(face) => ShapeKind::Face(face.translated(&offset)),
        };

        Ok(Shape {
            kind,
            construction: Construction {
                operation: "MakeTranslation".to_string(),
                arguments: args,
            },
        })
    }
}
