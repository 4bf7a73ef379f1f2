// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shape representation: vertices, vectors and planar faces

use super::BoundingBox;
use crate::error::GeometryError;
use crate::notebook::Scalar;
use nalgebra::{Point2, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plane a rectangular face is built in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Height along X, width along Y
    Oxy = 1,
    /// Height along Y, width along Z
    Oyz = 2,
    /// Height along Z, width along X
    Ozx = 3,
}

impl Orientation {
    /// Local (u, v) axes of the plane; u × v is the face normal
    pub fn axes(self) -> (Vector3<f64>, Vector3<f64>) {
        match self {
            Orientation::Oxy => (Vector3::x(), Vector3::y()),
            Orientation::Oyz => (Vector3::y(), Vector3::z()),
            Orientation::Ozx => (Vector3::z(), Vector3::x()),
        }
    }
}

impl TryFrom<i32> for Orientation {
    type Error = GeometryError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Orientation::Oxy),
            2 => Ok(Orientation::Oyz),
            3 => Ok(Orientation::Ozx),
            other => Err(GeometryError::InvalidOrientation(other)),
        }
    }
}

/// Planar face with a single convex outer loop.
///
/// The loop is stored in the local frame `origin + x·u + y·v` and runs
/// counter-clockwise when seen from the normal side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub origin: Point3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
    pub outer: Vec<Point2<f64>>,
}

impl Face {
    /// Axis-aligned rectangle of `h` by `w` centered on the frame origin
    pub fn rectangle(origin: Point3<f64>, u: Vector3<f64>, v: Vector3<f64>, h: f64, w: f64) -> Self {
        let (hh, hw) = (0.5 * h, 0.5 * w);
        Self {
            origin,
            u,
            v,
            outer: vec![
                Point2::new(-hh, -hw),
                Point2::new(hh, -hw),
                Point2::new(hh, hw),
                Point2::new(-hh, hw),
            ],
        }
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.u.cross(&self.v)
    }

    pub fn to_world(&self, p: &Point2<f64>) -> Point3<f64> {
        self.origin + self.u * p.x + self.v * p.y
    }

    pub fn to_local(&self, p: &Point3<f64>) -> Point2<f64> {
        let d = p - self.origin;
        Point2::new(d.dot(&self.u), d.dot(&self.v))
    }

    /// Outer loop corners in world coordinates
    pub fn corners(&self) -> Vec<Point3<f64>> {
        self.outer.iter().map(|p| self.to_world(p)).collect()
    }

    /// Outer loop edges as (start, end) pairs in the local frame
    pub fn edges(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        let n = self.outer.len();
        (0..n).map(move |i| (self.outer[i], self.outer[(i + 1) % n]))
    }

    /// Signed area via the shoelace formula
    pub fn area(&self) -> f64 {
        0.5 * self
            .edges()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum::<f64>()
    }

    /// Area centroid in world coordinates
    pub fn centroid(&self) -> Point3<f64> {
        let area = self.area();
        if area.abs() < f64::EPSILON {
            let n = self.outer.len().max(1) as f64;
            let sum = self
                .outer
                .iter()
                .fold(Vector2::zeros(), |acc, p| acc + p.coords);
            return self.to_world(&Point2::from(sum / n));
        }

        let mut c = Vector2::zeros();
        for (a, b) in self.edges() {
            let cross = a.x * b.y - b.x * a.y;
            c += (a.coords + b.coords) * cross;
        }
        self.to_world(&Point2::from(c / (6.0 * area)))
    }

    /// Extent along the local u axis
    pub fn height(&self) -> f64 {
        let (min, max) = self.local_range(|p| p.x);
        max - min
    }

    /// Extent along the local v axis
    pub fn width(&self) -> f64 {
        let (min, max) = self.local_range(|p| p.y);
        max - min
    }

    fn local_range(&self, coord: impl Fn(&Point2<f64>) -> f64) -> (f64, f64) {
        self.outer.iter().map(coord).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), x| (lo.min(x), hi.max(x)),
        )
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(a, b)| (b - a).norm()).sum()
    }

    /// True if every turn along the loop is to the left (or straight)
    pub fn is_convex(&self) -> bool {
        let n = self.outer.len();
        if n < 3 {
            return false;
        }
        (0..n).all(|i| {
            let a = self.outer[i];
            let b = self.outer[(i + 1) % n];
            let c = self.outer[(i + 2) % n];
            let ab = b - a;
            let bc = c - b;
            ab.x * bc.y - ab.y * bc.x >= -1e-12
        })
    }

    /// Check if a local point lies inside the loop, boundary included within `tol`
    pub fn contains_local(&self, p: &Point2<f64>, tol: f64) -> bool {
        self.edges().all(|(a, b)| {
            let edge = b - a;
            let len = edge.norm();
            if len == 0.0 {
                return true;
            }
            let to_p = p - a;
            (edge.x * to_p.y - edge.y * to_p.x) / len >= -tol
        })
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            origin: self.origin + offset,
            ..self.clone()
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.corners())
    }
}

/// Geometric entity produced by the builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Vertex(Point3<f64>),
    /// Edge from `origin` to `origin + direction`
    Vector {
        origin: Point3<f64>,
        direction: Vector3<f64>,
    },
    Face(Face),
}

impl ShapeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Vertex(_) => "VERTEX",
            ShapeKind::Vector { .. } => "EDGE",
            ShapeKind::Face(_) => "FACE",
        }
    }
}

/// Argument of a construction as given and as resolved at build time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub given: Scalar,
    pub resolved: f64,
}

/// Construction record of a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    pub operation: String,
    pub arguments: Vec<Argument>,
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operation)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match &arg.given {
                Scalar::Value(v) => write!(f, "{}", v)?,
                Scalar::Param(p) => write!(f, "\"{}\"={}", p, arg.resolved)?,
            }
        }
        write!(f, ")")
    }
}

/// A shape and the construction that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub construction: Construction,
}

impl Shape {
    pub fn as_face(&self) -> Option<&Face> {
        match &self.kind {
            ShapeKind::Face(face) => Some(face),
            _ => None,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        match &self.kind {
            ShapeKind::Vertex(p) => BoundingBox::from_points([p]),
            ShapeKind::Vector { origin, direction } => {
                BoundingBox::from_points(&[*origin, origin + direction])
            }
            ShapeKind::Face(face) => face.bounding_box(),
        }
    }

    /// Names of notebook variables this shape was built from
    pub fn parameters(&self) -> Vec<&str> {
        self.construction
            .arguments
            .iter()
            .filter_map(|arg| match &arg.given {
                Scalar::Param(p) => Some(p.as_str()),
                Scalar::Value(_) => None,
            })
            .collect()
    }
}
