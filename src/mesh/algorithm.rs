// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshing algorithms and their hypotheses

use crate::error::MeshError;
use crate::geometry::Face;
use serde::{Deserialize, Serialize};

/// Ratio between the face bounding box diagonal and the default element size
const DEFAULT_SIZE_DIVISOR: f64 = 10.0;

/// Upper bound on the estimated element count of a single compute
const MAX_ESTIMATED_ELEMENTS: f64 = 5.0e4;

/// Available 2D algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmKind {
    /// Delaunay triangulation of a face, the stand-in for NETGEN 2D
    Triangle2D,
}

impl AlgorithmKind {
    pub fn default_name(self) -> &'static str {
        match self {
            AlgorithmKind::Triangle2D => "NETGEN 2D",
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            AlgorithmKind::Triangle2D => "triangulation, 2D",
        }
    }

    pub fn dimension(self) -> u8 {
        match self {
            AlgorithmKind::Triangle2D => 2,
        }
    }
}

/// Element size controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    /// Target edge length; derived from the face size when absent
    pub max_size: Option<f64>,
    /// Lower bound on the edge length
    pub min_size: Option<f64>,
}

impl Hypothesis {
    pub fn with_max_size(max_size: f64) -> Self {
        Self {
            max_size: Some(max_size),
            min_size: None,
        }
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        for (label, value) in [("max size", self.max_size), ("min size", self.min_size)] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(MeshError::InvalidHypothesis(format!(
                        "{} must be positive and finite, got {}",
                        label, v
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(MeshError::InvalidHypothesis(format!(
                    "min size {} exceeds max size {}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Element size used for `face`
    pub fn element_size(&self, face: &Face) -> Result<f64, MeshError> {
        self.validate()?;

        let automatic = face.bounding_box().diagonal() / DEFAULT_SIZE_DIVISOR;
        let mut size = self.max_size.unwrap_or(automatic);
        if let Some(min) = self.min_size {
            size = size.max(min);
        }

        let estimated = face.area().abs() / (0.433 * size * size);
        if estimated > MAX_ESTIMATED_ELEMENTS {
            return Err(MeshError::InvalidHypothesis(format!(
                "element size {} would produce about {:.0} elements",
                size, estimated
            )));
        }
        Ok(size)
    }
}

/// Algorithm assigned to a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Algorithm {
    pub kind: AlgorithmKind,
    pub name: String,
    pub hypothesis: Hypothesis,
}

impl Algorithm {
    pub fn new(kind: AlgorithmKind) -> Self {
        Self {
            kind,
            name: kind.default_name().to_string(),
            hypothesis: Hypothesis::default(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_max_size(&mut self, max_size: f64) {
        self.hypothesis.max_size = Some(max_size);
    }

    pub fn set_min_size(&mut self, min_size: f64) {
        self.hypothesis.min_size = Some(min_size);
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn face() -> Face {
        let (u, v) = Orientation::Oxy.axes();
        Face::rectangle(Point3::origin(), u, v, 3.0, 1.0)
    }

    #[test]
    fn test_default_size_follows_diagonal() {
        let size = Hypothesis::default().element_size(&face()).unwrap();
        assert_relative_eq!(size, 10.0_f64.sqrt() / 10.0);
    }

    #[test]
    fn test_min_size_bounds_max_size() {
        let hypothesis = Hypothesis {
            max_size: Some(0.1),
            min_size: Some(0.1),
        };
        assert_relative_eq!(hypothesis.element_size(&face()).unwrap(), 0.1);

        let hypothesis = Hypothesis {
            max_size: None,
            min_size: Some(0.5),
        };
        assert_relative_eq!(hypothesis.element_size(&face()).unwrap(), 0.5);
    }

    #[test]
    fn test_invalid_hypotheses() {
        assert!(Hypothesis::with_max_size(-1.0).validate().is_err());
        assert!(Hypothesis::with_max_size(f64::NAN).validate().is_err());
        let inverted = Hypothesis {
            max_size: Some(0.1),
            min_size: Some(0.2),
        };
        assert!(inverted.validate().is_err());
        assert!(Hypothesis::with_max_size(1e-6).element_size(&face()).is_err());
    }

    #[test]
    fn test_algorithm_naming() {
        let mut algorithm = Algorithm::new(AlgorithmKind::Triangle2D);
        assert_eq!(algorithm.name, "NETGEN 2D");
        assert_eq!(algorithm.type_name(), "triangulation, 2D");
        algorithm.set_name("Delaunay");
        assert_eq!(algorithm.name, "Delaunay");
    }
}
