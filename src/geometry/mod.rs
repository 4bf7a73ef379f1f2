// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - shapes and their construction

mod bbox;
mod builder;
mod shape;

pub use bbox::BoundingBox;
pub use builder::GeomBuilder;
pub use shape::{Argument, Construction, Face, Orientation, Shape, ShapeKind};
