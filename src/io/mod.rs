// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh export and import

mod export_json;
mod export_stl;

pub use export_json::{export_json, BoundaryGroup, MeshDocument};
pub use export_stl::{export_stl, import_stl, write_stl};

use crate::mesh::SurfaceMesh;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Mesh output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Stl,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Stl => "stl",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stl" => Ok(ExportFormat::Stl),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Write `mesh` to `dir/<name>.<ext>` in `format`
pub fn export_mesh(
    mesh: &SurfaceMesh,
    name: &str,
    dir: &Path,
    format: ExportFormat,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{}.{}", name, format.extension()));
    match format {
        ExportFormat::Stl => export_stl(mesh, &path)?,
        ExportFormat::Json => export_json(name, mesh, &path)?,
    }
    info!(path = %path.display(), format = format.extension(), "mesh exported");
    Ok(path)
}
