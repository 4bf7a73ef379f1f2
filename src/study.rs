// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Study: the named document tree holding published entities

use crate::error::StudyError;
use crate::geometry::Shape;
use crate::mesh::{Algorithm, ComputeStatus, MeshObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Current study file format version
pub const FORMAT_VERSION: u32 = 1;

const FORMAT_NAME: &str = "parmesh-study";

pub type EntryId = u64;

/// Top-level branch of the study tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Geometry,
    Mesh,
}

impl Component {
    pub fn label(self) -> &'static str {
        match self {
            Component::Geometry => "Geometry",
            Component::Mesh => "Mesh",
        }
    }
}

/// Mesh as recorded in the study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Study entry of the meshed shape, if it was published
    pub target: Option<EntryId>,
    pub algorithm: Option<String>,
    pub algorithm_type: Option<String>,
    pub status: ComputeStatus,
    pub node_count: usize,
    pub triangle_count: usize,
}

impl MeshRecord {
    fn from_object(mesh: &MeshObject, target: Option<EntryId>) -> Self {
        let (node_count, triangle_count) = mesh
            .mesh()
            .map(|m| (m.node_count(), m.triangle_count()))
            .unwrap_or((0, 0));
        Self {
            target,
            algorithm: mesh.algorithm().map(|a| a.name.clone()),
            algorithm_type: mesh.algorithm().map(|a| a.type_name().to_string()),
            status: mesh.status().clone(),
            node_count,
            triangle_count,
        }
    }
}

/// Data held by a study entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryData {
    Shape(Shape),
    Algorithm(Algorithm),
    Mesh(MeshRecord),
}

impl EntryData {
    pub fn kind(&self) -> &'static str {
        match self {
            EntryData::Shape(shape) => shape.kind.type_name(),
            EntryData::Algorithm(_) => "ALGORITHM",
            EntryData::Mesh(_) => "MESH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyEntry {
    pub id: EntryId,
    pub name: String,
    pub component: Component,
    pub data: EntryData,
}

/// Document tree of named entities; names are unique across the study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub name: String,
    pub created: DateTime<Utc>,
    entries: Vec<StudyEntry>,
    next_id: EntryId,
}

impl Study {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: Utc::now(),
            entries: Vec::new(),
            next_id: 1,
        }
    }

    fn insert(&mut self, name: &str, component: Component, data: EntryData) -> Result<EntryId, StudyError> {
        if name.trim().is_empty() {
            return Err(StudyError::EmptyName);
        }
        if self.find(name).is_some() {
            return Err(StudyError::DuplicateName(name.to_string()));
        }

        let id = self.next_id;
        self.next_id += 1;
        info!(id, name, kind = data.kind(), component = component.label(), "published in study");
        self.entries.push(StudyEntry {
            id,
            name: name.to_string(),
            component,
            data,
        });
        Ok(id)
    }

    /// Publish a geometric shape under `name`
    pub fn add_to_study(&mut self, shape: &Shape, name: &str) -> Result<EntryId, StudyError> {
        self.insert(name, Component::Geometry, EntryData::Shape(shape.clone()))
    }

    /// Name the algorithm of `mesh` and publish it
    pub fn set_algorithm_name(&mut self, mesh: &mut MeshObject, name: &str) -> Result<EntryId, StudyError> {
        let mut renamed = mesh.algorithm().cloned().ok_or(StudyError::NoAlgorithm)?;
        renamed.set_name(name);
        let id = self.insert(name, Component::Mesh, EntryData::Algorithm(renamed))?;
        if let Some(algorithm) = mesh.algorithm_mut() {
            algorithm.set_name(name);
        }
        Ok(id)
    }

    /// Name `mesh` and publish a record of it, linked to its published target
    pub fn set_mesh_name(&mut self, mesh: &mut MeshObject, name: &str) -> Result<EntryId, StudyError> {
        let target = self.find_shape(mesh.target()).map(|e| e.id);
        mesh.set_name(name);
        let record = MeshRecord::from_object(mesh, target);
        self.insert(name, Component::Mesh, EntryData::Mesh(record))
    }

    /// Refresh the record of an already published mesh
    pub fn update_mesh(&mut self, id: EntryId, mesh: &MeshObject) -> Result<(), StudyError> {
        let target = self.find_shape(mesh.target()).map(|e| e.id);
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StudyError::UnknownEntry(id))?;
        entry.data = EntryData::Mesh(MeshRecord::from_object(mesh, target));
        Ok(())
    }

    pub fn rename(&mut self, id: EntryId, name: &str) -> Result<(), StudyError> {
        if name.trim().is_empty() {
            return Err(StudyError::EmptyName);
        }
        if self.find(name).map_or(false, |e| e.id != id) {
            return Err(StudyError::DuplicateName(name.to_string()));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StudyError::UnknownEntry(id))?;
        entry.name = name.to_string();
        Ok(())
    }

    pub fn remove(&mut self, id: EntryId) -> Result<StudyEntry, StudyError> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(StudyError::UnknownEntry(id))?;
        Ok(self.entries.remove(pos))
    }

    pub fn get(&self, id: EntryId) -> Option<&StudyEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find(&self, name: &str) -> Option<&StudyEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn find_shape(&self, shape: &Shape) -> Option<&StudyEntry> {
        self.entries
            .iter()
            .find(|e| matches!(&e.data, EntryData::Shape(s) if s == shape))
    }

    /// Shape published under `name`
    pub fn shape(&self, name: &str) -> Option<&Shape> {
        match self.find(name).map(|e| &e.data) {
            Some(EntryData::Shape(shape)) => Some(shape),
            _ => None,
        }
    }

    pub fn entries(&self) -> &[StudyEntry] {
        &self.entries
    }

    pub fn component(&self, component: Component) -> impl Iterator<Item = &StudyEntry> {
        self.entries.iter().filter(move |e| e.component == component)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the study file format
    pub fn to_json(&self) -> Result<String, StudyError> {
        let file = StudyFile {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
            study: self.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Deserialize, validating format identifier and version
    pub fn from_json(json: &str) -> Result<Self, StudyError> {
        let file: StudyFile = serde_json::from_str(json)?;
        if file.format != FORMAT_NAME {
            return Err(StudyError::UnknownFormat(file.format));
        }
        if file.version > FORMAT_VERSION {
            return Err(StudyError::FutureVersion {
                file_version: file.version,
                supported_version: FORMAT_VERSION,
            });
        }
        Ok(file.study)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StudyError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        info!(path = %path.as_ref().display(), entries = self.len(), "study saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StudyError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StudyFile {
    format: String,
    version: u32,
    study: Study,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeomBuilder;
    use crate::mesh::AlgorithmKind;
    use crate::notebook::Notebook;

    fn shapes() -> (Shape, Shape) {
        let notebook = Notebook::new();
        let geom = GeomBuilder::new(&notebook);
        (
            geom.make_vertex(0, 0, 0).unwrap(),
            geom.make_face_hw(2.0, 1.0, 1).unwrap(),
        )
    }

    #[test]
    fn test_names_are_unique() {
        let (vertex, face) = shapes();
        let mut study = Study::new("Study1");
        study.add_to_study(&vertex, "O").unwrap();
        assert!(matches!(
            study.add_to_study(&face, "O"),
            Err(StudyError::DuplicateName(_))
        ));
        assert!(matches!(study.add_to_study(&face, "  "), Err(StudyError::EmptyName)));
        assert_eq!(study.len(), 1);
    }

    #[test]
    fn test_rename_checks_uniqueness() {
        let (vertex, face) = shapes();
        let mut study = Study::new("Study1");
        let o = study.add_to_study(&vertex, "O").unwrap();
        let f = study.add_to_study(&face, "Face_1").unwrap();
        assert!(study.rename(f, "O").is_err());
        study.rename(f, "Plate").unwrap();
        study.rename(o, "O").unwrap();
        assert!(study.shape("Plate").is_some());
        assert!(study.remove(f).is_ok());
        assert!(study.get(f).is_none());
    }

    #[test]
    fn test_mesh_record_links_target() {
        let (_, face) = shapes();
        let mut study = Study::new("Study1");
        let face_id = study.add_to_study(&face, "Face_1").unwrap();

        let mut mesh = MeshObject::new(&face);
        mesh.triangle(AlgorithmKind::Triangle2D);
        mesh.compute().unwrap();
        study.set_algorithm_name(&mut mesh, "NETGEN 2D").unwrap();
        let mesh_id = study.set_mesh_name(&mut mesh, "Mesh_1").unwrap();

        match &study.get(mesh_id).unwrap().data {
            EntryData::Mesh(record) => {
                assert_eq!(record.target, Some(face_id));
                assert_eq!(record.algorithm.as_deref(), Some("NETGEN 2D"));
                assert_eq!(record.algorithm_type.as_deref(), Some("triangulation, 2D"));
                assert!(record.status.is_done());
                assert!(record.triangle_count > 0);
            }
            other => panic!("expected mesh record, got {:?}", other),
        }
        assert_eq!(mesh.name(), Some("Mesh_1"));
        assert_eq!(study.component(Component::Mesh).count(), 2);
    }

    #[test]
    fn test_json_round_trip_and_validation() {
        let (vertex, face) = shapes();
        let mut study = Study::new("Study1");
        study.add_to_study(&vertex, "O").unwrap();
        study.add_to_study(&face, "Face_1").unwrap();

        let json = study.to_json().unwrap();
        assert_eq!(Study::from_json(&json).unwrap(), study);

        let foreign = json.replace(FORMAT_NAME, "other-format");
        assert!(matches!(Study::from_json(&foreign), Err(StudyError::UnknownFormat(_))));

        let future = json.replace("\"version\": 1", "\"version\": 99");
        assert!(matches!(
            Study::from_json(&future),
            Err(StudyError::FutureVersion { file_version: 99, .. })
        ));
    }
}
