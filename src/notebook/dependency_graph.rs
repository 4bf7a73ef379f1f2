// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Dependency graph between notebook variables

use crate::error::NotebookError;
use ahash::{AHashMap, AHashSet};

/// Tracks which variables an expression reads and which variables read it
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Maps a variable to the variables its expression references
    dependencies: AHashMap<String, Vec<String>>,
    /// Maps a variable to the variables whose expressions reference it
    dependents: AHashMap<String, Vec<String>>,
    /// Declaration order, used to keep evaluation order stable
    order: Vec<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or redeclare) `name` with the given dependencies
    pub fn declare(&mut self, name: &str, dependencies: Vec<String>) {
        self.remove_edges(name);

        if !self.order.iter().any(|n| n == name) {
            self.order.push(name.to_string());
        }

        for dep in &dependencies {
            self.dependents
                .entry(dep.clone())
                .or_insert_with(Vec::new)
                .push(name.to_string());
        }
        self.dependencies.insert(name.to_string(), dependencies);
    }

    fn remove_edges(&mut self, name: &str) {
        if let Some(old) = self.dependencies.remove(name) {
            for dep in old {
                if let Some(list) = self.dependents.get_mut(&dep) {
                    list.retain(|n| n != name);
                }
            }
        }
    }

    /// Direct dependencies of a variable
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.dependencies
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All variables that transitively depend on `name`
    pub fn get_dependents(&self, name: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut visited = AHashSet::new();
        self.collect_dependents(name, &mut result, &mut visited);
        result
    }

    fn collect_dependents(&self, name: &str, result: &mut Vec<String>, visited: &mut AHashSet<String>) {
        if !visited.insert(name.to_string()) {
            return;
        }

        if let Some(parents) = self.dependents.get(name) {
            for parent in parents {
                if !result.contains(parent) {
                    result.push(parent.clone());
                }
                self.collect_dependents(parent, result, visited);
            }
        }
    }

    /// Find a cycle reachable from `start`, returned as a closed path
    pub fn find_cycle_from(&self, start: &str) -> Option<Vec<String>> {
        let mut path = vec![start.to_string()];
        self.walk_for_cycle(start, start, &mut path, &mut AHashSet::new())
    }

    fn walk_for_cycle(
        &self,
        start: &str,
        current: &str,
        path: &mut Vec<String>,
        visited: &mut AHashSet<String>,
    ) -> Option<Vec<String>> {
        for dep in self.dependencies_of(current) {
            if dep == start {
                let mut cycle = path.clone();
                cycle.push(start.to_string());
                return Some(cycle);
            }
            if visited.insert(dep.clone()) {
                path.push(dep.clone());
                if let Some(cycle) = self.walk_for_cycle(start, dep, path, visited) {
                    return Some(cycle);
                }
                path.pop();
            }
        }
        None
    }

    /// Declared variables ordered so that every variable follows its dependencies.
    ///
    /// Ties keep declaration order. Dependencies that were never declared are
    /// skipped here and reported when the expression is evaluated.
    pub fn topological_order(&self) -> Result<Vec<String>, NotebookError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            graph: &DependencyGraph,
            name: &str,
            marks: &mut AHashMap<String, Mark>,
            stack: &mut Vec<String>,
            out: &mut Vec<String>,
        ) -> Result<(), NotebookError> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = stack.iter().position(|n| n == name).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(name.to_string());
                    return Err(NotebookError::Cycle(cycle));
                }
                None => {}
            }

            if !graph.dependencies.contains_key(name) {
                return Ok(());
            }

            marks.insert(name.to_string(), Mark::Visiting);
            stack.push(name.to_string());
            for dep in graph.dependencies_of(name) {
                visit(graph, dep, marks, stack, out)?;
            }
            stack.pop();
            marks.insert(name.to_string(), Mark::Done);
            out.push(name.to_string());
            Ok(())
        }

        let mut marks = AHashMap::new();
        let mut stack = Vec::new();
        let mut out = Vec::with_capacity(self.order.len());
        for name in &self.order {
            visit(self, name, &mut marks, &mut stack, &mut out)?;
        }
        Ok(out)
    }

    /// Check if a variable is declared
    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// Declared variable names in declaration order
    pub fn declared(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.declare("l_x_half", vec!["l_x".into()]);
        graph.declare("l_x", vec![]);
        graph.declare("l_y", vec![]);
        graph.declare("area", vec!["l_x".into(), "l_y".into()]);
        graph
    }

    #[test]
    fn test_topological_order_puts_dependencies_first() {
        let order = graph().topological_order().unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("l_x") < pos("l_x_half"));
        assert!(pos("l_x") < pos("area"));
        assert!(pos("l_y") < pos("area"));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn test_dependents() {
        let dependents = graph().get_dependents("l_x");
        assert!(dependents.contains(&"l_x_half".to_string()));
        assert!(dependents.contains(&"area".to_string()));
        assert_eq!(dependents.len(), 2);
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = graph();
        graph.declare("l_x", vec!["area".into()]);
        assert!(graph.find_cycle_from("l_x").is_some());
        assert!(matches!(graph.topological_order(), Err(NotebookError::Cycle(_))));
    }

    #[test]
    fn test_redeclare_drops_old_edges() {
        let mut graph = graph();
        graph.declare("l_x_half", vec!["l_y".into()]);
        assert!(!graph.get_dependents("l_x").contains(&"l_x_half".to_string()));
        assert_eq!(graph.dependencies_of("l_x_half"), &["l_y".to_string()]);
    }
}
