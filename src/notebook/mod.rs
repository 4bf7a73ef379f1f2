// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Notebook of named parametric variables
//!
//! Variables hold either a number or an expression over other variables
//! (`l_x_half = "0.5*l_x"`). Expressions are parsed when they are set and
//! evaluated on demand, in dependency order, so reading a variable always
//! reflects the current values of the variables it depends on.

mod dependency_graph;
mod expr;

pub use dependency_graph::DependencyGraph;
pub use expr::{is_identifier, BinaryOp, Expr};

use crate::error::NotebookError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Value assigned to a notebook variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Number(f64),
    Expression(String),
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Number(value)
    }
}

impl From<i32> for VarValue {
    fn from(value: i32) -> Self {
        VarValue::Number(value as f64)
    }
}

impl From<&str> for VarValue {
    fn from(source: &str) -> Self {
        VarValue::Expression(source.to_string())
    }
}

impl From<String> for VarValue {
    fn from(source: String) -> Self {
        VarValue::Expression(source)
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Number(v) => write!(f, "{}", v),
            VarValue::Expression(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Stored variable: the value as given plus its parsed form
#[derive(Debug, Clone)]
struct Variable {
    value: VarValue,
    expr: Expr,
}

/// Numeric argument to a geometry constructor: a literal or a notebook expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Value(f64),
    Param(String),
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Value(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Value(value as f64)
    }
}

impl From<&str> for Scalar {
    fn from(param: &str) -> Self {
        Scalar::Param(param.to_string())
    }
}

impl From<String> for Scalar {
    fn from(param: String) -> Self {
        Scalar::Param(param)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Value(v) => write!(f, "{}", v),
            Scalar::Param(p) => write!(f, "{}", p),
        }
    }
}

/// Notebook of named variables
#[derive(Debug, Clone, Default)]
pub struct Notebook {
    variables: AHashMap<String, Variable>,
    graph: DependencyGraph,
}

impl Notebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable to a number or an expression.
    ///
    /// Expressions may reference variables that are not defined yet; they
    /// are reported when evaluated. A definition that would create a cycle
    /// is rejected and leaves the notebook unchanged.
    pub fn set(&mut self, name: &str, value: impl Into<VarValue>) -> Result<(), NotebookError> {
        if !is_identifier(name) {
            return Err(NotebookError::InvalidName(name.to_string()));
        }

        let value = value.into();
        let expr = match &value {
            VarValue::Number(v) => {
                if !v.is_finite() {
                    return Err(NotebookError::NonFinite {
                        name: name.to_string(),
                        value: *v,
                    });
                }
                Expr::Number(*v)
            }
            VarValue::Expression(source) => Expr::parse(source)?,
        };

        let mut graph = self.graph.clone();
        graph.declare(name, expr.variables());
        if let Some(cycle) = graph.find_cycle_from(name) {
            return Err(NotebookError::Cycle(cycle));
        }

        debug!(name, value = %value, "notebook variable set");
        self.graph = graph;
        self.variables.insert(name.to_string(), Variable { value, expr });
        Ok(())
    }

    /// Evaluate a single variable
    pub fn get(&self, name: &str) -> Result<f64, NotebookError> {
        let mut memo = AHashMap::new();
        self.eval_variable(name, &mut memo)
    }

    fn eval_variable(&self, name: &str, memo: &mut AHashMap<String, f64>) -> Result<f64, NotebookError> {
        if let Some(value) = memo.get(name) {
            return Ok(*value);
        }

        let variable = self
            .variables
            .get(name)
            .ok_or_else(|| NotebookError::UnknownVariable(name.to_string()))?;

        let mut deps = AHashMap::new();
        for dep in self.graph.dependencies_of(name) {
            if self.variables.contains_key(dep) {
                deps.insert(dep.clone(), self.eval_variable(dep, memo)?);
            }
        }

        let value = variable.expr.eval(&|n: &str| deps.get(n).copied())?;
        if !value.is_finite() {
            return Err(NotebookError::NonFinite {
                name: name.to_string(),
                value,
            });
        }
        memo.insert(name.to_string(), value);
        Ok(value)
    }

    /// Evaluate every variable in dependency order into a snapshot
    pub fn evaluate(&self) -> Result<NotebookValues, NotebookError> {
        let mut memo = AHashMap::new();
        let mut values = BTreeMap::new();
        for name in self.graph.topological_order()? {
            let value = self.eval_variable(&name, &mut memo)?;
            values.insert(name, value);
        }
        Ok(NotebookValues { values })
    }

    /// Evaluate an arbitrary expression against the current variables
    pub fn eval_expression(&self, source: &str) -> Result<f64, NotebookError> {
        let expr = Expr::parse(source)?;
        let mut memo = AHashMap::new();
        let mut vars = AHashMap::new();
        for name in expr.variables() {
            if self.variables.contains_key(&name) {
                let value = self.eval_variable(&name, &mut memo)?;
                vars.insert(name, value);
            }
        }
        let value = expr.eval(&|n: &str| vars.get(n).copied())?;
        if !value.is_finite() {
            return Err(NotebookError::NonFinite {
                name: source.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// Resolve a constructor argument to a number
    pub fn resolve(&self, scalar: &Scalar) -> Result<f64, NotebookError> {
        match scalar {
            Scalar::Value(v) => Ok(*v),
            Scalar::Param(source) => self.eval_expression(source),
        }
    }

    /// Raw value as it was set
    pub fn value(&self, name: &str) -> Option<&VarValue> {
        self.variables.get(name).map(|v| &v.value)
    }

    /// Variables that transitively read `name`
    pub fn dependents(&self, name: &str) -> Vec<String> {
        self.graph.get_dependents(name)
    }

    /// Variable names in the order they were first set
    pub fn names(&self) -> &[String] {
        self.graph.declared()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Snapshot of evaluated notebook variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookValues {
    values: BTreeMap<String, f64>,
}

impl NotebookValues {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Typed parameters of the parametric rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleParams {
    pub l_x: f64,
    pub l_y: f64,
}

impl Default for RectangleParams {
    fn default() -> Self {
        Self { l_x: 3.0, l_y: 1.0 }
    }
}

impl RectangleParams {
    pub const L_X: &'static str = "l_x";
    pub const L_Y: &'static str = "l_y";
    pub const L_X_HALF: &'static str = "l_x_half";
    pub const L_Y_HALF: &'static str = "l_y_half";

    pub fn new(l_x: f64, l_y: f64) -> Self {
        Self { l_x, l_y }
    }

    pub fn l_x_half(&self) -> f64 {
        0.5 * self.l_x
    }

    pub fn l_y_half(&self) -> f64 {
        0.5 * self.l_y
    }

    /// Write the four variables into a notebook; the halves are declared as
    /// expressions over the full lengths
    pub fn write_to(&self, notebook: &mut Notebook) -> Result<(), NotebookError> {
        notebook.set(Self::L_X, self.l_x)?;
        notebook.set(Self::L_Y, self.l_y)?;
        notebook.set(Self::L_X_HALF, "0.5*l_x")?;
        notebook.set(Self::L_Y_HALF, "0.5*l_y")?;
        Ok(())
    }

    /// Read the lengths back from an evaluated notebook
    pub fn from_notebook(notebook: &Notebook) -> Result<Self, NotebookError> {
        Ok(Self {
            l_x: notebook.get(Self::L_X)?,
            l_y: notebook.get(Self::L_Y)?,
        })
    }
}
