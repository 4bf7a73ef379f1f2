// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Notebook expression parser using pest

use crate::error::NotebookError;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Parser)]
#[grammar = "notebook/expr.pest"]
struct ExprParser;

/// Binary operators, lowest to highest precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "**",
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }
}

/// Parsed notebook expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Parse an expression such as `"0.5*l_x"`
    pub fn parse(source: &str) -> Result<Expr, NotebookError> {
        let mut pairs = ExprParser::parse(Rule::expression, source).map_err(|e| {
            NotebookError::Parse {
                expression: source.to_string(),
                message: e.to_string(),
            }
        })?;

        let expression = next_pair(&mut pairs, source)?;
        let sum = next_pair(&mut expression.into_inner(), source)?;
        build(sum, source)
    }

    /// Names of all variables referenced by this expression, in first-use order
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                if !names.contains(name) && constant(name).is_none() {
                    names.push(name.clone());
                }
            }
            Expr::Neg(inner) => inner.collect_variables(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(names);
                }
            }
        }
    }

    /// Evaluate against a variable lookup.
    ///
    /// Lookup wins over the built-in constants `pi` and `e`, so a notebook
    /// variable named `e` shadows Euler's number.
    pub fn eval<F>(&self, lookup: &F) -> Result<f64, NotebookError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Variable(name) => lookup(name)
                .or_else(|| constant(name))
                .ok_or_else(|| NotebookError::UnknownVariable(name.clone())),
            Expr::Neg(inner) => Ok(-inner.eval(lookup)?),
            Expr::Binary { op, lhs, rhs } => Ok(op.apply(lhs.eval(lookup)?, rhs.eval(lookup)?)),
            Expr::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.eval(lookup))
                    .collect::<Result<Vec<_>, _>>()?;
                call(name, &values)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{}", value),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Neg(inner) => write!(f, "-({})", inner),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, NotebookError> {
    let unary = |f: fn(f64) -> f64| -> Result<f64, NotebookError> {
        match args {
            [x] => Ok(f(*x)),
            _ => Err(NotebookError::UnknownFunction(format!(
                "{}/{} (expected 1 argument)",
                name,
                args.len()
            ))),
        }
    };

    match name {
        "sqrt" => unary(f64::sqrt),
        "abs" => unary(f64::abs),
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        "exp" => unary(f64::exp),
        "log" => unary(f64::ln),
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "min" | "max" if !args.is_empty() => {
            let fold = if name == "min" { f64::min } else { f64::max };
            Ok(args[1..].iter().fold(args[0], |acc, &x| fold(acc, x)))
        }
        "pow" => match args {
            [base, exponent] => Ok(base.powf(*exponent)),
            _ => Err(NotebookError::UnknownFunction(format!(
                "pow/{} (expected 2 arguments)",
                args.len()
            ))),
        },
        _ => Err(NotebookError::UnknownFunction(name.to_string())),
    }
}

fn next_pair<'a>(pairs: &mut Pairs<'a, Rule>, source: &str) -> Result<Pair<'a, Rule>, NotebookError> {
    pairs.next().ok_or_else(|| NotebookError::Parse {
        expression: source.to_string(),
        message: "unexpected end of expression".to_string(),
    })
}

fn build(pair: Pair<Rule>, source: &str) -> Result<Expr, NotebookError> {
    match pair.as_rule() {
        Rule::sum | Rule::product => {
            let mut inner = pair.into_inner();
            let mut acc = build(next_pair(&mut inner, source)?, source)?;
            while let Some(op) = inner.next() {
                let rhs = build(next_pair(&mut inner, source)?, source)?;
                let op = match op.as_str() {
                    "+" => BinaryOp::Add,
                    "-" => BinaryOp::Sub,
                    "*" => BinaryOp::Mul,
                    _ => BinaryOp::Div,
                };
                acc = Expr::Binary {
                    op,
                    lhs: Box::new(acc),
                    rhs: Box::new(rhs),
                };
            }
            Ok(acc)
        }
        Rule::unary => {
            let mut negations = 0usize;
            let mut operand = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::neg => negations += 1,
                    _ => operand = Some(build(inner, source)?),
                }
            }
            let mut expr = operand.ok_or_else(|| NotebookError::Parse {
                expression: source.to_string(),
                message: "missing operand".to_string(),
            })?;
            for _ in 0..negations {
                expr = Expr::Neg(Box::new(expr));
            }
            Ok(expr)
        }
        Rule::power => {
            let mut inner = pair.into_inner();
            let base = build(next_pair(&mut inner, source)?, source)?;
            match inner.next() {
                Some(_pow_op) => {
                    let exponent = build(next_pair(&mut inner, source)?, source)?;
                    Ok(Expr::Binary {
                        op: BinaryOp::Pow,
                        lhs: Box::new(base),
                        rhs: Box::new(exponent),
                    })
                }
                None => Ok(base),
            }
        }
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = next_pair(&mut inner, source)?.as_str().to_string();
            let args = inner
                .map(|arg| build(arg, source))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::Call { name, args })
        }
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(Expr::Number)
            .map_err(|e| NotebookError::Parse {
                expression: source.to_string(),
                message: e.to_string(),
            }),
        Rule::ident => Ok(Expr::Variable(pair.as_str().to_string())),
        rule => Err(NotebookError::Parse {
            expression: source.to_string(),
            message: format!("unexpected rule {:?}", rule),
        }),
    }
}

/// Check whether `name` is a valid variable identifier
pub fn is_identifier(name: &str) -> bool {
    ExprParser::parse(Rule::ident, name)
        .map(|pairs| pairs.as_str() == name)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with(source: &str, vars: &[(&str, f64)]) -> f64 {
        let expr = Expr::parse(source).unwrap();
        expr.eval(&|name: &str| vars.iter().find(|(n, _)| *n == name).map(|(_, v)| *v))
            .unwrap()
    }

    #[test]
    fn test_half_expression() {
        assert_eq!(eval_with("0.5*l_x", &[("l_x", 3.0)]), 1.5);
        assert_eq!(eval_with("0.5 * l_y", &[("l_y", 1.0)]), 0.5);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval_with("1 + 2 * 3", &[]), 7.0);
        assert_eq!(eval_with("(1 + 2) * 3", &[]), 9.0);
        assert_eq!(eval_with("8 / 4 / 2", &[]), 1.0);
        assert_eq!(eval_with("10 - 4 - 3", &[]), 3.0);
        assert_eq!(eval_with("2 ** 3 ** 2", &[]), 512.0);
        assert_eq!(eval_with("-2 ** 2", &[]), -4.0);
        assert_eq!(eval_with("2 ^ -1", &[]), 0.5);
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(eval_with("sqrt(16)", &[]), 4.0);
        assert_eq!(eval_with("max(1, x, 2)", &[("x", 5.0)]), 5.0);
        assert_eq!(eval_with("min(3, 1.5e0)", &[]), 1.5);
        assert!((eval_with("cos(pi)", &[]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_variables_collected_once() {
        let expr = Expr::parse("a * b + a - pi").unwrap();
        assert_eq!(expr.variables(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_unknown_variable() {
        let expr = Expr::parse("0.5*l_z").unwrap();
        let err = expr.eval(&|_: &str| None).unwrap_err();
        assert_eq!(err, NotebookError::UnknownVariable("l_z".into()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Expr::parse("0.5*"), Err(NotebookError::Parse { .. })));
        assert!(matches!(Expr::parse(""), Err(NotebookError::Parse { .. })));
        assert!(matches!(Expr::parse("(1 + 2"), Err(NotebookError::Parse { .. })));
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("l_x_half"));
        assert!(is_identifier("_tmp1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("l x"));
        assert!(!is_identifier(""));
    }
}
