// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for parmesh

pub mod reporter;

pub use reporter::Reporter;

use crate::notebook::VarValue;
use crate::session::Desktop;
use crate::study::Study;

/// Desktop that prints the object browser to the terminal
#[derive(Debug, Default)]
pub struct TerminalDesktop;

impl Desktop for TerminalDesktop {
    fn name(&self) -> &str {
        "terminal"
    }

    fn update_object_browser(&mut self, study: &Study) {
        println!();
        Reporter::report_study(study);
    }
}

/// Parse a `NAME=VALUE` assignment; numeric values stay numbers
pub fn parse_assignment(source: &str) -> Result<(String, VarValue), String> {
    let (name, value) = source
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", source))?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return Err(format!("expected NAME=VALUE, got {:?}", source));
    }
    let value = match value.parse::<f64>() {
        Ok(number) => VarValue::Number(number),
        Err(_) => VarValue::Expression(value.to_string()),
    };
    Ok((name.to_string(), value))
}

/// Parse a sweep point written `LXxLY`, e.g. `4x5`
pub fn parse_dims(source: &str) -> Result<(f64, f64), String> {
    let (l_x, l_y) = source
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected LXxLY, got {:?}", source))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid dimension {:?} in {:?}", s, source))
    };
    Ok((parse(l_x)?, parse(l_y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("l_x=4").unwrap(),
            ("l_x".to_string(), VarValue::Number(4.0))
        );
        assert_eq!(
            parse_assignment("l_y = 0.5*l_x").unwrap(),
            ("l_y".to_string(), VarValue::Expression("0.5*l_x".to_string()))
        );
        assert!(parse_assignment("l_x").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn test_parse_dims() {
        assert_eq!(parse_dims("4x5").unwrap(), (4.0, 5.0));
        assert_eq!(parse_dims("1.5X2").unwrap(), (1.5, 2.0));
        assert!(parse_dims("4by5").is_err());
        assert!(parse_dims("ax1").is_err());
    }
}
