// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Run configuration

use crate::io::ExportFormat;
use crate::mesh::Hypothesis;
use crate::notebook::VarValue;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "parmesh.toml";

/// Configuration of a procedure run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParmeshConfig {
    /// Maximum element size; automatic when absent
    pub max_size: Option<f64>,
    /// Minimum element size
    pub min_size: Option<f64>,
    /// Output directory for meshes and the study
    pub output_dir: PathBuf,
    /// Mesh export formats
    pub formats: Vec<ExportFormat>,
    /// Whether to save the study next to the meshes
    pub save_study: bool,
    /// Verbose output
    pub verbose: bool,
    /// Notebook variables set before the geometry is built
    pub variables: BTreeMap<String, VarValue>,
}

impl Default for ParmeshConfig {
    fn default() -> Self {
        Self {
            max_size: None,
            min_size: None,
            output_dir: PathBuf::from("."),
            formats: vec![ExportFormat::Stl],
            save_study: true,
            verbose: false,
            variables: BTreeMap::new(),
        }
    }
}

impl ParmeshConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ParmeshConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Reads `path` when given, otherwise `parmesh.toml` if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PARMESH_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(max_size) = lookup("PARMESH_MAX_SIZE") {
            self.max_size = Some(
                max_size
                    .parse()
                    .with_context(|| format!("Invalid PARMESH_MAX_SIZE: {}", max_size))?,
            );
        }

        if let Some(min_size) = lookup("PARMESH_MIN_SIZE") {
            self.min_size = Some(
                min_size
                    .parse()
                    .with_context(|| format!("Invalid PARMESH_MIN_SIZE: {}", min_size))?,
            );
        }

        if let Some(output_dir) = lookup("PARMESH_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(output_dir);
        }

        if let Some(verbose) = lookup("PARMESH_VERBOSE") {
            self.verbose = parse_flag(&verbose)
                .with_context(|| format!("Invalid PARMESH_VERBOSE: {}", verbose))?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Element size hypothesis described by this configuration
    pub fn hypothesis(&self) -> Hypothesis {
        Hypothesis {
            max_size: self.max_size,
            min_size: self.min_size,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParmeshConfig::default();
        assert_eq!(config.formats, vec![ExportFormat::Stl]);
        assert!(config.save_study);
        assert_eq!(config.hypothesis(), Hypothesis::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ParmeshConfig = toml::from_str(
            r#"
            max_size = 0.25
            formats = ["stl", "json"]

            [variables]
            l_x = 4.0
            l_y = "l_x / 2"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_size, Some(0.25));
        assert_eq!(config.formats, vec![ExportFormat::Stl, ExportFormat::Json]);
        assert_eq!(config.variables["l_x"], VarValue::Number(4.0));
        assert_eq!(config.variables["l_y"], VarValue::Expression("l_x / 2".into()));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ParmeshConfig::default();
        config
            .apply_overrides(|key| match key {
                "PARMESH_MAX_SIZE" => Some("0.1".to_string()),
                "PARMESH_OUTPUT_DIR" => Some("out".to_string()),
                "PARMESH_VERBOSE" => Some("true".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.max_size, Some(0.1));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.verbose);

        let bad = config.apply_overrides(|key| (key == "PARMESH_MIN_SIZE").then(|| "tiny".to_string()));
        assert!(bad.is_err());
    }

    #[test]
    fn test_verbose_flag_values() {
        for (value, expected) in [("1", true), ("yes", true), ("TRUE", true), ("0", false), ("off", false)] {
            let mut config = ParmeshConfig::default();
            config
                .apply_overrides(|key| (key == "PARMESH_VERBOSE").then(|| value.to_string()))
                .unwrap();
            assert_eq!(config.verbose, expected, "PARMESH_VERBOSE={}", value);
        }

        let mut config = ParmeshConfig::default();
        let err = config
            .apply_overrides(|key| (key == "PARMESH_VERBOSE").then(|| "loud".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PARMESH_VERBOSE"));
    }
}
