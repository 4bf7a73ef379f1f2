// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::mesh::ComputeStatus;
use crate::script::{ScriptOutput, SweepResult};
use crate::study::{Component, EntryData, Study, StudyEntry};
use colored::*;
use std::path::PathBuf;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report the outcome of the parametric square procedure
    pub fn report_run(output: &ScriptOutput, written: &[PathBuf]) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Procedure:".bold(), "parametric square".cyan());
        println!("{}", "━".repeat(80).bright_black());

        println!("\n{}", "Notebook:".bold());
        for (name, value) in output.values.iter() {
            println!("  {} {}", format!("{}:", name).bright_black(), value.to_string().cyan());
        }

        println!("\n{}", "Geometry:".bold());
        println!(
            "  {} {}",
            "Face_1:".bright_black(),
            output.shapes.face.construction.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Translation_1:".bright_black(),
            output.shapes.translation.construction.to_string().cyan()
        );

        println!("\n{}", "Mesh:".bold());
        Self::print_status(&output.status);
        if let Some(report) = &output.report {
            println!(
                "  {} {}",
                "Nodes:".bright_black(),
                report.node_count.to_string().cyan()
            );
            println!(
                "  {} {}",
                "Triangles:".bright_black(),
                report.triangle_count.to_string().cyan()
            );
            println!(
                "  {} {}",
                "Element size:".bright_black(),
                format!("{:.4}", report.element_size).cyan()
            );
            println!(
                "  {} {}",
                "Time:".bright_black(),
                Self::format_duration(report.elapsed).yellow()
            );
        }

        if !written.is_empty() {
            println!("\n{}", "Outputs:".bold());
            for path in written {
                println!("  {}", path.display().to_string().cyan());
            }
        }
        println!("{}", "━".repeat(80).bright_black());
    }

    /// List the entries of a study as a tree
    pub fn report_study(study: &Study) {
        println!("{} {}", "Study:".bold(), study.name.cyan());
        println!(
            "  {} {}",
            "Created:".bright_black(),
            study.created.format("%Y-%m-%d %H:%M:%S UTC").to_string().bright_black()
        );
        for component in [Component::Geometry, Component::Mesh] {
            let entries: Vec<&StudyEntry> = study.component(component).collect();
            if entries.is_empty() {
                continue;
            }
            println!("  {}", component.label().bold());
            for entry in entries {
                println!("    {}", Self::describe_entry(entry));
            }
        }
    }

    fn describe_entry(entry: &StudyEntry) -> String {
        let detail = match &entry.data {
            EntryData::Shape(shape) => shape.construction.to_string(),
            EntryData::Algorithm(algorithm) => algorithm.type_name().to_string(),
            EntryData::Mesh(record) => match &record.status {
                ComputeStatus::Done => format!(
                    "{} nodes, {} triangles",
                    record.node_count, record.triangle_count
                ),
                ComputeStatus::NotComputed => "not computed".to_string(),
                ComputeStatus::Failed(reason) => format!("failed: {}", reason),
            },
        };
        format!(
            "{} {} {}",
            format!("[{}]", entry.data.kind()).bright_black(),
            entry.name.cyan(),
            detail.bright_black()
        )
    }

    /// Summarize a sweep
    pub fn report_sweep(results: &[SweepResult]) {
        println!("\n{}", "═".repeat(80).bright_black());
        println!("{}", "Sweep Summary".bold());
        println!("{}", "═".repeat(80).bright_black());
        for result in results {
            match &result.outcome {
                Ok(output) => match (&output.status, &output.report) {
                    (ComputeStatus::Done, Some(report)) => println!(
                        "  {} {} {}",
                        "✅".green(),
                        result.name.cyan(),
                        format!(
                            "{} nodes, {} triangles, {}",
                            report.node_count,
                            report.triangle_count,
                            Self::format_duration(report.elapsed)
                        )
                        .bright_black()
                    ),
                    (status, _) => println!(
                        "  {} {} {}",
                        "⚠️".yellow(),
                        result.name.cyan(),
                        format!("{:?}", status).yellow()
                    ),
                },
                Err(err) => println!("  {} {} {}", "❌".red(), result.name.cyan(), err.to_string().red()),
            }
        }
        let done = results
            .iter()
            .filter(|r| r.outcome.as_ref().map_or(false, |o| o.status.is_done()))
            .count();
        println!(
            "\n  {} {}/{}",
            "Meshed:".bright_black(),
            done.to_string().green(),
            results.len()
        );
        println!("{}", "═".repeat(80).bright_black());
    }

    fn print_status(status: &ComputeStatus) {
        match status {
            ComputeStatus::Done => println!("  {} {}", "✅".green(), "Mesh computed".green().bold()),
            ComputeStatus::NotComputed => println!("  {} {}", "⚠️".yellow(), "Mesh not computed".yellow()),
            ComputeStatus::Failed(reason) => {
                println!("  {} {}", "❌".red(), "Mesh computation failed".red().bold());
                println!("     {}", reason.bright_black());
            }
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}
