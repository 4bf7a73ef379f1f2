// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! parmesh CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parmesh::cli::{parse_assignment, parse_dims, Reporter, TerminalDesktop};
use parmesh::io::{export_mesh, ExportFormat};
use parmesh::notebook::{Notebook, RectangleParams, VarValue};
use parmesh::script::{run_parametric_square, sweep_with_progress, ScriptOptions};
use parmesh::{ParmeshConfig, Session, Study};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parmesh")]
#[command(about = "Parametric rectangle modelling and 2D triangulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, publish and mesh the parametric square
    Run(RunArgs),

    /// Evaluate an expression against the default notebook
    Eval {
        /// Notebook assignment applied before evaluation
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, VarValue)>,

        /// Expression, e.g. "l_x_half * 2"
        expr: String,
    },

    /// Mesh the square for several dimension pairs
    Sweep {
        /// Dimension pairs written LXxLY, e.g. 1x1 2x2 4x5
        #[arg(required = true, value_parser = parse_dims)]
        dims: Vec<(f64, f64)>,

        /// Maximum element size
        #[arg(long)]
        max_size: Option<f64>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Mesh output format
        #[arg(short, long, default_value = "stl")]
        format: ExportFormat,
    },

    /// List the entries of a saved study
    Inspect {
        /// Study file
        study: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct RunArgs {
    /// Notebook assignment, e.g. l_x=4 or l_y=0.5*l_x
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, VarValue)>,

    /// Maximum element size
    #[arg(long)]
    max_size: Option<f64>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Mesh output format (stl, json); repeatable
    #[arg(short, long = "format")]
    formats: Vec<ExportFormat>,

    /// Do not save the study
    #[arg(long)]
    no_study: bool,

    /// Print the object browser after the run
    #[arg(long)]
    desktop: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RunArgs {
    /// Layer command-line flags over a loaded configuration
    fn apply(self, config: &mut ParmeshConfig, verbose: bool) {
        config.verbose |= verbose;
        config.variables.extend(self.set);
        if self.max_size.is_some() {
            config.max_size = self.max_size;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if !self.formats.is_empty() {
            config.formats = self.formats;
        }
        if self.no_study {
            config.save_study = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            let mut config = ParmeshConfig::load(args.config.as_deref())?;
            let desktop = args.desktop;
            args.apply(&mut config, cli.verbose);
            run_command(&config, desktop)?;
        }
        Commands::Eval { set, expr } => {
            eval_command(&set, &expr)?;
        }
        Commands::Sweep {
            dims,
            max_size,
            output_dir,
            format,
        } => {
            sweep_command(&dims, max_size, &output_dir, format, cli.verbose)?;
        }
        Commands::Inspect { study } => {
            let study = Study::load(&study).with_context(|| format!("Failed to load study: {:?}", study))?;
            Reporter::report_study(&study);
        }
        Commands::Version => {
            println!("parmesh v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "parmesh=debug" } else { "parmesh=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(config: &ParmeshConfig, desktop: bool) -> Result<()> {
    let mut session = Session::init();
    if desktop {
        session.attach_desktop(Box::new(TerminalDesktop));
    }

    let options = ScriptOptions::from_config(config);
    let output = run_parametric_square(&mut session, &options)?;

    let mut written = Vec::new();
    if let Some(mesh) = output.mesh.mesh() {
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", config.output_dir))?;
        let name = output.mesh.name().unwrap_or("Mesh_1");
        for format in &config.formats {
            written.push(export_mesh(mesh, name, &config.output_dir, *format)?);
        }
    }

    let study = session.shutdown();
    if config.save_study {
        std::fs::create_dir_all(&config.output_dir)?;
        let path = config.output_dir.join("study.json");
        study.save(&path)?;
        written.push(path);
    }

    Reporter::report_run(&output, &written);
    if let Some(mesh) = output.mesh.mesh() {
        parmesh::mesh::analyze(mesh).print();
    }
    if config.verbose {
        Reporter::report_study(&study);
    }

    if !output.is_done() {
        Reporter::report_warning("procedure finished without a mesh");
        std::process::exit(2);
    }
    Reporter::success("procedure finished");
    Ok(())
}

fn eval_command(set: &[(String, VarValue)], expr: &str) -> Result<()> {
    let mut notebook = Notebook::new();
    RectangleParams::default().write_to(&mut notebook)?;
    for (name, value) in set {
        notebook.set(name, value.clone())?;
    }

    match notebook.eval_expression(expr) {
        Ok(value) => {
            println!("{} = {}", expr.cyan(), value.to_string().green().bold());
            Ok(())
        }
        Err(e) => {
            Reporter::report_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

fn sweep_command(
    dims: &[(f64, f64)],
    max_size: Option<f64>,
    output_dir: &Path,
    format: ExportFormat,
    verbose: bool,
) -> Result<()> {
    let mut options = ScriptOptions::default();
    options.hypothesis.max_size = max_size;

    let pb = ProgressBar::new(dims.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let results = sweep_with_progress(dims, &options, |result| {
        pb.set_message(result.name.clone());
        pb.inc(1);
    });
    pb.finish_with_message("Sweep complete");

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
    for result in &results {
        if let Ok(output) = &result.outcome {
            if let Some(mesh) = &output.mesh {
                let path = export_mesh(mesh, &result.name, output_dir, format)?;
                if verbose {
                    Reporter::report_info(&format!("wrote {}", path.display()));
                }
            }
        }
    }

    Reporter::report_sweep(&results);

    let failed = results
        .iter()
        .filter(|r| r.outcome.as_ref().map_or(true, |o| !o.status.is_done()))
        .count();
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
