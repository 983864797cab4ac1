// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiles chart description files into Vega specs.
//!
//! Usage:
//! - `vizspec_demo compile <file> [--source NAME] [--theme dark|light] [--keep-boundary]`
//! - `vizspec_demo signals <file> [--source NAME] [--container W H]`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{debug, info};
use vizspec_charts::{ChartOutput, CompileOptions, Compiler, Theme};
use vizspec_signals::{SignalGraph, SignalRuntime};

#[derive(Parser, Debug)]
#[command(name = "vizspec_demo")]
#[command(about = "Compile chart descriptions into interactive Vega specs")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the compiled spec as JSON.
    Compile {
        /// Chart description file.
        file: PathBuf,
        #[command(flatten)]
        chart: ChartArgs,
        /// Theme preset.
        #[arg(long, value_enum, default_value_t = ThemeName::Dark)]
        theme: ThemeName,
        /// Keep the first and last timestep of timeseries data.
        #[arg(long)]
        keep_boundary: bool,
    },
    /// Print the signal update order and initial values of the compiled spec.
    Signals {
        /// Chart description file.
        file: PathBuf,
        #[command(flatten)]
        chart: ChartArgs,
        /// Container size in pixels; unknown when omitted.
        #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
        container: Option<Vec<f64>>,
    },
}

#[derive(clap::Args, Debug)]
struct ChartArgs {
    /// Name of the data source the embedder populates.
    #[arg(long, default_value = "output")]
    source: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeName {
    Dark,
    Light,
}

impl ThemeName {
    fn theme(self) -> Theme {
        match self {
            Self::Dark => Theme::dark(),
            Self::Light => Theme::light(),
        }
    }
}

fn read_description(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn compile(
    path: &Path,
    source: &str,
    theme: &Theme,
    options: CompileOptions,
) -> Result<ChartOutput> {
    let description = read_description(path)?;
    let output = Compiler::new(theme)
        .with_options(options)
        .compile_json(&description, source)
        .with_context(|| format!("compiling {}", path.display()))?;
    if let Some(spec) = output.spec.as_compiled() {
        spec.validate()
            .with_context(|| format!("validating the spec compiled from {}", path.display()))?;
    }
    info!(
        file = %path.display(),
        has_legend = output.has_legend,
        legend_column = %output.legend_column,
        "compiled"
    );
    Ok(output)
}

fn print_signals(output: &ChartOutput, container: Option<[f64; 2]>) -> Result<()> {
    let Some(spec) = output.spec.as_compiled() else {
        bail!("passthrough specs are not analyzed");
    };
    let graph = SignalGraph::build(&spec.signals).context("ordering signals")?;
    let runtime = SignalRuntime::new(spec, container).context("evaluating initial values")?;
    for name in graph.ordered_names() {
        let value = runtime.value(name).cloned().unwrap_or(Value::Null);
        println!("{name} = {value}");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    debug!(?args, "parsed arguments");
    match args.command {
        Command::Compile {
            file,
            chart,
            theme,
            keep_boundary,
        } => {
            let options = CompileOptions::default().with_trim_boundary_timesteps(!keep_boundary);
            let output = compile(&file, &chart.source, &theme.theme(), options)?;
            let json = serde_json::to_string_pretty(&output.spec).context("serializing spec")?;
            println!("{json}");
        }
        Command::Signals {
            file,
            chart,
            container,
        } => {
            let container = match container.as_deref() {
                Some(&[width, height]) => Some([width, height]),
                Some(_) => bail!("--container takes a width and a height"),
                None => None,
            };
            let output = compile(
                &file,
                &chart.source,
                &Theme::default(),
                CompileOptions::default(),
            )?;
            print_signals(&output, container)?;
        }
    }
    Ok(())
}
