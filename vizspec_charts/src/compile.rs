// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch from chart descriptions to the per-kind builders.

extern crate alloc;

use alloc::string::{String, ToString};

use serde::Deserialize;
use serde_json::Value;
use vizspec_core::SpecDocument;

use crate::display::ChartDescription;
use crate::error::CompileError;
use crate::lowering::{Lowering, NoLowering};
use crate::options::CompileOptions;
use crate::theme::{self, Theme};
use crate::{bar, timeseries, vega};

const KIND_KEY: &str = "@type";

/// A compiled chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartOutput {
    /// The spec handed to the runtime, already themed.
    pub spec: SpecDocument,
    /// Whether the embedder should render a legend next to the chart.
    pub has_legend: bool,
    /// Column whose values the legend lists; empty when the legend lists value columns.
    pub legend_column: String,
}

/// Compiles chart descriptions with a fixed theme, options and lowering.
#[derive(Clone, Copy, Debug)]
pub struct Compiler<'a> {
    theme: &'a Theme,
    options: CompileOptions,
    lowering: &'a dyn Lowering,
}

impl<'a> Compiler<'a> {
    /// A compiler with default options that rejects higher-level specs.
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            options: CompileOptions::default(),
            lowering: &NoLowering,
        }
    }

    /// Replaces the compile options.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the lowering used for higher-level specs.
    pub fn with_lowering(mut self, lowering: &'a dyn Lowering) -> Self {
        self.lowering = lowering;
        self
    }

    /// Compiles `display`, reading rows from the data source named `source`.
    ///
    /// The theme is applied to every successful result, compiled or passed through.
    pub fn compile(
        &self,
        display: &ChartDescription,
        source: &str,
    ) -> Result<ChartOutput, CompileError> {
        let kind = display.kind();
        tracing::debug!(kind, source, "compiling chart");
        let mut output = match display {
            ChartDescription::Timeseries(chart) => {
                timeseries::compile(chart, source, &self.options)
            }
            ChartDescription::Bar(chart) => bar::compile(chart, source, &self.options),
            ChartDescription::Vega(chart) => vega::compile(chart, self.lowering),
        }?;
        theme::hydrate(&mut output.spec, self.theme);
        Ok(output)
    }

    /// Compiles a description given as JSON.
    ///
    /// The `@type` tag is checked before the rest, so an unknown tag is reported as such rather
    /// than as a shape mismatch.
    pub fn compile_json(&self, display: &Value, source: &str) -> Result<ChartOutput, CompileError> {
        let kind = display
            .get(KIND_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !crate::CHART_KINDS.contains(&kind) {
            return Err(CompileError::UnsupportedKind(String::from(kind)));
        }
        let description = ChartDescription::deserialize(display)
            .map_err(|err| CompileError::MalformedDescription(err.to_string()))?;
        self.compile(&description, source)
    }
}

/// Compiles `display` with default options.
///
/// See [`Compiler`] for options and higher-level spec support.
pub fn compile(
    display: &ChartDescription,
    source: &str,
    theme: &Theme,
) -> Result<ChartOutput, CompileError> {
    Compiler::new(theme).compile(display, source)
}
