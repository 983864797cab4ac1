// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiles high-level chart descriptions into interactive Vega v5 specs.
//!
//! A [`ChartDescription`] says *what* to plot: a timeseries of value columns, a bar chart, or a
//! pre-authored spec. [`compile`] (or a configured [`Compiler`]) turns it into a [`ChartOutput`]:
//! - a themed [`SpecDocument`](vizspec_core::SpecDocument) with data sources, scales, axes, marks
//!   and the signal graph for hover, legend interplay and cross-chart time-domain sync, and
//! - the legend flag and discriminator column the embedder needs to draw a legend.
//!
//! Compilation is synchronous and pure. Descriptions are validated before anything is built, and a
//! failure never comes with a partial spec.
//!
//! ```
//! use vizspec_charts::{ChartDescription, Theme, TimeseriesChart, TimeseriesSeries, compile};
//!
//! let chart = ChartDescription::Timeseries(TimeseriesChart {
//!     timeseries: Some(vec![TimeseriesSeries {
//!         value: "latency".into(),
//!         ..TimeseriesSeries::default()
//!     }]),
//!     ..TimeseriesChart::default()
//! });
//! let output = compile(&chart, "requests", &Theme::dark()).unwrap();
//! assert!(output.has_legend);
//! assert!(output.legend_column.is_empty());
//! ```

#![no_std]

extern crate alloc;

mod axis;
mod bar;
mod compile;
mod data;
mod display;
mod error;
mod hover;
mod lowering;
pub mod names;
mod options;
mod scale;
mod signals;
mod theme;
mod timeseries;
mod vega;
pub mod z_order;

#[cfg(test)]
mod chart_tests;

pub use compile::{ChartOutput, Compiler, compile};
pub use display::{
    AxisLabel, BAR_CHART_KIND, Bar, BarChart, CHART_KINDS, ChartDescription, Mode,
    TIMESERIES_CHART_KIND, TimeseriesChart, TimeseriesSeries, VEGA_CHART_KIND, VegaChart,
};
pub use error::{Combination, CompileError, RequiredField};
pub use lowering::{Lowering, NoLowering};
pub use options::CompileOptions;
pub use theme::{Theme, css_hex, hydrate};
