// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compile failures.

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// A field a chart description must provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredField {
    /// `timeseries` of a timeseries chart, with at least one entry.
    Timeseries,
    /// `bar` of a bar chart.
    Bar,
    /// `bar.value`.
    BarValue,
    /// `bar.label`.
    BarLabel,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeseries => "TimeseriesChart must have one timeseries entry",
            Self::Bar => "BarChart must have an entry for property bar",
            Self::BarValue => "BarChart property bar must have an entry for property value",
            Self::BarLabel => "BarChart property bar must have an entry for property label",
        })
    }
}

/// An option combination the compiler rejects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combination {
    /// A discriminator field on a series that is not the only one in the chart.
    SubseriesWithMultipleTimeseries,
    /// `stackBySeries` without a discriminator field.
    StackWithoutSeries,
    /// Area mode on a series that is not stacked.
    AreaWithoutStack,
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SubseriesWithMultipleTimeseries => {
                "Subseries are not supported for multiple timeseries within a TimeseriesChart"
            }
            Self::StackWithoutSeries => {
                "Stack by series is not supported when series is not specified."
            }
            Self::AreaWithoutStack => "Area charts not supported unless stacked by series.",
        })
    }
}

/// Error compiling a chart description.
///
/// A failed compile never produces a partial spec.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The `@type` tag names no known chart kind.
    #[error("Unsupported display type: {0}")]
    UnsupportedKind(String),
    /// A required field is missing or empty.
    #[error("{0}")]
    MissingRequiredField(RequiredField),
    /// Fields are individually valid but cannot be combined.
    #[error("{0}")]
    UnsupportedCombination(Combination),
    /// The lowering of a higher-level spec failed.
    #[error("lowering failed: {0}")]
    DelegatedLoweringFailure(String),
    /// Description JSON does not match the shape of its kind.
    #[error("malformed chart description: {0}")]
    MalformedDescription(String),
    /// Raw spec text is not a JSON object.
    #[error("malformed spec: {0}")]
    MalformedSpec(String),
}

impl From<RequiredField> for CompileError {
    fn from(field: RequiredField) -> Self {
        Self::MissingRequiredField(field)
    }
}

impl From<Combination> for CompileError {
    fn from(combination: Combination) -> Self {
        Self::UnsupportedCombination(combination)
    }
}
