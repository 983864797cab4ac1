// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Guides: axes and legends.

extern crate alloc;

use alloc::string::String;

use serde::Serialize;
use vizspec_expr::SignalRef;

use crate::encode::Encode;

/// Which side of the plot an axis is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrient {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
}

/// Custom encodings for axis sub-elements.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AxisEncode {
    /// Tick labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Encode>,
}

/// An axis over a named scale.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    /// Scale the axis visualizes.
    pub scale: String,
    /// Placement.
    pub orient: AxisOrient,
    /// Draw gridlines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<bool>,
    /// Scale used to extend gridlines across the plot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_scale: Option<String>,
    /// Flush the first and last labels to the axis extent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_flush: Option<bool>,
    /// Hide overlapping labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_overlap: Option<bool>,
    /// Horizontal label alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_align: Option<String>,
    /// Label rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_angle: Option<f64>,
    /// Vertical label baseline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_baseline: Option<String>,
    /// Desired tick count, usually derived from the axis extent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_count: Option<SignalRef>,
    /// Axis title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Custom encodings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<AxisEncode>,
    /// Rendering order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zindex: Option<i32>,
}

impl Axis {
    /// An axis with runtime defaults.
    pub fn new(scale: impl Into<String>, orient: AxisOrient) -> Self {
        Self {
            scale: scale.into(),
            orient,
            grid: None,
            grid_scale: None,
            label_flush: None,
            label_overlap: None,
            label_align: None,
            label_angle: None,
            label_baseline: None,
            tick_count: None,
            title: None,
            encode: None,
            zindex: None,
        }
    }
}

/// Custom encodings for legend sub-elements.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LegendEncode {
    /// Legend symbols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Encode>,
}

/// A legend over a color scale.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    /// Scale providing symbol fill colors.
    pub fill: String,
    /// Symbol shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_type: Option<String>,
    /// Legend title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Custom encodings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<LegendEncode>,
}
