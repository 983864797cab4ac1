// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The top-level compiled specification.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;
use serde_json::{Map, Value};
use vizspec_expr::SignalRef;
use vizspec_transforms::Pipeline;

use crate::guide::{Axis, Legend};
use crate::mark::{Mark, Style};
use crate::scale::Scale;
use crate::signal::Signal;

/// Schema URL of the low-level grammar the compiler emits.
pub const VEGA_V5_SCHEMA: &str = "https://vega.github.io/schema/vega/v5.json";

/// Schema URL of the higher-level grammar accepted through lowering.
pub const VEGA_LITE_V4_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v4.json";

/// A named data source with an optional parent and an ordered transform chain.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Data {
    /// Unique name.
    pub name: String,
    /// Parent data source; the chain runs over a copy of its output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Transforms applied in order.
    #[serde(skip_serializing_if = "Pipeline::is_empty")]
    pub transform: Pipeline,
}

impl Data {
    /// A root data source populated by the embedder.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            transform: Pipeline::new(),
        }
    }

    /// A derived data source reading from `source`.
    pub fn derived(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
            transform: Pipeline::new(),
        }
    }

    /// Sets the transform chain.
    pub fn with_transform(mut self, transform: Pipeline) -> Self {
        self.transform = transform;
        self
    }
}

/// How the view sizes itself to its container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Autosize {
    /// Sizing strategy.
    #[serde(rename = "type")]
    pub kind: String,
    /// What the size includes.
    pub contains: String,
}

impl Autosize {
    /// Fit the container, padding included.
    pub fn fit_padding() -> Self {
        Self {
            kind: String::from("fit"),
            contains: String::from("padding"),
        }
    }
}

/// Chart title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Title {
    /// Text.
    pub text: String,
}

/// Title anchoring per grid header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TitleAnchor {
    /// Anchor for column titles.
    pub column: String,
}

/// Offsets per grid header.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOffset {
    /// Offset of column titles.
    pub column_title: f64,
}

/// Grid layout of the top-level group marks.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    /// Space between cells.
    pub padding: f64,
    /// Header title anchoring.
    pub title_anchor: TitleAnchor,
    /// Header offsets.
    pub offset: LayoutOffset,
    /// Column count.
    pub columns: SignalRef,
    /// Bounds used for layout.
    pub bounds: String,
    /// Cell alignment.
    pub align: String,
}

/// A compiled specification.
///
/// Entries refer to each other by name only; see [`Spec::validate`](crate::Spec::validate).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Spec {
    /// Grammar version.
    #[serde(rename = "$schema")]
    pub schema: String,
    /// Sizing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosize: Option<Autosize>,
    /// Style of the top-level group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    /// Chart title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    /// Background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Padding around the view, in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    /// Grid layout of top-level groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<GridLayout>,
    /// Data sources, parents first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Data>,
    /// Signals.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<Signal>,
    /// Scales.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scales: Vec<Scale>,
    /// Top-level axes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<Axis>,
    /// Top-level marks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    /// Legends.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub legends: Vec<Legend>,
    /// Runtime configuration defaults (theme).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

impl Spec {
    /// An empty v5 specification.
    pub fn new() -> Self {
        Self {
            schema: String::from(VEGA_V5_SCHEMA),
            autosize: None,
            style: None,
            title: None,
            background: None,
            padding: None,
            layout: None,
            data: Vec::new(),
            signals: Vec::new(),
            scales: Vec::new(),
            axes: Vec::new(),
            marks: Vec::new(),
            legends: Vec::new(),
            config: None,
        }
    }

    /// Iterates all marks depth-first, parents before children.
    pub fn walk_marks(&self) -> impl Iterator<Item = &Mark> {
        let mut stack: Vec<&Mark> = self.marks.iter().rev().collect();
        core::iter::from_fn(move || {
            let mark = stack.pop()?;
            stack.extend(mark.marks.iter().rev());
            Some(mark)
        })
    }

    /// Finds a mark by name at any depth.
    pub fn find_mark(&self, name: &str) -> Option<&Mark> {
        self.walk_marks().find(|m| m.name == name)
    }

    /// Finds a signal by name.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Finds a scale by name.
    pub fn scale(&self, name: &str) -> Option<&Scale> {
        self.scales.iter().find(|s| s.name == name)
    }

    /// Finds a data source by name.
    pub fn data_source(&self, name: &str) -> Option<&Data> {
        self.data.iter().find(|d| d.name == name)
    }
}

impl Default for Spec {
    fn default() -> Self {
        Self::new()
    }
}
