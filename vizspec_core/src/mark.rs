// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mark declarations, including group marks that own nested marks and axes.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;
use vizspec_expr::SignalRef;
use vizspec_transforms::{Compare, Pipeline};

use crate::encode::Encode;
use crate::guide::{Axis, AxisOrient};

/// Mark kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    /// Connected line through all items.
    Line,
    /// One symbol per item.
    Symbol,
    /// Filled area between `y` and `y2`.
    Area,
    /// Rectangles.
    Rect,
    /// Line segments.
    Rule,
    /// Text labels.
    Text,
    /// Arbitrary paths.
    Path,
    /// Container for nested marks, axes and facets.
    Group,
}

impl MarkType {
    /// The serialized name, which doubles as the default config style of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Symbol => "symbol",
            Self::Area => "area",
            Self::Rect => "rect",
            Self::Rule => "rule",
            Self::Text => "text",
            Self::Path => "path",
            Self::Group => "group",
        }
    }
}

/// Config style reference: one style name or a cascade of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Style {
    /// A single style.
    Name(String),
    /// Styles applied in order.
    List(Vec<String>),
}

impl From<&str> for Style {
    fn from(name: &str) -> Self {
        Self::Name(String::from(name))
    }
}

/// Partition of a data source into one group item per distinct key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Facet {
    /// Name under which each partition is visible to child marks.
    pub name: String,
    /// Partitioned data source.
    pub data: String,
    /// Partition keys.
    pub groupby: Vec<String>,
}

/// Where a mark's items come from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkFrom {
    /// One item per datum of a data source (or of a previously declared mark).
    Data {
        /// Data source or mark name.
        data: String,
    },
    /// One group item per facet partition.
    Facet {
        /// Partition description.
        facet: Facet,
    },
}

impl MarkFrom {
    /// Items from a named data source.
    pub fn data(name: impl Into<String>) -> Self {
        Self::Data { data: name.into() }
    }
}

/// Title text: literal, or computed from a signal expression.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TitleText {
    /// Literal text.
    Literal(String),
    /// Computed text.
    Signal(SignalRef),
}

/// A title attached to a group mark.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkTitle {
    /// Text.
    pub text: TitleText,
    /// Reference frame (`"group"` or `"bounds"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
    /// Placement.
    pub orient: AxisOrient,
    /// Pixel offset from the group.
    pub offset: f64,
    /// Config style name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// A mark declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mark {
    /// Unique name; event selectors and reactive geometry refer to marks by name.
    pub name: String,
    /// Mark kind.
    #[serde(rename = "type")]
    pub kind: MarkType,
    /// Layout role inside a grid layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Config style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    /// Whether items receive input events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
    /// Item source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<MarkFrom>,
    /// Item order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Compare>,
    /// Group title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<MarkTitle>,
    /// Visual encodings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<Encode>,
    /// Post-encoding transforms (reactive geometry).
    #[serde(skip_serializing_if = "Pipeline::is_empty")]
    pub transform: Pipeline,
    /// Rendering order among siblings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zindex: Option<i32>,
    /// Nested marks (group marks only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    /// Nested axes (group marks only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<Axis>,
}

impl Mark {
    /// A mark with no source, encodings or children.
    pub fn new(name: impl Into<String>, kind: MarkType) -> Self {
        Self {
            name: name.into(),
            kind,
            role: None,
            style: None,
            interactive: None,
            from: None,
            sort: None,
            title: None,
            encode: None,
            transform: Pipeline::new(),
            zindex: None,
            marks: Vec::new(),
            axes: Vec::new(),
        }
    }

    /// A group mark.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, MarkType::Group)
    }

    /// Sets the item source.
    pub fn with_from(mut self, from: MarkFrom) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the config style.
    pub fn with_style(mut self, style: impl Into<Style>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Sets the item order.
    pub fn with_sort(mut self, sort: Compare) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the encodings.
    pub fn with_encode(mut self, encode: Encode) -> Self {
        self.encode = Some(encode);
        self
    }

    /// Sets the rendering order.
    pub fn with_zindex(mut self, zindex: i32) -> Self {
        self.zindex = Some(zindex);
        self
    }

    /// Returns the encodings, creating them if needed.
    pub fn encode_mut(&mut self) -> &mut Encode {
        self.encode.get_or_insert_with(Encode::default)
    }

    /// Returns the facet name this group exposes to its children, if any.
    pub fn facet_name(&self) -> Option<&str> {
        match &self.from {
            Some(MarkFrom::Facet { facet }) => Some(&facet.name),
            _ => None,
        }
    }
}
