// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform IR types.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use vizspec_expr::{Expr, ExprRef, SignalRef};

/// Stack baseline offset mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StackOffset {
    /// Stack positive and negative values around 0 (Vega default).
    Zero,
    /// Center each stack around the middle of the tallest one.
    Center,
    /// Scale each stack to the range `[0, 1]`.
    Normalize,
}

/// Aggregation operation for [`Transform::Aggregate`] and [`Transform::JoinAggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    /// Count rows.
    Count,
    /// Sum values.
    Sum,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// Mean value.
    Mean,
}

/// Sorting order for a [`Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    /// Ascending order.
    #[serde(rename = "ascending")]
    Asc,
    /// Descending order.
    #[serde(rename = "descending")]
    Desc,
}

/// A sort comparator (Vega `compare`): one or more field accessors with per-field order.
///
/// Single-key comparators serialize their `field`/`order` as scalars; multi-key comparators, and
/// comparators built with [`Compare::keys`], serialize them as arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    /// Field accessors, most significant first.
    pub fields: SmallVec<[String; 1]>,
    /// Orders aligned with `fields`. Empty means the runtime default (ascending).
    pub orders: SmallVec<[SortOrder; 1]>,
    /// Emit arrays even for a single key.
    pub as_arrays: bool,
}

impl Compare {
    /// Compares by one field without an explicit order.
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            fields: smallvec::smallvec![field.into()],
            orders: SmallVec::new(),
            as_arrays: false,
        }
    }

    /// Compares by one field in the given order.
    pub fn by(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            fields: smallvec::smallvec![field.into()],
            orders: smallvec::smallvec![order],
            as_arrays: false,
        }
    }

    /// Compares by a list of keys, each with its own order.
    pub fn keys<S: Into<String>>(keys: impl IntoIterator<Item = (S, SortOrder)>) -> Self {
        let mut fields = SmallVec::new();
        let mut orders = SmallVec::new();
        for (field, order) in keys {
            fields.push(field.into());
            orders.push(order);
        }
        Self {
            fields,
            orders,
            as_arrays: true,
        }
    }

    /// Returns the most significant key and its order, if any.
    pub fn primary(&self) -> Option<(&str, Option<SortOrder>)> {
        let field = self.fields.first()?;
        Some((field.as_str(), self.orders.first().copied()))
    }
}

impl Serialize for Compare {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        struct OneOrMany<'a, T>(&'a [T], bool);

        impl<T: Serialize> Serialize for OneOrMany<'_, T> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.0 {
                    [one] if !self.1 => one.serialize(serializer),
                    many => {
                        let mut seq = serializer.serialize_seq(Some(many.len()))?;
                        for item in many {
                            seq.serialize_element(item)?;
                        }
                        seq.end()
                    }
                }
            }
        }

        let len = if self.orders.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("field", &OneOrMany(&self.fields, self.as_arrays))?;
        if !self.orders.is_empty() {
            map.serialize_entry("order", &OneOrMany(&self.orders, self.as_arrays))?;
        }
        map.end()
    }
}

/// A data transform, applied in order within a data source or mark pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transform {
    /// Derive a field from an expression.
    Formula {
        /// Expression evaluated per datum.
        expr: Expr,
        /// Output field.
        #[serde(rename = "as")]
        as_: String,
    },
    /// Keep only rows for which `expr` is truthy.
    Filter {
        /// Predicate evaluated per datum.
        expr: Expr,
    },
    /// Keep only the listed fields.
    Project {
        /// Fields to keep.
        fields: Vec<String>,
    },
    /// Reshape rows so that each distinct value of `field` becomes its own column.
    Pivot {
        /// Field whose values become new columns.
        field: String,
        /// Field whose values fill the new columns.
        value: String,
        /// Fields identifying an output row.
        groupby: Vec<String>,
    },
    /// Group rows and replace them with one aggregated row per group.
    ///
    /// With no `ops` the runtime emits one row per distinct group key.
    Aggregate {
        /// Group-by key fields.
        groupby: Vec<String>,
        /// Operations, aligned with `fields` and `as_`.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        ops: Vec<AggregateOp>,
        /// Input fields.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<String>,
        /// Output fields.
        #[serde(rename = "as", skip_serializing_if = "Vec::is_empty")]
        as_: Vec<String>,
    },
    /// Like [`Transform::Aggregate`], but writes the aggregate back onto every input row.
    #[serde(rename = "joinaggregate")]
    JoinAggregate {
        /// Group-by key fields; empty aggregates over all rows.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        groupby: Vec<String>,
        /// Operations, aligned with `fields` and `as_`.
        ops: Vec<AggregateOp>,
        /// Input fields.
        fields: Vec<String>,
        /// Output fields.
        #[serde(rename = "as")]
        as_: Vec<String>,
    },
    /// Compute a stack layout, writing start/end offsets per row.
    Stack {
        /// Group-by key fields defining independent stacks.
        groupby: Vec<String>,
        /// Field providing the value to accumulate.
        field: String,
        /// Order of rows within each stack.
        #[serde(skip_serializing_if = "Option::is_none")]
        sort: Option<Compare>,
        /// Output start and end fields.
        #[serde(rename = "as")]
        as_: [String; 2],
        /// Baseline offset mode.
        #[serde(skip_serializing_if = "Option::is_none")]
        offset: Option<StackOffset>,
    },
    /// Compute a Voronoi cell path per datum over the given extent.
    Voronoi {
        /// X coordinate accessor.
        x: ExprRef,
        /// Y coordinate accessor.
        y: ExprRef,
        /// Clip extent `[width, height]`.
        size: [SignalRef; 2],
    },
}

impl Transform {
    /// `formula`: `as_ = expr`.
    pub fn formula(expr: Expr, as_: impl Into<String>) -> Self {
        Self::Formula {
            expr,
            as_: as_.into(),
        }
    }

    /// `filter` by `expr`.
    pub fn filter(expr: Expr) -> Self {
        Self::Filter { expr }
    }

    /// Returns the fields this transform writes onto its output rows.
    pub fn output_fields(&self) -> Vec<&str> {
        match self {
            Self::Formula { as_, .. } => alloc::vec![as_.as_str()],
            Self::Aggregate { groupby, as_, .. } => groupby
                .iter()
                .chain(as_.iter())
                .map(String::as_str)
                .collect(),
            Self::JoinAggregate { as_, .. } => as_.iter().map(String::as_str).collect(),
            Self::Stack { as_, .. } => as_.iter().map(String::as_str).collect(),
            Self::Project { fields } => fields.iter().map(String::as_str).collect(),
            Self::Filter { .. } | Self::Pivot { .. } | Self::Voronoi { .. } => Vec::new(),
        }
    }
}
