// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered transform lists.

extern crate alloc;

use alloc::vec::Vec;

use serde::{Serialize, Serializer};

use crate::Transform;

/// An ordered list of transforms owned by a data source or mark.
///
/// Pipelines only grow: later compile stages append to a pipeline that earlier stages created,
/// and the runtime applies entries in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pipeline {
    transforms: Vec<Transform>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform.
    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    /// Returns the transforms in application order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Returns `true` if the pipeline has no transforms.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Returns the number of transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns `true` if some transform writes `field`.
    pub fn writes(&self, field: &str) -> bool {
        self.transforms
            .iter()
            .any(|t| t.output_fields().contains(&field))
    }
}

impl Extend<Transform> for Pipeline {
    fn extend<I: IntoIterator<Item = Transform>>(&mut self, iter: I) {
        self.transforms.extend(iter);
    }
}

impl FromIterator<Transform> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Transform>>(iter: I) -> Self {
        Self {
            transforms: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Pipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.transforms.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::String;
    use alloc::vec;

    use serde_json::json;
    use vizspec_expr::Expr;

    use super::*;
    use crate::{AggregateOp, Compare, SortOrder, StackOffset};

    #[test]
    fn stack_with_keyed_sort_serializes_arrays() {
        let mut p = Pipeline::new();
        p.push(Transform::Stack {
            groupby: vec![String::from("endpoint")],
            field: String::from("sum_count"),
            sort: Some(Compare::keys([("status", SortOrder::Desc)])),
            as_: [String::from("sum_count_start"), String::from("sum_count_end")],
            offset: Some(StackOffset::Zero),
        });
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!([{
                "type": "stack",
                "groupby": ["endpoint"],
                "field": "sum_count",
                "sort": {"field": ["status"], "order": ["descending"]},
                "as": ["sum_count_start", "sum_count_end"],
                "offset": "zero",
            }])
        );
    }

    #[test]
    fn joinaggregate_without_groupby_omits_it() {
        let t = Transform::JoinAggregate {
            groupby: vec![],
            ops: vec![AggregateOp::Min, AggregateOp::Max],
            fields: vec![String::from("time_"), String::from("time_")],
            as_: vec![String::from("min_time"), String::from("max_time")],
        };
        assert_eq!(
            serde_json::to_value(&t).unwrap(),
            json!({
                "type": "joinaggregate",
                "ops": ["min", "max"],
                "fields": ["time_", "time_"],
                "as": ["min_time", "max_time"],
            })
        );
    }

    #[test]
    fn formula_renders_expression_text() {
        let t = Transform::formula(
            Expr::call("toDate", [Expr::datum_field("time_")]),
            "time_",
        );
        assert_eq!(
            serde_json::to_value(&t).unwrap(),
            json!({"type": "formula", "expr": "toDate(datum[\"time_\"])", "as": "time_"})
        );
    }

    #[test]
    fn writes_tracks_derived_fields() {
        let p: Pipeline = [
            Transform::formula(Expr::Null, "a"),
            Transform::filter(Expr::Bool(true)),
        ]
        .into_iter()
        .collect();
        assert!(p.writes("a"));
        assert!(!p.writes("b"));
        assert_eq!(p.len(), 2);
        assert_eq!(Compare::field("x").primary(), Some(("x", None)));
    }
}
