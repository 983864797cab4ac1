// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform chains of the derived data sources.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use vizspec_expr::Expr;
use vizspec_transforms::{AggregateOp, Compare, Pipeline, SortOrder, StackOffset, Transform};

use crate::display::TimeseriesSeries;
use crate::error::Combination;
use crate::names::TIME_FIELD;

const MIN_TIME_FIELD: &str = "min_time";
const MAX_TIME_FIELD: &str = "max_time";
const MEAN_VALUE_FIELD: &str = "meanOfValueField";

/// Start and end fields written by a stack transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Stacked {
    pub(crate) start: String,
    pub(crate) end: String,
}

/// Converts the time column to dates, then optionally drops the first and last timestep.
pub(crate) fn time_transforms(trim_boundary_timesteps: bool) -> Pipeline {
    let mut pipeline = Pipeline::new();
    pipeline.push(Transform::formula(
        Expr::call("toDate", [Expr::datum_field(TIME_FIELD)]),
        TIME_FIELD,
    ));
    if trim_boundary_timesteps {
        pipeline.push(Transform::JoinAggregate {
            groupby: Vec::new(),
            ops: vec![AggregateOp::Min, AggregateOp::Max],
            fields: vec![String::from(TIME_FIELD), String::from(TIME_FIELD)],
            as_: vec![String::from(MIN_TIME_FIELD), String::from(MAX_TIME_FIELD)],
        });
        let time = || Expr::datum().prop(TIME_FIELD);
        pipeline.push(Transform::filter(
            time()
                .gt(Expr::datum().prop(MIN_TIME_FIELD))
                .and(time().lt(Expr::datum().prop(MAX_TIME_FIELD))),
        ));
    }
    pipeline
}

/// One row per timestep for the hover overlay.
///
/// Without discriminators the value columns are kept as they are; a single discriminated series
/// is pivoted so each sub-series becomes a column.
pub(crate) fn hover_transforms(series: &[TimeseriesSeries]) -> Result<Pipeline, Combination> {
    let transform = match series {
        _ if series.iter().all(|s| s.discriminator().is_none()) => Transform::Project {
            fields: series
                .iter()
                .map(|s| s.value.clone())
                .chain([String::from(TIME_FIELD)])
                .collect(),
        },
        [only] => match only.discriminator() {
            Some(field) => Transform::Pivot {
                field: String::from(field),
                value: only.value.clone(),
                groupby: vec![String::from(TIME_FIELD)],
            },
            None => return Err(Combination::SubseriesWithMultipleTimeseries),
        },
        _ => return Err(Combination::SubseriesWithMultipleTimeseries),
    };
    Ok(core::iter::once(transform).collect())
}

/// Stacks the sub-series of `value` per timestep, heaviest series on top.
pub(crate) fn timeseries_stack(value: &str, series: &str) -> (Vec<Transform>, Stacked) {
    let stacked = Stacked {
        start: format!("{value}_stacked_start"),
        end: format!("{value}_stacked_end"),
    };
    let transforms = vec![
        Transform::JoinAggregate {
            groupby: vec![String::from(series)],
            ops: vec![AggregateOp::Mean],
            fields: vec![String::from(value)],
            as_: vec![String::from(MEAN_VALUE_FIELD)],
        },
        Transform::Stack {
            groupby: vec![String::from(TIME_FIELD)],
            field: String::from(value),
            sort: Some(Compare::by(MEAN_VALUE_FIELD, SortOrder::Asc)),
            as_: [stacked.start.clone(), stacked.end.clone()],
            offset: None,
        },
    ];
    (transforms, stacked)
}

/// Sums `value` per bar segment and stacks the segments of each bar.
///
/// Returns the transforms, the summed field and the stack fields.
pub(crate) fn bar_stack(
    value: &str,
    label: &str,
    stack_by: &str,
    group_by: Option<&str>,
) -> (Vec<Transform>, String, Stacked) {
    let sum = format!("sum_{value}");
    let stacked = Stacked {
        start: format!("{sum}_start"),
        end: format!("{sum}_end"),
    };
    let bar_keys: Vec<String> = [label].into_iter().chain(group_by).map(String::from).collect();
    let segment_keys: Vec<String> = [label, stack_by]
        .into_iter()
        .chain(group_by)
        .map(String::from)
        .collect();
    let transforms = vec![
        Transform::Aggregate {
            groupby: segment_keys,
            ops: vec![AggregateOp::Sum],
            fields: vec![String::from(value)],
            as_: vec![sum.clone()],
        },
        Transform::Stack {
            groupby: bar_keys,
            field: sum.clone(),
            sort: Some(Compare::keys([(stack_by, SortOrder::Desc)])),
            as_: [stacked.start.clone(), stacked.end.clone()],
            offset: Some(StackOffset::Zero),
        },
    ];
    (transforms, sum, stacked)
}

/// One row per distinct `group_by` value.
pub(crate) fn column_domain(group_by: &str) -> Pipeline {
    core::iter::once(Transform::Aggregate {
        groupby: vec![String::from(group_by)],
        ops: Vec::new(),
        fields: Vec::new(),
        as_: Vec::new(),
    })
    .collect()
}
