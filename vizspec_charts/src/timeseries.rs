// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timeseries charts: lines, points and stacked areas over a time scale.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use vizspec_core::{
    Autosize, Data, DataId, Domain, Encode, EncodeEntry, Facet, Mark, MarkFrom, MarkRef,
    MarkType, SpecBuilder, ValueRef,
};
use vizspec_expr::Expr;
use vizspec_transforms::Compare;

use crate::axis;
use crate::compile::ChartOutput;
use crate::data;
use crate::display::{Captions, Mode, TimeseriesChart, TimeseriesSeries};
use crate::error::{Combination, CompileError, RequiredField};
use crate::hover;
use crate::names::{
    self, COLOR_SCALE, HOVER_PIVOT_DATA, TIME_FIELD, TRANSFORMED_DATA, X_SCALE, X_SIGNAL_SCALE,
    Y_SCALE,
};
use crate::options::CompileOptions;
use crate::scale::{self, TimeseriesScales};
use crate::signals::{self, ReverseSignals};
use crate::z_order;

/// Stroke width of the invisible hit boxes.
const HIT_BOX_WIDTH: f64 = 7.0;

/// Mark kind drawn for a mode.
pub(crate) fn mark_type(mode: Mode) -> MarkType {
    match mode {
        Mode::Point => MarkType::Symbol,
        Mode::Area => MarkType::Area,
        Mode::Line | Mode::Unknown => MarkType::Line,
    }
}

/// A validated series.
#[derive(Clone, Copy, Debug)]
struct Plan<'a> {
    series: &'a TimeseriesSeries,
    discriminator: Option<&'a str>,
    kind: MarkType,
}

impl Plan<'_> {
    /// Expression identifying this series' items to the legend.
    ///
    /// Without a discriminator that is the value column name; with one, the row's sub-series.
    fn selector(&self) -> Expr {
        match self.discriminator {
            Some(field) => Expr::datum_field(field),
            None => Expr::string(self.series.value.as_str()),
        }
    }
}

fn plan(chart: &TimeseriesChart) -> Result<Vec<Plan<'_>>, CompileError> {
    let all = chart
        .timeseries
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(RequiredField::Timeseries)?;
    all.iter()
        .map(|series| {
            let discriminator = series.discriminator();
            if discriminator.is_some() && all.len() > 1 {
                return Err(Combination::SubseriesWithMultipleTimeseries.into());
            }
            if series.stack_by_series && discriminator.is_none() {
                return Err(Combination::StackWithoutSeries.into());
            }
            let kind = mark_type(series.mode);
            if kind == MarkType::Area && !series.stack_by_series {
                return Err(Combination::AreaWithoutStack.into());
            }
            Ok(Plan {
                series,
                discriminator,
                kind,
            })
        })
        .collect()
}

fn push_into(builder: &mut SpecBuilder, parent: Option<&MarkRef>, mark: Mark) -> MarkRef {
    match parent {
        Some(parent) => builder.push_child_mark(parent, mark),
        None => builder.push_mark(mark),
    }
}

/// Compiles a timeseries chart reading rows from `source`.
pub(crate) fn compile(
    chart: &TimeseriesChart,
    source: &str,
    options: &CompileOptions,
) -> Result<ChartOutput, CompileError> {
    let plans = plan(chart)?;
    let series: Vec<TimeseriesSeries> = plans.iter().map(|p| p.series.clone()).collect();
    let hover_pipeline = data::hover_transforms(&series)?;
    let captions = Captions::new(&chart.title, &chart.x_axis, &chart.y_axis);

    let mut builder = SpecBuilder::new();
    builder.set_autosize(Autosize::fit_padding());
    builder.set_style("cell");

    builder.push_data(Data::named(source));
    let transformed = builder.push_data(
        Data::derived(TRANSFORMED_DATA, source)
            .with_transform(data::time_transforms(options.trim_boundary_timesteps)),
    );
    builder.push_data(
        Data::derived(HOVER_PIVOT_DATA, TRANSFORMED_DATA).with_transform(hover_pipeline),
    );
    tracing::debug!(source, series = plans.len(), "timeseries data sources");
    builder.check_stage("data");

    signals::add_width_height(&mut builder, "width", "height", options.fallback_size);
    let reverse = signals::add_hover_select(&mut builder);
    signals::add_ts_domain(&mut builder, X_SIGNAL_SCALE);

    let scales =
        scale::timeseries_scales(&mut builder, plans.iter().map(|p| p.series.value.as_str()));
    builder.check_stage("scales");
    axis::timeseries_axes(&mut builder, &captions, options);

    let mut legend_column = String::new();
    for (index, plan) in plans.iter().enumerate() {
        if let Some(field) = plan.discriminator {
            legend_column = String::from(field);
        }
        add_series(&mut builder, index, plan, transformed, scales, &reverse);
    }
    tracing::debug!(marks = builder.spec().marks.len(), "timeseries series marks");

    hover::add_hover_marks(&mut builder, HOVER_PIVOT_DATA);
    if let Some(title) = captions.title {
        builder.set_title(title);
    }

    Ok(ChartOutput {
        spec: builder.finish().into(),
        has_legend: true,
        legend_column,
    })
}

/// Adds the data mark, legend emphasis and hit box of one series.
fn add_series(
    builder: &mut SpecBuilder,
    index: usize,
    plan: &Plan<'_>,
    transformed: DataId,
    scales: TimeseriesScales,
    reverse: &ReverseSignals,
) {
    let value = plan.series.value.as_str();
    let (group, data_name) = match plan.discriminator {
        Some(field) => {
            let data_name = names::faceted_data(index);
            let group = Mark::group(names::timeseries_group(index))
                .with_from(MarkFrom::Facet {
                    facet: Facet {
                        name: data_name.clone(),
                        data: String::from(TRANSFORMED_DATA),
                        groupby: vec![String::from(field)],
                    },
                })
                .with_encode(Encode::update(
                    EncodeEntry::new()
                        .with("width", ValueRef::group_field("width"))
                        .with("height", ValueRef::group_field("height")),
                ))
                .with_zindex(z_order::PLOT);
            let group = builder.push_mark(group);
            builder.scale_mut(scales.color).domain =
                Some(Domain::sorted_field(TRANSFORMED_DATA, field));
            (Some(group), data_name)
        }
        None => {
            if !builder.scale_mut(scales.color).push_domain_value(value) {
                tracing::warn!(value, "color domain is data-driven; series name not added");
            }
            (None, String::from(TRANSFORMED_DATA))
        }
    };

    let mut y_field = String::from(value);
    let mut y2_field = None;
    if let (true, Some(field)) = (plan.series.stack_by_series, plan.discriminator) {
        let (transforms, stacked) = data::timeseries_stack(value, field);
        builder.data_mut(transformed).transform.extend(transforms);
        builder.scale_mut(scales.y).domain = Some(Domain::Fields {
            data: String::from(TRANSFORMED_DATA),
            fields: vec![stacked.start.clone(), stacked.end.clone()],
        });
        y_field = stacked.end;
        y2_field = Some(stacked.start);
    }

    let mut update = EncodeEntry::new()
        .with("x", ValueRef::scaled_field(X_SCALE, TIME_FIELD))
        .with("y", ValueRef::scaled_field(Y_SCALE, y_field));
    let is_area = plan.kind == MarkType::Area;
    if let (true, Some(start)) = (is_area, y2_field) {
        update.set("y2", ValueRef::scaled_field(Y_SCALE, start));
    }
    match plan.discriminator {
        Some(field) => {
            update.set("stroke", ValueRef::scaled_field(COLOR_SCALE, field));
            if is_area {
                update.set("fill", ValueRef::scaled_field(COLOR_SCALE, field));
            }
        }
        None => {
            update.set("stroke", ValueRef::scaled_value(COLOR_SCALE, value));
        }
    }
    let selector = plan.selector();
    signals::add_legend_emphasis(&mut update, &selector);

    let mark = Mark::new(names::timeseries_mark(index), plan.kind)
        .with_style(plan.kind.name())
        .with_from(MarkFrom::data(data_name))
        .with_sort(Compare::field(Expr::datum_field(TIME_FIELD).to_string()))
        .with_encode(Encode::update(update))
        .with_zindex(z_order::PLOT);

    let mut hit_box = mark.clone();
    hit_box.name = names::hit_box_mark(index);
    let hit_update = hit_box.encode_mut().update_mut();
    hit_update.set("opacity", vec![ValueRef::value(0)]);
    hit_update.set("strokeWidth", vec![ValueRef::value(HIT_BOX_WIDTH)]);
    hit_box.zindex = Some(z_order::HIT_BOX);
    let hit_box_name = hit_box.name.clone();

    push_into(builder, group.as_ref(), mark);
    push_into(builder, group.as_ref(), hit_box);
    reverse.extend_with_hit_box(builder, &hit_box_name, &selector);
    tracing::trace!(index, kind = plan.kind.name(), "added series");
}

#[cfg(test)]
mod tests {
    extern crate std;

    use vizspec_transforms::Pipeline;

    use super::*;

    fn hover_pipeline_of(chart: &TimeseriesChart) -> Result<Pipeline, CompileError> {
        let series: Vec<TimeseriesSeries> =
            plan(chart)?.iter().map(|p| p.series.clone()).collect();
        Ok(data::hover_transforms(&series)?)
    }

    fn chart(series: Vec<TimeseriesSeries>) -> TimeseriesChart {
        TimeseriesChart {
            timeseries: Some(series),
            ..TimeseriesChart::default()
        }
    }

    fn series(value: &str) -> TimeseriesSeries {
        TimeseriesSeries {
            value: String::from(value),
            ..TimeseriesSeries::default()
        }
    }

    #[test]
    fn modes_map_to_mark_types() {
        assert_eq!(mark_type(Mode::Point), MarkType::Symbol);
        assert_eq!(mark_type(Mode::Area), MarkType::Area);
        assert_eq!(mark_type(Mode::Unknown), MarkType::Line);
    }

    #[test]
    fn validation_rejects_before_building() {
        assert_eq!(
            plan(&chart(Vec::new())).unwrap_err(),
            CompileError::MissingRequiredField(RequiredField::Timeseries)
        );
        let stacked = TimeseriesSeries {
            stack_by_series: true,
            ..series("latency")
        };
        assert_eq!(
            plan(&chart(vec![stacked])).unwrap_err(),
            CompileError::UnsupportedCombination(Combination::StackWithoutSeries)
        );
        let area = TimeseriesSeries {
            mode: Mode::Area,
            series: Some(String::from("service")),
            ..series("latency")
        };
        assert_eq!(
            plan(&chart(vec![area])).unwrap_err(),
            CompileError::UnsupportedCombination(Combination::AreaWithoutStack)
        );
    }

    #[test]
    fn empty_discriminators_count_as_missing() {
        let blank = TimeseriesSeries {
            series: Some(String::new()),
            ..series("latency")
        };
        let c = chart(vec![blank, series("errors")]);
        assert!(plan(&c).is_ok(), "a blank series field is not a discriminator");
        assert_eq!(hover_pipeline_of(&c).unwrap().len(), 1);
    }
}
