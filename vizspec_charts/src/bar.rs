// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar charts, optionally stacked by a column and grouped into panels by another.
//!
//! Grouped bars use a grid layout: a title row, a header group owning the value axis, one footer
//! per group value owning the band axis, and a faceted group drawing one panel per group value.

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;

use serde_json::Value;
use vizspec_core::{
    Autosize, AxisOrient, Data, Domain, Encode, EncodeEntry, Facet, GridLayout, LayoutOffset,
    Legend, LegendEncode, Mark, MarkFrom, MarkRef, MarkTitle, MarkType, SpecBuilder, TitleAnchor,
    TitleText, ValueRef,
};
use vizspec_expr::{Expr, SignalRef};
use vizspec_transforms::{Compare, SortOrder};

use crate::axis;
use crate::compile::ChartOutput;
use crate::data;
use crate::display::{BarChart, Captions, non_empty};
use crate::error::{CompileError, RequiredField};
use crate::names::{
    BAR_GROUP_MARK, BAR_MARK, COLOR_SCALE, COLUMN_DOMAIN_DATA, COLUMN_FOOTER_MARK,
    COLUMN_TITLE_MARK, FACETED_BAR_DATA, ROW_HEADER_MARK, TRANSFORMED_DATA, X_SCALE, Y_SCALE,
};
use crate::options::CompileOptions;
use crate::scale;
use crate::signals;

const GRID_PADDING: f64 = 20.0;
const GROUP_TITLE_OFFSET: f64 = 10.0;

/// Validated fields of a bar block.
#[derive(Clone, Copy, Debug)]
struct Fields<'a> {
    value: &'a str,
    label: &'a str,
    stack_by: Option<&'a str>,
    group_by: Option<&'a str>,
}

fn fields(chart: &BarChart) -> Result<Fields<'_>, RequiredField> {
    let bar = chart.bar.as_ref().ok_or(RequiredField::Bar)?;
    Ok(Fields {
        value: non_empty(bar.value.as_deref()).ok_or(RequiredField::BarValue)?,
        label: non_empty(bar.label.as_deref()).ok_or(RequiredField::BarLabel)?,
        stack_by: non_empty(bar.stack_by.as_deref()),
        group_by: non_empty(bar.group_by.as_deref()),
    })
}

/// Groups of a grouped bar chart that own the axes.
struct AxisOwners {
    x: MarkRef,
    y: MarkRef,
}

fn size_update(width: Option<&str>, height: Option<&str>) -> Encode {
    let mut entry = EncodeEntry::new();
    if let Some(width) = width {
        entry.set("width", ValueRef::signal(Expr::ident(width)));
    }
    if let Some(height) = height {
        entry.set("height", ValueRef::signal(Expr::ident(height)));
    }
    Encode::update(entry)
}

/// Title row, value-axis header and band-axis footers of the grid.
fn add_grid_headers(
    builder: &mut SpecBuilder,
    group_by: &str,
    label: &str,
    width: &str,
    height: &str,
) -> AxisOwners {
    let mut title = Mark::group(COLUMN_TITLE_MARK);
    title.role = Some(String::from(COLUMN_TITLE_MARK));
    title.title = Some(MarkTitle {
        text: TitleText::Literal(format!("{group_by}, {label}")),
        frame: None,
        orient: AxisOrient::Bottom,
        offset: GROUP_TITLE_OFFSET,
        style: Some(String::from("grouped-bar-x-title")),
    });
    builder.push_mark(title);

    let mut header = Mark::group(ROW_HEADER_MARK).with_encode(size_update(None, Some(height)));
    header.role = Some(String::from(ROW_HEADER_MARK));
    let y = builder.push_mark(header);

    let mut footer = Mark::group(COLUMN_FOOTER_MARK)
        .with_from(MarkFrom::data(COLUMN_DOMAIN_DATA))
        .with_sort(Compare::by(
            Expr::datum_field(group_by).to_string(),
            SortOrder::Asc,
        ))
        .with_encode(size_update(Some(width), None));
    footer.role = Some(String::from(COLUMN_FOOTER_MARK));
    footer.title = Some(MarkTitle {
        text: TitleText::Signal(SignalRef::expr(Expr::ident("parent").field(group_by))),
        frame: Some(String::from("group")),
        orient: AxisOrient::Bottom,
        offset: GROUP_TITLE_OFFSET,
        style: Some(String::from("grouped-bar-x-subtitle")),
    });
    let x = builder.push_mark(footer);
    AxisOwners { x, y }
}

fn grid_layout() -> GridLayout {
    GridLayout {
        padding: GRID_PADDING,
        title_anchor: TitleAnchor {
            column: String::from("end"),
        },
        offset: LayoutOffset {
            column_title: GROUP_TITLE_OFFSET,
        },
        columns: SignalRef::expr(Expr::call(
            "length",
            [Expr::call("data", [Expr::string(COLUMN_DOMAIN_DATA)])],
        )),
        bounds: String::from("full"),
        align: String::from("all"),
    }
}

/// Compiles a bar chart reading rows from `source`.
pub(crate) fn compile(
    chart: &BarChart,
    source: &str,
    options: &CompileOptions,
) -> Result<ChartOutput, CompileError> {
    let fields = fields(chart)?;
    let captions = Captions::new(&chart.title, &chart.x_axis, &chart.y_axis);

    let mut builder = SpecBuilder::new();
    if fields.group_by.is_none() {
        builder.set_autosize(Autosize::fit_padding());
        builder.set_style("cell");
    }

    builder.push_data(Data::named(source));
    let transformed = builder.push_data(Data::derived(TRANSFORMED_DATA, source));
    let mut value_fields = vec![String::from(fields.value)];
    let mut stacked = None;
    if let Some(stack_by) = fields.stack_by {
        let (transforms, sum, stack) =
            data::bar_stack(fields.value, fields.label, stack_by, fields.group_by);
        builder.data_mut(transformed).transform.extend(transforms);
        value_fields = vec![stack.start.clone(), stack.end.clone()];
        tracing::trace!(sum = %sum, "stacked bars");
        stacked = Some(stack);
    }
    if let Some(group_by) = fields.group_by {
        builder.push_data(
            Data::derived(COLUMN_DOMAIN_DATA, TRANSFORMED_DATA)
                .with_transform(data::column_domain(group_by)),
        );
    }
    tracing::debug!(source, grouped = fields.group_by.is_some(), "bar data sources");
    builder.check_stage("data");

    let (width, height) = match fields.group_by {
        Some(_) => ("child_width", "child_height"),
        None => ("width", "height"),
    };
    signals::add_width_height(&mut builder, width, height, options.fallback_size);

    let color_domain = match fields.stack_by {
        Some(stack_by) => Domain::sorted_field(TRANSFORMED_DATA, stack_by),
        None => Domain::Values(vec![String::from(fields.value)]),
    };
    scale::bar_scales(
        &mut builder,
        fields.label,
        value_fields,
        color_domain,
        width,
        height,
    );
    builder.check_stage("scales");

    let mut owners = None;
    let mut parent = None;
    let mut data_name = TRANSFORMED_DATA;
    if let Some(group_by) = fields.group_by {
        owners = Some(add_grid_headers(
            &mut builder,
            group_by,
            fields.label,
            width,
            height,
        ));
        builder.set_layout(grid_layout());
        data_name = FACETED_BAR_DATA;
        let group = Mark::group(BAR_GROUP_MARK)
            .with_style("cell")
            .with_from(MarkFrom::Facet {
                facet: Facet {
                    name: String::from(FACETED_BAR_DATA),
                    data: String::from(TRANSFORMED_DATA),
                    groupby: vec![String::from(group_by)],
                },
            })
            .with_sort(Compare::keys([(
                Expr::datum_field(group_by).to_string(),
                SortOrder::Asc,
            )]))
            .with_encode(size_update(Some(width), Some(height)));
        parent = Some(builder.push_mark(group));
    }

    let mut update = EncodeEntry::new();
    match fields.stack_by {
        Some(stack_by) => update.set("fill", ValueRef::scaled_field(COLOR_SCALE, stack_by)),
        None => update.set("fill", ValueRef::scaled_value(COLOR_SCALE, fields.value)),
    };
    update.set("x", ValueRef::scaled_field(X_SCALE, fields.label));
    match &stacked {
        Some(stack) => {
            update.set("y", ValueRef::scaled_field(Y_SCALE, stack.end.as_str()));
            update.set("y2", ValueRef::scaled_field(Y_SCALE, stack.start.as_str()));
        }
        None => {
            update.set("y", ValueRef::scaled_field(Y_SCALE, fields.value));
            update.set("y2", ValueRef::scaled_value(Y_SCALE, 0));
        }
    }
    update.set("width", ValueRef::band(X_SCALE, 1.0));
    let bar = Mark::new(BAR_MARK, MarkType::Rect)
        .with_style("bar")
        .with_from(MarkFrom::data(data_name))
        .with_encode(Encode::update(update));
    match &parent {
        Some(parent) => builder.push_child_mark(parent, bar),
        None => builder.push_mark(bar),
    };

    axis::bar_axes(
        &mut builder,
        owners.as_ref().map(|o| &o.x),
        owners.as_ref().map(|o| &o.y),
        height,
        &captions,
        options,
    );

    if let Some(stack_by) = fields.stack_by {
        builder.push_legend(Legend {
            fill: String::from(COLOR_SCALE),
            symbol_type: Some(String::from("square")),
            title: Some(String::from(stack_by)),
            encode: Some(LegendEncode {
                symbols: Some(Encode::update(
                    EncodeEntry::new().with("stroke", ValueRef::value(Value::Null)),
                )),
            }),
        });
    }
    if let Some(title) = captions.title {
        builder.set_title(title);
    }

    Ok(ChartOutput {
        spec: builder.finish().into(),
        has_legend: false,
        legend_column: String::new(),
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::display::Bar;

    fn chart(value: Option<&str>, label: Option<&str>) -> BarChart {
        BarChart {
            bar: Some(Bar {
                value: value.map(String::from),
                label: label.map(String::from),
                ..Bar::default()
            }),
            ..BarChart::default()
        }
    }

    #[test]
    fn each_missing_field_is_named() {
        assert_eq!(
            fields(&BarChart::default()).unwrap_err(),
            RequiredField::Bar
        );
        assert_eq!(
            fields(&chart(None, Some("service"))).unwrap_err(),
            RequiredField::BarValue
        );
        assert_eq!(
            fields(&chart(Some("count"), Some(""))).unwrap_err(),
            RequiredField::BarLabel
        );
        let complete = chart(Some("count"), Some("service"));
        let ok = fields(&complete).unwrap();
        assert_eq!((ok.value, ok.label), ("count", "service"));
    }

    #[test]
    fn grid_columns_follow_the_group_count() {
        let layout = serde_json::to_value(grid_layout()).unwrap();
        assert_eq!(
            layout["columns"],
            serde_json::json!({"signal": "length(data(\"column-domain\"))"})
        );
        assert_eq!(layout["titleAnchor"]["column"], "end");
    }

    #[test]
    fn footers_sort_by_group_and_title_from_parent() {
        let mut b = SpecBuilder::new();
        add_grid_headers(&mut b, "region", "service", "child_width", "child_height");
        let footer = serde_json::to_value(b.spec().find_mark(COLUMN_FOOTER_MARK).unwrap()).unwrap();
        assert_eq!(
            footer["sort"],
            serde_json::json!({"field": "datum[\"region\"]", "order": "ascending"})
        );
        assert_eq!(
            footer["title"]["text"],
            serde_json::json!({"signal": "parent[\"region\"]"})
        );
        assert_eq!(footer["role"], "column-footer");
    }
}
