// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The hover overlay of timeseries charts.
//!
//! A dashed rule, a bulb and a boxed time label are drawn for every row of the hover data, but
//! only the row matching the hovered timestep is visible. Pointer proximity is resolved by Voronoi
//! cells around the rules rather than by hit-testing the thin rules themselves.

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use vizspec_core::{Encode, EncodeEntry, Mark, MarkFrom, MarkType, SpecBuilder, Style, ValueRef};
use vizspec_expr::{Expr, ExprRef, SignalRef};
use vizspec_transforms::Transform;

use crate::names::{
    HOVER_BULB_MARK, HOVER_RULE_MARK, HOVER_SIGNAL, HOVER_TIME_BOX_MARK, HOVER_TIME_MARK,
    HOVER_VORONOI_MARK, TIME_FIELD, X_SCALE,
};
use crate::z_order;

const HOVER_LINE_COLOR: &str = "#4dffd4";
const HOVER_TIME_COLOR: &str = "#121212";
const HOVER_LINE_OPACITY: f64 = 0.75;
const HOVER_LINE_DASH: [f64; 2] = [6.0, 6.0];
const HOVER_LINE_WIDTH: f64 = 2.0;
const HOVER_BULB_OFFSET: f64 = 10.0;
const HOVER_LINE_TEXT_OFFSET: f64 = 6.0;
const HOVER_LINE_TEXT_PADDING: f64 = 3.0;
/// Room below the plot for the time axis, covered by the Voronoi cells.
const AXIS_HEIGHT: f64 = 25.0;
const VORONOI_STROKE_WIDTH: f64 = 0.35;

/// `height + offset`
fn below_plot(offset: f64) -> Expr {
    Expr::ident("height") + Expr::number(offset)
}

/// Visible only on the row of the hovered timestep.
fn hover_opacity() -> Vec<ValueRef> {
    let hover = Expr::ident(HOVER_SIGNAL);
    let on_hovered_time = hover
        .clone()
        .and(Expr::datum())
        .and(hover.field(TIME_FIELD).strict_eq(Expr::datum_field(TIME_FIELD)));
    vec![
        ValueRef::value(HOVER_LINE_OPACITY).when(on_hovered_time),
        ValueRef::value(0),
    ]
}

fn time_x() -> ValueRef {
    ValueRef::scaled_field(X_SCALE, TIME_FIELD)
}

/// Appends the overlay marks reading rows from `data`.
pub(crate) fn add_hover_marks(builder: &mut SpecBuilder, data: &str) {
    let mut rule = Mark::new(HOVER_RULE_MARK, MarkType::Rule)
        .with_style(Style::List(vec![String::from("rule")]))
        .with_from(MarkFrom::data(data))
        .with_encode(Encode {
            enter: Some(
                EncodeEntry::new()
                    .with("stroke", ValueRef::value(HOVER_LINE_COLOR))
                    .with("strokeDash", ValueRef::value(HOVER_LINE_DASH.to_vec()))
                    .with("strokeWidth", ValueRef::value(HOVER_LINE_WIDTH)),
            ),
            update: Some(
                EncodeEntry::new()
                    .with("opacity", hover_opacity())
                    .with("x", time_x())
                    .with("y", ValueRef::value(0))
                    .with("y2", ValueRef::signal(below_plot(HOVER_LINE_TEXT_OFFSET))),
            ),
        });
    rule.interactive = Some(true);
    builder.push_mark(rule);

    let mut bulb = Mark::new(HOVER_BULB_MARK, MarkType::Symbol)
        .with_from(MarkFrom::data(data))
        .with_encode(Encode {
            enter: Some(
                EncodeEntry::new()
                    .with("fill", ValueRef::value(HOVER_LINE_COLOR))
                    .with("stroke", ValueRef::value(HOVER_LINE_COLOR))
                    .with("size", ValueRef::value(45))
                    .with("shape", ValueRef::value("circle"))
                    .with("strokeOpacity", ValueRef::value(0))
                    .with("strokeWidth", ValueRef::value(2)),
            ),
            update: Some(
                EncodeEntry::new()
                    .with("fillOpacity", ValueRef::value(0))
                    .with("x", time_x())
                    .with("y", ValueRef::signal(below_plot(HOVER_BULB_OFFSET))),
            ),
        });
    bulb.interactive = Some(true);
    builder.push_mark(bulb);

    let time_text = Expr::datum().and(Expr::raw(alloc::format!(
        "timeFormat(datum[\"{TIME_FIELD}\"], \"%I:%M:%S\")"
    )));
    builder.push_mark(
        Mark::new(HOVER_TIME_MARK, MarkType::Text)
            .with_from(MarkFrom::data(data))
            .with_encode(Encode {
                enter: Some(
                    EncodeEntry::new()
                        .with("fill", ValueRef::value(HOVER_TIME_COLOR))
                        .with("align", ValueRef::value("center"))
                        .with("baseline", ValueRef::value("top"))
                        .with("font", ValueRef::value("Roboto"))
                        .with("fontSize", ValueRef::value(10)),
                ),
                update: Some(
                    EncodeEntry::new()
                        .with("opacity", hover_opacity())
                        .with("text", ValueRef::signal(time_text))
                        .with("x", time_x())
                        .with(
                            "y",
                            ValueRef::signal(
                                below_plot(HOVER_LINE_TEXT_OFFSET)
                                    + Expr::number(HOVER_LINE_TEXT_PADDING),
                            ),
                        ),
                ),
            })
            .with_zindex(z_order::HOVER_LABEL),
    );

    // The box reads the laid-out label items, so it sizes itself to the rendered text.
    let bounds = |edge: &str| Expr::datum().prop("bounds").prop(edge);
    let padding = || Expr::number(HOVER_LINE_TEXT_PADDING);
    let text_width = bounds("x2") - bounds("x1");
    let text_height = bounds("y2") - bounds("y1");
    builder.push_mark(
        Mark::new(HOVER_TIME_BOX_MARK, MarkType::Rect)
            .with_from(MarkFrom::data(HOVER_TIME_MARK))
            .with_encode(Encode::update(
                EncodeEntry::new()
                    .with(
                        "x",
                        ValueRef::signal(
                            Expr::datum().prop("x")
                                - text_width.clone() / Expr::number(2.0)
                                - padding(),
                        ),
                    )
                    .with("y", ValueRef::signal(Expr::datum().prop("y") - padding()))
                    .with(
                        "width",
                        ValueRef::signal(text_width + Expr::number(2.0) * padding()),
                    )
                    .with(
                        "height",
                        ValueRef::signal(text_height + Expr::number(2.0) * padding()),
                    )
                    .with("fill", ValueRef::value(HOVER_LINE_COLOR))
                    .with(
                        "opacity",
                        ValueRef::signal(Expr::conditional(
                            Expr::datum().prop("opacity").gt(Expr::number(0.0)),
                            Expr::number(1.0),
                            Expr::number(0.0),
                        )),
                    ),
            ))
            .with_zindex(z_order::HOVER_LABEL_BOX),
    );

    let mut voronoi = Mark::new(HOVER_VORONOI_MARK, MarkType::Path)
        .with_from(MarkFrom::data(HOVER_RULE_MARK))
        .with_encode(Encode::update(
            EncodeEntry::new()
                .with("fill", ValueRef::value("transparent"))
                .with("strokeWidth", ValueRef::value(VORONOI_STROKE_WIDTH))
                .with("stroke", ValueRef::value("transparent"))
                .with("isVoronoi", ValueRef::value(true)),
        ))
        .with_zindex(z_order::VORONOI);
    voronoi.interactive = Some(true);
    let rule_position = |axis: &str| -> ExprRef {
        Expr::datum()
            .prop("datum")
            .prop(axis)
            .or(Expr::number(0.0))
            .into()
    };
    voronoi.transform.push(Transform::Voronoi {
        x: rule_position("x"),
        y: rule_position("y"),
        size: [
            SignalRef::named("width"),
            SignalRef::expr(below_plot(AXIS_HEIGHT)),
        ],
    });
    builder.push_mark(voronoi);
    tracing::trace!(data, "added hover overlay");
}

#[cfg(test)]
mod tests {
    extern crate std;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use vizspec_core::Data;

    use super::*;
    use crate::names::HOVER_PIVOT_DATA;

    fn overlay() -> serde_json::Value {
        let mut b = SpecBuilder::new();
        b.push_data(Data::named(HOVER_PIVOT_DATA));
        add_hover_marks(&mut b, HOVER_PIVOT_DATA);
        serde_json::to_value(&b.spec().marks).unwrap()
    }

    #[test]
    fn overlay_marks_are_declared_in_dependency_order() {
        let marks = overlay();
        let names: Vec<&str> = marks
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                HOVER_RULE_MARK,
                HOVER_BULB_MARK,
                HOVER_TIME_MARK,
                HOVER_TIME_BOX_MARK,
                HOVER_VORONOI_MARK
            ]
        );
        assert_eq!(marks[2]["zindex"], json!(1));
        assert_eq!(marks[3]["zindex"], json!(0));
        assert_eq!(marks[4]["zindex"], json!(99));
    }

    #[test]
    fn rules_show_only_on_the_hovered_timestep() {
        let marks = overlay();
        assert_eq!(
            marks[0]["encode"]["update"]["opacity"],
            json!([
                {
                    "test": "hover_value && datum && hover_value[\"time_\"] === datum[\"time_\"]",
                    "value": 0.75,
                },
                {"value": 0},
            ])
        );
        assert_eq!(marks[0]["style"], json!(["rule"]));
        assert_eq!(
            marks[0]["encode"]["update"]["y2"],
            json!({"signal": "height + 6"})
        );
    }

    #[test]
    fn voronoi_covers_the_plot_and_the_axis() {
        let marks = overlay();
        assert_eq!(
            marks[4]["transform"],
            json!([{
                "type": "voronoi",
                "x": {"expr": "datum.datum.x || 0"},
                "y": {"expr": "datum.datum.y || 0"},
                "size": [{"signal": "width"}, {"signal": "height + 25"}],
            }])
        );
        assert_eq!(
            marks[3]["encode"]["update"]["x"],
            json!({"signal": "datum.x - (datum.bounds.x2 - datum.bounds.x1) / 2 - 3"})
        );
    }
}
