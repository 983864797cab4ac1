// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate std;

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use vizspec_core::{EventType, Spec};
use vizspec_signals::{Event, SignalRuntime};

use crate::names::{
    COLUMN_DOMAIN_DATA, EXTERNAL_HOVER_SIGNAL, EXTERNAL_TS_DOMAIN_SIGNAL, HOVER_SIGNAL,
    HOVER_VORONOI_MARK, LEGEND_HOVER_SIGNAL, LEGEND_SELECT_SIGNAL, REVERSE_HOVER_SIGNAL,
    REVERSE_SELECT_SIGNAL, REVERSE_UNSELECT_SIGNAL, TRANSFORMED_DATA, TS_DOMAIN_SIGNAL,
    X_SIGNAL_SCALE, hit_box_mark,
};
use crate::{
    Bar, BarChart, ChartDescription, ChartOutput, Combination, CompileError, CompileOptions,
    Compiler, Mode, RequiredField, Theme, TimeseriesChart, TimeseriesSeries, compile,
};

const SOURCE: &str = "requests";

fn series(value: &str) -> TimeseriesSeries {
    TimeseriesSeries {
        value: String::from(value),
        ..TimeseriesSeries::default()
    }
}

fn by_service(value: &str, mode: Mode, stacked: bool) -> TimeseriesSeries {
    TimeseriesSeries {
        value: String::from(value),
        mode,
        series: Some(String::from("service")),
        stack_by_series: stacked,
    }
}

fn timeseries(series: Vec<TimeseriesSeries>) -> ChartDescription {
    ChartDescription::Timeseries(TimeseriesChart {
        timeseries: Some(series),
        ..TimeseriesChart::default()
    })
}

fn bars(
    value: &str,
    label: &str,
    stack_by: Option<&str>,
    group_by: Option<&str>,
) -> ChartDescription {
    ChartDescription::Bar(BarChart {
        bar: Some(Bar {
            value: Some(String::from(value)),
            label: Some(String::from(label)),
            stack_by: stack_by.map(String::from),
            group_by: group_by.map(String::from),
        }),
        ..BarChart::default()
    })
}

fn build(display: &ChartDescription) -> ChartOutput {
    compile(display, SOURCE, &Theme::dark()).unwrap()
}

fn compiled(output: &ChartOutput) -> &Spec {
    output.spec.as_compiled().unwrap()
}

fn to_json(output: &ChartOutput) -> Value {
    output.spec.to_value().unwrap()
}

fn scale<'a>(spec: &'a Value, name: &str) -> &'a Value {
    spec["scales"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == name)
        .unwrap()
}

fn names_of(values: &Value) -> Vec<&str> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect()
}

#[test]
fn plain_series_list_their_value_columns() {
    let output = build(&timeseries(vec![series("latency"), series("errors")]));
    assert!(output.has_legend, "timeseries charts always have a legend");
    assert_eq!(output.legend_column, "");

    let spec = to_json(&output);
    assert_eq!(scale(&spec, "color")["domain"], json!(["latency", "errors"]));
    assert_eq!(
        names_of(&spec["data"]),
        [SOURCE, TRANSFORMED_DATA, "hover_pivot_data"]
    );

    let lines: Vec<&Value> = spec["marks"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["name"].as_str().unwrap().starts_with("timeseries_line_"))
        .collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        assert_eq!(line["from"], json!({"data": TRANSFORMED_DATA}));
        assert_eq!(line["type"], "line");
        assert_eq!(line["zindex"], json!(100));
        assert_eq!(line["sort"], json!({"field": "datum[\"time_\"]"}));
    }
    assert_eq!(
        spec["marks"][0]["encode"]["update"]["stroke"],
        json!({"scale": "color", "value": "latency"})
    );
}

#[test]
fn discriminated_series_draw_in_a_facet_group() {
    let output = build(&timeseries(vec![by_service("latency", Mode::Line, false)]));
    assert_eq!(output.legend_column, "service");
    let spec = compiled(&output);

    let group = spec.find_mark("timeseries_group_0").unwrap();
    assert_eq!(group.facet_name(), Some("faceted_data_0"));
    let names: Vec<&str> = group.marks.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["timeseries_line_0", "hover_line_mark_layer_0"]);

    let value = to_json(&output);
    assert_eq!(
        scale(&value, "color")["domain"],
        json!({"data": TRANSFORMED_DATA, "field": "service", "sort": true})
    );
    assert_eq!(
        value["data"][2]["transform"],
        json!([{
            "type": "pivot",
            "field": "service",
            "value": "latency",
            "groupby": ["time_"],
        }])
    );
}

#[test]
fn stacked_areas_fill_between_stack_fields() {
    let output = build(&timeseries(vec![by_service("bytes", Mode::Area, true)]));
    let spec = to_json(&output);
    let transforms = spec["data"][1]["transform"].as_array().unwrap();
    let stack = transforms.iter().find(|t| t["type"] == "stack").unwrap();
    assert_eq!(
        stack["sort"],
        json!({"field": "meanOfValueField", "order": "ascending"})
    );
    assert_eq!(
        stack["as"],
        json!(["bytes_stacked_start", "bytes_stacked_end"])
    );

    let area = compiled(&output).find_mark("timeseries_line_0").unwrap();
    let area = serde_json::to_value(area).unwrap();
    assert_eq!(area["type"], "area");
    assert_eq!(
        area["encode"]["update"]["y2"],
        json!({"scale": "y", "field": "bytes_stacked_start"})
    );
    assert_eq!(
        area["encode"]["update"]["fill"],
        json!({"scale": "color", "field": "service"})
    );
    assert_eq!(
        scale(&spec, "y")["domain"]["fields"],
        json!(["bytes_stacked_start", "bytes_stacked_end"])
    );
}

#[test]
fn invalid_timeseries_combinations_are_rejected() {
    let theme = Theme::dark();
    let two_discriminated = timeseries(vec![
        by_service("latency", Mode::Line, false),
        by_service("errors", Mode::Line, false),
    ]);
    assert_eq!(
        compile(&two_discriminated, SOURCE, &theme),
        Err(CompileError::UnsupportedCombination(
            Combination::SubseriesWithMultipleTimeseries
        ))
    );
    let one_of_two = timeseries(vec![
        by_service("latency", Mode::Line, false),
        series("errors"),
    ]);
    assert_eq!(
        compile(&one_of_two, SOURCE, &theme),
        Err(CompileError::UnsupportedCombination(
            Combination::SubseriesWithMultipleTimeseries
        ))
    );
    assert_eq!(
        compile(&timeseries(Vec::new()), SOURCE, &theme),
        Err(CompileError::MissingRequiredField(RequiredField::Timeseries))
    );
    let unstacked_area = timeseries(vec![by_service("bytes", Mode::Area, false)]);
    assert_eq!(
        compile(&unstacked_area, SOURCE, &theme),
        Err(CompileError::UnsupportedCombination(
            Combination::AreaWithoutStack
        ))
    );
}

#[test]
fn bars_require_value_and_label() {
    let theme = Theme::dark();
    let missing = |value: Option<&str>, label: Option<&str>| {
        let display = ChartDescription::Bar(BarChart {
            bar: Some(Bar {
                value: value.map(String::from),
                label: label.map(String::from),
                ..Bar::default()
            }),
            ..BarChart::default()
        });
        compile(&display, SOURCE, &theme).err()
    };
    assert_eq!(
        missing(None, Some("service")),
        Some(CompileError::MissingRequiredField(RequiredField::BarValue))
    );
    assert_eq!(
        missing(Some("count"), None),
        Some(CompileError::MissingRequiredField(RequiredField::BarLabel))
    );
    assert_eq!(missing(Some("count"), Some("service")), None);
    assert_eq!(
        CompileError::from(RequiredField::BarLabel).to_string(),
        "BarChart property bar must have an entry for property label"
    );
}

#[test]
fn simple_bars_color_by_value_column() {
    let output = build(&bars("count", "service", None, None));
    assert!(!output.has_legend, "bar charts carry their own legend");
    let spec = to_json(&output);
    assert_eq!(spec["style"], "cell");
    assert_eq!(spec["autosize"], json!({"type": "fit", "contains": "padding"}));
    let bar = &spec["marks"][0];
    assert_eq!(bar["name"], "barMark");
    assert_eq!(bar["style"], "bar");
    assert_eq!(
        bar["encode"]["update"]["y2"],
        json!({"scale": "y", "value": 0})
    );
    assert_eq!(
        bar["encode"]["update"]["fill"],
        json!({"scale": "color", "value": "count"})
    );
    assert_eq!(spec.get("legends"), None);
}

#[test]
fn stacked_bars_sort_segments_by_stack_field() {
    let output = build(&bars("count", "service", Some("status"), None));
    let spec = to_json(&output);
    assert_eq!(
        spec["data"][1]["transform"][1]["sort"],
        json!({"field": ["status"], "order": ["descending"]})
    );
    assert_eq!(
        spec["legends"],
        json!([{
            "fill": "color",
            "symbolType": "square",
            "title": "status",
            "encode": {"symbols": {"update": {"stroke": {"value": null}}}},
        }])
    );
    assert_eq!(
        spec["marks"][0]["encode"]["update"]["y"],
        json!({"scale": "y", "field": "sum_count_end"})
    );
}

#[test]
fn grouped_bars_lay_out_one_panel_per_group() {
    let output = build(&bars("count", "service", None, Some("region")));
    let spec = compiled(&output);
    let value = to_json(&output);

    assert_eq!(value.get("style"), None);
    assert_eq!(value.get("autosize"), None);
    let column_domain = spec.data_source(COLUMN_DOMAIN_DATA).unwrap();
    assert_eq!(column_domain.source.as_deref(), Some(TRANSFORMED_DATA));
    assert_eq!(
        serde_json::to_value(&column_domain.transform).unwrap(),
        json!([{"type": "aggregate", "groupby": ["region"]}])
    );
    assert_eq!(
        value["layout"]["columns"],
        json!({"signal": "length(data(\"column-domain\"))"})
    );
    assert!(spec.signal("child_width").is_some(), "grouped width signal");
    assert!(spec.signal("child_height").is_some(), "grouped height signal");
    assert!(spec.signal("width").is_none(), "no top-level width signal");

    let header = spec.find_mark("row-header").unwrap();
    assert_eq!(header.axes.len(), 1);
    let footer = spec.find_mark("column-footer").unwrap();
    assert_eq!(footer.axes.len(), 1);
    assert!(spec.axes.is_empty(), "axes live in the grid headers");

    let group = spec.find_mark("barGroup").unwrap();
    assert_eq!(group.facet_name(), Some("facetedData"));
    assert_eq!(group.marks[0].name, "barMark");
}

#[test]
fn compiling_is_deterministic() {
    let displays = [
        timeseries(vec![series("latency"), series("errors")]),
        timeseries(vec![by_service("bytes", Mode::Area, true)]),
        bars("count", "service", Some("status"), Some("region")),
    ];
    for display in &displays {
        let first = to_json(&build(display));
        let second = to_json(&build(display));
        assert_eq!(first, second);
    }
}

#[test]
fn every_compiled_spec_resolves_its_names() {
    let displays = [
        timeseries(vec![series("latency")]),
        timeseries(vec![series("latency"), series("errors")]),
        timeseries(vec![by_service("latency", Mode::Point, false)]),
        timeseries(vec![by_service("bytes", Mode::Area, true)]),
        bars("count", "service", None, None),
        bars("count", "service", Some("status"), None),
        bars("count", "service", None, Some("region")),
        bars("count", "service", Some("status"), Some("region")),
    ];
    for display in &displays {
        let output = build(display);
        assert_eq!(compiled(&output).validate(), Ok(()), "{display:?}");
    }
}

#[test]
fn hit_boxes_report_hovered_and_unselected_series() {
    let output = build(&timeseries(vec![series("latency"), series("errors")]));
    let mut runtime = SignalRuntime::new(compiled(&output), None).unwrap();
    let row = json!({"time_": 1000, "latency": 3.5, "errors": 1});

    runtime
        .dispatch(&Event::on_mark(EventType::MouseOver, hit_box_mark(1), row.clone()))
        .unwrap();
    assert_eq!(runtime.value(REVERSE_HOVER_SIGNAL), Some(&json!("errors")));
    runtime
        .dispatch(&Event::on_mark(EventType::MouseOut, hit_box_mark(1), row.clone()))
        .unwrap();
    assert_eq!(runtime.value(REVERSE_HOVER_SIGNAL), Some(&Value::Null));

    runtime
        .dispatch(&Event::on_mark(EventType::Click, hit_box_mark(0), row.clone()))
        .unwrap();
    assert_eq!(runtime.value(REVERSE_SELECT_SIGNAL), Some(&json!("latency")));

    runtime
        .dispatch(&Event::on_mark(EventType::MouseDown, hit_box_mark(0), row.clone()))
        .unwrap();
    assert_eq!(runtime.value(REVERSE_UNSELECT_SIGNAL), Some(&Value::Null));
    runtime
        .dispatch(&Event::on_mark(EventType::MouseDown, hit_box_mark(0), row).with_button(3))
        .unwrap();
    assert_eq!(runtime.value(REVERSE_UNSELECT_SIGNAL), Some(&json!(true)));
}

#[test]
fn discriminated_hit_boxes_report_the_row_series() {
    let output = build(&timeseries(vec![by_service("latency", Mode::Line, false)]));
    let mut runtime = SignalRuntime::new(compiled(&output), None).unwrap();
    runtime
        .dispatch(&Event::on_mark(
            EventType::MouseOver,
            hit_box_mark(0),
            json!({"time_": 1000, "service": "checkout", "latency": 3.5}),
        ))
        .unwrap();
    assert_eq!(runtime.value(REVERSE_HOVER_SIGNAL), Some(&json!("checkout")));
}

#[test]
fn hover_prefers_this_chart_over_external_writes() {
    let output = build(&timeseries(vec![series("latency")]));
    let mut runtime = SignalRuntime::new(compiled(&output), None).unwrap();

    runtime
        .set_external(EXTERNAL_HOVER_SIGNAL, json!({"time_": 2000}))
        .unwrap();
    assert_eq!(runtime.value(HOVER_SIGNAL), Some(&json!({"time_": 2000})));

    let cell = json!({"datum": {"time_": 1000, "latency": 3.5}});
    runtime
        .dispatch(&Event::on_mark(EventType::MouseOver, HOVER_VORONOI_MARK, cell))
        .unwrap();
    assert_eq!(runtime.value(HOVER_SIGNAL), Some(&json!({"time_": 1000})));

    runtime.dispatch(&Event::on_view(EventType::MouseOut)).unwrap();
    assert_eq!(runtime.value(HOVER_SIGNAL), Some(&json!({"time_": 2000})));
}

#[test]
fn time_domain_merges_internal_first() {
    let output = build(&timeseries(vec![series("latency")]));
    let mut runtime = SignalRuntime::new(compiled(&output), None).unwrap();
    assert_eq!(runtime.value(TS_DOMAIN_SIGNAL), Some(&Value::Null));

    runtime
        .set_external(EXTERNAL_TS_DOMAIN_SIGNAL, json!([0, 50]))
        .unwrap();
    assert_eq!(runtime.value(TS_DOMAIN_SIGNAL), Some(&json!([0, 50])));

    runtime.notify_scale(X_SIGNAL_SCALE, json!([10, 20])).unwrap();
    assert_eq!(runtime.value(TS_DOMAIN_SIGNAL), Some(&json!([10, 20])));
}

#[test]
fn size_signals_use_the_configured_fallback() {
    let theme = Theme::dark();
    let options = CompileOptions::default().with_fallback_size(kurbo::Size::new(640.0, 360.0));
    let output = Compiler::new(&theme)
        .with_options(options)
        .compile(&timeseries(vec![series("latency")]), SOURCE)
        .unwrap();
    let runtime = SignalRuntime::new(compiled(&output), None).unwrap();
    assert_eq!(runtime.value("width"), Some(&json!(640.0)));
    assert_eq!(runtime.value("height"), Some(&json!(360.0)));

    let sized = SignalRuntime::new(compiled(&output), Some([800.0, 300.0])).unwrap();
    assert_eq!(sized.value("width"), Some(&json!(800.0)));
    assert_eq!(sized.value("height"), Some(&json!(300.0)));
}

#[test]
fn legend_cells_start_empty_and_accept_writes() {
    let output = build(&timeseries(vec![series("latency"), series("errors")]));
    let mut runtime = SignalRuntime::new(compiled(&output), None).unwrap();
    assert_eq!(runtime.value(LEGEND_SELECT_SIGNAL), Some(&json!([])));
    assert_eq!(runtime.value(LEGEND_HOVER_SIGNAL), Some(&Value::Null));
    runtime
        .set_external(LEGEND_SELECT_SIGNAL, json!(["latency"]))
        .unwrap();
    assert_eq!(runtime.value(LEGEND_SELECT_SIGNAL), Some(&json!(["latency"])));
}

#[test]
fn boundary_trim_can_be_disabled() {
    let theme = Theme::dark();
    let display = timeseries(vec![series("latency")]);
    let trimmed = build(&display);
    let untrimmed = Compiler::new(&theme)
        .with_options(CompileOptions::default().with_trim_boundary_timesteps(false))
        .compile(&display, SOURCE)
        .unwrap();
    let count = |output: &ChartOutput| {
        compiled(output)
            .data_source(TRANSFORMED_DATA)
            .unwrap()
            .transform
            .len()
    };
    assert_eq!(count(&trimmed), 3);
    assert_eq!(count(&untrimmed), 1);
}

#[test]
fn titles_and_captions_are_copied() {
    let display = ChartDescription::Timeseries(TimeseriesChart {
        timeseries: Some(vec![series("latency")]),
        title: Some(String::from("Request latency")),
        x_axis: Some(crate::AxisLabel {
            label: Some(String::from("time")),
        }),
        y_axis: Some(crate::AxisLabel {
            label: Some(String::new()),
        }),
    });
    let spec = to_json(&build(&display));
    assert_eq!(spec["title"], json!({"text": "Request latency"}));
    assert_eq!(spec["axes"][0]["title"], "time");
    assert_eq!(spec["axes"][1].get("title"), None);
}

#[test]
fn themes_apply_to_passthrough_specs_once() {
    let raw = ChartDescription::Vega(crate::VegaChart {
        spec: String::from(r#"{"config": {"mark": {"tooltip": true}}, "marks": []}"#),
    });
    let output = build(&raw);
    let mut again = output.spec.clone();
    crate::hydrate(&mut again, &Theme::dark());
    assert_eq!(again, output.spec);

    let value = to_json(&output);
    assert_eq!(value["$schema"], vizspec_core::VEGA_V5_SCHEMA);
    assert_eq!(value["config"]["mark"], json!({"tooltip": true}));
    assert_eq!(value["background"], "#161616");
    assert!(!output.has_legend, "passthrough specs have no managed legend");
}
