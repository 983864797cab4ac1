// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axes of the compiled chart kinds.

extern crate alloc;

use alloc::format;
use alloc::string::String;

use vizspec_core::{
    Axis, AxisEncode, AxisOrient, Encode, EncodeEntry, MarkRef, SpecBuilder, ValueRef,
};
use vizspec_expr::{Expr, SignalRef};

use crate::display::Captions;
use crate::names::{X_SCALE, Y_SCALE};
use crate::options::CompileOptions;
use crate::z_order;

/// Minimum pixels between formatted time labels.
const TIME_LABEL_SEPARATION: f64 = 100.0;
const TIME_LABEL_FONT: &str = "Roboto";
const TIME_LABEL_FONT_SIZE: f64 = 10.0;

/// `ceil(extent / spacing)`: one tick every `spacing` pixels.
fn tick_count(extent: &str, spacing: f64) -> SignalRef {
    SignalRef::expr(Expr::call(
        "ceil",
        [Expr::ident(extent) / Expr::number(spacing)],
    ))
}

/// Time labels come from the runtime's `pxTimeFormat`, which picks a granularity from the
/// available width.
fn time_labels(spacing: f64) -> AxisEncode {
    let text = Expr::raw(format!(
        "pxTimeFormat(datum, ceil(width), ceil(width/{spacing}), {TIME_LABEL_SEPARATION}, \
         \"{TIME_LABEL_FONT}\", {TIME_LABEL_FONT_SIZE})"
    ));
    AxisEncode {
        labels: Some(Encode::update(
            EncodeEntry::new().with("text", ValueRef::signal(text)),
        )),
    }
}

fn caption(axis: &mut Axis, caption: Option<&str>) {
    if let Some(text) = caption {
        axis.title = Some(String::from(text));
    }
}

/// Bottom time axis and left value axis with gridlines.
pub(crate) fn timeseries_axes(
    builder: &mut SpecBuilder,
    captions: &Captions<'_>,
    options: &CompileOptions,
) {
    let mut x = Axis::new(X_SCALE, AxisOrient::Bottom);
    x.grid = Some(false);
    x.label_flush = Some(true);
    x.tick_count = Some(tick_count("width", options.time_tick_spacing));
    x.label_overlap = Some(true);
    x.encode = Some(time_labels(options.time_tick_spacing));
    x.zindex = Some(z_order::AXES);
    caption(&mut x, captions.x);

    let mut y = Axis::new(Y_SCALE, AxisOrient::Left);
    y.grid_scale = Some(String::from(X_SCALE));
    y.grid = Some(true);
    y.tick_count = Some(tick_count("height", options.value_tick_spacing));
    y.label_overlap = Some(true);
    y.zindex = Some(z_order::AXES);
    caption(&mut y, captions.y);

    builder.push_axis(x);
    builder.push_axis(y);
}

/// Band axis with vertical labels and value axis.
///
/// Grouped bars place each axis in its grid header or footer group instead of the top level.
pub(crate) fn bar_axes(
    builder: &mut SpecBuilder,
    x_owner: Option<&MarkRef>,
    y_owner: Option<&MarkRef>,
    height: &str,
    captions: &Captions<'_>,
    options: &CompileOptions,
) {
    let mut x = Axis::new(X_SCALE, AxisOrient::Bottom);
    x.grid = Some(false);
    x.label_align = Some(String::from("right"));
    x.label_angle = Some(270.0);
    x.label_baseline = Some(String::from("middle"));
    x.label_overlap = Some(true);
    caption(&mut x, captions.x);

    let mut y = Axis::new(Y_SCALE, AxisOrient::Left);
    y.grid_scale = Some(String::from(X_SCALE));
    y.grid = Some(true);
    y.label_overlap = Some(true);
    y.tick_count = Some(tick_count(height, options.value_tick_spacing));
    caption(&mut y, captions.y);

    match x_owner {
        Some(owner) => builder.push_child_axis(owner, x),
        None => builder.push_axis(x),
    }
    match y_owner {
        Some(owner) => builder.push_child_axis(owner, y),
        None => builder.push_axis(y),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use serde_json::json;

    use super::*;

    #[test]
    fn time_axis_formats_labels_and_spaces_ticks() {
        let mut b = SpecBuilder::new();
        let captions = Captions {
            x: Some("time"),
            ..Captions::default()
        };
        timeseries_axes(&mut b, &captions, &CompileOptions::default());
        let axes = serde_json::to_value(&b.spec().axes).unwrap();
        assert_eq!(axes[0]["tickCount"], json!({"signal": "ceil(width / 20)"}));
        assert_eq!(
            axes[0]["encode"]["labels"]["update"]["text"]["signal"],
            json!("pxTimeFormat(datum, ceil(width), ceil(width/20), 100, \"Roboto\", 10)")
        );
        assert_eq!(axes[0]["title"], json!("time"));
        assert_eq!(axes[1]["tickCount"], json!({"signal": "ceil(height / 40)"}));
        assert_eq!(axes[1].get("title"), None);
    }
}
