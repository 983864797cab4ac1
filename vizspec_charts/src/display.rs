// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart descriptions: the high-level input.
//!
//! Fields whose absence is a compile error are optional here, so that a description with a
//! missing field still deserializes and the builder reports which field is missing. Empty strings
//! count as missing.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

/// `@type` tag of [`ChartDescription::Timeseries`].
pub const TIMESERIES_CHART_KIND: &str = "pixielabs.ai/pl.vispb.TimeseriesChart";
/// `@type` tag of [`ChartDescription::Bar`].
pub const BAR_CHART_KIND: &str = "pixielabs.ai/pl.vispb.BarChart";
/// `@type` tag of [`ChartDescription::Vega`].
pub const VEGA_CHART_KIND: &str = "pixielabs.ai/pl.vispb.VegaChart";

/// Known `@type` tags.
pub const CHART_KINDS: [&str; 3] = [TIMESERIES_CHART_KIND, BAR_CHART_KIND, VEGA_CHART_KIND];

/// A chart description, tagged by `@type`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "@type")]
pub enum ChartDescription {
    /// Lines, points or stacked areas over time.
    #[serde(rename = "pixielabs.ai/pl.vispb.TimeseriesChart")]
    Timeseries(TimeseriesChart),
    /// Bars, optionally stacked and grouped.
    #[serde(rename = "pixielabs.ai/pl.vispb.BarChart")]
    Bar(BarChart),
    /// A pre-authored spec passed through.
    #[serde(rename = "pixielabs.ai/pl.vispb.VegaChart")]
    Vega(VegaChart),
}

impl ChartDescription {
    /// The `@type` tag of this description.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeseries(_) => TIMESERIES_CHART_KIND,
            Self::Bar(_) => BAR_CHART_KIND,
            Self::Vega(_) => VEGA_CHART_KIND,
        }
    }
}

/// An axis caption.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AxisLabel {
    /// Caption text.
    #[serde(default)]
    pub label: Option<String>,
}

/// How a series is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Mode {
    /// Connected line.
    #[serde(rename = "MODE_LINE")]
    Line,
    /// One point per row.
    #[serde(rename = "MODE_POINT")]
    Point,
    /// Filled area; requires stacking.
    #[serde(rename = "MODE_AREA")]
    Area,
    /// Unset or unrecognized; drawn as a line.
    #[default]
    #[serde(rename = "MODE_UNKNOWN", other)]
    Unknown,
}

/// One plotted value column of a timeseries chart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesSeries {
    /// Value column.
    #[serde(default)]
    pub value: String,
    /// Drawing mode.
    #[serde(default)]
    pub mode: Mode,
    /// Discriminator column splitting the rows into sub-series.
    #[serde(default)]
    pub series: Option<String>,
    /// Stack the sub-series on top of each other.
    #[serde(default)]
    pub stack_by_series: bool,
}

impl TimeseriesSeries {
    /// The discriminator column, if set and non-empty.
    pub fn discriminator(&self) -> Option<&str> {
        non_empty(self.series.as_deref())
    }
}

/// A timeseries chart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesChart {
    /// Plotted series.
    #[serde(default)]
    pub timeseries: Option<Vec<TimeseriesSeries>>,
    /// Chart title.
    #[serde(default)]
    pub title: Option<String>,
    /// Time axis caption.
    #[serde(default)]
    pub x_axis: Option<AxisLabel>,
    /// Value axis caption.
    #[serde(default)]
    pub y_axis: Option<AxisLabel>,
}

/// The bar block of a bar chart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Bar height column.
    #[serde(default)]
    pub value: Option<String>,
    /// Category column along the band axis.
    #[serde(default)]
    pub label: Option<String>,
    /// Column whose values are stacked within a bar.
    #[serde(default)]
    pub stack_by: Option<String>,
    /// Column whose values each get their own panel.
    #[serde(default)]
    pub group_by: Option<String>,
}

/// A bar chart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    /// Bar settings.
    #[serde(default)]
    pub bar: Option<Bar>,
    /// Chart title.
    #[serde(default)]
    pub title: Option<String>,
    /// Band axis caption.
    #[serde(default)]
    pub x_axis: Option<AxisLabel>,
    /// Value axis caption.
    #[serde(default)]
    pub y_axis: Option<AxisLabel>,
}

/// A pre-authored spec.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct VegaChart {
    /// Spec JSON text, in the low-level grammar or the higher-level one.
    #[serde(default)]
    pub spec: String,
}

/// Returns `s` unless it is missing or empty.
pub(crate) fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Title and axis captions shared by the compiled chart kinds.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Captions<'a> {
    pub(crate) title: Option<&'a str>,
    pub(crate) x: Option<&'a str>,
    pub(crate) y: Option<&'a str>,
}

impl<'a> Captions<'a> {
    pub(crate) fn new(
        title: &'a Option<String>,
        x_axis: &'a Option<AxisLabel>,
        y_axis: &'a Option<AxisLabel>,
    ) -> Self {
        let caption = |axis: &'a Option<AxisLabel>| {
            non_empty(axis.as_ref().and_then(|a| a.label.as_deref()))
        };
        Self {
            title: non_empty(title.as_deref()),
            x: caption(x_axis),
            y: caption(y_axis),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use serde_json::json;

    use super::*;

    #[test]
    fn timeseries_descriptions_deserialize() {
        let d: ChartDescription = serde_json::from_value(json!({
            "@type": TIMESERIES_CHART_KIND,
            "timeseries": [
                {"value": "latency", "mode": "MODE_POINT"},
                {"value": "errors", "mode": "MODE_SOMETHING_NEW", "stackBySeries": false},
            ],
            "title": "Latency",
            "yAxis": {"label": "ms"},
        }))
        .unwrap();
        let ChartDescription::Timeseries(chart) = d else {
            panic!("expected a timeseries chart");
        };
        let series = chart.timeseries.unwrap();
        assert_eq!(series[0].mode, Mode::Point);
        assert_eq!(series[1].mode, Mode::Unknown, "unknown modes fall back");
        assert_eq!(chart.y_axis.unwrap().label.as_deref(), Some("ms"));
    }

    #[test]
    fn missing_fields_still_deserialize() {
        let d: ChartDescription = serde_json::from_value(json!({
            "@type": BAR_CHART_KIND,
            "bar": {"label": "service"},
        }))
        .unwrap();
        assert_eq!(d.kind(), BAR_CHART_KIND);
        let ChartDescription::Bar(chart) = d else {
            panic!("expected a bar chart");
        };
        assert_eq!(chart.bar.unwrap().value, None);
    }

    #[test]
    fn empty_captions_are_missing() {
        let title = Some(String::new());
        let x = Some(AxisLabel {
            label: Some(String::from("time")),
        });
        let y = Some(AxisLabel { label: None });
        let c = Captions::new(&title, &x, &y);
        assert_eq!((c.title, c.x, c.y), (None, Some("time"), None));
    }
}
