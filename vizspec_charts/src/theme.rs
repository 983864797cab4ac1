// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme hydration: the presentation blocks merged into every output spec.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use peniko::Color;
use serde_json::{Map, Value, json};
use vizspec_core::SpecDocument;

const FONT: &str = "Roboto";

/// Colors and spacing applied to compiled and passthrough specs alike.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    /// View background.
    pub background: Color,
    /// Labels and titles.
    pub foreground: Color,
    /// Gridlines, ticks and the time-axis domain line.
    pub grid: Color,
    /// Default fill and stroke of marks without a color encoding.
    pub accent: Color,
    /// Fill of group marks.
    pub group_fill: Color,
    /// Categorical range of color scales.
    pub category: [Color; 6],
    /// Diverging range.
    pub diverging: [Color; 6],
    /// Sequential range for heatmaps.
    pub heatmap: [Color; 5],
    /// Pixels per spacing unit.
    pub spacing_unit: f64,
}

impl Theme {
    /// Light text on a near-black background.
    pub fn dark() -> Self {
        Self {
            background: Color::from_rgba8(0x16, 0x16, 0x16, 0xff),
            foreground: Color::from_rgba8(0xb2, 0xb5, 0xbb, 0xff),
            grid: Color::from_rgba8(0x35, 0x37, 0x38, 0xff),
            ..Self::base()
        }
    }

    /// Dark text on a near-white background.
    pub fn light() -> Self {
        Self {
            background: Color::from_rgba8(0xf6, 0xf6, 0xf6, 0xff),
            foreground: Color::from_rgba8(0x4a, 0x4c, 0x4f, 0xff),
            grid: Color::from_rgba8(0xdb, 0xdd, 0xe0, 0xff),
            ..Self::base()
        }
    }

    fn base() -> Self {
        let rgb = |r, g, b| Color::from_rgba8(r, g, b, 0xff);
        Self {
            background: rgb(0, 0, 0),
            foreground: rgb(0xff, 0xff, 0xff),
            grid: rgb(0x80, 0x80, 0x80),
            accent: rgb(0x39, 0xa8, 0xf5),
            group_fill: rgb(0xf0, 0xf0, 0xf0),
            category: [
                rgb(0x21, 0xa1, 0xe7),
                rgb(0x2c, 0xa0, 0x2c),
                rgb(0x98, 0xdf, 0x8a),
                rgb(0xae, 0xc7, 0xe8),
                rgb(0xff, 0x7f, 0x0e),
                rgb(0xff, 0xbb, 0x78),
            ],
            diverging: [
                rgb(0xcc, 0x00, 0x20),
                rgb(0xe7, 0x78, 0x66),
                rgb(0xf6, 0xe7, 0xe1),
                rgb(0xd6, 0xe8, 0xed),
                rgb(0x91, 0xbf, 0xd9),
                rgb(0x1d, 0x78, 0xb5),
            ],
            heatmap: [
                rgb(0xd6, 0xe8, 0xed),
                rgb(0xce, 0xe0, 0xe5),
                rgb(0x91, 0xbf, 0xd9),
                rgb(0x54, 0x9c, 0xc6),
                rgb(0x1d, 0x78, 0xb5),
            ],
            spacing_unit: 8.0,
        }
    }

    /// `factor` spacing units, in pixels.
    pub fn spacing(&self, factor: f64) -> f64 {
        self.spacing_unit * factor
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// CSS hex notation; alpha is only written when not opaque.
pub fn css_hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    if rgba.a == 255 {
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

fn palette(colors: &[Color]) -> Value {
    Value::Array(
        colors
            .iter()
            .map(|&c| Value::String(css_hex(c)))
            .collect::<Vec<_>>(),
    )
}

/// The `config` entries a theme contributes.
fn config(theme: &Theme) -> Map<String, Value> {
    let foreground = css_hex(theme.foreground);
    let grid = css_hex(theme.grid);
    let accent = css_hex(theme.accent);
    let value = json!({
        "legend": {
            "labelColor": foreground,
            "labelFont": FONT,
            "labelFontSize": 10,
            "padding": theme.spacing(1.0),
            "symbolSize": 100,
            "titleColor": foreground,
            "titleFontSize": 12,
        },
        "style": {
            "bar": {"fill": accent, "stroke": null},
            "cell": {"stroke": "transparent"},
            "arc": {"fill": accent},
            "area": {"fill": accent},
            "line": {"stroke": accent, "strokeWidth": 1},
            "symbol": {"shape": "circle"},
            "rect": {"fill": accent},
            "group-title": {"fontSize": 0},
            "grouped-bar-x-title": {"fill": foreground, "fontSize": 12},
            "grouped-bar-x-subtitle": {"fill": foreground, "fontSize": 10},
        },
        "axis": {
            "labelColor": foreground,
            "labelFont": FONT,
            "labelFontSize": 10,
            "labelPadding": theme.spacing(0.5),
            "tickColor": grid,
            "tickSize": 10,
            "tickWidth": 1,
            "titleColor": foreground,
            "titleFont": FONT,
            "titleFontSize": 12,
            "titlePadding": theme.spacing(3.0),
        },
        "axisY": {
            "grid": true,
            "domain": false,
            "gridColor": grid,
            "gridWidth": 0.5,
        },
        "axisX": {
            "grid": false,
            "domain": true,
            "domainColor": grid,
            "tickOpacity": 0,
            "tickSize": theme.spacing(0.5),
        },
        "axisBand": {"grid": false},
        "group": {"fill": css_hex(theme.group_fill)},
        "path": {"stroke": accent, "strokeWidth": 0.5},
        "range": {
            "category": palette(&theme.category),
            "diverging": palette(&theme.diverging),
            "heatmap": palette(&theme.heatmap),
        },
        "shape": {"stroke": accent},
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Sets the background, padding and config defaults of `spec`.
///
/// Theme config keys replace existing ones of the same name; other keys are kept. Hydrating twice
/// with the same theme is a no-op the second time.
pub fn hydrate(spec: &mut SpecDocument, theme: &Theme) {
    spec.set_background(css_hex(theme.background));
    spec.set_padding(theme.spacing(2.0));
    spec.merge_config(config(theme));
    tracing::trace!(schema = ?spec.schema(), "hydrated theme");
}

#[cfg(test)]
mod tests {
    extern crate std;

    use pretty_assertions::assert_eq;
    use vizspec_core::Spec;

    use super::*;

    fn authored(value: Value) -> SpecDocument {
        match value {
            Value::Object(map) => SpecDocument::Authored(map),
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn hex_includes_alpha_only_when_translucent() {
        assert_eq!(css_hex(Color::from_rgba8(0x39, 0xa8, 0xf5, 0xff)), "#39a8f5");
        assert_eq!(css_hex(Color::from_rgba8(0, 0, 0, 0x80)), "#00000080");
    }

    #[test]
    fn compiled_specs_get_background_padding_and_config() {
        let theme = Theme::dark();
        let mut doc = SpecDocument::from(Spec::new());
        hydrate(&mut doc, &theme);
        let v = doc.to_value().unwrap();
        assert_eq!(v["background"], json!("#161616"));
        assert_eq!(v["padding"], json!(16.0));
        assert_eq!(v["config"]["axisX"]["tickSize"], json!(4.0));
        assert_eq!(v["config"]["range"]["category"][0], json!("#21a1e7"));
        assert_eq!(v["config"]["style"]["bar"]["stroke"], Value::Null);
    }

    #[test]
    fn hydration_is_idempotent_and_keeps_unrelated_keys() {
        let theme = Theme::light();
        let mut doc = authored(json!({
            "$schema": "https://vega.github.io/schema/vega/v5.json",
            "config": {"view": {"stroke": null}, "axis": {"labelColor": "red"}},
        }));
        hydrate(&mut doc, &theme);
        let once = doc.to_value().unwrap();
        hydrate(&mut doc, &theme);
        assert_eq!(doc.to_value().unwrap(), once);
        assert_eq!(once["config"]["view"], json!({"stroke": null}));
        assert_eq!(once["config"]["axis"]["labelColor"], json!("#4a4c4f"));
    }
}
