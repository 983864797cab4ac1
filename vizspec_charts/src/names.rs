// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Names of the data sources, scales, signals and marks the compiler emits.
//!
//! Embedders synchronize charts by writing the external signals and reading the reverse ones, so
//! these names are part of the public surface.

extern crate alloc;

use alloc::format;
use alloc::string::String;

/// Time column of timeseries data, converted to a date by the first transform.
pub const TIME_FIELD: &str = "time_";

/// Derived source every compiled chart draws from.
pub const TRANSFORMED_DATA: &str = "transformedData";
/// Per-timestep rows backing the hover overlay.
pub const HOVER_PIVOT_DATA: &str = "hover_pivot_data";
/// One row per bar group.
pub const COLUMN_DOMAIN_DATA: &str = "column-domain";
/// Facet partition of grouped bars.
pub const FACETED_BAR_DATA: &str = "facetedData";

/// Horizontal position scale.
pub const X_SCALE: &str = "x";
/// Vertical position scale.
pub const Y_SCALE: &str = "y";
/// Series color scale.
pub const COLOR_SCALE: &str = "color";
/// Copy of the time scale without a bound domain, observed for domain changes.
pub const X_SIGNAL_SCALE: &str = "_x_signal";

/// Hovered timestep originating in this chart.
pub const INTERNAL_HOVER_SIGNAL: &str = "internal_hover_value";
/// Hovered timestep written by another chart.
pub const EXTERNAL_HOVER_SIGNAL: &str = "external_hover_value";
/// Hovered timestep, internal first.
pub const HOVER_SIGNAL: &str = "hover_value";
/// Series selected in the legend.
pub const LEGEND_SELECT_SIGNAL: &str = "selected_series";
/// Series hovered in the legend.
pub const LEGEND_HOVER_SIGNAL: &str = "legend_hovered_series";
/// Series hovered in the plot, reported back to the legend.
pub const REVERSE_HOVER_SIGNAL: &str = "reverse_hovered_series";
/// Series clicked in the plot, reported back to the legend.
pub const REVERSE_SELECT_SIGNAL: &str = "reverse_selected_series";
/// Set when a series is right-clicked in the plot.
pub const REVERSE_UNSELECT_SIGNAL: &str = "reverse_unselect_signal";
/// Time domain observed on this chart.
pub const INTERNAL_TS_DOMAIN_SIGNAL: &str = "internal_ts_domain_value";
/// Time domain written by another chart.
pub const EXTERNAL_TS_DOMAIN_SIGNAL: &str = "external_ts_domain_value";
/// Time domain bound to the time scale, internal first.
pub const TS_DOMAIN_SIGNAL: &str = "ts_domain_value";

/// Dashed vertical rule at the hovered timestep.
pub const HOVER_RULE_MARK: &str = "hover_rule_layer";
/// Bulb under the hover rule.
pub const HOVER_BULB_MARK: &str = "hover_bulb_layer";
/// Time label under the hover rule.
pub const HOVER_TIME_MARK: &str = "hover_time_mark";
/// Box behind the time label.
pub const HOVER_TIME_BOX_MARK: &str = "hover_line_text_box_mark";
/// Voronoi cells around the hover rules.
pub const HOVER_VORONOI_MARK: &str = "hover_voronoi_layer";

/// Bars.
pub const BAR_MARK: &str = "barMark";
/// Facet group of grouped bars.
pub const BAR_GROUP_MARK: &str = "barGroup";
/// Grid header holding the grouped-bar caption.
pub const COLUMN_TITLE_MARK: &str = "column-title";
/// Grid header holding the value axis.
pub const ROW_HEADER_MARK: &str = "row-header";
/// Grid footer holding the band axis of each group.
pub const COLUMN_FOOTER_MARK: &str = "column-footer";

/// Group mark faceting series `index` by its discriminator.
pub fn timeseries_group(index: usize) -> String {
    format!("timeseries_group_{index}")
}

/// Facet partition name of series `index`.
pub fn faceted_data(index: usize) -> String {
    format!("faceted_data_{index}")
}

/// Data mark of series `index`.
pub fn timeseries_mark(index: usize) -> String {
    format!("timeseries_line_{index}")
}

/// Hit box of series `index`.
pub fn hit_box_mark(index: usize) -> String {
    format!("hover_line_mark_layer_{index}")
}
