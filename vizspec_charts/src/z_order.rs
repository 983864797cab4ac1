// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for compiled marks.
//!
//! The runtime paints siblings by ascending `zindex`. Series sit high so that the hover overlay,
//! which is declared later at the top level, does not cover them.

/// Axes of timeseries charts.
pub const AXES: i32 = 0;

/// Box behind the hover time label.
pub const HOVER_LABEL_BOX: i32 = 0;
/// Hover time label, above its box.
pub const HOVER_LABEL: i32 = HOVER_LABEL_BOX + 1;

/// Voronoi proximity layer driving hover.
pub const VORONOI: i32 = 99;

/// Series marks and the facet groups that hold them.
pub const PLOT: i32 = 100;
/// Invisible hit boxes, above the series they widen.
pub const HIT_BOX: i32 = PLOT + 1;
