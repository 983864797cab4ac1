// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compiler knobs that are not part of a chart description.

use kurbo::Size;

/// Options shared by every chart compiled with one [`Compiler`](crate::Compiler).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompileOptions {
    /// Drop the first and last timestep of timeseries data.
    ///
    /// Range aggregation upstream leaves partial buckets at both ends of a window; trimming them
    /// hides the artificial dips.
    pub trim_boundary_timesteps: bool,
    /// View size used while the container size is unknown or not finite.
    pub fallback_size: Size,
    /// Pixels between time-axis ticks.
    pub time_tick_spacing: f64,
    /// Pixels between value-axis ticks.
    pub value_tick_spacing: f64,
}

impl CompileOptions {
    /// Sets [`CompileOptions::trim_boundary_timesteps`].
    pub fn with_trim_boundary_timesteps(mut self, trim: bool) -> Self {
        self.trim_boundary_timesteps = trim;
        self
    }

    /// Sets [`CompileOptions::fallback_size`].
    pub fn with_fallback_size(mut self, size: Size) -> Self {
        self.fallback_size = size;
        self
    }

    /// Sets the tick spacing of both axis kinds.
    pub fn with_tick_spacing(mut self, time: f64, value: f64) -> Self {
        self.time_tick_spacing = time;
        self.value_tick_spacing = value;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            trim_boundary_timesteps: true,
            fallback_size: Size::new(200.0, 200.0),
            time_tick_spacing: 20.0,
            value_tick_spacing: 40.0,
        }
    }
}
