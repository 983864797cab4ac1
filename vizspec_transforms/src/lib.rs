// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vega data transforms as a typed IR.
//!
//! This crate provides:
//! - [`Transform`], one variant per transform the chart compiler emits, and
//! - [`Pipeline`], the ordered transform list owned by a data source or mark.
//!
//! Nothing here executes transforms; they serialize into the `transform` arrays of a compiled
//! spec and run inside the rendering runtime.

#![no_std]

extern crate alloc;

mod pipeline;
mod transform;

pub use pipeline::Pipeline;
pub use transform::{AggregateOp, Compare, SortOrder, StackOffset, Transform};
