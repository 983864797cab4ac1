// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The compiled specification model.
//!
//! A [`Spec`] is what the runtime consumes: data sources with transform chains, scales, axes,
//! marks (group marks nest marks and axes), legends, and signals. Entries refer to each other by
//! name only, which keeps the output plain JSON but means nothing in the type system stops a
//! dangling reference. This crate therefore pairs the model with:
//! - [`SpecBuilder`], an append-only builder that hands out typed handles and indexes names, and
//! - [`Spec::validate`], which resolves every name and reports the first violation.
//!
//! [`SpecDocument`] wraps either a compiled spec or a pre-authored JSON object so that
//! presentation defaults can be applied to both uniformly.

#![no_std]

extern crate alloc;

mod builder;
mod document;
mod encode;
mod guide;
mod mark;
mod scale;
mod signal;
mod spec;
mod validate;

pub use builder::{DataId, MarkRef, ScaleId, SignalId, SpecBuilder};
pub use document::SpecDocument;
pub use encode::{Encode, EncodeEntry, FieldRef, Production, ValueRef};
pub use guide::{Axis, AxisEncode, AxisOrient, Legend, LegendEncode};
pub use mark::{Facet, Mark, MarkFrom, MarkTitle, MarkType, Style, TitleText};
pub use scale::{Domain, Range, RangeValue, Scale, ScaleType};
pub use signal::{EventSelector, EventSource, EventStream, EventType, OnEvent, Signal};
pub use spec::{
    Autosize, Data, GridLayout, LayoutOffset, Spec, Title, TitleAnchor, VEGA_LITE_V4_SCHEMA,
    VEGA_V5_SCHEMA,
};
pub use validate::{EntryKind, IntegrityError, SCOPE_NAMES};
