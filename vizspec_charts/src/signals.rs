// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signal wiring: view size, hover, legend interplay and cross-chart time domains.
//!
//! Values crossing chart boundaries come in pairs: an internal cell written by this chart's own
//! events and an external cell written by the embedder. A combined cell merges the two, internal
//! first, and is the only one the rest of the spec reads.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Size;
use serde_json::Value;
use vizspec_core::{
    EncodeEntry, EventSelector, EventSource, EventStream, EventType, OnEvent, Signal, SignalId,
    SpecBuilder, ValueRef,
};
use vizspec_expr::Expr;

use crate::names::{
    EXTERNAL_HOVER_SIGNAL, EXTERNAL_TS_DOMAIN_SIGNAL, HOVER_SIGNAL, HOVER_VORONOI_MARK,
    INTERNAL_HOVER_SIGNAL, INTERNAL_TS_DOMAIN_SIGNAL, LEGEND_HOVER_SIGNAL, LEGEND_SELECT_SIGNAL,
    REVERSE_HOVER_SIGNAL, REVERSE_SELECT_SIGNAL, REVERSE_UNSELECT_SIGNAL, TIME_FIELD,
    TS_DOMAIN_SIGNAL,
};

const RIGHT_BUTTON: f64 = 3.0;

const LINE_WIDTH: f64 = 1.0;
const HIGHLIGHTED_LINE_WIDTH: f64 = 3.0;
const SELECTED_LINE_OPACITY: f64 = 1.0;
const UNSELECTED_LINE_OPACITY: f64 = 0.2;

/// `isFinite(containerSize()[axis]) ? containerSize()[axis] : fallback`
fn container_extent(axis: u8, fallback: f64) -> Expr {
    let size = Expr::call("containerSize", []).index(Expr::number(f64::from(axis)));
    Expr::conditional(
        Expr::call("isFinite", [size.clone()]),
        size,
        Expr::number(fallback),
    )
}

fn window_resize() -> EventSelector {
    EventStream::new(EventSource::Window, EventType::Resize).into()
}

/// View width and height, tracking the container and falling back to `fallback` while unknown.
pub(crate) fn add_width_height(
    builder: &mut SpecBuilder,
    width: &str,
    height: &str,
    fallback: Size,
) {
    for (axis, name, fallback) in [(0, width, fallback.width), (1, height, fallback.height)] {
        let extent = container_extent(axis, fallback);
        builder.push_signal(
            Signal::new(name)
                .with_init(extent.clone())
                .with_handler(OnEvent::new([window_resize()], extent)),
        );
    }
}

/// Signals the plot writes back to the legend, extended once per hit box.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReverseSignals {
    hover: SignalId,
    select: SignalId,
    unselect: SignalId,
}

impl ReverseSignals {
    /// Reports pointer-over, click and right-button press on `hit_box` as `selector`.
    pub(crate) fn extend_with_hit_box(
        &self,
        builder: &mut SpecBuilder,
        hit_box: &str,
        selector: &Expr,
    ) {
        let on_hit_box = |kind| EventStream::new(EventSource::View, kind).on_mark(hit_box);
        let reported = Expr::datum().and(selector.clone());

        let hover = builder.signal_mut(self.hover);
        hover.on.push(OnEvent::new(
            [on_hit_box(EventType::MouseOver).into()],
            reported.clone(),
        ));
        hover.on.push(OnEvent::new(
            [on_hit_box(EventType::MouseOut).into()],
            Expr::Null,
        ));

        builder.signal_mut(self.select).on.push(
            OnEvent::new([on_hit_box(EventType::Click).into()], reported).forced(),
        );

        let right_button = Expr::event()
            .prop("which")
            .strict_eq(Expr::number(RIGHT_BUTTON));
        builder.signal_mut(self.unselect).on.push(
            OnEvent::new(
                [on_hit_box(EventType::MouseDown)
                    .with_filter(right_button)
                    .consumed()
                    .into()],
                Expr::Bool(true),
            )
            .forced(),
        );
    }
}

/// Hover cells and legend selection cells.
///
/// The reverse signals start without handlers; [`ReverseSignals::extend_with_hit_box`] adds them.
pub(crate) fn add_hover_select(builder: &mut SpecBuilder) -> ReverseSignals {
    let hovered_time = Expr::datum().prop("datum");
    builder.push_signal(
        Signal::new(INTERNAL_HOVER_SIGNAL)
            .with_handler(OnEvent::new(
                [EventStream::new(EventSource::Scope, EventType::MouseOver)
                    .on_mark(HOVER_VORONOI_MARK)
                    .into()],
                Expr::datum().and(hovered_time.clone()).and(Expr::object([(
                    TIME_FIELD,
                    hovered_time.field(TIME_FIELD),
                )])),
            ))
            .with_handler(OnEvent::new(
                [EventStream::new(EventSource::View, EventType::MouseOut)
                    .with_filter(Expr::event().prop("type").strict_eq(Expr::string("mouseout")))
                    .into()],
                Expr::Null,
            )),
    );
    builder.push_signal(Signal::new(EXTERNAL_HOVER_SIGNAL).with_value(Value::Null));
    builder.push_signal(Signal::new(HOVER_SIGNAL).with_handler(OnEvent::new(
        [
            EventSelector::signal(INTERNAL_HOVER_SIGNAL),
            EventSelector::signal(EXTERNAL_HOVER_SIGNAL),
        ],
        Expr::ident(INTERNAL_HOVER_SIGNAL).or(Expr::ident(EXTERNAL_HOVER_SIGNAL)),
    )));

    builder.push_signal(Signal::new(LEGEND_SELECT_SIGNAL).with_value(Value::Array(Vec::new())));
    builder.push_signal(Signal::new(LEGEND_HOVER_SIGNAL).with_value(Value::Null));
    ReverseSignals {
        hover: builder.push_signal(Signal::new(REVERSE_HOVER_SIGNAL)),
        select: builder.push_signal(Signal::new(REVERSE_SELECT_SIGNAL)),
        unselect: builder.push_signal(Signal::new(REVERSE_UNSELECT_SIGNAL)),
    }
}

/// Time domain cells observing `scale`.
pub(crate) fn add_ts_domain(builder: &mut SpecBuilder, scale: &str) -> SignalId {
    builder.push_signal(Signal::new(INTERNAL_TS_DOMAIN_SIGNAL).with_handler(OnEvent::new(
        [EventSelector::scale(scale)],
        Expr::call("domain", [Expr::string(scale)]),
    )));
    builder.push_signal(Signal::new(EXTERNAL_TS_DOMAIN_SIGNAL).with_value(Value::Null));
    builder.push_signal(Signal::new(TS_DOMAIN_SIGNAL).with_handler(OnEvent::new(
        [
            EventSelector::signal(INTERNAL_TS_DOMAIN_SIGNAL),
            EventSelector::signal(EXTERNAL_TS_DOMAIN_SIGNAL),
        ],
        Expr::call(
            "combineInternalExternal",
            [
                Expr::ident(INTERNAL_TS_DOMAIN_SIGNAL),
                Expr::ident(EXTERNAL_TS_DOMAIN_SIGNAL),
            ],
        ),
    )))
}

/// Opacity and stroke-width rules reacting to legend hover and selection of `selector`.
pub(crate) fn add_legend_emphasis(entry: &mut EncodeEntry, selector: &Expr) {
    let legend_hovered = Expr::ident(LEGEND_HOVER_SIGNAL);
    let hovered = legend_hovered
        .clone()
        .and(selector.clone().strict_eq(legend_hovered));
    let selected = Expr::ident(LEGEND_SELECT_SIGNAL);
    let deselected = selected
        .clone()
        .prop("length")
        .strict_ne(Expr::number(0.0))
        .and(
            Expr::call("indexof", [selected, selector.clone()]).strict_eq(Expr::number(-1.0)),
        );
    entry.set(
        "opacity",
        vec![
            ValueRef::value(SELECTED_LINE_OPACITY).when(hovered.clone()),
            ValueRef::value(UNSELECTED_LINE_OPACITY).when(deselected),
            ValueRef::value(SELECTED_LINE_OPACITY),
        ],
    );
    entry.set(
        "strokeWidth",
        vec![
            ValueRef::value(HIGHLIGHTED_LINE_WIDTH).when(hovered),
            ValueRef::value(LINE_WIDTH),
        ],
    );
}
