// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signals: named reactive cells and their event handlers.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Serialize, Serializer};
use serde_json::Value;
use smallvec::SmallVec;
use vizspec_expr::Expr;

/// Where an event stream listens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// Anywhere in the view.
    View,
    /// Within the enclosing group.
    Scope,
    /// The browser window.
    Window,
}

/// Input event kinds the compiler listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Pointer enters an item.
    MouseOver,
    /// Pointer leaves an item.
    MouseOut,
    /// A button is pressed.
    MouseDown,
    /// A button is clicked.
    Click,
    /// The window is resized.
    Resize,
}

/// A filtered stream of input events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventStream {
    /// Event source.
    pub source: EventSource,
    /// Event type.
    #[serde(rename = "type")]
    pub kind: EventType,
    /// Only events whose target item belongs to this named mark.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markname: Option<String>,
    /// Additional predicate over `event`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Expr>,
    /// Stop the event from reaching default handlers.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub consume: bool,
}

impl EventStream {
    /// A stream of `kind` events from `source`.
    pub fn new(source: EventSource, kind: EventType) -> Self {
        Self {
            source,
            kind,
            markname: None,
            filter: None,
            consume: false,
        }
    }

    /// Restricts the stream to items of a named mark.
    pub fn on_mark(mut self, markname: impl Into<String>) -> Self {
        self.markname = Some(markname.into());
        self
    }

    /// Adds an event predicate.
    pub fn with_filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Marks matched events as consumed.
    pub fn consumed(mut self) -> Self {
        self.consume = true;
        self
    }
}

/// One trigger of an event handler.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventSelector {
    /// Input events.
    Stream(EventStream),
    /// Fires whenever the named signal changes.
    Signal {
        /// Upstream signal.
        signal: String,
    },
    /// Fires whenever the named scale is re-evaluated.
    Scale {
        /// Watched scale.
        scale: String,
    },
}

impl EventSelector {
    /// A signal-change trigger.
    pub fn signal(name: impl Into<String>) -> Self {
        Self::Signal {
            signal: name.into(),
        }
    }

    /// A scale-change trigger.
    pub fn scale(name: impl Into<String>) -> Self {
        Self::Scale { scale: name.into() }
    }
}

impl From<EventStream> for EventSelector {
    fn from(stream: EventStream) -> Self {
        Self::Stream(stream)
    }
}

/// An event handler: when any selector fires, the signal takes the value of `update`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OnEvent {
    /// Triggers.
    #[serde(serialize_with = "serialize_selectors")]
    pub events: SmallVec<[EventSelector; 2]>,
    /// New value.
    pub update: Expr,
    /// Propagate even when the new value equals the old one.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub force: bool,
}

impl OnEvent {
    /// A handler with the given triggers.
    pub fn new(events: impl IntoIterator<Item = EventSelector>, update: Expr) -> Self {
        Self {
            events: events.into_iter().collect(),
            update,
            force: false,
        }
    }

    /// Sets `force`.
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Names of the signals this handler listens to.
    pub fn signal_triggers(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            EventSelector::Signal { signal } => Some(signal.as_str()),
            _ => None,
        })
    }
}

fn serialize_selectors<S: Serializer>(
    events: &SmallVec<[EventSelector; 2]>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match events.as_slice() {
        [one] => one.serialize(serializer),
        many => many.serialize(serializer),
    }
}

/// A named reactive cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Signal {
    /// Unique name; the only way other entries refer to this signal.
    pub name: String,
    /// Initial literal value. `Some(Value::Null)` declares an explicit `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Initial value expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,
    /// Event handlers, in priority order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub on: Vec<OnEvent>,
}

impl Signal {
    /// A signal with no initial value and no handlers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            init: None,
            on: Vec::new(),
        }
    }

    /// Sets the literal initial value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the initial value expression.
    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }

    /// Appends a handler.
    pub fn with_handler(mut self, handler: OnEvent) -> Self {
        self.on.push(handler);
        self
    }

    /// Returns `true` if nothing inside the spec writes this signal.
    ///
    /// Such cells are inputs owned by whoever embeds the view.
    pub fn is_external(&self) -> bool {
        self.on.is_empty() && self.init.is_none()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use serde_json::json;

    use super::*;

    #[test]
    fn single_selector_serializes_as_object() {
        let s = Signal::new("reverse_selected_series").with_handler(
            OnEvent::new(
                [EventStream::new(EventSource::View, EventType::Click)
                    .on_mark("hover_line_mark_layer_0")
                    .into()],
                Expr::datum().and(Expr::string("latency")),
            )
            .forced(),
        );
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({
                "name": "reverse_selected_series",
                "on": [{
                    "events": {"source": "view", "type": "click", "markname": "hover_line_mark_layer_0"},
                    "update": "datum && \"latency\"",
                    "force": true,
                }],
            })
        );
    }

    #[test]
    fn merged_signal_lists_both_triggers() {
        let h = OnEvent::new(
            [
                EventSelector::signal("internal_hover_value"),
                EventSelector::signal("external_hover_value"),
            ],
            Expr::ident("internal_hover_value").or(Expr::ident("external_hover_value")),
        );
        let triggers: Vec<&str> = h.signal_triggers().collect();
        assert_eq!(triggers, ["internal_hover_value", "external_hover_value"]);
        assert_eq!(
            serde_json::to_value(&h).unwrap()["events"],
            json!([{"signal": "internal_hover_value"}, {"signal": "external_hover_value"}])
        );
    }

    #[test]
    fn external_cells_have_no_writers() {
        assert!(Signal::new("external_hover_value").with_value(Value::Null).is_external());
        assert!(!Signal::new("width").with_init(Expr::number(200.0)).is_external());
    }
}
