// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic, single-threaded signal runtime.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use serde_json::{Map, Value};
use vizspec_core::{EventSelector, EventSource, EventStream, EventType, Signal, Spec};
use vizspec_expr::Expr;

use crate::eval::{EvalError, Scope, eval, truthy};
use crate::graph::{GraphError, SignalGraph};

/// Error raised by the [`SignalRuntime`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// The signal graph is malformed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A signal's initializer or handler failed to evaluate.
    #[error("evaluating `{signal}`: {error}")]
    Eval {
        /// Signal being evaluated.
        signal: String,
        /// Underlying failure.
        error: EvalError,
    },
    /// No signal with this name.
    #[error("unknown signal `{0}`")]
    UnknownSignal(String),
    /// The signal has writers inside the spec and cannot be set from outside.
    #[error("signal `{0}` is not an external input")]
    NotExternal(String),
}

/// An input event delivered to the runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event kind.
    pub kind: EventType,
    /// Whether the event originates from the window rather than the view.
    pub from_window: bool,
    /// Name of the mark owning the target item, if any.
    pub markname: Option<String>,
    /// The target item's datum.
    pub datum: Value,
    /// Mouse button code (`3` is the right button).
    pub which: Option<u8>,
}

impl Event {
    /// A pointer event over an item of `markname`.
    pub fn on_mark(kind: EventType, markname: impl Into<String>, datum: Value) -> Self {
        Self {
            kind,
            from_window: false,
            markname: Some(markname.into()),
            datum,
            which: None,
        }
    }

    /// A pointer event over empty space.
    pub fn on_view(kind: EventType) -> Self {
        Self {
            kind,
            from_window: false,
            markname: None,
            datum: Value::Null,
            which: None,
        }
    }

    /// A window resize.
    pub fn resize() -> Self {
        Self {
            kind: EventType::Resize,
            from_window: true,
            markname: None,
            datum: Value::Null,
            which: None,
        }
    }

    /// Sets the mouse button code.
    pub fn with_button(mut self, which: u8) -> Self {
        self.which = Some(which);
        self
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        let kind = match self.kind {
            EventType::MouseOver => "mouseover",
            EventType::MouseOut => "mouseout",
            EventType::MouseDown => "mousedown",
            EventType::Click => "click",
            EventType::Resize => "resize",
        };
        map.insert(String::from("type"), Value::from(kind));
        if let Some(which) = self.which {
            map.insert(String::from("which"), Value::from(which));
        }
        Value::Object(map)
    }

    fn matches(&self, stream: &EventStream, event_value: &Value, scope: &dyn Scope) -> bool {
        let source_ok = match stream.source {
            EventSource::Window => self.from_window,
            EventSource::View | EventSource::Scope => !self.from_window,
        };
        if !source_ok || stream.kind != self.kind {
            return false;
        }
        if let Some(markname) = &stream.markname {
            if self.markname.as_ref() != Some(markname) {
                return false;
            }
        }
        match &stream.filter {
            None => true,
            Some(filter) => {
                let scoped = Bound {
                    base: scope,
                    datum: &self.datum,
                    event: event_value,
                };
                eval(filter, &scoped).is_ok_and(|v| truthy(&v))
            }
        }
    }
}

/// Scope that overlays a datum and an event on the runtime's signal scope.
struct Bound<'a> {
    base: &'a dyn Scope,
    datum: &'a Value,
    event: &'a Value,
}

impl Scope for Bound<'_> {
    fn signal(&self, name: &str) -> Option<&Value> {
        self.base.signal(name)
    }

    fn datum(&self) -> Option<&Value> {
        Some(self.datum)
    }

    fn event(&self) -> Option<&Value> {
        Some(self.event)
    }

    fn container_size(&self) -> [f64; 2] {
        self.base.container_size()
    }

    fn scale_domain(&self, scale: &str) -> Option<&Value> {
        self.base.scale_domain(scale)
    }
}

/// Signal values plus the host state expressions can observe.
#[derive(Debug)]
struct State {
    names: HashMap<String, usize>,
    values: Vec<Value>,
    container: [f64; 2],
    domains: HashMap<String, Value>,
}

impl Scope for State {
    fn signal(&self, name: &str) -> Option<&Value> {
        self.names.get(name).map(|&i| &self.values[i])
    }

    fn container_size(&self) -> [f64; 2] {
        self.container
    }

    fn scale_domain(&self, scale: &str) -> Option<&Value> {
        self.domains.get(scale)
    }
}

/// Executes the signal graph of a compiled spec.
///
/// Values change only through [`SignalRuntime::dispatch`] (event handlers),
/// [`SignalRuntime::notify_scale`] (scale handlers) and [`SignalRuntime::set_external`] (signals
/// with no writers in the spec). Each entry point then propagates through signal triggers in
/// topological order.
#[derive(Debug)]
pub struct SignalRuntime {
    signals: Vec<Signal>,
    graph: SignalGraph,
    state: State,
}

impl SignalRuntime {
    /// Builds the runtime and evaluates initial values.
    ///
    /// `container` is the embedding container's `[width, height]`, or `None` when unknown.
    pub fn new(spec: &Spec, container: Option<[f64; 2]>) -> Result<Self, RuntimeError> {
        let signals = spec.signals.clone();
        let graph = SignalGraph::build(&signals)?;
        let mut state = State {
            names: signals
                .iter()
                .enumerate()
                .map(|(i, s)| (s.name.clone(), i))
                .collect(),
            values: alloc::vec![Value::Null; signals.len()],
            container: container.unwrap_or([f64::NAN, f64::NAN]),
            domains: HashMap::new(),
        };
        for &i in graph.order() {
            let signal = &signals[i];
            let value = match (&signal.value, &signal.init) {
                (_, Some(init)) => eval(init, &state).map_err(|error| RuntimeError::Eval {
                    signal: signal.name.clone(),
                    error,
                })?,
                (Some(value), None) => value.clone(),
                (None, None) => Value::Null,
            };
            state.values[i] = value;
        }
        tracing::debug!(signals = signals.len(), "signal runtime initialized");
        Ok(Self {
            signals,
            graph,
            state,
        })
    }

    /// Current value of a signal.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.state.signal(name)
    }

    /// Sets an external input signal and propagates.
    ///
    /// Returns the names of signals whose value changed, in update order.
    pub fn set_external(&mut self, name: &str, value: Value) -> Result<Vec<String>, RuntimeError> {
        let i = self
            .graph
            .position(name)
            .ok_or_else(|| RuntimeError::UnknownSignal(String::from(name)))?;
        if !self.signals[i].is_external() {
            return Err(RuntimeError::NotExternal(String::from(name)));
        }
        let mut changed = Vec::new();
        if self.state.values[i] != value {
            self.state.values[i] = value;
            changed.push(i);
        }
        self.propagate(changed)
    }

    /// Delivers an input event to every matching handler, then propagates.
    pub fn dispatch(&mut self, event: &Event) -> Result<Vec<String>, RuntimeError> {
        tracing::debug!(kind = ?event.kind, markname = ?event.markname, "dispatch");
        let event_value = event.to_value();
        let mut pending: Vec<(usize, Value, bool)> = Vec::new();
        for (i, signal) in self.signals.iter().enumerate() {
            for handler in &signal.on {
                let fires = handler.events.iter().any(|selector| match selector {
                    EventSelector::Stream(stream) => {
                        event.matches(stream, &event_value, &self.state)
                    }
                    _ => false,
                });
                if !fires {
                    continue;
                }
                let scope = Bound {
                    base: &self.state,
                    datum: &event.datum,
                    event: &event_value,
                };
                let value = eval(&handler.update, &scope).map_err(|error| RuntimeError::Eval {
                    signal: signal.name.clone(),
                    error,
                })?;
                pending.push((i, value, handler.force));
            }
        }
        let changed = self.apply(pending);
        self.propagate(changed)
    }

    /// Records a new domain for `scale` and fires handlers listening to it.
    pub fn notify_scale(&mut self, scale: &str, domain: Value) -> Result<Vec<String>, RuntimeError> {
        self.state.domains.insert(String::from(scale), domain);
        let mut pending = Vec::new();
        for (i, signal) in self.signals.iter().enumerate() {
            for handler in &signal.on {
                let fires = handler
                    .events
                    .iter()
                    .any(|s| matches!(s, EventSelector::Scale { scale: name } if name == scale));
                if fires {
                    let value = eval(&handler.update, &self.state).map_err(|error| {
                        RuntimeError::Eval {
                            signal: signal.name.clone(),
                            error,
                        }
                    })?;
                    pending.push((i, value, handler.force));
                }
            }
        }
        let changed = self.apply(pending);
        self.propagate(changed)
    }

    /// Writes handler results; later handlers for the same signal win.
    fn apply(&mut self, pending: Vec<(usize, Value, bool)>) -> Vec<usize> {
        let mut changed = Vec::new();
        for (i, value, force) in pending {
            if force || self.state.values[i] != value {
                self.state.values[i] = value;
                if !changed.contains(&i) {
                    changed.push(i);
                }
            }
        }
        changed
    }

    fn propagate(&mut self, seeds: Vec<usize>) -> Result<Vec<String>, RuntimeError> {
        let mut dirty: HashSet<usize> = seeds.iter().copied().collect();
        let mut changed = seeds;
        for &i in self.graph.order() {
            let signal = &self.signals[i];
            let mut update: Option<(&Expr, bool)> = None;
            for handler in &signal.on {
                let triggered = handler
                    .signal_triggers()
                    .any(|t| self.graph.position(t).is_some_and(|p| dirty.contains(&p)));
                if triggered {
                    update = Some((&handler.update, handler.force));
                }
            }
            let Some((expr, force)) = update else {
                continue;
            };
            let value = eval(expr, &self.state).map_err(|error| RuntimeError::Eval {
                signal: signal.name.clone(),
                error,
            })?;
            if force || self.state.values[i] != value {
                tracing::trace!(signal = %signal.name, %value, "signal updated");
                self.state.values[i] = value;
                dirty.insert(i);
                if !changed.contains(&i) {
                    changed.push(i);
                }
            }
        }
        Ok(changed
            .into_iter()
            .map(|i| String::from(self.graph.name(i)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use serde_json::json;
    use vizspec_core::OnEvent;

    use super::*;

    fn hover_spec() -> Spec {
        let mut spec = Spec::new();
        spec.signals.push(
            Signal::new("internal").with_handler(OnEvent::new(
                [EventStream::new(EventSource::Scope, EventType::MouseOver)
                    .on_mark("voronoi")
                    .into()],
                Expr::datum().and(Expr::object([("time_", Expr::datum_field("time_"))])),
            )),
        );
        spec.signals.push(Signal::new("external").with_value(Value::Null));
        spec.signals.push(Signal::new("combined").with_handler(OnEvent::new(
            [EventSelector::signal("internal"), EventSelector::signal("external")],
            Expr::ident("internal").or(Expr::ident("external")),
        )));
        spec
    }

    #[test]
    fn events_propagate_to_combined_signals() {
        let mut rt = SignalRuntime::new(&hover_spec(), None).unwrap();
        assert_eq!(rt.value("combined"), Some(&Value::Null));

        let changed = rt
            .dispatch(&Event::on_mark(
                EventType::MouseOver,
                "voronoi",
                json!({"time_": 10}),
            ))
            .unwrap();
        assert_eq!(changed, ["internal", "combined"]);
        assert_eq!(rt.value("combined"), Some(&json!({"time_": 10})));

        // Other marks do not trigger the handler.
        let changed = rt
            .dispatch(&Event::on_mark(EventType::MouseOver, "other", json!({"time_": 11})))
            .unwrap();
        assert!(changed.is_empty());
    }

    #[test]
    fn external_writes_are_limited_to_inputs() {
        let mut rt = SignalRuntime::new(&hover_spec(), None).unwrap();
        let changed = rt.set_external("external", json!({"time_": 3})).unwrap();
        assert_eq!(changed, ["external", "combined"]);
        assert_eq!(rt.value("combined"), Some(&json!({"time_": 3})));
        assert_eq!(
            rt.set_external("combined", Value::Null),
            Err(RuntimeError::NotExternal("combined".into()))
        );
        assert_eq!(
            rt.set_external("missing", Value::Null),
            Err(RuntimeError::UnknownSignal("missing".into()))
        );
    }

    #[test]
    fn filters_see_the_event() {
        let mut spec = Spec::new();
        spec.signals.push(Signal::new("unselect").with_handler(
            OnEvent::new(
                [EventStream::new(EventSource::View, EventType::MouseDown)
                    .on_mark("hit")
                    .with_filter(Expr::event().prop("which").strict_eq(Expr::number(3.0)))
                    .consumed()
                    .into()],
                Expr::Bool(true),
            )
            .forced(),
        ));
        let mut rt = SignalRuntime::new(&spec, None).unwrap();
        let left = Event::on_mark(EventType::MouseDown, "hit", json!({})).with_button(1);
        assert!(rt.dispatch(&left).unwrap().is_empty());
        let right = Event::on_mark(EventType::MouseDown, "hit", json!({})).with_button(3);
        assert_eq!(rt.dispatch(&right).unwrap(), ["unselect"]);
        // Forced handlers report a change even when the value is the same.
        assert_eq!(rt.dispatch(&right).unwrap(), ["unselect"]);
        assert_eq!(rt.value("unselect"), Some(&json!(true)));
    }
}
