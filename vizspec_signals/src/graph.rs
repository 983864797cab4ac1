// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signal dependency graph and propagation order.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use vizspec_core::Signal;

/// Error building a [`SignalGraph`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A handler listens to a signal that is not declared.
    #[error("signal `{signal}` listens to unknown signal `{trigger}`")]
    UnknownTrigger {
        /// Listening signal.
        signal: String,
        /// Missing upstream signal.
        trigger: String,
    },
    /// Signal triggers form a cycle.
    #[error("signal triggers form a cycle through {signals:?}")]
    Cycle {
        /// Signals that could not be ordered.
        signals: Vec<String>,
    },
}

/// Upstream/downstream relations between signals, derived from `{signal: name}` triggers.
///
/// Only signal-change triggers create edges; event and scale triggers are entry points.
#[derive(Clone, Debug)]
pub struct SignalGraph {
    index: HashMap<String, usize>,
    names: Vec<String>,
    dependents: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl SignalGraph {
    /// Builds the graph and a propagation order (Kahn's algorithm).
    ///
    /// Ties are broken by declaration order so the order is deterministic.
    pub fn build(signals: &[Signal]) -> Result<Self, GraphError> {
        let index: HashMap<String, usize> = signals
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();

        let mut dependents = alloc::vec![Vec::new(); signals.len()];
        let mut in_degree = alloc::vec![0_usize; signals.len()];
        for (i, signal) in signals.iter().enumerate() {
            // A signal listing the same trigger twice still depends on it once.
            let mut seen: HashSet<usize> = HashSet::new();
            for trigger in signal.on.iter().flat_map(|h| h.signal_triggers()) {
                let Some(&upstream) = index.get(trigger) else {
                    return Err(GraphError::UnknownTrigger {
                        signal: signal.name.clone(),
                        trigger: String::from(trigger),
                    });
                };
                if seen.insert(upstream) {
                    dependents[upstream].push(i);
                    in_degree[i] += 1;
                }
            }
        }

        let mut order = Vec::with_capacity(signals.len());
        let mut ready: Vec<usize> = (0..signals.len()).filter(|&i| in_degree[i] == 0).collect();
        while !ready.is_empty() {
            ready.sort_unstable();
            let mut next = Vec::new();
            for &node in &ready {
                order.push(node);
                for &dep in &dependents[node] {
                    in_degree[dep] -= 1;
                    if in_degree[dep] == 0 {
                        next.push(dep);
                    }
                }
            }
            ready = next;
        }

        if order.len() != signals.len() {
            let signals = signals
                .iter()
                .enumerate()
                .filter(|&(i, _)| in_degree[i] > 0)
                .map(|(_, s)| s.name.clone())
                .collect();
            return Err(GraphError::Cycle { signals });
        }

        Ok(Self {
            index,
            names: signals.iter().map(|s| s.name.clone()).collect(),
            dependents,
            order,
        })
    }

    /// Position of a signal in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Signal name at a declaration position.
    pub fn name(&self, position: usize) -> &str {
        &self.names[position]
    }

    /// Declaration positions in propagation order: every signal after all of its triggers.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Signals that listen to the signal at `position`.
    pub fn dependents(&self, position: usize) -> &[usize] {
        &self.dependents[position]
    }

    /// Names in propagation order.
    pub fn ordered_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|&i| self.names[i].as_str())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use vizspec_core::{EventSelector, OnEvent};
    use vizspec_expr::Expr;

    use super::*;

    fn listens(name: &str, triggers: &[&str]) -> Signal {
        Signal::new(name).with_handler(OnEvent::new(
            triggers.iter().map(|t| EventSelector::signal(*t)),
            Expr::Null,
        ))
    }

    #[test]
    fn combined_signal_follows_its_inputs() {
        let signals = [
            listens("hover_value", &["internal_hover_value", "external_hover_value"]),
            Signal::new("internal_hover_value"),
            Signal::new("external_hover_value"),
        ];
        let g = SignalGraph::build(&signals).unwrap();
        let order: Vec<&str> = g.ordered_names().collect();
        assert_eq!(
            order,
            ["internal_hover_value", "external_hover_value", "hover_value"]
        );
        assert_eq!(g.dependents(1), [0]);
    }

    #[test]
    fn cycles_are_rejected() {
        let signals = [listens("a", &["b"]), listens("b", &["a"]), Signal::new("c")];
        assert_eq!(
            SignalGraph::build(&signals).unwrap_err(),
            GraphError::Cycle {
                signals: alloc::vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn unknown_triggers_are_rejected() {
        let signals = [listens("a", &["missing"])];
        assert!(matches!(
            SignalGraph::build(&signals),
            Err(GraphError::UnknownTrigger { .. })
        ));
    }
}
