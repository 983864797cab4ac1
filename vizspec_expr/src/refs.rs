// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrappers that place an expression into a spec property.

extern crate alloc;

use alloc::string::String;

use serde::Serialize;

use crate::Expr;

/// A property bound to a signal expression, serialized as `{"signal": "..."}`.
///
/// The expression is usually a bare signal name, but any expression over signals is allowed
/// (`ceil(width / 20)`).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignalRef {
    /// Expression evaluated against the signal scope.
    pub signal: Expr,
}

impl SignalRef {
    /// Binds to a single named signal.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            signal: Expr::ident(name),
        }
    }

    /// Binds to an arbitrary expression.
    pub fn expr(signal: Expr) -> Self {
        Self { signal }
    }

    /// Returns the signal name when this binds directly to one signal.
    pub fn name(&self) -> Option<&str> {
        self.signal.as_ident()
    }
}

/// A per-datum parameter expression, serialized as `{"expr": "..."}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExprRef {
    /// Expression evaluated per datum.
    pub expr: Expr,
}

impl From<Expr> for ExprRef {
    fn from(expr: Expr) -> Self {
        Self { expr }
    }
}
