// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed expressions for the Vega expression language.
//!
//! Compiled specs carry expressions in three places: signal update rules, transform parameters
//! (`formula`, `filter`), and encoding tests. Building them as an AST instead of formatting strings
//! by hand gives us:
//! - a single place that decides parenthesization and string escaping, and
//! - a structure that a reference evaluator can walk without re-parsing text.
//!
//! Expressions serialize as their rendered text, so a `{"update": ...}` field holds a plain string.

#![no_std]

extern crate alloc;

mod expr;
mod print;
mod refs;

pub use expr::{BinaryOp, Expr, UnaryOp};
pub use refs::{ExprRef, SignalRef};
