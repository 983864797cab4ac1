// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A reference evaluator for the signals of a compiled spec.
//!
//! The rendering runtime owns the real signal machinery; this crate reimplements the small subset
//! the compiler relies on so that interaction wiring can be exercised without a browser:
//! - [`SignalGraph`] orders signals by their `{signal: name}` triggers and rejects cycles,
//! - [`eval`] evaluates expressions over JSON values,
//! - [`SignalRuntime`] delivers events, scale changes and external writes, then propagates.
//!
//! Formatter calls emitted as verbatim text are opaque here and fail with [`EvalError::Opaque`].

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod eval;
#[cfg(not(feature = "std"))]
mod float;
mod graph;
mod runtime;

pub use eval::{EvalError, Scope, eval, strict_eq, to_number, truthy};
pub use graph::{GraphError, SignalGraph};
pub use runtime::{Event, RuntimeError, SignalRuntime};
