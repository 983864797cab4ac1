// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lowering of higher-level grammar specs into the low-level grammar.

extern crate alloc;

use alloc::string::String;
use core::fmt::Debug;

use serde_json::{Map, Value};

/// Translates a spec written in the higher-level grammar into the low-level one.
///
/// The compiler does not implement the higher-level grammar itself; embedders that accept such
/// specs supply an implementation.
pub trait Lowering: Debug {
    /// Lowers `spec`, returning the low-level spec or a reason for failure.
    fn lower(&self, spec: Map<String, Value>) -> Result<Map<String, Value>, String>;
}

/// Rejects every higher-level spec.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLowering;

impl Lowering for NoLowering {
    fn lower(&self, _spec: Map<String, Value>) -> Result<Map<String, Value>, String> {
        Err(String::from("no lowering for higher-level specs is configured"))
    }
}
