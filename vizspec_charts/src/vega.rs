// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pre-authored specs, passed through with a default schema.

extern crate alloc;

use alloc::string::{String, ToString};

use serde_json::{Map, Value};
use vizspec_core::{SpecDocument, VEGA_LITE_V4_SCHEMA, VEGA_V5_SCHEMA};

use crate::compile::ChartOutput;
use crate::display::VegaChart;
use crate::error::CompileError;
use crate::lowering::Lowering;

const SCHEMA_KEY: &str = "$schema";

fn parse(text: &str) -> Result<Map<String, Value>, CompileError> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CompileError::MalformedSpec(String::from(
            "spec is not a JSON object",
        ))),
        Err(err) => Err(CompileError::MalformedSpec(err.to_string())),
    }
}

/// Parses the spec text, defaults a missing or empty `$schema` to the low-level grammar and
/// lowers higher-level specs through `lowering`.
pub(crate) fn compile(
    chart: &VegaChart,
    lowering: &dyn Lowering,
) -> Result<ChartOutput, CompileError> {
    let mut spec = parse(&chart.spec)?;
    let schema_missing = spec
        .get(SCHEMA_KEY)
        .and_then(Value::as_str)
        .is_none_or(str::is_empty);
    if schema_missing {
        spec.insert(
            String::from(SCHEMA_KEY),
            Value::String(String::from(VEGA_V5_SCHEMA)),
        );
    }

    let lowered = spec.get(SCHEMA_KEY).and_then(Value::as_str) == Some(VEGA_LITE_V4_SCHEMA);
    if lowered {
        spec = lowering
            .lower(spec)
            .map_err(CompileError::DelegatedLoweringFailure)?;
    }
    tracing::debug!(lowered, keys = spec.len(), "passthrough spec");

    Ok(ChartOutput {
        spec: SpecDocument::Authored(spec),
        has_legend: false,
        legend_column: String::new(),
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use serde_json::json;

    use super::*;
    use crate::lowering::NoLowering;

    #[derive(Debug)]
    struct Marker;

    impl Lowering for Marker {
        fn lower(&self, mut spec: Map<String, Value>) -> Result<Map<String, Value>, String> {
            spec.insert(String::from(SCHEMA_KEY), json!(VEGA_V5_SCHEMA));
            spec.insert(String::from("lowered"), json!(true));
            Ok(spec)
        }
    }

    fn raw(spec: &str) -> VegaChart {
        VegaChart {
            spec: String::from(spec),
        }
    }

    #[test]
    fn missing_schema_defaults_to_v5() {
        let out = compile(&raw(r#"{"marks": []}"#), &NoLowering).unwrap();
        assert_eq!(out.spec.schema(), Some(VEGA_V5_SCHEMA));
        let out = compile(&raw(r#"{"$schema": ""}"#), &NoLowering).unwrap();
        assert_eq!(out.spec.schema(), Some(VEGA_V5_SCHEMA));
        assert!(!out.has_legend, "passthrough specs have no managed legend");
    }

    #[test]
    fn higher_level_specs_are_lowered() {
        let text = json!({"$schema": VEGA_LITE_V4_SCHEMA, "mark": "bar"}).to_string();
        let out = compile(&raw(&text), &Marker).unwrap();
        let value = out.spec.to_value().unwrap();
        assert_eq!(value["lowered"], json!(true));
        assert_eq!(
            compile(&raw(&text), &NoLowering).unwrap_err(),
            CompileError::DelegatedLoweringFailure(String::from(
                "no lowering for higher-level specs is configured"
            ))
        );
    }

    #[test]
    fn non_objects_are_malformed() {
        assert!(matches!(
            compile(&raw("[1, 2]"), &NoLowering),
            Err(CompileError::MalformedSpec(_))
        ));
        assert!(matches!(
            compile(&raw("{"), &NoLowering),
            Err(CompileError::MalformedSpec(_))
        ));
    }
}
