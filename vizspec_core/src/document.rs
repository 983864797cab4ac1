// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A specification that is either compiled here or authored elsewhere.

extern crate alloc;

use alloc::string::String;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::spec::Spec;

/// The output document handed to the runtime.
///
/// Pre-authored specs pass through as JSON objects; only the top-level presentation blocks
/// (`background`, `padding`, `config`) are touched after compilation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpecDocument {
    /// Built by the compiler.
    Compiled(Spec),
    /// Authored by hand (or lowered from the higher-level grammar), kept as JSON.
    Authored(Map<String, Value>),
}

impl SpecDocument {
    /// The `$schema` URL, if set.
    pub fn schema(&self) -> Option<&str> {
        match self {
            Self::Compiled(spec) => Some(&spec.schema),
            Self::Authored(map) => map.get("$schema").and_then(Value::as_str),
        }
    }

    /// Returns the compiled spec, if this document was compiled.
    pub fn as_compiled(&self) -> Option<&Spec> {
        match self {
            Self::Compiled(spec) => Some(spec),
            Self::Authored(_) => None,
        }
    }

    /// Sets the background color.
    pub fn set_background(&mut self, color: String) {
        match self {
            Self::Compiled(spec) => spec.background = Some(color),
            Self::Authored(map) => {
                map.insert(String::from("background"), Value::String(color));
            }
        }
    }

    /// Sets the view padding in pixels.
    pub fn set_padding(&mut self, padding: f64) {
        match self {
            Self::Compiled(spec) => spec.padding = Some(padding),
            Self::Authored(map) => {
                map.insert(String::from("padding"), Value::from(padding));
            }
        }
    }

    /// Returns the config block, if any.
    pub fn config(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Compiled(spec) => spec.config.as_ref(),
            Self::Authored(map) => map.get("config").and_then(Value::as_object),
        }
    }

    /// Shallow-merges `entries` into the config block; keys in `entries` replace existing ones.
    ///
    /// A non-object `config` in an authored document is replaced.
    pub fn merge_config(&mut self, entries: Map<String, Value>) {
        match self {
            Self::Compiled(spec) => spec.config.get_or_insert_with(Map::new).extend(entries),
            Self::Authored(map) => {
                match map
                    .entry("config")
                    .or_insert_with(|| Value::Object(Map::new()))
                {
                    Value::Object(config) => config.extend(entries),
                    other => *other = Value::Object(entries),
                }
            }
        }
    }

    /// Converts to a JSON value.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl From<Spec> for SpecDocument {
    fn from(spec: Spec) -> Self {
        Self::Compiled(spec)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use serde_json::json;

    use super::*;

    #[test]
    fn authored_config_keeps_unrelated_keys() {
        let Value::Object(map) = json!({
            "$schema": "https://vega.github.io/schema/vega/v5.json",
            "config": {"mark": {"tooltip": true}, "axis": {"grid": true}},
        }) else {
            unreachable!()
        };
        let mut doc = SpecDocument::Authored(map);
        let Value::Object(theme) = json!({"axis": {"labelFont": "Roboto"}}) else {
            unreachable!()
        };
        doc.merge_config(theme);
        doc.set_padding(16.0);
        let value = doc.to_value().unwrap();
        assert_eq!(value["config"]["mark"], json!({"tooltip": true}));
        assert_eq!(value["config"]["axis"], json!({"labelFont": "Roboto"}));
        assert_eq!(value["padding"], json!(16.0));
    }

    #[test]
    fn non_object_config_is_replaced() {
        let Value::Object(map) = json!({"config": 3}) else {
            unreachable!()
        };
        let mut doc = SpecDocument::Authored(map);
        doc.merge_config(Map::new());
        assert_eq!(doc.config(), Some(&Map::new()));
        assert_eq!(doc.schema(), None);
    }

    #[test]
    fn compiled_documents_serialize_as_the_spec() {
        let mut doc = SpecDocument::from(Spec::new());
        doc.set_background(String::from("#161616"));
        assert_eq!(
            doc.to_value().unwrap(),
            json!({
                "$schema": "https://vega.github.io/schema/vega/v5.json",
                "background": "#161616",
            })
        );
    }
}
