// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual encodings.
//!
//! An encoding maps a visual channel (`x`, `stroke`, `opacity`, ...) to a *production*: either a
//! single value reference or an ordered list of test-guarded rules where the first passing rule
//! wins. Rules are evaluated by the runtime every frame, so interaction feedback (legend emphasis,
//! hover opacity) is expressed here as data rather than as compiler-side control flow.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use vizspec_expr::Expr;

/// A field reference: a datum field name, or a field of the enclosing group item.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldRef {
    /// `datum[name]`
    Name(String),
    /// A property of the enclosing group, `{"group": name}`.
    Group {
        /// Group property name.
        group: String,
    },
}

/// A value reference, optionally guarded by a `test` when used as a rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValueRef {
    /// Guard expression; only meaningful inside a rule list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<Expr>,
    /// Scale applied to `field` or `value`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    /// Source field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldRef>,
    /// Literal value. `Some(Value::Null)` serializes an explicit `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Signal expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<Expr>,
    /// Band fraction of a band scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<f64>,
}

impl ValueRef {
    /// A literal value.
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// A datum field.
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: Some(FieldRef::Name(field.into())),
            ..Self::default()
        }
    }

    /// A property of the enclosing group.
    pub fn group_field(group: impl Into<String>) -> Self {
        Self {
            field: Some(FieldRef::Group {
                group: group.into(),
            }),
            ..Self::default()
        }
    }

    /// A signal expression.
    pub fn signal(signal: Expr) -> Self {
        Self {
            signal: Some(signal),
            ..Self::default()
        }
    }

    /// A datum field mapped through `scale`.
    pub fn scaled_field(scale: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            scale: Some(scale.into()),
            ..Self::field(field)
        }
    }

    /// A literal value mapped through `scale`.
    pub fn scaled_value(scale: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            scale: Some(scale.into()),
            ..Self::value(value)
        }
    }

    /// A band-width fraction of `scale`.
    pub fn band(scale: impl Into<String>, band: f64) -> Self {
        Self {
            scale: Some(scale.into()),
            band: Some(band),
            ..Self::default()
        }
    }

    /// Guards this reference with `test`, turning it into a rule.
    pub fn when(mut self, test: Expr) -> Self {
        self.test = Some(test);
        self
    }
}

/// What a channel resolves to.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Production {
    /// A single value reference.
    Ref(ValueRef),
    /// Ordered rules; the first whose `test` passes (or that has none) applies.
    Rules(Vec<ValueRef>),
}

impl Production {
    /// Returns the scale this production maps through, if any rule names one.
    pub fn scales(&self) -> impl Iterator<Item = &str> {
        let refs: &[ValueRef] = match self {
            Self::Ref(r) => core::slice::from_ref(r),
            Self::Rules(rules) => rules,
        };
        refs.iter().filter_map(|r| r.scale.as_deref())
    }
}

impl From<ValueRef> for Production {
    fn from(value: ValueRef) -> Self {
        Self::Ref(value)
    }
}

impl From<Vec<ValueRef>> for Production {
    fn from(rules: Vec<ValueRef>) -> Self {
        Self::Rules(rules)
    }
}

/// One encoding set (`enter`, `update`, ...): channels in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodeEntry {
    channels: Vec<(String, Production)>,
}

impl EncodeEntry {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `channel`, replacing any previous production in place.
    pub fn set(&mut self, channel: &str, production: impl Into<Production>) -> &mut Self {
        let production = production.into();
        match self.channels.iter_mut().find(|(c, _)| c == channel) {
            Some((_, existing)) => *existing = production,
            None => self.channels.push((String::from(channel), production)),
        }
        self
    }

    /// Builder-style [`EncodeEntry::set`].
    pub fn with(mut self, channel: &str, production: impl Into<Production>) -> Self {
        self.set(channel, production);
        self
    }

    /// Returns the production for `channel`.
    pub fn get(&self, channel: &str) -> Option<&Production> {
        self.channels
            .iter()
            .find(|(c, _)| c == channel)
            .map(|(_, p)| p)
    }

    /// Iterates channels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Production)> {
        self.channels.iter().map(|(c, p)| (c.as_str(), p))
    }

    /// Returns `true` if no channel is set.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Serialize for EncodeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.channels.len()))?;
        for (channel, production) in &self.channels {
            map.serialize_entry(channel, production)?;
        }
        map.end()
    }
}

/// Encoding sets of a mark or guide element.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Encode {
    /// Applied once when an item is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enter: Option<EncodeEntry>,
    /// Applied on every update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<EncodeEntry>,
}

impl Encode {
    /// An encoding with only an `update` set.
    pub fn update(entry: EncodeEntry) -> Self {
        Self {
            enter: None,
            update: Some(entry),
        }
    }

    /// Returns the `update` set, creating it if needed.
    pub fn update_mut(&mut self) -> &mut EncodeEntry {
        self.update.get_or_insert_with(EncodeEntry::new)
    }

    /// Iterates both sets' productions.
    pub fn productions(&self) -> impl Iterator<Item = (&str, &Production)> {
        self.enter
            .iter()
            .chain(self.update.iter())
            .flat_map(EncodeEntry::iter)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use serde_json::json;

    use super::*;

    #[test]
    fn set_replaces_in_place_and_keeps_order() {
        let mut e = EncodeEntry::new();
        e.set("x", ValueRef::scaled_field("x", "time_"));
        e.set("y", ValueRef::scaled_field("y", "latency"));
        e.set("x", ValueRef::value(0));
        let channels: Vec<&str> = e.iter().map(|(c, _)| c).collect();
        assert_eq!(channels, ["x", "y"]);
        assert_eq!(
            serde_json::to_value(&e).unwrap(),
            json!({"x": {"value": 0}, "y": {"scale": "y", "field": "latency"}})
        );
    }

    #[test]
    fn rules_serialize_with_tests() {
        let p = Production::Rules(vec![
            ValueRef::value(1.0).when(Expr::ident("hovered")),
            ValueRef::value(0.2),
        ]);
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!([{"test": "hovered", "value": 1.0}, {"value": 0.2}])
        );
    }

    #[test]
    fn explicit_null_value_is_kept() {
        let r = ValueRef::value(Value::Null);
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"value": null}));
        assert_eq!(
            serde_json::to_value(ValueRef::group_field("width")).unwrap(),
            json!({"field": {"group": "width"}})
        );
    }
}
