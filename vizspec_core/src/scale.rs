// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale declarations.
//!
//! Scales here are declarations for the runtime: a domain source and a range, no mapping code.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;
use vizspec_expr::SignalRef;

/// Scale kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    /// Continuous linear scale.
    Linear,
    /// Continuous time scale.
    Time,
    /// Discrete band scale.
    Band,
    /// Discrete ordinal scale.
    Ordinal,
}

/// Where a scale's domain comes from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Domain {
    /// Literal domain values.
    Values(Vec<String>),
    /// One field of a data source.
    Field {
        /// Data source name.
        data: String,
        /// Field name.
        field: String,
        /// Sort distinct values (discrete scales).
        #[serde(skip_serializing_if = "Option::is_none")]
        sort: Option<bool>,
    },
    /// Several fields of one data source, unioned.
    Fields {
        /// Data source name.
        data: String,
        /// Field names.
        fields: Vec<String>,
    },
}

impl Domain {
    /// Domain from one field.
    pub fn field(data: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Field {
            data: data.into(),
            field: field.into(),
            sort: None,
        }
    }

    /// Domain from one field, sorted.
    pub fn sorted_field(data: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Field {
            data: data.into(),
            field: field.into(),
            sort: Some(true),
        }
    }

    /// Returns the referenced data source, if any.
    pub fn data(&self) -> Option<&str> {
        match self {
            Self::Values(_) => None,
            Self::Field { data, .. } | Self::Fields { data, .. } => Some(data),
        }
    }
}

/// One end of a continuous range.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RangeValue {
    /// Fixed pixel value.
    Number(f64),
    /// Signal-bound pixel value.
    Signal(SignalRef),
}

impl From<f64> for RangeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<SignalRef> for RangeValue {
    fn from(value: SignalRef) -> Self {
        Self::Signal(value)
    }
}

/// A scale range.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Range {
    /// A named range from the config block (`"category"`).
    Named(String),
    /// Start and end of a continuous range.
    Extent([RangeValue; 2]),
}

impl Range {
    /// A range from `start` to `end`.
    pub fn extent(start: impl Into<RangeValue>, end: impl Into<RangeValue>) -> Self {
        Self::Extent([start.into(), end.into()])
    }
}

/// A scale declaration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    /// Unique name.
    pub name: String,
    /// Scale kind.
    #[serde(rename = "type")]
    pub kind: ScaleType,
    /// Domain source. May be filled in by a later stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    /// Signal overriding the data-derived domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_raw: Option<SignalRef>,
    /// Output range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    /// Force the domain to include zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,
    /// Extend the domain to round values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nice: Option<bool>,
}

impl Scale {
    /// A scale with no domain or range yet.
    pub fn new(name: impl Into<String>, kind: ScaleType) -> Self {
        Self {
            name: name.into(),
            kind,
            domain: None,
            domain_raw: None,
            range: None,
            zero: None,
            nice: None,
        }
    }

    /// Sets the domain.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Sets the range.
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Binds the raw domain to a signal.
    pub fn with_domain_raw(mut self, signal: SignalRef) -> Self {
        self.domain_raw = Some(signal);
        self
    }

    /// Sets `zero` and `nice`.
    pub fn with_zero_nice(mut self, zero: bool, nice: bool) -> Self {
        self.zero = Some(zero);
        self.nice = Some(nice);
        self
    }

    /// Appends a literal domain value, turning an unset domain into a literal list.
    ///
    /// Returns `false` (and leaves the domain alone) if the domain is data-driven.
    pub fn push_domain_value(&mut self, value: impl Into<String>) -> bool {
        match self.domain.get_or_insert_with(|| Domain::Values(Vec::new())) {
            Domain::Values(values) => {
                values.push(value.into());
                true
            }
            _ => false,
        }
    }
}
