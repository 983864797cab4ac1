// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Referential integrity of a compiled spec.
//!
//! Every cross-reference is a bare name. This module resolves them all:
//!
//! - data sources read from a source declared before them,
//! - scale domains, mark sources and facets name a visible data source,
//! - encodings, axes and legends name a declared scale,
//! - event selectors name a declared signal, scale or mark,
//! - identifiers inside expressions are declared signals or runtime scopes.
//!
//! Signals, scales and mark names may be referenced before their declaration (the runtime resolves
//! them globally). Data sources and mark-as-data references may not.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashSet;
use vizspec_expr::Expr;
use vizspec_transforms::Transform;

use crate::encode::{Encode, Production, ValueRef};
use crate::guide::Axis;
use crate::mark::{Mark, MarkFrom, TitleText};
use crate::scale::{Range, RangeValue, Scale};
use crate::signal::EventSelector;
use crate::spec::Spec;

/// Names bound by the runtime inside expressions rather than declared as signals.
pub const SCOPE_NAMES: &[&str] = &["datum", "event", "parent", "item", "group"];

/// The kind of entry a name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// A data source (or mark used as a data source).
    Data,
    /// A scale.
    Scale,
    /// A signal.
    Signal,
    /// A mark.
    Mark,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Data => "data source",
            Self::Scale => "scale",
            Self::Signal => "signal",
            Self::Mark => "mark",
        })
    }
}

/// A referential integrity violation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// Two entries of the same kind share a name.
    #[error("duplicate {kind} name `{name}`")]
    Duplicate {
        /// Entry kind.
        kind: EntryKind,
        /// Shared name.
        name: String,
    },
    /// A name that resolves to nothing visible from where it is used.
    #[error("{referrer} refers to unknown {kind} `{name}`")]
    Dangling {
        /// The entry holding the reference.
        referrer: String,
        /// Expected entry kind.
        kind: EntryKind,
        /// Unresolved name.
        name: String,
    },
}

#[derive(Clone, Copy)]
enum Referrer<'a> {
    Data(&'a str),
    Scale(&'a str),
    Signal(&'a str),
    Axis(&'a str),
    Mark(&'a str),
    Legend(&'a str),
    Layout,
}

impl fmt::Display for Referrer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(n) => write!(f, "data source `{n}`"),
            Self::Scale(n) => write!(f, "scale `{n}`"),
            Self::Signal(n) => write!(f, "signal `{n}`"),
            Self::Axis(n) => write!(f, "axis over `{n}`"),
            Self::Mark(n) => write!(f, "mark `{n}`"),
            Self::Legend(n) => write!(f, "legend over `{n}`"),
            Self::Layout => f.write_str("layout"),
        }
    }
}

fn dangling(referrer: Referrer<'_>, kind: EntryKind, name: &str) -> IntegrityError {
    IntegrityError::Dangling {
        referrer: referrer.to_string(),
        kind,
        name: String::from(name),
    }
}

struct Checker<'a> {
    data: HashSet<&'a str>,
    scales: HashSet<&'a str>,
    signals: HashSet<&'a str>,
    marks: HashSet<&'a str>,
    /// Marks already visited in document order; later marks may read them as data.
    declared_marks: HashSet<&'a str>,
}

impl<'a> Checker<'a> {
    fn collect(spec: &'a Spec) -> Result<Self, IntegrityError> {
        let mut checker = Self {
            data: HashSet::new(),
            scales: HashSet::new(),
            signals: HashSet::new(),
            marks: HashSet::new(),
            declared_marks: HashSet::new(),
        };
        for data in &spec.data {
            if let Some(source) = data.source.as_deref() {
                if !checker.data.contains(source) {
                    return Err(dangling(Referrer::Data(&data.name), EntryKind::Data, source));
                }
            }
            insert_unique(&mut checker.data, EntryKind::Data, &data.name)?;
        }
        for scale in &spec.scales {
            insert_unique(&mut checker.scales, EntryKind::Scale, &scale.name)?;
        }
        for signal in &spec.signals {
            insert_unique(&mut checker.signals, EntryKind::Signal, &signal.name)?;
        }
        for mark in spec.walk_marks() {
            insert_unique(&mut checker.marks, EntryKind::Mark, &mark.name)?;
        }
        Ok(checker)
    }

    fn scales(&self, scales: &[Scale]) -> Result<(), IntegrityError> {
        for scale in scales {
            let referrer = Referrer::Scale(&scale.name);
            if let Some(data) = scale.domain.as_ref().and_then(|d| d.data()) {
                if !self.data.contains(data) {
                    return Err(dangling(referrer, EntryKind::Data, data));
                }
            }
            if let Some(raw) = &scale.domain_raw {
                self.expr(referrer, &raw.signal)?;
            }
            if let Some(Range::Extent(ends)) = &scale.range {
                for end in ends {
                    if let RangeValue::Signal(s) = end {
                        self.expr(referrer, &s.signal)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn expr(&self, referrer: Referrer<'_>, expr: &Expr) -> Result<(), IntegrityError> {
        let mut unknown = None;
        expr.for_each_ident(&mut |name| {
            if unknown.is_none() && !SCOPE_NAMES.contains(&name) && !self.signals.contains(name) {
                unknown = Some(String::from(name));
            }
        });
        match unknown {
            Some(name) => Err(dangling(referrer, EntryKind::Signal, &name)),
            None => Ok(()),
        }
    }

    fn scale(&self, referrer: Referrer<'_>, name: &str) -> Result<(), IntegrityError> {
        if self.scales.contains(name) {
            Ok(())
        } else {
            Err(dangling(referrer, EntryKind::Scale, name))
        }
    }

    fn value_ref(&self, referrer: Referrer<'_>, r: &ValueRef) -> Result<(), IntegrityError> {
        if let Some(scale) = r.scale.as_deref() {
            self.scale(referrer, scale)?;
        }
        for e in r.test.iter().chain(r.signal.iter()) {
            self.expr(referrer, e)?;
        }
        Ok(())
    }

    fn encode(&self, referrer: Referrer<'_>, encode: &Encode) -> Result<(), IntegrityError> {
        for (_, production) in encode.productions() {
            match production {
                Production::Ref(r) => self.value_ref(referrer, r)?,
                Production::Rules(rules) => {
                    for r in rules {
                        self.value_ref(referrer, r)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn axis(&self, axis: &Axis) -> Result<(), IntegrityError> {
        let referrer = Referrer::Axis(&axis.scale);
        self.scale(referrer, &axis.scale)?;
        if let Some(grid_scale) = axis.grid_scale.as_deref() {
            self.scale(referrer, grid_scale)?;
        }
        if let Some(tick_count) = &axis.tick_count {
            self.expr(referrer, &tick_count.signal)?;
        }
        if let Some(labels) = axis.encode.as_ref().and_then(|e| e.labels.as_ref()) {
            self.encode(referrer, labels)?;
        }
        Ok(())
    }

    fn marks(&mut self, marks: &'a [Mark], visible: &mut Vec<&'a str>) -> Result<(), IntegrityError> {
        for mark in marks {
            let referrer = Referrer::Mark(&mark.name);
            match &mark.from {
                Some(MarkFrom::Data { data }) => {
                    let found = self.data.contains(data.as_str())
                        || visible.contains(&data.as_str())
                        || self.declared_marks.contains(data.as_str());
                    if !found {
                        return Err(dangling(referrer, EntryKind::Data, data));
                    }
                }
                Some(MarkFrom::Facet { facet }) => {
                    if !self.data.contains(facet.data.as_str())
                        && !visible.contains(&facet.data.as_str())
                    {
                        return Err(dangling(referrer, EntryKind::Data, &facet.data));
                    }
                }
                None => {}
            }
            if let Some(encode) = &mark.encode {
                self.encode(referrer, encode)?;
            }
            if let Some(TitleText::Signal(signal)) = mark.title.as_ref().map(|t| &t.text) {
                self.expr(referrer, &signal.signal)?;
            }
            for transform in mark.transform.transforms() {
                if let Transform::Voronoi { size, .. } = transform {
                    for s in size {
                        self.expr(referrer, &s.signal)?;
                    }
                }
            }
            for axis in &mark.axes {
                self.axis(axis)?;
            }
            self.declared_marks.insert(&mark.name);
            let pushed = match mark.facet_name() {
                Some(name) => {
                    visible.push(name);
                    true
                }
                None => false,
            };
            let nested = self.marks(&mark.marks, visible);
            if pushed {
                visible.pop();
            }
            nested?;
        }
        Ok(())
    }
}

fn insert_unique<'a>(
    set: &mut HashSet<&'a str>,
    kind: EntryKind,
    name: &'a str,
) -> Result<(), IntegrityError> {
    if set.insert(name) {
        Ok(())
    } else {
        Err(IntegrityError::Duplicate {
            kind,
            name: String::from(name),
        })
    }
}

impl Spec {
    /// Checks the data sources and scales of a spec still under construction.
    ///
    /// Signals, axes and marks may still refer forward, so only the source chain, name uniqueness
    /// and the names scales use are resolved.
    pub fn validate_sources(&self) -> Result<(), IntegrityError> {
        Checker::collect(self)?.scales(&self.scales)
    }

    /// Checks that every name used in the spec resolves.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        let mut checker = Checker::collect(self)?;
        checker.scales(&self.scales)?;

        for signal in &self.signals {
            let referrer = Referrer::Signal(&signal.name);
            if let Some(init) = &signal.init {
                checker.expr(referrer, init)?;
            }
            for handler in &signal.on {
                for selector in &handler.events {
                    match selector {
                        EventSelector::Signal { signal } => {
                            if !checker.signals.contains(signal.as_str()) {
                                return Err(dangling(referrer, EntryKind::Signal, signal));
                            }
                        }
                        EventSelector::Scale { scale } => checker.scale(referrer, scale)?,
                        EventSelector::Stream(stream) => {
                            if let Some(mark) = stream.markname.as_deref() {
                                if !checker.marks.contains(mark) {
                                    return Err(dangling(referrer, EntryKind::Mark, mark));
                                }
                            }
                        }
                    }
                }
                checker.expr(referrer, &handler.update)?;
            }
        }

        for axis in &self.axes {
            checker.axis(axis)?;
        }

        checker.marks(&self.marks, &mut Vec::new())?;

        for legend in &self.legends {
            checker.scale(Referrer::Legend(&legend.fill), &legend.fill)?;
        }

        if let Some(layout) = &self.layout {
            checker.expr(Referrer::Layout, &layout.columns.signal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use vizspec_expr::SignalRef;

    use super::*;
    use crate::encode::EncodeEntry;
    use crate::mark::MarkType;
    use crate::scale::{Domain, Scale, ScaleType};
    use crate::signal::{EventSource, EventStream, EventType, OnEvent, Signal};
    use crate::spec::Data;

    fn base() -> Spec {
        let mut spec = Spec::new();
        spec.data.push(Data::named("src"));
        spec.data.push(Data::derived("transformedData", "src"));
        spec.signals.push(Signal::new("width").with_value(200));
        spec.scales
            .push(Scale::new("x", ScaleType::Linear).with_domain(Domain::field("transformedData", "t")));
        spec
    }

    #[test]
    fn well_formed_spec_validates() {
        let mut spec = base();
        spec.marks.push(
            Mark::new("line", MarkType::Line)
                .with_from(MarkFrom::data("transformedData"))
                .with_encode(Encode::update(
                    EncodeEntry::new()
                        .with("x", ValueRef::scaled_field("x", "t"))
                        .with("y", ValueRef::signal(Expr::ident("width") - Expr::number(1.0))),
                )),
        );
        assert_eq!(spec.validate(), Ok(()));
    }

    #[test]
    fn sources_check_ignores_forward_references() {
        let mut spec = base();
        spec.signals.push(Signal::new("hover").with_handler(OnEvent::new(
            [EventStream::new(EventSource::Scope, EventType::MouseOver)
                .on_mark("voronoi")
                .into()],
            Expr::datum(),
        )));
        assert_eq!(spec.validate_sources(), Ok(()));
        assert!(spec.validate().is_err(), "the mark is not declared yet");

        spec.scales.push(
            Scale::new("color", ScaleType::Ordinal)
                .with_domain(Domain::field("column-domain", "service")),
        );
        assert_eq!(
            spec.validate_sources(),
            Err(IntegrityError::Dangling {
                referrer: "scale `color`".into(),
                kind: EntryKind::Data,
                name: "column-domain".into(),
            })
        );
    }

    #[test]
    fn source_must_precede_reader() {
        let mut spec = Spec::new();
        spec.data.push(Data::derived("transformedData", "src"));
        spec.data.push(Data::named("src"));
        assert_eq!(
            spec.validate(),
            Err(IntegrityError::Dangling {
                referrer: "data source `transformedData`".into(),
                kind: EntryKind::Data,
                name: "src".into(),
            })
        );
    }

    #[test]
    fn unknown_scale_in_encoding_is_reported() {
        let mut spec = base();
        spec.marks.push(
            Mark::new("bars", MarkType::Rect).with_encode(Encode::update(
                EncodeEntry::new().with("fill", ValueRef::scaled_value("color", "v")),
            )),
        );
        let err = spec.validate().unwrap_err();
        assert_eq!(err.to_string(), "mark `bars` refers to unknown scale `color`");
    }

    #[test]
    fn expression_identifiers_must_be_signals_or_scopes() {
        let mut spec = base();
        spec.signals.push(Signal::new("h").with_handler(OnEvent::new(
            [EventSelector::signal("width")],
            Expr::datum().prop("x").and(Expr::ident("heigth")),
        )));
        assert!(matches!(
            spec.validate(),
            Err(IntegrityError::Dangling { kind: EntryKind::Signal, ref name, .. }) if name == "heigth"
        ));
    }

    #[test]
    fn marks_may_be_named_before_declaration() {
        let mut spec = base();
        spec.signals.push(Signal::new("hover").with_handler(OnEvent::new(
            [EventStream::new(EventSource::Scope, EventType::MouseOver)
                .on_mark("voronoi")
                .into()],
            Expr::datum(),
        )));
        spec.marks.push(Mark::new("rule", MarkType::Rule).with_from(MarkFrom::data("src")));
        spec.marks.push(Mark::new("voronoi", MarkType::Path).with_from(MarkFrom::data("rule")));
        assert_eq!(spec.validate(), Ok(()));

        // Reading a mark as data requires it to be declared first.
        spec.marks.swap(0, 1);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn facet_names_are_scoped_to_their_group() {
        let mut spec = base();
        spec.marks.push(
            Mark::group("g").with_from(MarkFrom::Facet {
                facet: crate::mark::Facet {
                    name: "faceted_data_0".into(),
                    data: "transformedData".into(),
                    groupby: vec!["series".into()],
                },
            }),
        );
        spec.marks[0]
            .marks
            .push(Mark::new("inner", MarkType::Line).with_from(MarkFrom::data("faceted_data_0")));
        assert_eq!(spec.validate(), Ok(()));

        spec.marks
            .push(Mark::new("outer", MarkType::Line).with_from(MarkFrom::data("faceted_data_0")));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn duplicate_names_are_reported() {
        let mut spec = base();
        spec.signals.push(Signal::new("width"));
        assert_eq!(
            spec.validate(),
            Err(IntegrityError::Duplicate {
                kind: EntryKind::Signal,
                name: "width".into(),
            })
        );
        let mut spec = base();
        spec.scales[0].range = Some(crate::scale::Range::extent(SignalRef::named("height"), 0.0));
        assert!(spec.validate().is_err());
    }
}
