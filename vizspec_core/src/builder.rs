// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Append-only construction of a [`Spec`].
//!
//! Entries are pushed once and never removed. Each push returns a typed handle that stays valid
//! for the lifetime of the builder, so later stages can extend an entry (add transforms to a data
//! source, handlers to a signal, encodings to a mark) without looking it up by name again.

extern crate alloc;

use alloc::string::String;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::guide::{Axis, Legend};
use crate::mark::Mark;
use crate::scale::Scale;
use crate::signal::Signal;
use crate::spec::{Autosize, Data, GridLayout, Spec, Title};

/// Handle to a data source pushed into a [`SpecBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataId(usize);

/// Handle to a scale pushed into a [`SpecBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleId(usize);

/// Handle to a signal pushed into a [`SpecBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalId(usize);

/// Handle to a mark at any depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkRef {
    parents: SmallVec<[usize; 1]>,
    index: usize,
}

impl MarkRef {
    /// Nesting depth; top-level marks are at depth 0.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }
}

/// Builds a [`Spec`] by appending entries.
///
/// Names are indexed as they are pushed. Pushing a second entry with a taken name is a logic
/// error: it is logged, and [`SpecBuilder::finish`] reports it through [`Spec::validate`].
#[derive(Debug, Default)]
pub struct SpecBuilder {
    spec: Spec,
    data: HashMap<String, usize>,
    scales: HashMap<String, usize>,
    signals: HashMap<String, usize>,
    marks: HashMap<String, MarkRef>,
}

impl SpecBuilder {
    /// Starts from an empty v5 spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the spec built so far.
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Sets the autosize block.
    pub fn set_autosize(&mut self, autosize: Autosize) {
        self.spec.autosize = Some(autosize);
    }

    /// Sets the style of the top-level group.
    pub fn set_style(&mut self, style: &str) {
        self.spec.style = Some(style.into());
    }

    /// Sets the chart title.
    pub fn set_title(&mut self, text: impl Into<String>) {
        self.spec.title = Some(Title { text: text.into() });
    }

    /// Sets the grid layout.
    pub fn set_layout(&mut self, layout: GridLayout) {
        self.spec.layout = Some(layout);
    }

    /// Appends a data source.
    pub fn push_data(&mut self, data: Data) -> DataId {
        let index = self.spec.data.len();
        index_name(&mut self.data, "data", &data.name, index);
        self.spec.data.push(data);
        DataId(index)
    }

    /// Returns a data source for extension.
    pub fn data_mut(&mut self, id: DataId) -> &mut Data {
        &mut self.spec.data[id.0]
    }

    /// Returns a data source.
    pub fn data(&self, id: DataId) -> &Data {
        &self.spec.data[id.0]
    }

    /// Appends a scale.
    pub fn push_scale(&mut self, scale: Scale) -> ScaleId {
        let index = self.spec.scales.len();
        index_name(&mut self.scales, "scale", &scale.name, index);
        self.spec.scales.push(scale);
        ScaleId(index)
    }

    /// Returns a scale for extension.
    pub fn scale_mut(&mut self, id: ScaleId) -> &mut Scale {
        &mut self.spec.scales[id.0]
    }

    /// Returns a scale.
    pub fn scale(&self, id: ScaleId) -> &Scale {
        &self.spec.scales[id.0]
    }

    /// Appends a signal.
    pub fn push_signal(&mut self, signal: Signal) -> SignalId {
        let index = self.spec.signals.len();
        index_name(&mut self.signals, "signal", &signal.name, index);
        self.spec.signals.push(signal);
        SignalId(index)
    }

    /// Returns a signal for extension.
    pub fn signal_mut(&mut self, id: SignalId) -> &mut Signal {
        &mut self.spec.signals[id.0]
    }

    /// Returns a signal.
    pub fn signal(&self, id: SignalId) -> &Signal {
        &self.spec.signals[id.0]
    }

    /// Appends a top-level axis.
    pub fn push_axis(&mut self, axis: Axis) {
        self.spec.axes.push(axis);
    }

    /// Appends an axis owned by a group mark.
    pub fn push_child_axis(&mut self, parent: &MarkRef, axis: Axis) {
        self.mark_mut(parent).axes.push(axis);
    }

    /// Appends a top-level mark.
    pub fn push_mark(&mut self, mark: Mark) -> MarkRef {
        let r = MarkRef {
            parents: SmallVec::new(),
            index: self.spec.marks.len(),
        };
        self.index_mark(&mark.name, &r);
        self.spec.marks.push(mark);
        r
    }

    /// Appends a mark inside a group mark.
    pub fn push_child_mark(&mut self, parent: &MarkRef, mark: Mark) -> MarkRef {
        let name = mark.name.clone();
        let mut parents = parent.parents.clone();
        parents.push(parent.index);
        let siblings = &mut self.mark_mut(parent).marks;
        let r = MarkRef {
            parents,
            index: siblings.len(),
        };
        siblings.push(mark);
        self.index_mark(&name, &r);
        r
    }

    /// Returns a mark.
    pub fn mark(&self, mark: &MarkRef) -> &Mark {
        let mut marks = &self.spec.marks;
        for &p in &mark.parents {
            marks = &marks[p].marks;
        }
        &marks[mark.index]
    }

    /// Returns a mark for extension.
    pub fn mark_mut(&mut self, mark: &MarkRef) -> &mut Mark {
        let mut marks = &mut self.spec.marks;
        for &p in &mark.parents {
            marks = &mut marks[p].marks;
        }
        &mut marks[mark.index]
    }

    /// Looks up a mark by name.
    pub fn find_mark(&self, name: &str) -> Option<&MarkRef> {
        self.marks.get(name)
    }

    /// Looks up a data source by name.
    pub fn find_data(&self, name: &str) -> Option<DataId> {
        self.data.get(name).copied().map(DataId)
    }

    /// Looks up a scale by name.
    pub fn find_scale(&self, name: &str) -> Option<ScaleId> {
        self.scales.get(name).copied().map(ScaleId)
    }

    /// Looks up a signal by name.
    pub fn find_signal(&self, name: &str) -> Option<SignalId> {
        self.signals.get(name).copied().map(SignalId)
    }

    /// Appends a legend.
    pub fn push_legend(&mut self, legend: Legend) {
        self.spec.legends.push(legend);
    }

    /// Checks the data sources and scales pushed so far, at the end of a build stage.
    ///
    /// Failures are logged and trip a debug assertion, like those of [`finish`](Self::finish).
    pub fn check_stage(&self, stage: &'static str) {
        let checked = self.spec.validate_sources();
        if let Err(err) = &checked {
            tracing::error!(stage, %err, "build stage failed integrity check");
        }
        debug_assert!(checked.is_ok(), "{stage} stage failed integrity check: {checked:?}");
        tracing::trace!(stage, "build stage checked");
    }

    /// Finishes the build.
    ///
    /// Dangling references are compiler bugs rather than input errors: they are logged and trip a
    /// debug assertion, and the spec is returned as built.
    pub fn finish(self) -> Spec {
        let checked = self.spec.validate();
        if let Err(err) = &checked {
            tracing::error!(%err, "compiled spec failed integrity check");
        }
        debug_assert!(checked.is_ok(), "compiled spec failed integrity check: {checked:?}");
        tracing::debug!(
            data = self.spec.data.len(),
            signals = self.spec.signals.len(),
            scales = self.spec.scales.len(),
            marks = self.marks.len(),
            "spec finished"
        );
        self.spec
    }

    fn index_mark(&mut self, name: &str, r: &MarkRef) {
        if self.marks.contains_key(name) {
            tracing::error!(kind = "mark", name, "duplicate name");
        } else {
            self.marks.insert(String::from(name), r.clone());
        }
    }
}

fn index_name(index: &mut HashMap<String, usize>, kind: &'static str, name: &str, at: usize) {
    if index.contains_key(name) {
        tracing::error!(kind, name, "duplicate name");
    } else {
        index.insert(String::from(name), at);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use vizspec_expr::SignalRef;

    use super::*;
    use crate::mark::{Facet, MarkFrom, MarkType};
    use crate::scale::{Domain, Range, ScaleType};

    #[test]
    fn handles_reach_nested_marks() {
        let mut b = SpecBuilder::new();
        b.push_data(Data::named("src"));
        let group = b.push_mark(Mark::group("g").with_from(MarkFrom::Facet {
            facet: Facet {
                name: "faceted".into(),
                data: "src".into(),
                groupby: alloc::vec!["series".into()],
            },
        }));
        let line = b.push_child_mark(
            &group,
            Mark::new("line", MarkType::Line).with_from(MarkFrom::data("faceted")),
        );
        assert_eq!(line.depth(), 1);
        b.mark_mut(&line).zindex = Some(100);
        assert_eq!(b.find_mark("line"), Some(&line));
        let spec = b.finish();
        assert_eq!(spec.marks[0].marks[0].zindex, Some(100));
    }

    #[test]
    fn stage_checks_pass_before_marks_exist() {
        let mut b = SpecBuilder::new();
        b.push_data(Data::named("src"));
        b.push_data(Data::derived("transformedData", "src"));
        b.check_stage("data");
        b.push_scale(
            Scale::new("x", ScaleType::Time).with_domain(Domain::field("transformedData", "time_")),
        );
        b.check_stage("scales");
        assert_eq!(b.spec().validate_sources(), Ok(()));
    }

    #[test]
    #[should_panic(expected = "scales stage failed integrity check")]
    #[cfg(debug_assertions)]
    fn stage_checks_catch_dangling_domains() {
        let mut b = SpecBuilder::new();
        b.push_scale(Scale::new("x", ScaleType::Time).with_domain(Domain::field("missing", "t")));
        b.check_stage("scales");
    }

    #[test]
    fn later_stages_extend_earlier_entries() {
        let mut b = SpecBuilder::new();
        b.push_data(Data::named("src"));
        b.push_signal(Signal::new("width").with_value(200));
        let y = b.push_scale(Scale::new("y", ScaleType::Linear));
        assert_eq!(b.find_scale("y"), Some(y));
        assert!(b.find_signal("width").is_some());
        assert!(b.find_data("missing").is_none());
        b.scale_mut(y).domain = Some(Domain::field("src", "v"));
        b.scale_mut(y).range = Some(Range::extent(SignalRef::named("width"), 0.0));
        let spec = b.finish();
        assert_eq!(spec.scales[0].domain, Some(Domain::field("src", "v")));
        assert!(spec.validate().is_ok());
    }
}
