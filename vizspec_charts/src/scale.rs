// Copyright 2025 the VizSpec Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale declarations of the compiled chart kinds.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use vizspec_core::{Domain, Range, Scale, ScaleId, ScaleType, SpecBuilder};
use vizspec_expr::SignalRef;

use crate::names::{
    COLOR_SCALE, TIME_FIELD, TRANSFORMED_DATA, TS_DOMAIN_SIGNAL, X_SCALE, X_SIGNAL_SCALE, Y_SCALE,
};

const CATEGORY_RANGE: &str = "category";

/// Scales later stages of a timeseries build rewrite.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TimeseriesScales {
    pub(crate) y: ScaleId,
    pub(crate) color: ScaleId,
}

/// Time, shadow time, value and color scales.
///
/// The time scale's raw domain follows the combined domain signal, so a domain written by another
/// chart overrides the data extent. The shadow copy has no such binding; observing it instead of
/// the bound scale keeps the domain signals from feeding back into themselves.
///
/// The color domain is left empty for the mark stage to fill.
pub(crate) fn timeseries_scales<'a>(
    builder: &mut SpecBuilder,
    values: impl IntoIterator<Item = &'a str>,
) -> TimeseriesScales {
    let x = Scale::new(X_SCALE, ScaleType::Time)
        .with_domain(Domain::field(TRANSFORMED_DATA, TIME_FIELD))
        .with_range(Range::extent(0.0, SignalRef::named("width")));
    let mut shadow = x.clone();
    shadow.name = String::from(X_SIGNAL_SCALE);
    builder.push_scale(x.with_domain_raw(SignalRef::named(TS_DOMAIN_SIGNAL)));
    builder.push_scale(shadow);

    let mut fields: Vec<String> = Vec::new();
    for value in values {
        if !fields.iter().any(|f| f == value) {
            fields.push(String::from(value));
        }
    }
    let y = builder.push_scale(
        Scale::new(Y_SCALE, ScaleType::Linear)
            .with_domain(Domain::Fields {
                data: String::from(TRANSFORMED_DATA),
                fields,
            })
            .with_range(Range::extent(SignalRef::named("height"), 0.0))
            .with_zero_nice(false, true),
    );
    let color = builder.push_scale(
        Scale::new(COLOR_SCALE, ScaleType::Ordinal)
            .with_range(Range::Named(String::from(CATEGORY_RANGE))),
    );
    TimeseriesScales { y, color }
}

/// Band, value and color scales of a bar chart.
pub(crate) fn bar_scales(
    builder: &mut SpecBuilder,
    label: &str,
    value_fields: Vec<String>,
    color_domain: Domain,
    width: &str,
    height: &str,
) {
    builder.push_scale(
        Scale::new(X_SCALE, ScaleType::Band)
            .with_domain(Domain::sorted_field(TRANSFORMED_DATA, label))
            .with_range(Range::extent(0.0, SignalRef::named(width))),
    );
    builder.push_scale(
        Scale::new(Y_SCALE, ScaleType::Linear)
            .with_domain(Domain::Fields {
                data: String::from(TRANSFORMED_DATA),
                fields: value_fields,
            })
            .with_range(Range::extent(SignalRef::named(height), 0.0))
            .with_zero_nice(true, true),
    );
    builder.push_scale(
        Scale::new(COLOR_SCALE, ScaleType::Ordinal)
            .with_range(Range::Named(String::from(CATEGORY_RANGE)))
            .with_domain(color_domain),
    );
}

#[cfg(test)]
mod tests {
    extern crate std;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn value_fields_are_deduplicated_in_order() {
        let mut b = SpecBuilder::new();
        let scales = timeseries_scales(&mut b, ["latency", "errors", "latency"]);
        assert_eq!(
            serde_json::to_value(b.scale(scales.y)).unwrap(),
            json!({
                "name": "y",
                "type": "linear",
                "domain": {"data": "transformedData", "fields": ["latency", "errors"]},
                "range": [{"signal": "height"}, 0.0],
                "zero": false,
                "nice": true,
            })
        );
        assert_eq!(b.scale(scales.color).domain, None);
    }

    #[test]
    fn only_the_time_scale_binds_the_domain_signal() {
        let mut b = SpecBuilder::new();
        timeseries_scales(&mut b, ["latency"]);
        let spec = b.spec();
        let x = spec.scale(X_SCALE).unwrap();
        let shadow = spec.scale(X_SIGNAL_SCALE).unwrap();
        assert_eq!(x.domain_raw, Some(SignalRef::named(TS_DOMAIN_SIGNAL)));
        assert_eq!(shadow.domain_raw, None);
        assert_eq!(shadow.domain, x.domain);
    }
}
