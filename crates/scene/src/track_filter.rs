//! Crops track features to a time window without touching the store.

use std::borrow::Cow;

use foundation::time::{Time, TimeSpan, parse_timestamp};
use serde_json::Value;

use crate::feature::{Feature, PROP_COURSES, PROP_SPEEDS, PROP_TIMES};

/// Samples of `feature` that fall inside `span`, as a derived feature.
///
/// Non-tracks and tracks without `times` come back borrowed and untouched.
/// A track with no sample in range comes back with all four parallel
/// sequences emptied; a geometry that is not a sample sequence is removed.
/// Entries of `times` that do not parse never match either bound.
pub fn filter_track(feature: &Feature, span: TimeSpan) -> Cow<'_, Feature> {
    if !feature.is_track() {
        return Cow::Borrowed(feature);
    }
    let Some(times) = feature.times() else {
        return Cow::Borrowed(feature);
    };

    let parsed: Vec<Option<Time>> = times
        .iter()
        .map(|v| v.as_str().and_then(parse_timestamp))
        .collect();
    let start_index = parsed
        .iter()
        .position(|t| t.is_some_and(|t| t >= span.start));
    let end_index = parsed
        .iter()
        .rposition(|t| t.is_some_and(|t| t <= span.end));

    let range = match (start_index, end_index) {
        (Some(s), Some(e)) if s <= e => Some((s, e)),
        _ => None,
    };

    let mut out = feature.clone();
    for key in [PROP_TIMES, PROP_SPEEDS, PROP_COURSES] {
        if let Some(Value::Array(values)) = out.properties.get_mut(key) {
            *values = slice(values, range);
        }
    }
    if let Some(samples) = out.geometry.as_mut().and_then(|g| g.samples_mut()) {
        *samples = slice(samples, range);
    } else if range.is_none() {
        // A single-position geometry has nothing to slice; drop it with the samples.
        out.geometry = None;
    }
    Cow::Owned(out)
}

/// Maps [`filter_track`] over `features`, preserving order.
pub fn apply_time_window<'a>(
    features: impl IntoIterator<Item = &'a Feature>,
    span: TimeSpan,
) -> Vec<Cow<'a, Feature>> {
    features
        .into_iter()
        .map(|f| filter_track(f, span))
        .collect()
}

fn slice<T: Clone>(items: &[T], range: Option<(usize, usize)>) -> Vec<T> {
    range
        .and_then(|(s, e)| items.get(s..=e))
        .map(<[T]>::to_vec)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Geometry, PROP_DATA_TYPE};
    use serde_json::json;

    fn at(s: &str) -> Time {
        parse_timestamp(s).expect("timestamp")
    }

    fn track() -> Feature {
        Feature::new()
            .with_id("t1")
            .with_property(PROP_DATA_TYPE, "track")
            .with_property(
                PROP_TIMES,
                json!([
                    "2024-01-01T10:00:00Z",
                    "2024-01-01T11:00:00Z",
                    "2024-01-01T12:00:00Z",
                    "2024-01-01T13:00:00Z",
                    "2024-01-01T14:00:00Z"
                ]),
            )
            .with_property(PROP_SPEEDS, json!([1, 2, 3, 4, 5]))
            .with_property(PROP_COURSES, json!([10, 20, 30, 40, 50]))
            .with_geometry(Geometry::LineString(vec![
                [0.0, 0.0],
                [1.0, 1.0],
                [2.0, 2.0],
                [3.0, 3.0],
                [4.0, 4.0],
            ]))
    }

    #[test]
    fn slices_all_sequences_inclusively() {
        let t = track();
        let span = TimeSpan::new(at("2024-01-01T11:00:00Z"), at("2024-01-01T13:00:00Z"));
        let out = filter_track(&t, span);

        assert_eq!(
            out.properties.get(PROP_TIMES),
            Some(&json!([
                "2024-01-01T11:00:00Z",
                "2024-01-01T12:00:00Z",
                "2024-01-01T13:00:00Z"
            ]))
        );
        assert_eq!(out.properties.get(PROP_SPEEDS), Some(&json!([2, 3, 4])));
        assert_eq!(out.properties.get(PROP_COURSES), Some(&json!([20, 30, 40])));
        assert_eq!(
            out.geometry,
            Some(Geometry::LineString(vec![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]))
        );
        // The input is left alone.
        assert_eq!(t, track());
    }

    #[test]
    fn window_between_samples_empties_the_track() {
        let t = track();
        let span = TimeSpan::new(at("2024-01-01T11:10:00Z"), at("2024-01-01T11:50:00Z"));
        let out = filter_track(&t, span);
        assert_eq!(out.properties.get(PROP_TIMES), Some(&json!([])));
        assert_eq!(out.properties.get(PROP_SPEEDS), Some(&json!([])));
        assert_eq!(out.properties.get(PROP_COURSES), Some(&json!([])));
        assert_eq!(out.geometry, Some(Geometry::LineString(vec![])));
    }

    #[test]
    fn window_outside_data_empties_the_track() {
        let t = track();
        let span = TimeSpan::new(at("2025-01-01T00:00:00Z"), at("2025-01-02T00:00:00Z"));
        let out = filter_track(&t, span);
        assert_eq!(out.properties.get(PROP_TIMES), Some(&json!([])));
    }

    #[test]
    fn unparsable_times_never_match_a_bound() {
        let t = Feature::new()
            .with_property(PROP_DATA_TYPE, "track")
            .with_property(
                PROP_TIMES,
                json!(["bad", "2024-01-01T10:00:00Z", "nope", "2024-01-01T12:00:00Z"]),
            )
            .with_property(PROP_SPEEDS, json!([0, 1, 2, 3]))
            .with_geometry(Geometry::LineString(vec![
                [0.0, 0.0],
                [1.0, 1.0],
                [2.0, 2.0],
                [3.0, 3.0],
            ]));
        let span = TimeSpan::new(at("2024-01-01T09:00:00Z"), at("2024-01-01T12:00:00Z"));
        let out = filter_track(&t, span);

        // The leading entry is outside the slice; the interior one rides along.
        assert_eq!(
            out.properties.get(PROP_TIMES),
            Some(&json!(["2024-01-01T10:00:00Z", "nope", "2024-01-01T12:00:00Z"]))
        );
        assert_eq!(out.properties.get(PROP_SPEEDS), Some(&json!([1, 2, 3])));
        assert_eq!(
            out.geometry,
            Some(Geometry::LineString(vec![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]))
        );

        let all_bad = Feature::new()
            .with_property(PROP_DATA_TYPE, "track")
            .with_property(PROP_TIMES, json!(["bad", "nope"]));
        let out = filter_track(&all_bad, TimeSpan::forever());
        assert_eq!(out.properties.get(PROP_TIMES), Some(&json!([])));
    }

    #[test]
    fn multipoint_samples_are_sliced() {
        let t = track().with_geometry(Geometry::MultiPoint(vec![
            [0.0, 0.0],
            [1.0, 1.0],
            [2.0, 2.0],
            [3.0, 3.0],
            [4.0, 4.0],
        ]));
        let span = TimeSpan::new(at("2024-01-01T12:00:00Z"), at("2024-01-01T14:00:00Z"));
        let out = filter_track(&t, span);
        assert_eq!(
            out.geometry,
            Some(Geometry::MultiPoint(vec![[2.0, 2.0], [3.0, 3.0], [4.0, 4.0]]))
        );
        assert_eq!(out.properties.get(PROP_COURSES), Some(&json!([30, 40, 50])));
    }

    #[test]
    fn empty_crop_drops_point_geometry() {
        let t = Feature::new()
            .with_property(PROP_DATA_TYPE, "track")
            .with_property(PROP_TIMES, json!(["2024-01-01T10:00:00Z"]))
            .with_property(PROP_SPEEDS, json!([7]))
            .with_geometry(Geometry::Point([5.0, 5.0]));

        let miss = TimeSpan::new(at("2024-01-02T00:00:00Z"), at("2024-01-03T00:00:00Z"));
        let out = filter_track(&t, miss);
        assert_eq!(out.properties.get(PROP_TIMES), Some(&json!([])));
        assert_eq!(out.properties.get(PROP_SPEEDS), Some(&json!([])));
        assert_eq!(out.geometry, None);

        let hit = TimeSpan::instant(at("2024-01-01T10:00:00Z"));
        assert_eq!(filter_track(&t, hit).geometry, Some(Geometry::Point([5.0, 5.0])));
    }

    #[test]
    fn non_tracks_pass_through_borrowed() {
        let zone = Feature::new()
            .with_property(PROP_DATA_TYPE, "zone")
            .with_property(PROP_TIMES, json!(["2024-01-01T10:00:00Z"]));
        let out = filter_track(&zone, TimeSpan::instant(Time(0)));
        assert!(matches!(out, Cow::Borrowed(f) if std::ptr::eq(f, &zone)));

        let untimed = Feature::new().with_property(PROP_DATA_TYPE, "track");
        assert!(matches!(
            filter_track(&untimed, TimeSpan::forever()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn window_maps_over_every_feature() {
        let features = vec![track(), Feature::new().with_id("z")];
        let span = TimeSpan::new(at("2024-01-01T14:00:00Z"), at("2024-01-01T15:00:00Z"));
        let out = apply_time_window(&features, span);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].properties.get(PROP_SPEEDS), Some(&json!([5])));
        assert!(matches!(out[1], Cow::Borrowed(_)));
    }
}
