//! Cardinal-spline interpolation through timed keyframes.
//!
//! A trajectory is a list of [`Keyframe`]s sorted by time. The curve between
//! keyframes `k` and `k + 1` is a cubic Hermite segment whose tangents come from
//! the neighbours `k - 1` and `k + 2`, so the first and last keyframes of a
//! [`KeyframeTrack`] only shape the boundary tangents: the usable time window
//! runs from the second keyframe to the second-to-last one.
//!
//! # Example
//!
//! ```
//! use marionette::{Keyframe, KeyframeTrack, Vec3};
//!
//! let track = KeyframeTrack::new(vec![
//!     Keyframe::new(Vec3::new(-1.0, 0.0, 0.0), 0.0),
//!     Keyframe::new(Vec3::new(0.0, 0.0, 0.0), 1.0),
//!     Keyframe::new(Vec3::new(1.0, 1.0, 0.0), 2.0),
//!     Keyframe::new(Vec3::new(2.0, 1.0, 0.0), 3.0),
//! ])
//! .unwrap();
//!
//! assert_eq!(track.time_window(), (1.0, 2.0));
//! let sample = track.sample(1.5, 1.0).unwrap();
//! assert!(sample.position.x > 0.0 && sample.position.x < 1.0);
//! ```

use std::cmp::Ordering;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};

/// Keyframes needed for a track: one tangent anchor, one segment, one tangent anchor.
pub const MIN_TRACK_KEYFRAMES: usize = 4;

/// Tension used by every trajectory in the bundled scene (Catmull-Rom tangents).
pub const DEFAULT_TENSION: f32 = 1.0;

/// A position reached at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Position of the control point.
    pub position: Vec3,
    /// Time at which the curve passes through `position`.
    pub time: f32,
}

impl Keyframe {
    pub fn new(position: Vec3, time: f32) -> Self {
        Self { position, time }
    }
}

/// Position and velocity of a spline at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplineSample {
    /// Time that was sampled.
    pub time: f32,
    /// Index `k` of the segment `[t_k, t_{k+1}]` that was evaluated.
    pub segment: usize,
    /// Position on the curve.
    pub position: Vec3,
    /// Derivative of the position with respect to time.
    pub derivative: Vec3,
}

/// Returns `k` such that `keyframes[k].time <= time <= keyframes[k + 1].time`.
///
/// The scan walks forward while the next keyframe is strictly earlier than
/// `time`, so a query that lands exactly on a keyframe resolves to the segment
/// ending there rather than the one starting there.
///
/// Fails when fewer than two keyframes are given or when `time` is outside
/// `[keyframes[0].time, keyframes[last].time)`.
pub fn find_segment_index(time: f32, keyframes: &[Keyframe]) -> Result<usize> {
    let n = keyframes.len();
    if n < 2 {
        return Err(RigError::TooFewKeyframes {
            count: n,
            required: 2,
        });
    }
    let (min, max) = (keyframes[0].time, keyframes[n - 1].time);
    if !(min..max).contains(&time) {
        return Err(RigError::TimeOutOfRange { time, min, max });
    }

    let mut k = 0;
    while k + 2 < keyframes.len() && keyframes[k + 1].time < time {
        k += 1;
    }
    Ok(k)
}

/// The four control points and times around a segment.
#[derive(Clone, Copy, Debug)]
pub struct SegmentSupport {
    pub times: [f32; 4],
    pub points: [Vec3; 4],
}

impl SegmentSupport {
    /// Support of segment `k`, taken from keyframes `k - 1 ..= k + 2`.
    ///
    /// Returns `None` when the segment lacks a neighbour on either side.
    pub fn around(keyframes: &[Keyframe], k: usize) -> Option<Self> {
        if k == 0 || k + 2 >= keyframes.len() {
            return None;
        }
        let window = &keyframes[k - 1..=k + 2];
        Some(Self {
            times: [window[0].time, window[1].time, window[2].time, window[3].time],
            points: [
                window[0].position,
                window[1].position,
                window[2].position,
                window[3].position,
            ],
        })
    }

    /// Hermite tangents at the segment ends, scaled by `tension`.
    fn tangents(&self, tension: f32) -> (Vec3, Vec3) {
        let [t0, t1, t2, t3] = self.times;
        let [p0, p1, p2, p3] = self.points;
        let d1 = 2.0 * tension / (t2 - t0) * (p2 - p0);
        let d2 = 2.0 * tension / (t3 - t1) * (p3 - p1);
        (d1, d2)
    }

    fn normalized(&self, time: f32) -> f32 {
        let [_, t1, t2, _] = self.times;
        (time - t1) / (t2 - t1)
    }

    /// Position on the segment at `time`.
    pub fn evaluate(&self, time: f32, tension: f32) -> Vec3 {
        let (d1, d2) = self.tangents(tension);
        let [_, p1, p2, _] = self.points;
        let s = self.normalized(time);
        let s2 = s * s;
        let s3 = s2 * s;

        (2.0 * s3 - 3.0 * s2 + 1.0) * p1
            + (s3 - 2.0 * s2 + s) * d1
            + (-2.0 * s3 + 3.0 * s2) * p2
            + (s3 - s2) * d2
    }

    /// Time derivative of [`evaluate`](Self::evaluate).
    pub fn evaluate_derivative(&self, time: f32, tension: f32) -> Vec3 {
        let (d1, d2) = self.tangents(tension);
        let [_, t1, t2, _] = self.times;
        let [_, p1, p2, _] = self.points;
        let s = self.normalized(time);
        let s2 = s * s;

        ((6.0 * s2 - 6.0 * s) * p1
            + (3.0 * s2 - 4.0 * s + 1.0) * d1
            + (-6.0 * s2 + 6.0 * s) * p2
            + (3.0 * s2 - 2.0 * s) * d2)
            / (t2 - t1)
    }
}

/// Cardinal spline position on `(t1, t2)` from four surrounding control points.
#[allow(clippy::too_many_arguments)]
pub fn cardinal_spline(
    time: f32,
    t0: f32,
    t1: f32,
    t2: f32,
    t3: f32,
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    p3: Vec3,
    tension: f32,
) -> Vec3 {
    SegmentSupport {
        times: [t0, t1, t2, t3],
        points: [p0, p1, p2, p3],
    }
    .evaluate(time, tension)
}

/// Time derivative of [`cardinal_spline`].
#[allow(clippy::too_many_arguments)]
pub fn cardinal_spline_derivative(
    time: f32,
    t0: f32,
    t1: f32,
    t2: f32,
    t3: f32,
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    p3: Vec3,
    tension: f32,
) -> Vec3 {
    SegmentSupport {
        times: [t0, t1, t2, t3],
        points: [p0, p1, p2, p3],
    }
    .evaluate_derivative(time, tension)
}

/// A validated keyframe sequence: at least four keyframes, strictly increasing times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self> {
        if keyframes.len() < MIN_TRACK_KEYFRAMES {
            return Err(RigError::TooFewKeyframes {
                count: keyframes.len(),
                required: MIN_TRACK_KEYFRAMES,
            });
        }
        for (index, pair) in keyframes.windows(2).enumerate() {
            // Unordered (NaN) times are rejected along with equal ones.
            if pair[1].time.partial_cmp(&pair[0].time) != Some(Ordering::Greater) {
                return Err(RigError::UnsortedKeyframes {
                    index: index + 1,
                    time: pair[1].time,
                    previous: pair[0].time,
                });
            }
        }
        Ok(Self { keyframes })
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// `(t_min, t_max)`: times of the second and second-to-last keyframes.
    pub fn time_window(&self) -> (f32, f32) {
        let n = self.keyframes.len();
        (self.keyframes[1].time, self.keyframes[n - 2].time)
    }

    /// Moves one control point. Times are never edited, so the ordering holds.
    pub fn set_position(&mut self, index: usize, position: Vec3) -> Result<()> {
        let len = self.keyframes.len();
        let keyframe = self
            .keyframes
            .get_mut(index)
            .ok_or(RigError::KeyframeIndex { index, len })?;
        keyframe.position = position;
        Ok(())
    }

    /// Position and derivative at `time`, which must lie in [`time_window`](Self::time_window).
    pub fn sample(&self, time: f32, tension: f32) -> Result<SplineSample> {
        let (min, max) = self.time_window();
        if !(min..max).contains(&time) {
            return Err(RigError::TimeOutOfRange { time, min, max });
        }

        // At exactly t_min the search picks segment 0, which ends there and
        // has no left neighbour; segment 1 meets it at the same point.
        let segment = find_segment_index(time, &self.keyframes)?.max(1);
        let support = SegmentSupport::around(&self.keyframes, segment).ok_or(
            RigError::TimeOutOfRange { time, min, max },
        )?;

        Ok(SplineSample {
            time,
            segment,
            position: support.evaluate(time, tension),
            derivative: support.evaluate_derivative(time, tension),
        })
    }
}

impl TryFrom<Vec<Keyframe>> for KeyframeTrack {
    type Error = RigError;

    fn try_from(keyframes: Vec<Keyframe>) -> Result<Self> {
        Self::new(keyframes)
    }
}

impl From<KeyframeTrack> for Vec<Keyframe> {
    fn from(track: KeyframeTrack) -> Self {
        track.keyframes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn zigzag() -> Vec<Keyframe> {
        vec![
            Keyframe::new(Vec3::new(-1.0, 1.0, 0.0), 0.0),
            Keyframe::new(Vec3::new(0.0, 1.0, 0.0), 1.0),
            Keyframe::new(Vec3::new(1.0, 1.0, 0.0), 2.0),
            Keyframe::new(Vec3::new(1.0, 2.0, 0.0), 2.5),
            Keyframe::new(Vec3::new(2.0, 2.0, 0.0), 3.0),
            Keyframe::new(Vec3::new(2.0, 2.0, 1.0), 3.5),
            Keyframe::new(Vec3::new(2.0, 0.0, 1.5), 3.75),
            Keyframe::new(Vec3::new(1.5, -1.0, 1.0), 4.5),
        ]
    }

    #[test]
    fn segment_search_finds_enclosing_interval() {
        let keys = zigzag();
        assert_eq!(find_segment_index(0.0, &keys).unwrap(), 0);
        assert_eq!(find_segment_index(0.5, &keys).unwrap(), 0);
        assert_eq!(find_segment_index(2.2, &keys).unwrap(), 2);
        assert_eq!(find_segment_index(4.4, &keys).unwrap(), 6);
    }

    #[test]
    fn segment_search_ties_favor_earlier_segment() {
        let keys = zigzag();
        assert_eq!(find_segment_index(2.0, &keys).unwrap(), 1);
        assert_eq!(find_segment_index(3.5, &keys).unwrap(), 4);
    }

    #[test]
    fn segment_search_rejects_out_of_window_times() {
        let keys = zigzag();
        assert!(matches!(
            find_segment_index(-0.1, &keys),
            Err(RigError::TimeOutOfRange { .. })
        ));
        assert!(matches!(
            find_segment_index(4.5, &keys),
            Err(RigError::TimeOutOfRange { .. })
        ));
        assert!(matches!(
            find_segment_index(f32::NAN, &keys),
            Err(RigError::TimeOutOfRange { .. })
        ));
        assert!(matches!(
            find_segment_index(0.0, &keys[..1]),
            Err(RigError::TooFewKeyframes { .. })
        ));
    }

    #[test]
    fn track_validation() {
        assert!(matches!(
            KeyframeTrack::new(zigzag()[..3].to_vec()),
            Err(RigError::TooFewKeyframes { count: 3, .. })
        ));

        let mut keys = zigzag();
        keys.swap(2, 3);
        assert!(matches!(
            KeyframeTrack::new(keys),
            Err(RigError::UnsortedKeyframes { index: 3, .. })
        ));

        let mut keys = zigzag();
        keys[2].time = keys[1].time;
        assert!(KeyframeTrack::new(keys).is_err());
    }

    #[test]
    fn spline_passes_through_control_points() {
        let track = KeyframeTrack::new(zigzag()).unwrap();
        let keys = track.keyframes();

        for k in 1..keys.len() - 2 {
            let at_knot = track.sample(keys[k].time, DEFAULT_TENSION).unwrap();
            assert!(at_knot.position.abs_diff_eq(keys[k].position, 1e-5));

            // Approaching the knot from the previous segment lands on the same point.
            if k > 1 {
                let support = SegmentSupport::around(keys, k - 1).unwrap();
                let from_left = support.evaluate(keys[k].time, DEFAULT_TENSION);
                assert!(from_left.abs_diff_eq(keys[k].position, 1e-5));
            }
        }
    }

    #[test]
    fn sample_at_window_start_uses_first_usable_segment() {
        let track = KeyframeTrack::new(zigzag()).unwrap();
        let (t_min, _) = track.time_window();
        let sample = track.sample(t_min, DEFAULT_TENSION).unwrap();
        assert_eq!(sample.segment, 1);
        assert!(sample.position.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn sample_rejects_tangent_only_keyframes() {
        let track = KeyframeTrack::new(zigzag()).unwrap();
        assert!(track.sample(0.5, DEFAULT_TENSION).is_err());
        assert!(track.sample(3.75, DEFAULT_TENSION).is_err());
        assert!(track.sample(3.74, DEFAULT_TENSION).is_ok());
    }

    #[test]
    fn free_functions_match_support_evaluation() {
        let keys = zigzag();
        let support = SegmentSupport::around(&keys, 2).unwrap();
        let [t0, t1, t2, t3] = support.times;
        let [p0, p1, p2, p3] = support.points;

        let p = cardinal_spline(2.2, t0, t1, t2, t3, p0, p1, p2, p3, 0.5);
        let d = cardinal_spline_derivative(2.2, t0, t1, t2, t3, p0, p1, p2, p3, 0.5);
        assert_eq!(p, support.evaluate(2.2, 0.5));
        assert_eq!(d, support.evaluate_derivative(2.2, 0.5));
    }

    #[test]
    fn edited_positions_are_used_by_sampling() {
        let mut track = KeyframeTrack::new(zigzag()).unwrap();
        track.set_position(2, Vec3::new(5.0, 5.0, 5.0)).unwrap();
        let sample = track.sample(2.0, DEFAULT_TENSION).unwrap();
        assert!(sample.position.abs_diff_eq(Vec3::splat(5.0), 1e-5));
        assert!(track.set_position(42, Vec3::ZERO).is_err());
    }

    #[test]
    fn nan_times_are_rejected() {
        let mut keys = zigzag();
        keys[3].time = f32::NAN;
        assert!(matches!(
            KeyframeTrack::new(keys),
            Err(RigError::UnsortedKeyframes { index: 3, .. })
        ));

        let track = KeyframeTrack::new(zigzag()).unwrap();
        assert!(matches!(
            track.sample(f32::NAN, DEFAULT_TENSION),
            Err(RigError::TimeOutOfRange { .. })
        ));
    }

    /// Sorted tracks of 4 to 10 keyframes with gaps in `[0.5, 2)`.
    fn random_track() -> impl Strategy<Value = Vec<Keyframe>> {
        prop::collection::vec((0.5f32..2.0, prop::array::uniform3(-2.0f32..2.0)), 4..=10)
            .prop_map(|steps| {
                let mut time = 0.0;
                steps
                    .into_iter()
                    .map(|(gap, [x, y, z])| {
                        time += gap;
                        Keyframe::new(Vec3::new(x, y, z), time)
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn segment_search_is_correct(keys in random_track(), fraction in 0.0f32..1.0) {
            let (first, last) = (keys[0].time, keys[keys.len() - 1].time);
            let t = first + fraction * (last - first);
            prop_assume!(t < last);

            let k = find_segment_index(t, &keys).unwrap();
            prop_assert!(k + 1 < keys.len());
            prop_assert!(keys[k].time <= t);
            prop_assert!(t <= keys[k + 1].time);
            if keys.iter().all(|key| key.time != t) {
                prop_assert!(t < keys[k + 1].time);
            }
        }

        #[test]
        fn segment_search_ties_go_to_the_segment_ending_there(
            keys in random_track(),
            pick in 0usize..8,
        ) {
            let knot = 1 + pick % (keys.len() - 2);
            prop_assert_eq!(find_segment_index(keys[knot].time, &keys).unwrap(), knot - 1);
        }

        #[test]
        fn random_tracks_interpolate_their_keyframes(keys in random_track()) {
            let track = KeyframeTrack::new(keys).unwrap();
            let keys = track.keyframes();

            for k in 1..keys.len() - 2 {
                let at_knot = track.sample(keys[k].time, DEFAULT_TENSION).unwrap();
                prop_assert!(at_knot.position.abs_diff_eq(keys[k].position, 1e-5));

                let right = SegmentSupport::around(keys, k).unwrap();
                prop_assert!(right
                    .evaluate(keys[k].time, DEFAULT_TENSION)
                    .abs_diff_eq(keys[k].position, 1e-5));
                if k > 1 {
                    let left = SegmentSupport::around(keys, k - 1).unwrap();
                    prop_assert!(left
                        .evaluate(keys[k].time, DEFAULT_TENSION)
                        .abs_diff_eq(keys[k].position, 1e-5));
                }
            }
        }

        #[test]
        fn derivative_matches_finite_differences(
            keys in random_track(),
            fraction in 0.0f32..1.0,
        ) {
            let track = KeyframeTrack::new(keys).unwrap();
            let (t_min, t_max) = track.time_window();
            let t = t_min + fraction * (t_max - t_min);
            prop_assume!(t < t_max);
            let h = 1e-2;

            let sample = track.sample(t, DEFAULT_TENSION).unwrap();
            // Differences are taken on the sampled segment's cubic; the
            // five-point centred stencil is exact for cubics.
            let support = SegmentSupport::around(track.keyframes(), sample.segment).unwrap();
            let at = |offset: f32| support.evaluate(t + offset * h, DEFAULT_TENSION);
            let numeric = (at(-2.0) - 8.0 * at(-1.0) + 8.0 * at(1.0) - at(2.0)) / (12.0 * h);

            let tolerance = 1e-3 * (1.0 + sample.derivative.length());
            prop_assert!(
                (numeric - sample.derivative).length() < tolerance,
                "numeric {} analytic {}",
                numeric,
                sample.derivative
            );
        }
    }
}
