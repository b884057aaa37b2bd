//! 1D intensity profiles along straight sampling lines.
//!
//! A profile is a sequence of `(position, value)` pairs where `position` is
//! the coordinate along the axis the line varies in. Slopes are taken between
//! consecutive samples and sit at the midpoint of the two positions.
use crate::image::ProfileSampler;
use crate::types::Axis;
use nalgebra::Point3;

/// Straight sampling line in patient coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line3 {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Line3 {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Line from `start` running `length` along `axis` (negative goes back).
    pub fn along(start: Point3<f64>, axis: Axis, length: f64) -> Self {
        let mut end = start;
        end[axis.index()] += length;
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Both endpoints moved by `delta` along `axis`.
    pub fn shifted(&self, axis: Axis, delta: f64) -> Self {
        let mut line = *self;
        line.start[axis.index()] += delta;
        line.end[axis.index()] += delta;
        line
    }
}

/// Number of samples needed to cover `length` with spacing no larger than
/// `step`, endpoints included.
pub fn sample_count(length: f64, step: f64) -> usize {
    if !(step > 0.0) || !length.is_finite() {
        return 2;
    }
    ((length.abs() / step).ceil() as usize).saturating_add(1).max(2)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfilePoint {
    pub position: f64,
    pub value: f64,
}

/// Intensity change per unit distance between two neighbouring samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slope {
    /// Midpoint of the two sample positions
    pub position: f64,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    points: Vec<ProfilePoint>,
}

impl Profile {
    pub fn new(points: Vec<ProfilePoint>) -> Self {
        Self { points }
    }

    /// Zip positions and values; extra entries of the longer slice are dropped.
    pub fn from_pairs(positions: &[f64], values: &[f64]) -> Self {
        let points = positions
            .iter()
            .zip(values)
            .map(|(&position, &value)| ProfilePoint { position, value })
            .collect();
        Self { points }
    }

    /// Sample `count` points evenly along `line`, reporting positions as the
    /// `axis` coordinate.
    pub fn sample<S: ProfileSampler + ?Sized>(
        sampler: &S,
        line: &Line3,
        axis: Axis,
        count: usize,
    ) -> Self {
        let i = axis.index();
        let points = sampler
            .sample_profile(&line.start, &line.end, count)
            .into_iter()
            .map(|s| ProfilePoint {
                position: s.point[i],
                value: s.value,
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.value)
            .fold(None, |acc, v| match acc {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            })
    }

    /// Slopes between consecutive samples. The sign follows the sampling
    /// direction: a rise in intensity along the line is positive whichever
    /// way the positions run.
    pub fn slopes(&self) -> Vec<Slope> {
        self.points
            .windows(2)
            .map(|w| {
                let dp = (w[1].position - w[0].position).abs();
                let value = if dp > f64::EPSILON {
                    (w[1].value - w[0].value) / dp
                } else {
                    0.0
                };
                Slope {
                    position: 0.5 * (w[0].position + w[1].position),
                    value,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slopes_sit_at_midpoints() {
        let p = Profile::from_pairs(&[0.0, 1.0, 3.0], &[0.0, 10.0, 0.0]);
        let s = p.slopes();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0], Slope { position: 0.5, value: 10.0 });
        assert_eq!(s[1], Slope { position: 2.0, value: -5.0 });
    }

    #[test]
    fn descending_positions_keep_sampling_direction_sign() {
        let p = Profile::from_pairs(&[10.0, 9.0, 8.0], &[0.0, 100.0, 100.0]);
        let s = p.slopes();
        assert_eq!(s[0].position, 9.5);
        assert_eq!(s[0].value, 100.0);
        assert_eq!(s[1].value, 0.0);
    }

    #[test]
    fn degenerate_profiles_have_no_slopes() {
        assert!(Profile::default().slopes().is_empty());
        assert!(Profile::from_pairs(&[1.0], &[5.0]).slopes().is_empty());
    }

    #[test]
    fn sample_count_keeps_nominal_spacing() {
        assert_eq!(sample_count(200.0, 1.0), 201);
        assert_eq!(sample_count(40.0, 0.5), 81);
        assert_eq!(sample_count(0.7, 0.5), 3);
        assert_eq!(sample_count(0.0, 0.5), 2);
        assert_eq!(sample_count(1.0, f64::MIN_POSITIVE), usize::MAX);
    }

    #[test]
    fn line_helpers_move_along_axes() {
        let l = Line3::along(Point3::new(1.0, 2.0, 3.0), Axis::Y, -20.0);
        assert_eq!(l.end, Point3::new(1.0, -18.0, 3.0));
        assert_eq!(l.length(), 20.0);
        let s = l.shifted(Axis::Z, 10.0);
        assert_eq!(s.start.z, 13.0);
        assert_eq!(s.end.z, 13.0);
    }

    #[test]
    fn max_value_of_profile() {
        let p = Profile::from_pairs(&[0.0, 1.0, 2.0], &[-3.0, 7.0, 2.0]);
        assert_eq!(p.max_value(), Some(7.0));
        assert_eq!(Profile::default().max_value(), None);
    }
}
