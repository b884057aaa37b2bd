//! Sub-pixel alignment of a sampling line to a marker's intensity ridge.
use crate::image::ProfileSampler;
use crate::profile::Line3;
use crate::types::Axis;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignParams {
    /// Search extent; the caller supplies the direction
    pub range: f64,
    /// Perpendicular increment between candidate lines
    pub step: f64,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            range: 8.0,
            step: 0.1,
        }
    }
}

/// Shift `line` along `axis` in `step` increments up to `range` (signed) and
/// return the `axis` coordinate of the start point of the line whose
/// brightest sample is highest.
///
/// The nominal line itself is not a candidate; the first candidate is one
/// step away. Only peaks above zero count, so a search through air or soft
/// tissue returns `None`. Ties keep the earliest candidate.
pub fn align_to_max_intensity<S: ProfileSampler + ?Sized>(
    sampler: &S,
    line: &Line3,
    axis: Axis,
    range: f64,
    step: f64,
    samples: usize,
) -> Option<f64> {
    if !(step > 0.0) || range == 0.0 || samples == 0 {
        return None;
    }
    let direction = range.signum();
    let steps = (range.abs() / step).round() as usize;
    let origin = line.start[axis.index()];
    let mut best_peak = 0.0;
    let mut best = None;
    for k in 0..steps {
        let offset = direction * step * (k + 1) as f64;
        let candidate = line.shifted(axis, offset);
        let peak = sampler
            .sample_profile(&candidate.start, &candidate.end, samples)
            .iter()
            .map(|s| s.value)
            .fold(f64::NEG_INFINITY, f64::max);
        if peak > best_peak {
            best_peak = peak;
            best = Some(origin + offset);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageGeometry;
    use nalgebra::Point3;

    /// Thin bright ridge at x = 3.35 (±0.12) running along y.
    struct Ridge {
        geometry: ImageGeometry,
        peak: f64,
    }

    impl ProfileSampler for Ridge {
        fn geometry(&self) -> &ImageGeometry {
            &self.geometry
        }

        fn value_at(&self, p: &Point3<f64>) -> f64 {
            let d = (p.x - 3.35).abs();
            if d < 0.12 {
                self.peak * (1.0 - d)
            } else {
                -1000.0
            }
        }
    }

    fn ridge(peak: f64) -> Ridge {
        Ridge {
            geometry: ImageGeometry::new([0.0; 3], [1.0; 3], [16, 16, 16]),
            peak,
        }
    }

    fn line_at(x: f64) -> Line3 {
        Line3::new(Point3::new(x, 0.0, 0.0), Point3::new(x, 10.0, 0.0))
    }

    #[test]
    fn finds_ridge_searching_forward() {
        let x = align_to_max_intensity(&ridge(1500.0), &line_at(0.0), Axis::X, 8.0, 0.1, 21);
        let x = x.expect("ridge should be found");
        assert!((x - 3.3).abs() < 1e-9 || (x - 3.4).abs() < 1e-9, "got {x}");
    }

    #[test]
    fn finds_ridge_searching_backward() {
        let x = align_to_max_intensity(&ridge(1500.0), &line_at(8.0), Axis::X, -8.0, 0.1, 21);
        let x = x.expect("ridge should be found");
        assert!((3.2..=3.5).contains(&x), "got {x}");
    }

    #[test]
    fn no_positive_signal_is_not_found() {
        assert_eq!(
            align_to_max_intensity(&ridge(-10.0), &line_at(0.0), Axis::X, 8.0, 0.1, 21),
            None
        );
    }

    #[test]
    fn degenerate_search_is_not_found() {
        let r = ridge(1500.0);
        assert_eq!(align_to_max_intensity(&r, &line_at(0.0), Axis::X, 0.0, 0.1, 21), None);
        assert_eq!(align_to_max_intensity(&r, &line_at(0.0), Axis::X, 8.0, 0.0, 21), None);
    }
}
