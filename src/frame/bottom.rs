use crate::image::ProfileSampler;
use crate::matcher::locate_transition;
use crate::pattern::GradientPattern;
use crate::profile::{sample_count, Line3, Profile};
use crate::types::Axis;
use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Parameters for the vertical datum search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BottomParams {
    /// Outer shell, then inner shell of the frame floor, seen from below
    pub pattern: GradientPattern,
    /// Transition reported as the floor (inner shell, lower face)
    pub target_index: usize,
    /// Profile length in voxels
    pub profile_voxels: f64,
    /// Lateral shift between attempts
    pub retry_offset: f64,
    pub max_attempts: usize,
    /// Datum lies this far past the matched transition, along the profile
    pub datum_correction: f64,
    /// Round the datum to a whole unit, ties to even
    pub round_datum: bool,
}

impl Default for BottomParams {
    fn default() -> Self {
        Self {
            pattern: GradientPattern::starting_with(80.0)
                .then(-80.0, 4.4, 2.0)
                .then(80.0, 12.3, 1.0)
                .then(-80.0, 2.0, 3.0),
            target_index: 2,
            profile_voxels: 200.0,
            retry_offset: 100.0,
            max_attempts: 3,
            datum_correction: 1.0,
            round_datum: true,
        }
    }
}

/// Lateral offset of attempt `n`: centre, then one side, then the other.
fn attempt_offset(n: usize, step: f64) -> f64 {
    let ring = ((n + 1) / 2) as f64;
    if n % 2 == 1 {
        -ring * step
    } else {
        ring * step
    }
}

/// Find the y of the frame bottom in the plane of `point`.
///
/// Profiles run upwards from one voxel inside the lower image edge at the
/// lateral image centre; only the plane (z) of `point` is used. When the
/// centre is obstructed the profile is shifted sideways.
pub fn locate_bottom<S: ProfileSampler + ?Sized>(
    sampler: &S,
    point: &Point3<f64>,
    params: &BottomParams,
) -> Option<f64> {
    let g = sampler.geometry();
    let res = g.resolution(Axis::Y);
    let length = params.profile_voxels * res;
    let start = Point3::new(g.center(Axis::X), g.max_edge(Axis::Y) - res, point.z);
    let nominal = Line3::along(start, Axis::Y, -length);
    let samples = sample_count(length, res);
    let direction = (nominal.end.y - nominal.start.y).signum();

    for attempt in 0..params.max_attempts {
        let dx = attempt_offset(attempt, params.retry_offset);
        let line = nominal.shifted(Axis::X, dx);
        let profile = Profile::sample(sampler, &line, Axis::Y, samples);
        match locate_transition(&profile, &params.pattern, params.target_index) {
            Some(y) => {
                let datum = y + params.datum_correction * direction;
                let datum = if params.round_datum {
                    datum.round_ties_even()
                } else {
                    datum
                };
                debug!(
                    "bottom found at y={datum:.2} (attempt {}, x={:.1})",
                    attempt + 1,
                    line.start.x
                );
                return Some(datum);
            }
            None => debug!(
                "bottom not found on attempt {} at x={:.1}",
                attempt + 1,
                line.start.x
            ),
        }
    }
    None
}
