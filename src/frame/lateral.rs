//! Lateral wall probes.
//!
//! The same probe serves two purposes: at the fiducial band it yields the
//! lateral bounds and centre, and 10 units above the datum (where the frame
//! floor slopes) it confirms that the datum really is the frame bottom.
use super::above;
use crate::image::ProfileSampler;
use crate::matcher::locate_transition;
use crate::pattern::GradientPattern;
use crate::profile::{sample_count, Line3, Profile};
use crate::types::Axis;
use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Window on a measured wall separation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WidthGate {
    pub expected: f64,
    pub tolerance: f64,
    /// Accept widths exactly at `expected ± tolerance`
    #[serde(default = "default_inclusive")]
    pub inclusive: bool,
}

fn default_inclusive() -> bool {
    true
}

impl WidthGate {
    pub fn accepts(&self, width: f64) -> bool {
        let lo = self.expected - self.tolerance;
        let hi = self.expected + self.tolerance;
        if self.inclusive {
            width >= lo && width <= hi
        } else {
            width > lo && width < hi
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallProbeParams {
    /// Wall seen from outside in
    pub pattern: GradientPattern,
    /// Transition reported as the wall (inner wall face)
    pub target_index: usize,
    /// Profile length in voxels, from one voxel inside each image edge
    pub profile_voxels: f64,
    /// Probe height above the datum
    pub height: f64,
    pub width: WidthGate,
}

impl WallProbeParams {
    /// Probe through the fiducial band.
    pub fn lateral() -> Self {
        Self {
            pattern: GradientPattern::starting_with(100.0)
                .then(-100.0, 2.0, 2.0)
                .then(100.0, 13.0, 2.0),
            target_index: 2,
            profile_voxels: 100.0,
            height: 91.5,
            width: WidthGate {
                expected: 442.0,
                tolerance: 2.0,
                inclusive: true,
            },
        }
    }

    /// Probe through the sloped floor just above the datum.
    pub fn double_check() -> Self {
        Self {
            pattern: GradientPattern::starting_with(100.0)
                .then(-100.0, 2.0, 3.0)
                .then(100.0, 20.0, 3.0),
            target_index: 2,
            profile_voxels: 200.0,
            height: 10.0,
            width: WidthGate {
                expected: 349.0,
                tolerance: 5.0,
                inclusive: false,
            },
        }
    }
}

/// Inner wall positions along x.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LateralBounds {
    pub left: f64,
    pub right: f64,
}

impl LateralBounds {
    pub fn center(&self) -> f64 {
        0.5 * (self.left + self.right)
    }

    pub fn width(&self) -> f64 {
        (self.right - self.left).abs()
    }
}

/// Wall positions as measured, each side independently.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WallReadings {
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl WallReadings {
    pub fn bounds(&self) -> Option<LateralBounds> {
        Some(LateralBounds {
            left: self.left?,
            right: self.right?,
        })
    }
}

/// Sample both walls `probe.height` above `datum` in the plane of `point`.
pub fn probe_walls<S: ProfileSampler + ?Sized>(
    sampler: &S,
    point: &Point3<f64>,
    datum: f64,
    probe: &WallProbeParams,
) -> WallReadings {
    let g = sampler.geometry();
    let res = g.resolution(Axis::X);
    let length = probe.profile_voxels * res;
    let samples = sample_count(length, res);
    let y = above(datum, probe.height);
    let left_line = Line3::along(
        Point3::new(g.min_edge(Axis::X) + res, y, point.z),
        Axis::X,
        length,
    );
    let right_line = Line3::along(
        Point3::new(g.max_edge(Axis::X) - res, y, point.z),
        Axis::X,
        -length,
    );
    let read = |line: &Line3| {
        let profile = Profile::sample(sampler, line, Axis::X, samples);
        locate_transition(&profile, &probe.pattern, probe.target_index)
    };
    let readings = WallReadings {
        left: read(&left_line),
        right: read(&right_line),
    };
    debug!(
        "walls at y={y:.1}: left={:?} right={:?}",
        readings.left, readings.right
    );
    readings
}
