//! Per-point frame location pipeline.
//!
//! For each point of interest, in its axial plane:
//!
//! 1. find the frame bottom (vertical datum),
//! 2. confirm it with the wall width just above the datum,
//! 3. find the inner walls at the fiducial band and check their separation,
//! 4. read the longitudinal coordinate from the wall fiducials.
//!
//! Steps 1-3 form the transverse reference; when any of them fails the
//! point gets no coordinates at all. A failed step 4 only drops the
//! longitudinal coordinate.
mod params;

pub use self::params::LocatorParams;

use crate::diagnostics::{Failure, LocateReport, Stage};
use crate::frame::{
    locate_bottom, locate_longitudinal, probe_walls, FrameReference, LateralBounds,
    WallProbeParams,
};
use crate::image::ProfileSampler;
use crate::types::FrameCoordinates;
use log::{debug, warn};
use nalgebra::Point3;
use std::time::Instant;

pub struct FrameLocator<'a, S: ?Sized> {
    sampler: &'a S,
    params: LocatorParams,
}

impl<'a, S: ProfileSampler + ?Sized> FrameLocator<'a, S> {
    pub fn new(sampler: &'a S, params: LocatorParams) -> Self {
        Self { sampler, params }
    }

    pub fn params(&self) -> &LocatorParams {
        &self.params
    }

    /// Bottom, double check and lateral walls in the plane of `point`.
    pub fn transverse_reference(&self, point: &Point3<f64>) -> Result<FrameReference, Failure> {
        let p = &self.params;
        let datum = locate_bottom(self.sampler, point, &p.bottom).ok_or(Failure::NotFound {
            stage: Stage::Bottom,
        })?;
        self.double_check(point, datum)?;
        let bounds = self.checked_width(point, datum, &p.lateral, Stage::LateralWalls)?;
        debug!(
            "transverse reference at z={:.1}: datum={datum:.1}, walls {:.1}/{:.1}",
            point.z, bounds.left, bounds.right
        );
        Ok(FrameReference {
            datum,
            bounds,
            depth: point.z,
        })
    }

    fn checked_width(
        &self,
        point: &Point3<f64>,
        datum: f64,
        probe: &WallProbeParams,
        stage: Stage,
    ) -> Result<LateralBounds, Failure> {
        let bounds = probe_walls(self.sampler, point, datum, probe)
            .bounds()
            .ok_or(Failure::NotFound { stage })?;
        let width = bounds.width();
        if !probe.width.accepts(width) {
            warn!(
                "{stage} width {width:.1} outside {:.1} ± {:.1}",
                probe.width.expected, probe.width.tolerance
            );
            return Err(Failure::GeometryOutOfRange {
                stage,
                measured: width,
                expected: probe.width.expected,
                tolerance: probe.width.tolerance,
            });
        }
        Ok(bounds)
    }

    /// True if the wall width above `datum` confirms it as the frame bottom.
    pub fn confirms_datum(&self, point: &Point3<f64>, datum: f64) -> bool {
        self.double_check(point, datum).is_ok()
    }

    fn double_check(&self, point: &Point3<f64>, datum: f64) -> Result<LateralBounds, Failure> {
        self.checked_width(point, datum, &self.params.double_check, Stage::DoubleCheck)
    }

    /// Locate the frame coordinates of one point.
    pub fn locate(&self, point: &Point3<f64>) -> LocateReport {
        let t0 = Instant::now();
        let mut failures = Vec::new();
        let mut coordinates = FrameCoordinates::not_found();
        let mut longitudinal = None;

        let reference = match self.transverse_reference(point) {
            Ok(reference) => Some(reference),
            Err(failure) => {
                debug!("no transverse reference at {point:?}: {failure}");
                failures.push(failure);
                None
            }
        };

        if let Some(reference) = &reference {
            coordinates.lateral = Some(reference.center() - point.x);
            coordinates.vertical = Some(reference.datum - point.y);
            match locate_longitudinal(
                self.sampler,
                point,
                reference.datum,
                &reference.bounds,
                &self.params.longitudinal,
            ) {
                Ok(estimate) => {
                    coordinates.longitudinal = Some(estimate.value);
                    longitudinal = Some(estimate);
                }
                Err(failure) => {
                    debug!("no longitudinal coordinate at {point:?}: {failure}");
                    failures.push(failure);
                }
            }
        }

        LocateReport {
            point: [point.x, point.y, point.z],
            status: coordinates.status(),
            coordinates,
            reference,
            longitudinal,
            failures,
            elapsed_ms: t0.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

#[cfg(not(feature = "parallel"))]
impl<S: ProfileSampler + ?Sized> FrameLocator<'_, S> {
    /// Locate several points; reports come back in input order.
    pub fn locate_all(&self, points: &[Point3<f64>]) -> Vec<LocateReport> {
        points.iter().map(|p| self.locate(p)).collect()
    }
}

#[cfg(feature = "parallel")]
impl<S: ProfileSampler + Sync + ?Sized> FrameLocator<'_, S> {
    /// Locate several points in parallel; reports come back in input order.
    pub fn locate_all(&self, points: &[Point3<f64>]) -> Vec<LocateReport> {
        use rayon::prelude::*;
        points.par_iter().map(|p| self.locate(p)).collect()
    }
}
