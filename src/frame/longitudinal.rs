//! Longitudinal coordinate from the side-wall fiducials.
//!
//! Each side wall carries a column of fiducials: decimetre ticks below the
//! index rod, the index rod itself, a diagonal rod and a top rod. The tick
//! count gives whole decimetres (one tick per side per 100 units, so the sum
//! of both sides times 50), and the diagonal's distance from the index rod
//! gives the remainder.
//!
//! Close to a decimetre boundary the tick and diagonal readings may disagree
//! or merge. The whole measurement is then repeated 10 units either side
//! along z and the two shifted estimates are averaged when they differ by
//! about the 20 unit shift.
use super::{above, LateralBounds, Side};
use crate::align::{align_to_max_intensity, AlignParams};
use crate::diagnostics::{Failure, Stage};
use crate::fiducial::{count_ticks, diagonal_offset, DiagonalParams, TickParams};
use crate::image::ProfileSampler;
use crate::profile::{sample_count, Line3, Profile};
use crate::types::Axis;
use log::{debug, warn};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongitudinalParams {
    /// Nominal fiducial column, inward from the measured inner wall
    pub wall_inset: f64,
    /// Height above the datum between the ticks and the index rod
    pub band_height: f64,
    /// Profile length downwards covering all ticks
    pub lower_band_length: f64,
    /// Length of the index and top rod alignment profiles
    pub short_band_length: f64,
    /// Profile length upwards from the band to past the top rod
    pub upper_band_length: f64,
    /// Sample spacing along all fiducial profiles
    pub sample_step: f64,
    pub align: AlignParams,
    pub ticks: TickParams,
    pub diagonal: DiagonalParams,
    /// Units per tick, split over both sides
    pub tick_pitch: f64,
    /// Larger diagonal offsets are treated as boundary cases
    pub max_fine_offset: f64,
    /// z shift used to resample boundary cases
    pub depth_shift: f64,
    /// Accepted difference between the two shifted estimates (exclusive)
    pub shift_window: (f64, f64),
    /// Accepted left/right diagonal offset disagreement (exclusive)
    pub side_tolerance: f64,
}

impl Default for LongitudinalParams {
    fn default() -> Self {
        Self {
            wall_inset: 2.0,
            band_height: 91.5,
            lower_band_length: 40.0,
            short_band_length: 20.0,
            upper_band_length: 115.0,
            sample_step: 0.5,
            align: AlignParams::default(),
            ticks: TickParams::default(),
            diagonal: DiagonalParams::default(),
            tick_pitch: 100.0,
            max_fine_offset: 97.0,
            depth_shift: 10.0,
            shift_window: (18.0, 22.0),
            side_tolerance: 2.0,
        }
    }
}

/// Tick count and diagonal offset read on one side wall.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideReading {
    pub ticks: usize,
    pub offset: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongitudinalReading {
    pub left: SideReading,
    pub right: SideReading,
}

impl LongitudinalReading {
    /// `(left + right ticks) * pitch / 2 + mean offset`, if both offsets exist.
    pub fn estimate(&self, tick_pitch: f64) -> Option<f64> {
        let ticks = (self.left.ticks + self.right.ticks) as f64;
        let fine = 0.5 * (self.left.offset? + self.right.offset?);
        Some(ticks * 0.5 * tick_pitch + fine)
    }

    /// Safe to use without resampling: ticks agree and both offsets are
    /// clear of the decimetre boundary.
    pub fn is_unambiguous(&self, params: &LongitudinalParams) -> bool {
        let clear = |o: Option<f64>| o.is_some_and(|o| o > 0.0 && o <= params.max_fine_offset);
        self.left.ticks == self.right.ticks && clear(self.left.offset) && clear(self.right.offset)
    }

    /// Both sides read the same decimetre and nearly the same offset.
    pub fn sides_agree(&self, params: &LongitudinalParams) -> bool {
        match (self.left.offset, self.right.offset) {
            (Some(l), Some(r)) => {
                self.left.ticks == self.right.ticks
                    && l != 0.0
                    && r != 0.0
                    && (l - r).abs() < params.side_tolerance
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongitudinalEstimate {
    pub value: f64,
    /// Reading in the plane of the point of interest
    pub reading: LongitudinalReading,
    /// Readings at `+depth_shift` and `-depth_shift` when resampled
    pub shifted: Option<(LongitudinalReading, LongitudinalReading)>,
}

/// Combine a centre reading with the boundary fallback.
///
/// `resample(dz)` must repeat the measurement with all profiles moved `dz`
/// along z; it is only called when the centre reading is ambiguous.
pub fn resolve_longitudinal<F>(
    center: LongitudinalReading,
    params: &LongitudinalParams,
    mut resample: F,
) -> Result<LongitudinalEstimate, Failure>
where
    F: FnMut(f64) -> LongitudinalReading,
{
    if center.is_unambiguous(params) {
        if let Some(value) = center.estimate(params.tick_pitch) {
            return Ok(LongitudinalEstimate {
                value,
                reading: center,
                shifted: None,
            });
        }
    }
    debug!("ambiguous longitudinal reading {center:?}; resampling at ±{}", params.depth_shift);
    let plus = resample(params.depth_shift);
    let minus = resample(-params.depth_shift);
    let inconsistent = |detail: String| Failure::InconsistentMeasurement {
        stage: Stage::Longitudinal,
        detail,
    };
    if !(plus.sides_agree(params) && minus.sides_agree(params)) {
        warn!("shifted longitudinal readings disagree: {plus:?} / {minus:?}");
        return Err(inconsistent(
            "left and right sides disagree after shifting".to_string(),
        ));
    }
    let (Some(a), Some(b)) = (
        plus.estimate(params.tick_pitch),
        minus.estimate(params.tick_pitch),
    ) else {
        return Err(inconsistent("shifted estimate missing".to_string()));
    };
    let spread = (a - b).abs();
    let (lo, hi) = params.shift_window;
    if spread > lo && spread < hi {
        Ok(LongitudinalEstimate {
            value: 0.5 * (a + b),
            reading: center,
            shifted: Some((plus, minus)),
        })
    } else {
        warn!("shifted longitudinal estimates {a:.1} and {b:.1} are {spread:.1} apart");
        Err(inconsistent(format!(
            "shifted estimates {a:.1} and {b:.1} differ by {spread:.1}"
        )))
    }
}

/// Aligned profiles along one side wall.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SideLines {
    /// Downwards through the ticks
    lower: Line3,
    /// Upwards from the index rod to past the top rod
    upper: Line3,
}

impl SideLines {
    fn shifted(&self, dz: f64) -> Self {
        Self {
            lower: self.lower.shifted(Axis::Z, dz),
            upper: self.upper.shifted(Axis::Z, dz),
        }
    }
}

fn align_side<S: ProfileSampler + ?Sized>(
    sampler: &S,
    point: &Point3<f64>,
    datum: f64,
    wall: f64,
    side: Side,
    params: &LongitudinalParams,
) -> Result<SideLines, Failure> {
    let x0 = wall + side.inward() * params.wall_inset;
    let range = side.inward() * params.align.range;
    let step = params.align.step;
    let band = above(datum, params.band_height);
    let short = params.short_band_length;
    let short_samples = sample_count(short, params.sample_step);

    let align = |line: Line3, samples: usize| {
        align_to_max_intensity(sampler, &line, Axis::X, range, step, samples).ok_or_else(|| {
            debug!("{side:?} fiducial alignment found no signal near x={x0:.1}, y={:.1}", line.start.y);
            Failure::NotFound {
                stage: Stage::Alignment,
            }
        })
    };

    let lower_nominal = Line3::along(
        Point3::new(x0, band, point.z),
        Axis::Y,
        params.lower_band_length,
    );
    let lower_x = align(
        lower_nominal,
        sample_count(params.lower_band_length, params.sample_step),
    )?;

    let index_x = align(
        Line3::along(Point3::new(x0, band, point.z), Axis::Y, -short),
        short_samples,
    )?;
    let top_start = band - params.upper_band_length + short;
    let top_x = align(
        Line3::along(Point3::new(x0, top_start, point.z), Axis::Y, -short),
        short_samples,
    )?;

    let mut lower = lower_nominal;
    lower.start.x = lower_x;
    lower.end.x = lower_x;
    let upper = Line3::new(
        Point3::new(index_x, band, point.z),
        Point3::new(top_x, band - params.upper_band_length, point.z),
    );
    debug!("{side:?} fiducial column: lower x={lower_x:.2}, index x={index_x:.2}, top x={top_x:.2}");
    Ok(SideLines { lower, upper })
}

fn read_side<S: ProfileSampler + ?Sized>(
    sampler: &S,
    lines: &SideLines,
    params: &LongitudinalParams,
    depth_resolution: f64,
) -> SideReading {
    let lower = Profile::sample(
        sampler,
        &lines.lower,
        Axis::Y,
        sample_count(lines.lower.length(), params.sample_step),
    );
    let upper = Profile::sample(
        sampler,
        &lines.upper,
        Axis::Y,
        sample_count(params.upper_band_length, params.sample_step),
    );
    SideReading {
        ticks: count_ticks(&lower, &params.ticks),
        offset: diagonal_offset(&upper, &params.diagonal, depth_resolution),
    }
}

/// Measure the longitudinal coordinate in the plane of `point`, given a
/// validated datum and wall bounds.
pub fn locate_longitudinal<S: ProfileSampler + ?Sized>(
    sampler: &S,
    point: &Point3<f64>,
    datum: f64,
    bounds: &LateralBounds,
    params: &LongitudinalParams,
) -> Result<LongitudinalEstimate, Failure> {
    let left = align_side(sampler, point, datum, bounds.left, Side::Left, params)?;
    let right = align_side(sampler, point, datum, bounds.right, Side::Right, params)?;
    let zres = sampler.geometry().resolution(Axis::Z);
    let read = |dz: f64| LongitudinalReading {
        left: read_side(sampler, &left.shifted(dz), params, zres),
        right: read_side(sampler, &right.shifted(dz), params, zres),
    };
    let center = read(0.0);
    debug!("longitudinal reading at z={:.1}: {center:?}", point.z);
    resolve_longitudinal(center, params, read)
}
