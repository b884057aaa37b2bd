//! Frame-specific stages: bottom datum, lateral walls and the longitudinal
//! fiducial readout.
//!
//! All stages assume a supine patient, so "above the datum" is the negative
//! y direction and the lateral walls are found along x.
pub mod bottom;
pub mod lateral;
pub mod longitudinal;

pub use self::bottom::{locate_bottom, BottomParams};
pub use self::lateral::{probe_walls, LateralBounds, WallProbeParams, WallReadings, WidthGate};
pub use self::longitudinal::{
    locate_longitudinal, resolve_longitudinal, LongitudinalEstimate, LongitudinalParams,
    LongitudinalReading, SideReading,
};

use serde::Serialize;

/// Height `h` above `datum` as a y coordinate.
#[inline]
pub(crate) fn above(datum: f64, h: f64) -> f64 {
    datum - h
}

/// Transverse frame reference validated in one plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReference {
    /// y of the frame bottom (vertical zero)
    pub datum: f64,
    pub bounds: LateralBounds,
    /// z of the plane the reference was measured in
    pub depth: f64,
}

impl FrameReference {
    pub fn center(&self) -> f64 {
        self.bounds.center()
    }
}

/// Frame side as seen in the image (smaller x is `Left`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Direction pointing from this side's wall into the frame along x.
    #[inline]
    pub fn inward(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}
