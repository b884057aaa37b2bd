//! Analytic body-frame phantom for end-to-end tests.
//!
//! Geometry (supine, "up" is −y, heights `h = datum − y`):
//!
//! - floor: outer plate at h ∈ (−17.5, −13.5), inner shell at h ∈ (−1.5, 0.5);
//! - sloped part (2 < h < 30): outer wall |x| ∈ (194.5, 196.5), inner wall
//!   |x| ∈ (170.5, 174.5);
//! - vertical part (30 ≤ h < 230): outer wall |x| ∈ (234.5, 236.5), inner wall
//!   |x| ∈ (217.5, 221.5) and the fiducial column |x| ∈ (213.5, 219.5);
//! - fiducials in the column, all 2 units tall: index rod at h ≈ 95.25, top
//!   rod at h ≈ 195.25, one tick per decimetre below the index rod (5 apart)
//!   and the diagonal rod `L mod 100` above the index rod, where
//!   `L = z − frame_start_z`.
//!
//! Sampled at whole units across x/y and half units along the fiducial
//! column, every edge falls midway between samples, so the expected
//! positions are exact.
use frame_locator::image::{ImageGeometry, ProfileSampler};
use nalgebra::Point3;

pub const AIR: f64 = -1000.0;
pub const PLASTIC: f64 = 200.0;
pub const MARKER: f64 = 1500.0;

#[derive(Clone, Debug)]
pub struct FramePhantom {
    pub geometry: ImageGeometry,
    /// y of the frame bottom
    pub datum: f64,
    /// z where the longitudinal scale reads zero
    pub frame_start_z: f64,
    /// Moves the right wall assembly outwards
    pub right_shift: f64,
    /// Floor missing for |x| below this
    pub floor_gap: f64,
    pub sloped_walls: bool,
}

impl Default for FramePhantom {
    fn default() -> Self {
        Self {
            geometry: ImageGeometry::new([-255.5, -255.5, -500.0], [1.0, 1.0, 2.5], [512, 512, 400]),
            datum: 212.0,
            frame_start_z: -400.0,
            right_shift: 0.0,
            floor_gap: 0.0,
            sloped_walls: true,
        }
    }
}

fn inside(v: f64, lo: f64, hi: f64) -> bool {
    v > lo && v < hi
}

impl FramePhantom {
    /// Ticks and diagonal height at depth `z`.
    pub fn scale_at(&self, z: f64) -> (usize, f64) {
        let l = (z - self.frame_start_z).max(0.0);
        let n = (l / 100.0).floor();
        (n as usize, l - 100.0 * n)
    }

    fn column_value(&self, h: f64, z: f64) -> Option<f64> {
        let (ticks, offset) = self.scale_at(z);
        let rod = |center: f64| inside(h, center - 1.0, center + 1.0);
        let tick = (0..ticks).any(|j| rod(86.75 - 5.0 * j as f64));
        (rod(95.25) || rod(195.25) || rod(95.25 + offset) || tick).then_some(MARKER)
    }

    fn wall_value(&self, u: f64, h: f64, z: f64) -> f64 {
        if h > 2.0 && h < 30.0 && self.sloped_walls {
            if inside(u, 194.5, 196.5) || inside(u, 170.5, 174.5) {
                return PLASTIC;
            }
        } else if (30.0..230.0).contains(&h) {
            if inside(u, 213.5, 219.5) {
                if let Some(v) = self.column_value(h, z) {
                    return v;
                }
            }
            if inside(u, 234.5, 236.5) || inside(u, 217.5, 221.5) {
                return PLASTIC;
            }
        }
        AIR
    }
}

impl ProfileSampler for FramePhantom {
    fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    fn value_at(&self, p: &Point3<f64>) -> f64 {
        let h = self.datum - p.y;
        if p.x.abs() >= self.floor_gap
            && p.x.abs() < 240.0
            && (inside(h, -17.5, -13.5) || inside(h, -1.5, 0.5))
        {
            return PLASTIC;
        }
        let u = if p.x < 0.0 {
            -p.x
        } else {
            p.x - self.right_shift
        };
        self.wall_value(u, h, p.z)
    }
}

/// Uniform air, no frame at all.
pub struct EmptyScan {
    pub geometry: ImageGeometry,
}

impl ProfileSampler for EmptyScan {
    fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    fn value_at(&self, _p: &Point3<f64>) -> f64 {
        AIR
    }
}
