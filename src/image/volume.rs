//! Owned 3D scalar volume with trilinear lookup.
//!
//! Voxels are stored x-fastest, then y, then z. Values are rescaled
//! intensities (HU for CT).
use super::{ImageGeometry, ProfileSampler};
use nalgebra::Point3;

/// Intensity returned for points outside the volume (air in HU).
pub const DEFAULT_BACKGROUND: f64 = -1000.0;

#[derive(Clone, Debug)]
pub struct VolumeImage {
    geometry: ImageGeometry,
    data: Vec<f32>,
    background: f64,
}

impl VolumeImage {
    /// Wrap `data` laid out x-fastest. Fails when the length does not match
    /// the geometry.
    pub fn new(geometry: ImageGeometry, data: Vec<f32>) -> Result<Self, String> {
        geometry.validate()?;
        let expected = geometry.voxel_count();
        if data.len() != expected {
            return Err(format!(
                "Volume data has {} voxels, geometry {:?} needs {expected}",
                data.len(),
                geometry.size
            ));
        }
        Ok(Self {
            geometry,
            data,
            background: DEFAULT_BACKGROUND,
        })
    }

    /// Build a volume by evaluating `f` at every voxel centre.
    pub fn from_fn<F>(geometry: ImageGeometry, mut f: F) -> Result<Self, String>
    where
        F: FnMut(&Point3<f64>) -> f64,
    {
        geometry.validate()?;
        let [nx, ny, nz] = geometry.size;
        let mut data = Vec::with_capacity(geometry.voxel_count());
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let p = Point3::new(
                        geometry.origin[0] + i as f64 * geometry.spacing[0],
                        geometry.origin[1] + j as f64 * geometry.spacing[1],
                        geometry.origin[2] + k as f64 * geometry.spacing[2],
                    );
                    data.push(f(&p) as f32);
                }
            }
        }
        Self::new(geometry, data)
    }

    pub fn with_background(mut self, background: f64) -> Self {
        self.background = background;
        self
    }

    pub fn background(&self) -> f64 {
        self.background
    }

    #[inline]
    fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.geometry.size;
        (k * ny + j) * nx + i
    }

    /// Voxel value at integer index, `None` outside the grid.
    pub fn voxel(&self, i: usize, j: usize, k: usize) -> Option<f32> {
        let [nx, ny, nz] = self.geometry.size;
        if i >= nx || j >= ny || k >= nz {
            return None;
        }
        self.data.get(self.idx(i, j, k)).copied()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Lower neighbour and interpolation weight along one axis.
#[inline]
fn axis_cell(ci: f64, n: usize) -> Option<(usize, usize, f64)> {
    let last = (n - 1) as f64;
    if !(ci >= 0.0 && ci <= last) {
        return None;
    }
    let i0 = ci.floor() as usize;
    let i1 = (i0 + 1).min(n - 1);
    Some((i0, i1, ci - i0 as f64))
}

impl ProfileSampler for VolumeImage {
    fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    fn value_at(&self, point: &Point3<f64>) -> f64 {
        let ci = self.geometry.continuous_index(point);
        let [nx, ny, nz] = self.geometry.size;
        let (Some((x0, x1, fx)), Some((y0, y1, fy)), Some((z0, z1, fz))) = (
            axis_cell(ci[0], nx),
            axis_cell(ci[1], ny),
            axis_cell(ci[2], nz),
        ) else {
            return self.background;
        };
        let v = |i, j, k| self.data[self.idx(i, j, k)] as f64;
        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        let c00 = lerp(v(x0, y0, z0), v(x1, y0, z0), fx);
        let c10 = lerp(v(x0, y1, z0), v(x1, y1, z0), fx);
        let c01 = lerp(v(x0, y0, z1), v(x1, y0, z1), fx);
        let c11 = lerp(v(x0, y1, z1), v(x1, y1, z1), fx);
        lerp(lerp(c00, c10, fy), lerp(c01, c11, fy), fz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> VolumeImage {
        let g = ImageGeometry::new([0.0, 0.0, 0.0], [1.0, 2.0, 1.0], [4, 3, 2]);
        VolumeImage::from_fn(g, |p| p.x + 10.0 * p.y + 100.0 * p.z).unwrap()
    }

    #[test]
    fn interpolates_linear_field_exactly() {
        let vol = ramp();
        let v = vol.value_at(&Point3::new(1.25, 3.0, 0.5));
        assert!((v - (1.25 + 30.0 + 50.0)).abs() < 1e-4, "got {v}");
    }

    #[test]
    fn voxel_centres_return_stored_values() {
        let vol = ramp();
        assert_eq!(vol.voxel(3, 2, 1), Some(3.0 + 40.0 + 100.0));
        assert_eq!(vol.voxel(4, 0, 0), None);
        assert!((vol.value_at(&Point3::new(3.0, 4.0, 1.0)) - 143.0).abs() < 1e-6);
    }

    #[test]
    fn outside_points_return_background() {
        let vol = ramp().with_background(-5.0);
        assert_eq!(vol.value_at(&Point3::new(-0.1, 0.0, 0.0)), -5.0);
        assert_eq!(vol.value_at(&Point3::new(0.0, 4.5, 0.0)), -5.0);
    }

    #[test]
    fn rejects_mismatched_data() {
        let g = ImageGeometry::new([0.0; 3], [1.0; 3], [2, 2, 2]);
        assert!(VolumeImage::new(g, vec![0.0; 7]).is_err());
    }

    #[test]
    fn default_profile_sampling_includes_both_endpoints() {
        let vol = ramp();
        let samples = vol.sample_profile(&Point3::new(0.0, 0.0, 0.0), &Point3::new(3.0, 0.0, 0.0), 7);
        assert_eq!(samples.len(), 7);
        assert_eq!(samples[0].point.x, 0.0);
        assert_eq!(samples[6].point.x, 3.0);
        assert!((samples[3].value - 1.5).abs() < 1e-6);
    }
}
