//! Voxel grid geometry in patient coordinates (mm).
//!
//! `origin` is the centre of the first voxel. Edges are half a voxel outside
//! the first and last voxel centres.
use crate::types::Axis;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Centre of voxel (0, 0, 0)
    pub origin: [f64; 3],
    /// Voxel size along x, y, z (positive)
    pub spacing: [f64; 3],
    /// Number of voxels along x, y, z
    pub size: [usize; 3],
}

impl ImageGeometry {
    pub fn new(origin: [f64; 3], spacing: [f64; 3], size: [usize; 3]) -> Self {
        Self {
            origin,
            spacing,
            size,
        }
    }

    /// Voxel size along `axis`.
    #[inline]
    pub fn resolution(&self, axis: Axis) -> f64 {
        self.spacing[axis.index()]
    }

    /// Outer boundary of the first voxel along `axis`.
    #[inline]
    pub fn min_edge(&self, axis: Axis) -> f64 {
        let i = axis.index();
        self.origin[i] - 0.5 * self.spacing[i]
    }

    /// Outer boundary of the last voxel along `axis`.
    #[inline]
    pub fn max_edge(&self, axis: Axis) -> f64 {
        self.min_edge(axis) + self.extent(axis)
    }

    #[inline]
    pub fn extent(&self, axis: Axis) -> f64 {
        let i = axis.index();
        self.size[i] as f64 * self.spacing[i]
    }

    #[inline]
    pub fn center(&self, axis: Axis) -> f64 {
        self.min_edge(axis) + 0.5 * self.extent(axis)
    }

    pub fn voxel_count(&self) -> usize {
        self.size.iter().product()
    }

    /// Continuous voxel index of a patient-space point.
    pub fn continuous_index(&self, point: &Point3<f64>) -> [f64; 3] {
        [
            (point.x - self.origin[0]) / self.spacing[0],
            (point.y - self.origin[1]) / self.spacing[1],
            (point.z - self.origin[2]) / self.spacing[2],
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.spacing.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(format!("Invalid voxel spacing {:?}", self.spacing));
        }
        if self.size.iter().any(|&n| n == 0) {
            return Err(format!("Empty volume size {:?}", self.size));
        }
        Ok(())
    }
}
