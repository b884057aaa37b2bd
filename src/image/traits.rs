use super::ImageGeometry;
use nalgebra::Point3;

/// One sample taken along a sampling line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileSample {
    pub point: Point3<f64>,
    pub value: f64,
}

/// Read access to an image for profile sampling.
///
/// Implementors only need point lookup; `sample_profile` spaces `count`
/// samples evenly from `start` to `end`, both included.
pub trait ProfileSampler {
    fn geometry(&self) -> &ImageGeometry;

    /// Intensity at a patient-space point. Points outside the image return
    /// the implementor's background value.
    fn value_at(&self, point: &Point3<f64>) -> f64;

    fn sample_profile(
        &self,
        start: &Point3<f64>,
        end: &Point3<f64>,
        count: usize,
    ) -> Vec<ProfileSample> {
        if count == 0 {
            return Vec::new();
        }
        if count == 1 {
            return vec![ProfileSample {
                point: *start,
                value: self.value_at(start),
            }];
        }
        let delta = end - start;
        let last = (count - 1) as f64;
        (0..count)
            .map(|i| {
                let point = start + delta * (i as f64 / last);
                ProfileSample {
                    point,
                    value: self.value_at(&point),
                }
            })
            .collect()
    }
}
