//! Parameter types configuring the locator stages.
//!
//! Defaults carry the geometry of the body frame the locator was tuned on:
//! distances in millimetres, slope thresholds in HU per millimetre. Override
//! individual stages through the runtime config.
use crate::frame::{BottomParams, LongitudinalParams, WallProbeParams};
use serde::{Deserialize, Serialize};

/// Locator-wide parameters for the per-point pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorParams {
    /// Frame bottom (vertical datum) search.
    pub bottom: BottomParams,
    /// Wall width check just above the datum, validating the bottom.
    pub double_check: WallProbeParams,
    /// Inner walls through the fiducial band, giving the lateral centre.
    pub lateral: WallProbeParams,
    /// Tick counting and diagonal offset.
    pub longitudinal: LongitudinalParams,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            bottom: BottomParams::default(),
            double_check: WallProbeParams::double_check(),
            lateral: WallProbeParams::lateral(),
            longitudinal: LongitudinalParams::default(),
        }
    }
}

/// Upper bound on samples per profile and candidates per alignment search.
const MAX_STEPS: f64 = 1.0e6;

fn check_steps(name: &str, extent: f64, step: f64) -> Result<(), String> {
    if !(step.is_finite() && step > 0.0) {
        return Err(format!("{name} must be a positive finite step, got {step}"));
    }
    if !extent.is_finite() || extent.abs() / step > MAX_STEPS {
        return Err(format!(
            "{name} {step} is too fine for an extent of {extent} (at most {MAX_STEPS} steps)"
        ));
    }
    Ok(())
}

impl LocatorParams {
    /// Reject step sizes that would make sampling or alignment unbounded.
    pub fn validate(&self) -> Result<(), String> {
        for (name, voxels) in [
            ("bottom.profile_voxels", self.bottom.profile_voxels),
            ("double_check.profile_voxels", self.double_check.profile_voxels),
            ("lateral.profile_voxels", self.lateral.profile_voxels),
        ] {
            check_steps(name, voxels, 1.0)?;
        }
        let lng = &self.longitudinal;
        let band = lng.lower_band_length.abs().max(lng.upper_band_length.abs());
        check_steps("longitudinal.sample_step", band, lng.sample_step)?;
        check_steps("longitudinal.align.step", lng.align.range, lng.align.step)
    }
}
