#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod image;
pub mod locator;
pub mod types;

// Building blocks, usable on their own for other frames or profiles.
pub mod align;
pub mod fiducial;
pub mod frame;
pub mod matcher;
pub mod pattern;
pub mod profile;

// --- High-level re-exports -------------------------------------------------

pub use crate::diagnostics::{Failure, LocateReport, Stage};
pub use crate::locator::{FrameLocator, LocatorParams};
pub use crate::types::{Axis, CheckStatus, FrameCoordinates};

pub use crate::matcher::{locate_transition, match_pattern, PatternMatch};
pub use crate::pattern::{GradientPattern, Transition};
pub use crate::profile::{Line3, Profile};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```
/// use frame_locator::prelude::*;
///
/// let profile = Profile::from_pairs(
///     &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
///     &[0.0, 0.0, 150.0, 150.0, 0.0, 0.0],
/// );
/// let pattern = GradientPattern::starting_with(100.0).then(-100.0, 2.0, 1.0);
/// assert_eq!(locate_transition(&profile, &pattern, 1), Some(4.0));
/// ```
pub mod prelude {
    pub use crate::image::{ImageGeometry, ProfileSampler, VolumeImage};
    pub use crate::{
        locate_transition, match_pattern, CheckStatus, FrameCoordinates, FrameLocator,
        GradientPattern, LocateReport, LocatorParams, Profile,
    };
}
