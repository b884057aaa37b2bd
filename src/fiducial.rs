//! Decimetre tick counting and the diagonal-fiducial fine offset.
//!
//! Both run on profiles sampled along a side wall's fiducial column. Ticks
//! are short bright rods stacked at a fixed pitch below the index rod; the
//! diagonal rod crosses the column between the index rod and the top rod at
//! a height proportional to the sub-decimetre position.
use crate::matcher::match_slopes;
use crate::pattern::{GradientPattern, Transition};
use crate::profile::Profile;
use log::trace;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickParams {
    pub slope_threshold: f64,
    /// Extent of one tick along the profile
    pub width: f64,
    /// Distance from a tick's fall to the next tick's rise
    pub gap: f64,
    pub tolerance: f64,
    /// Upper bound on the count, guards against runaway loops
    pub max_ticks: usize,
}

impl Default for TickParams {
    fn default() -> Self {
        Self {
            slope_threshold: 100.0,
            width: 2.0,
            gap: 3.0,
            tolerance: 2.0,
            max_ticks: 40,
        }
    }
}

impl TickParams {
    /// Pattern for `ticks` consecutive rise/fall pairs.
    pub fn pattern(&self, ticks: usize) -> GradientPattern {
        let t = self.slope_threshold;
        let mut pattern = GradientPattern::starting_with(t);
        for i in 0..ticks {
            if i > 0 {
                pattern = pattern.then(t, self.gap, self.tolerance);
            }
            pattern = pattern.then(-t, self.width, self.tolerance);
        }
        pattern
    }
}

/// Number of complete ticks found before the first failed match.
pub fn count_ticks(profile: &Profile, params: &TickParams) -> usize {
    let slopes = profile.slopes();
    let mut ticks = 0;
    while ticks < params.max_ticks && match_slopes(&slopes, &params.pattern(ticks + 1)).is_some() {
        ticks += 1;
    }
    trace!("counted {ticks} ticks over {} samples", profile.len());
    ticks
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagonalParams {
    /// Slope threshold of the index and top rods
    pub rod_threshold: f64,
    pub rod_width: f64,
    pub rod_width_tolerance: f64,
    pub first_tolerance: f64,
    /// Numerator of the resolution-scaled diagonal threshold
    pub diagonal_gradient: f64,
    pub index_to_diagonal: f64,
    pub index_to_diagonal_tolerance: f64,
    pub diagonal_width_tolerance: f64,
    pub diagonal_to_top: f64,
    pub diagonal_to_top_tolerance: f64,
}

impl Default for DiagonalParams {
    fn default() -> Self {
        Self {
            rod_threshold: 100.0,
            rod_width: 2.0,
            rod_width_tolerance: 3.0,
            first_tolerance: 2.0,
            diagonal_gradient: 100.0,
            index_to_diagonal: 49.0,
            index_to_diagonal_tolerance: 105.0,
            diagonal_width_tolerance: 4.0,
            diagonal_to_top: 99.0,
            diagonal_to_top_tolerance: 105.0,
        }
    }
}

impl DiagonalParams {
    /// Diagonal edges get shallower with thicker slices. The divisor is
    /// `round(depth_resolution^(1/4))`, at least 1, and the quotient is
    /// truncated.
    pub fn diagonal_threshold(&self, depth_resolution: f64) -> f64 {
        let divisor = depth_resolution.sqrt().sqrt().round().max(1.0);
        (self.diagonal_gradient / divisor).trunc()
    }

    /// Expected extent of the diagonal rod along the profile.
    pub fn diagonal_width(&self, depth_resolution: f64) -> f64 {
        1.0 + 0.5 * depth_resolution.sqrt()
    }

    /// Index rod, diagonal rod, top rod.
    pub fn pattern(&self, depth_resolution: f64) -> GradientPattern {
        let rod = self.rod_threshold;
        let diag = self.diagonal_threshold(depth_resolution);
        GradientPattern::new(vec![
            Transition::new(rod, 0.0, self.first_tolerance),
            Transition::new(-rod, self.rod_width, self.rod_width_tolerance),
            Transition::new(diag, self.index_to_diagonal, self.index_to_diagonal_tolerance),
            Transition::new(
                -diag,
                self.diagonal_width(depth_resolution),
                self.diagonal_width_tolerance,
            ),
            Transition::new(rod, self.diagonal_to_top, self.diagonal_to_top_tolerance),
            Transition::new(-rod, self.rod_width, self.rod_width_tolerance),
        ])
    }
}

/// Distance between the index rod centre and the diagonal rod centre.
pub fn diagonal_offset(
    profile: &Profile,
    params: &DiagonalParams,
    depth_resolution: f64,
) -> Option<f64> {
    let m = match_slopes(&profile.slopes(), &params.pattern(depth_resolution))?;
    let index = m.midpoint(0, 1)?;
    let diagonal = m.midpoint(2, 3)?;
    Some((diagonal - index).abs())
}
