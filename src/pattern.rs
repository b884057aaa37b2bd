//! Declarative gradient patterns.
//!
//! A pattern is an ordered list of expected intensity transitions. Each one
//! carries a signed slope threshold and the expected distance (with
//! tolerance) from the previously accepted transition. The first transition's
//! distance is unused.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Minimum slope magnitude; the sign selects rising (+) or falling (−).
    pub slope_threshold: f64,
    /// Expected distance from the previous transition
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub tolerance: f64,
}

impl Transition {
    pub fn new(slope_threshold: f64, distance: f64, tolerance: f64) -> Self {
        Self {
            slope_threshold,
            distance,
            tolerance,
        }
    }

    /// True if `slope` is steeper than the threshold and has its sign.
    /// Zero counts as positive.
    #[inline]
    pub fn accepts_slope(&self, slope: f64) -> bool {
        slope.abs() > self.slope_threshold.abs()
            && (slope >= 0.0) == (self.slope_threshold >= 0.0)
    }

    /// Inclusive window of accepted distances.
    #[inline]
    pub fn window(&self) -> (f64, f64) {
        (self.distance - self.tolerance, self.distance + self.tolerance)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradientPattern {
    transitions: Vec<Transition>,
}

impl GradientPattern {
    pub fn new(transitions: Vec<Transition>) -> Self {
        Self { transitions }
    }

    /// Pattern whose first transition has the given threshold.
    pub fn starting_with(slope_threshold: f64) -> Self {
        Self {
            transitions: vec![Transition::new(slope_threshold, 0.0, 0.0)],
        }
    }

    /// Append a transition expected `distance ± tolerance` after the last one.
    pub fn then(mut self, slope_threshold: f64, distance: f64, tolerance: f64) -> Self {
        self.push(Transition::new(slope_threshold, distance, tolerance));
        self
    }

    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Build from three aligned columns. Fails when their lengths differ.
    pub fn from_columns(
        thresholds: &[f64],
        distances: &[f64],
        tolerances: &[f64],
    ) -> Result<Self, String> {
        if thresholds.len() != distances.len() || thresholds.len() != tolerances.len() {
            return Err(format!(
                "Pattern columns differ in length: {} thresholds, {} distances, {} tolerances",
                thresholds.len(),
                distances.len(),
                tolerances.len()
            ));
        }
        let transitions = thresholds
            .iter()
            .zip(distances)
            .zip(tolerances)
            .map(|((&t, &d), &tol)| Transition::new(t, d, tol))
            .collect();
        Ok(Self { transitions })
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn get(&self, index: usize) -> Option<&Transition> {
        self.transitions.get(index)
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_sign_and_magnitude() {
        let rise = Transition::new(100.0, 0.0, 0.0);
        assert!(rise.accepts_slope(150.0));
        assert!(!rise.accepts_slope(100.0));
        assert!(!rise.accepts_slope(-150.0));
        let fall = Transition::new(-100.0, 2.0, 3.0);
        assert!(fall.accepts_slope(-101.0));
        assert!(!fall.accepts_slope(101.0));
        assert_eq!(fall.window(), (-1.0, 5.0));
    }

    #[test]
    fn builder_matches_columns() {
        let built = GradientPattern::starting_with(80.0)
            .then(-80.0, 4.4, 2.0)
            .then(80.0, 12.3, 1.0)
            .then(-80.0, 2.0, 3.0);
        let cols = GradientPattern::from_columns(
            &[80.0, -80.0, 80.0, -80.0],
            &[0.0, 4.4, 12.3, 2.0],
            &[0.0, 2.0, 1.0, 3.0],
        )
        .unwrap();
        assert_eq!(built, cols);
        assert_eq!(built.len(), 4);
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let err = GradientPattern::from_columns(&[1.0, 2.0], &[0.0], &[0.0, 1.0]).unwrap_err();
        assert!(err.contains("differ in length"));
    }

    #[test]
    fn deserializes_from_record_list() {
        let json = r#"[{"slope_threshold": 100}, {"slope_threshold": -100, "distance": 2, "tolerance": 3}]"#;
        let p: GradientPattern = serde_json::from_str(json).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.get(1), Some(&Transition::new(-100.0, 2.0, 3.0)));
    }
}
