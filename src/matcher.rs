//! Gradient-pattern matching over a profile's slope sequence.
//!
//! The scan walks the slopes left to right looking for runs that satisfy the
//! next expected transition:
//!
//! - A run starts at the first slope steeper than the transition's threshold
//!   (with its sign) and extends while that holds. Its position is halfway
//!   between the first slope of the run and the first slope after it (the
//!   last slope when the run reaches the end).
//! - The first transition is accepted unconditionally.
//! - A later run closer to the previous transition than its window is noise
//!   and is skipped.
//! - A run farther away rejects the partial match. The scan restarts just
//!   after the first accepted run, so a true first transition hiding behind
//!   a spurious one is not lost.
//! - Distances on the window boundary are accepted.
//!
//! Every reject moves the restart point strictly forward, so the scan always
//! terminates.
use crate::pattern::{GradientPattern, Transition};
use crate::profile::{Profile, Slope};
use log::trace;

/// Accepted transition positions, one per pattern entry, in pattern order.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatch {
    positions: Vec<f64>,
}

impl PatternMatch {
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Option<f64> {
        self.positions.get(index).copied()
    }

    /// Midpoint between two accepted transitions.
    pub fn midpoint(&self, a: usize, b: usize) -> Option<f64> {
        Some(0.5 * (self.position(a)? + self.position(b)?))
    }
}

/// Contiguous run of slopes satisfying one transition.
#[derive(Clone, Copy, Debug)]
struct Run {
    position: f64,
    /// Index of the first slope after the run
    next: usize,
}

#[derive(Debug)]
enum State {
    /// Looking for the first transition.
    Scanning,
    /// `accepted.len()` transitions matched. `resume` is where scanning
    /// restarts if the partial match is rejected.
    Accumulating { accepted: Vec<f64>, resume: usize },
}

#[derive(Debug)]
enum Step {
    Continue(State),
    /// Partial match discarded; restart scanning at `resume`.
    Rejected { resume: usize },
    Complete(Vec<f64>),
}

enum Verdict {
    Noise,
    Accept,
    Reject,
}

fn classify(distance: f64, transition: &Transition) -> Verdict {
    let (lo, hi) = transition.window();
    if distance < lo {
        Verdict::Noise
    } else if distance > hi {
        Verdict::Reject
    } else {
        Verdict::Accept
    }
}

fn next_run(slopes: &[Slope], from: usize, transition: &Transition) -> Option<Run> {
    let start = from
        + slopes
            .get(from..)?
            .iter()
            .position(|s| transition.accepts_slope(s.value))?;
    let next = start
        + slopes[start..]
            .iter()
            .take_while(|s| transition.accepts_slope(s.value))
            .count();
    let end = slopes.get(next).unwrap_or(&slopes[slopes.len() - 1]);
    Some(Run {
        position: 0.5 * (slopes[start].position + end.position),
        next,
    })
}

impl State {
    fn expected(&self) -> usize {
        match self {
            State::Scanning => 0,
            State::Accumulating { accepted, .. } => accepted.len(),
        }
    }

    fn advance(self, run: Run, transitions: &[Transition]) -> Step {
        match self {
            State::Scanning => {
                if transitions.len() == 1 {
                    return Step::Complete(vec![run.position]);
                }
                Step::Continue(State::Accumulating {
                    accepted: vec![run.position],
                    resume: run.next,
                })
            }
            State::Accumulating {
                mut accepted,
                resume,
            } => {
                let k = accepted.len();
                let previous = accepted[k - 1];
                let distance = (run.position - previous).abs();
                match classify(distance, &transitions[k]) {
                    Verdict::Noise => Step::Continue(State::Accumulating { accepted, resume }),
                    Verdict::Reject => {
                        trace!(
                            "transition {k} at {:.2} is {distance:.2} from {previous:.2}; restarting at slope {resume}",
                            run.position
                        );
                        Step::Rejected { resume }
                    }
                    Verdict::Accept => {
                        accepted.push(run.position);
                        if accepted.len() == transitions.len() {
                            Step::Complete(accepted)
                        } else {
                            Step::Continue(State::Accumulating { accepted, resume })
                        }
                    }
                }
            }
        }
    }
}

/// Match `pattern` against precomputed slopes.
pub fn match_slopes(slopes: &[Slope], pattern: &GradientPattern) -> Option<PatternMatch> {
    let transitions = pattern.transitions();
    if transitions.is_empty() {
        return None;
    }
    let mut state = State::Scanning;
    let mut cursor = 0usize;
    loop {
        let run = next_run(slopes, cursor, &transitions[state.expected()])?;
        cursor = run.next;
        state = match state.advance(run, transitions) {
            Step::Continue(next) => next,
            Step::Rejected { resume } => {
                cursor = resume;
                State::Scanning
            }
            Step::Complete(positions) => return Some(PatternMatch { positions }),
        };
    }
}

/// Match `pattern` against the slopes of `profile`.
pub fn match_pattern(profile: &Profile, pattern: &GradientPattern) -> Option<PatternMatch> {
    match_slopes(&profile.slopes(), pattern)
}

/// Position of transition `target` in the first complete match.
pub fn locate_transition(profile: &Profile, pattern: &GradientPattern, target: usize) -> Option<f64> {
    match_pattern(profile, pattern)?.position(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rise_fall(distance: f64, tolerance: f64) -> GradientPattern {
        GradientPattern::starting_with(100.0).then(-100.0, distance, tolerance)
    }

    /// Unit-spaced profile from `values`, positions starting at `first`.
    fn profile(first: f64, values: &[f64]) -> Profile {
        let positions: Vec<f64> = (0..values.len()).map(|i| first + i as f64).collect();
        Profile::from_pairs(&positions, values)
    }

    /// 150-high plateau over samples `[from, from + width)`.
    fn plateau(len: usize, from: usize, width: usize) -> Vec<f64> {
        (0..len)
            .map(|i| if i >= from && i < from + width { 150.0 } else { 0.0 })
            .collect()
    }

    #[test]
    fn reports_falling_edge_of_bump() {
        let p = profile(0.0, &plateau(40, 11, 2));
        assert_eq!(locate_transition(&p, &rise_fall(2.0, 3.0), 1), Some(13.0));
        assert_eq!(locate_transition(&p, &rise_fall(2.0, 3.0), 0), Some(11.0));
    }

    #[test]
    fn sub_threshold_spikes_do_not_change_result() {
        let mut values = plateau(40, 11, 2);
        let clean = locate_transition(&profile(0.0, &values), &rise_fall(2.0, 3.0), 1);
        values[5] = 50.0;
        values[20] = -50.0;
        values[30] = 99.0;
        let noisy = locate_transition(&profile(0.0, &values), &rise_fall(2.0, 3.0), 1);
        assert_eq!(clean, noisy);
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let upper = profile(0.0, &plateau(40, 10, 5));
        assert_eq!(locate_transition(&upper, &rise_fall(2.0, 3.0), 1), Some(15.0));
        let beyond = profile(0.0, &plateau(40, 10, 6));
        assert_eq!(locate_transition(&beyond, &rise_fall(2.0, 3.0), 1), None);
        let lower = profile(0.0, &plateau(40, 10, 1));
        assert_eq!(locate_transition(&lower, &rise_fall(2.0, 1.0), 1), Some(11.0));
    }

    #[test]
    fn zero_is_a_legitimate_position() {
        let p = profile(-20.0, &plateau(40, 18, 2));
        assert_eq!(locate_transition(&p, &rise_fall(2.0, 3.0), 1), Some(0.0));
        assert_eq!(locate_transition(&p, &rise_fall(2.0, 3.0), 0), Some(-2.0));
    }

    #[test]
    fn rejection_restarts_after_first_transition() {
        // Rise at 5, second rise at 20, fall at 22. The first rise is too far
        // from the fall; the second one pairs with it.
        let values: Vec<f64> = (0..40)
            .map(|i| match i {
                0..=4 => 0.0,
                5..=19 => 150.0,
                20..=21 => 300.0,
                _ => 0.0,
            })
            .collect();
        let p = profile(0.0, &values);
        let m = match_pattern(&p, &rise_fall(2.0, 1.0)).expect("pattern should match after restart");
        assert_eq!(m.positions(), &[20.0, 22.0]);
        assert_eq!(m.midpoint(0, 1), Some(21.0));
    }

    #[test]
    fn close_transitions_are_skipped_as_noise() {
        let values: Vec<f64> = (0..30)
            .map(|i| match i {
                5..=6 => 300.0,
                7..=14 => 150.0,
                _ => 0.0,
            })
            .collect();
        let p = profile(0.0, &values);
        assert_eq!(locate_transition(&p, &rise_fall(10.0, 1.0), 1), Some(15.0));
    }

    #[test]
    fn run_reaching_the_end_uses_last_slope() {
        let p = profile(0.0, &[0.0, 0.0, 0.0, 0.0, 0.0, 150.0]);
        let single = GradientPattern::starting_with(100.0);
        assert_eq!(locate_transition(&p, &single, 0), Some(4.5));
    }

    #[test]
    fn incomplete_pattern_is_not_found() {
        let p = profile(0.0, &plateau(40, 11, 2));
        let three = rise_fall(2.0, 3.0).then(100.0, 5.0, 1.0);
        assert_eq!(match_pattern(&p, &three), None);
        assert_eq!(match_pattern(&p, &GradientPattern::default()), None);
        assert_eq!(match_pattern(&Profile::default(), &rise_fall(2.0, 3.0)), None);
    }

    #[test]
    fn matching_is_deterministic() {
        let mut values = plateau(60, 11, 2);
        values[30] = 150.0;
        values[31] = 150.0;
        let p = profile(0.0, &values);
        let pattern = rise_fall(2.0, 0.5).then(100.0, 17.0, 1.0).then(-100.0, 2.0, 0.5);
        let first = match_pattern(&p, &pattern);
        assert_eq!(first.as_ref().map(|m| m.positions().to_vec()), Some(vec![11.0, 13.0, 30.0, 32.0]));
        assert_eq!(first, match_pattern(&p, &pattern));
    }

    #[test]
    fn out_of_range_target_is_not_found() {
        let p = profile(0.0, &plateau(40, 11, 2));
        assert_eq!(locate_transition(&p, &rise_fall(2.0, 3.0), 2), None);
    }
}
