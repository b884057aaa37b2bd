//! Structured outcome of one location query.
//!
//! Detection failures are values: each stage that gives up pushes a
//! [`Failure`] onto the report and the affected coordinates stay `None`.
use crate::frame::{FrameReference, LongitudinalEstimate};
use crate::types::{CheckStatus, FrameCoordinates};
use serde::Serialize;
use std::fmt;

/// Pipeline stage that produced a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Bottom,
    DoubleCheck,
    LateralWalls,
    Alignment,
    Longitudinal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Bottom => "bottom",
            Stage::DoubleCheck => "double check",
            Stage::LateralWalls => "lateral walls",
            Stage::Alignment => "fiducial alignment",
            Stage::Longitudinal => "longitudinal",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Failure {
    /// A pattern scan exhausted its profile(s).
    NotFound { stage: Stage },
    /// Left/right or repeated measurements disagree.
    #[serde(rename_all = "camelCase")]
    InconsistentMeasurement { stage: Stage, detail: String },
    /// A measured width lies outside its expected window.
    #[serde(rename_all = "camelCase")]
    GeometryOutOfRange {
        stage: Stage,
        measured: f64,
        expected: f64,
        tolerance: f64,
    },
}

impl Failure {
    pub fn stage(&self) -> Stage {
        match self {
            Failure::NotFound { stage }
            | Failure::InconsistentMeasurement { stage, .. }
            | Failure::GeometryOutOfRange { stage, .. } => *stage,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::NotFound { stage } => write!(f, "{stage}: pattern not found"),
            Failure::InconsistentMeasurement { stage, detail } => {
                write!(f, "{stage}: inconsistent measurement ({detail})")
            }
            Failure::GeometryOutOfRange {
                stage,
                measured,
                expected,
                tolerance,
            } => write!(
                f,
                "{stage}: measured {measured:.1} outside {expected:.1} ± {tolerance:.1}"
            ),
        }
    }
}

/// Everything the locator learned about one point of interest.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateReport {
    pub point: [f64; 3],
    pub coordinates: FrameCoordinates,
    pub status: CheckStatus,
    /// Transverse frame, present once bottom and walls were validated
    pub reference: Option<FrameReference>,
    pub longitudinal: Option<LongitudinalEstimate>,
    pub failures: Vec<Failure>,
    pub elapsed_ms: f64,
}
