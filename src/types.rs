use serde::{Deserialize, Serialize};

/// Patient coordinate axis. For a supine patient `Y` points posterior, so
/// "up" inside the frame is the negative `Y` direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Frame coordinates of one point. Each component is `None` when the stage
/// that produces it could not be measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameCoordinates {
    /// Frame centre minus the point's x.
    pub lateral: Option<f64>,
    /// Frame bottom minus the point's y.
    pub vertical: Option<f64>,
    pub longitudinal: Option<f64>,
}

impl FrameCoordinates {
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn status(&self) -> CheckStatus {
        match (self.lateral, self.vertical, self.longitudinal) {
            (Some(_), Some(_), Some(_)) => CheckStatus::Found,
            (Some(_), Some(_), None) => CheckStatus::NoLongitudinal,
            _ => CheckStatus::NotFound,
        }
    }
}

/// Overall outcome of a location attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckStatus {
    /// All three coordinates were measured.
    Found,
    /// Transverse reference found, longitudinal coordinate missing.
    NoLongitudinal,
    NotFound,
}
