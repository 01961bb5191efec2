//! Pose Frames
//!
//! What the external tracker hands the engine: a status and, per camera
//! frame, a full skeleton (or nothing).

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::point::{Keypoint, Landmark};
use crate::game::landmarks::{landmark_name, LANDMARK_COUNT};

/// Lifecycle of the pose tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingStatus {
    /// Not started
    #[default]
    Idle,
    /// Camera and model loading
    Initializing,
    /// Producing frames
    Ready,
    /// Camera access refused
    PermissionDenied,
    /// Tracker failed to start or crashed
    Error,
}

impl TrackingStatus {
    /// Whether a game may start while the tracker is in this state.
    pub fn allows_start(self) -> bool {
        !matches!(self, TrackingStatus::PermissionDenied | TrackingStatus::Error)
    }

    /// Kebab-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            TrackingStatus::Idle => "idle",
            TrackingStatus::Initializing => "initializing",
            TrackingStatus::Ready => "ready",
            TrackingStatus::PermissionDenied => "permission-denied",
            TrackingStatus::Error => "error",
        }
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracker result.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseFrame {
    /// 33 landmarks, or empty when no person was detected
    pub landmarks: Vec<Landmark>,
    /// Capture time in milliseconds on the tracker's clock
    pub timestamp_ms: u64,
    /// Measured frame rate at capture
    pub fps: f64,
}

impl PoseFrame {
    /// Frame with no detected person.
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            landmarks: Vec::new(),
            timestamp_ms,
            fps: 0.0,
        }
    }

    /// Frame carrying a skeleton.
    pub fn new(landmarks: Vec<Landmark>, timestamp_ms: u64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
            fps: 0.0,
        }
    }

    /// Whether the frame carries a full skeleton.
    pub fn has_pose(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }

    /// Landmarks as named keypoints, with visibility used as confidence.
    pub fn keypoints(&self) -> Vec<Keypoint> {
        self.landmarks
            .iter()
            .enumerate()
            .map(|(i, lm)| {
                let keypoint = lm.to_keypoint();
                match landmark_name(i) {
                    Some(name) => keypoint.named(name),
                    None => keypoint,
                }
            })
            .collect()
    }
}
