//! Skeleton Landmark Indices
//!
//! The tracker reports 33 landmarks in a fixed anatomical order. Index `i`
//! names the same joint in every frame and every reference pose.

/// Number of landmarks in a full-body skeleton.
pub const LANDMARK_COUNT: usize = 33;

#[allow(missing_docs)]
pub mod index {
    pub const NOSE: usize = 0;
    pub const LEFT_EYE_INNER: usize = 1;
    pub const LEFT_EYE: usize = 2;
    pub const LEFT_EYE_OUTER: usize = 3;
    pub const RIGHT_EYE_INNER: usize = 4;
    pub const RIGHT_EYE: usize = 5;
    pub const RIGHT_EYE_OUTER: usize = 6;
    pub const LEFT_EAR: usize = 7;
    pub const RIGHT_EAR: usize = 8;
    pub const MOUTH_LEFT: usize = 9;
    pub const MOUTH_RIGHT: usize = 10;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_PINKY: usize = 17;
    pub const RIGHT_PINKY: usize = 18;
    pub const LEFT_INDEX: usize = 19;
    pub const RIGHT_INDEX: usize = 20;
    pub const LEFT_THUMB: usize = 21;
    pub const RIGHT_THUMB: usize = 22;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_ANKLE: usize = 27;
    pub const RIGHT_ANKLE: usize = 28;
    pub const LEFT_HEEL: usize = 29;
    pub const RIGHT_HEEL: usize = 30;
    pub const LEFT_FOOT_INDEX: usize = 31;
    pub const RIGHT_FOOT_INDEX: usize = 32;
}

use index::*;

/// Landmarks that participate in pose scoring.
pub const KEY_LANDMARKS: [usize; 10] = [
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_ELBOW,
    RIGHT_ELBOW,
    LEFT_WRIST,
    RIGHT_WRIST,
    LEFT_HIP,
    RIGHT_HIP,
    LEFT_KNEE,
    RIGHT_KNEE,
];

/// Importance weight of a landmark in pose scoring.
///
/// Torso anchors weigh most; extremities least. Unlisted joints weigh 1.0.
pub fn landmark_weight(index: usize) -> f64 {
    match index {
        LEFT_SHOULDER | RIGHT_SHOULDER => 1.5,
        LEFT_HIP | RIGHT_HIP => 1.3,
        LEFT_ELBOW | RIGHT_ELBOW => 1.2,
        LEFT_KNEE | RIGHT_KNEE => 1.1,
        LEFT_WRIST | RIGHT_WRIST => 1.0,
        LEFT_ANKLE | RIGHT_ANKLE => 0.8,
        _ => 1.0,
    }
}

/// Human-readable joint name, or `None` for an out-of-range index.
pub fn landmark_name(index: usize) -> Option<&'static str> {
    const NAMES: [&str; LANDMARK_COUNT] = [
        "nose",
        "left_eye_inner",
        "left_eye",
        "left_eye_outer",
        "right_eye_inner",
        "right_eye",
        "right_eye_outer",
        "left_ear",
        "right_ear",
        "mouth_left",
        "mouth_right",
        "left_shoulder",
        "right_shoulder",
        "left_elbow",
        "right_elbow",
        "left_wrist",
        "right_wrist",
        "left_pinky",
        "right_pinky",
        "left_index",
        "right_index",
        "left_thumb",
        "right_thumb",
        "left_hip",
        "right_hip",
        "left_knee",
        "right_knee",
        "left_ankle",
        "right_ankle",
        "left_heel",
        "right_heel",
        "left_foot_index",
        "right_foot_index",
    ];
    NAMES.get(index).copied()
}
