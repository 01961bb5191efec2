//! Pose Matching
//!
//! Scale- and position-invariant comparison of a player skeleton against a
//! reference pose, producing a 0-100 similarity score.

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::trace;

use crate::core::point::Landmark;
use crate::game::landmarks::{
    index::{LEFT_HIP, LEFT_SHOULDER, RIGHT_HIP, RIGHT_SHOULDER},
    landmark_weight, KEY_LANDMARKS, LANDMARK_COUNT,
};
use crate::game::pose::PoseShape;

/// Score at or above which a pose counts as matched.
pub const MATCH_THRESHOLD: f64 = 70.0;

/// Landmarks with visibility below this are ignored.
pub const MIN_VISIBILITY: f64 = 0.5;

/// Default distance tolerance when none is supplied.
pub const DEFAULT_MATCH_TOLERANCE: f64 = 0.15;

/// Shoulder widths at or below this are treated as degenerate.
const MIN_SHOULDER_WIDTH: f64 = 0.01;

/// Scale used when the shoulder width is degenerate.
const FALLBACK_SCALE: f64 = 0.3;

/// Outcome of one pose comparison.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchResult {
    /// Similarity 0-100, rounded
    pub score: u32,
    /// Whether the pose counts as matched
    pub is_match: bool,
    /// Per-landmark score in `[0,1]` for every key landmark that was compared
    pub landmark_scores: BTreeMap<usize, f64>,
}

impl MatchResult {
    /// Number of key landmarks that were visible on both sides.
    pub fn compared_count(&self) -> usize {
        self.landmark_scores.len()
    }
}

/// Re-center and re-scale a skeleton around its torso.
///
/// The center is the mean of both shoulders and both hips; the scale is the
/// horizontal shoulder width. Every landmark maps to
/// `(pos - center) / scale + 0.5`. If an anchor is missing the input is
/// returned unchanged.
pub fn normalize_pose(landmarks: &[Landmark]) -> Vec<Landmark> {
    let anchors = (
        landmarks.get(LEFT_SHOULDER),
        landmarks.get(RIGHT_SHOULDER),
        landmarks.get(LEFT_HIP),
        landmarks.get(RIGHT_HIP),
    );
    let (Some(ls), Some(rs), Some(lh), Some(rh)) = anchors else {
        return landmarks.to_vec();
    };

    let center_x = (ls.x + rs.x + lh.x + rh.x) / 4.0;
    let center_y = (ls.y + rs.y + lh.y + rh.y) / 4.0;

    let shoulder_width = (rs.x - ls.x).abs();
    let scale = if shoulder_width > MIN_SHOULDER_WIDTH {
        shoulder_width
    } else {
        FALLBACK_SCALE
    };

    landmarks
        .iter()
        .map(|lm| Landmark {
            x: (lm.x - center_x) / scale + 0.5,
            y: (lm.y - center_y) / scale + 0.5,
            z: lm.z,
            visibility: lm.visibility,
        })
        .collect()
}

/// Map a distance to a score in `[0,1]`; 1 is a perfect overlap.
#[inline]
fn distance_to_score(distance: f64, tolerance: f64) -> f64 {
    if tolerance <= 0.0 {
        return if distance == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - distance / tolerance).max(0.0)
}

/// Compare a player skeleton to a reference pose.
///
/// Skeletons with fewer than 33 landmarks score 0. Key landmarks that are
/// poorly visible on either side are skipped entirely.
pub fn compare_poses(player: &[Landmark], target: &PoseShape, tolerance: f64) -> MatchResult {
    if player.len() < LANDMARK_COUNT {
        return MatchResult::default();
    }

    let normalized_player = normalize_pose(player);
    let normalized_target = normalize_pose(&target.landmarks);

    let mut landmark_scores = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut weighted_total = 0.0;

    for idx in KEY_LANDMARKS {
        let (Some(p), Some(t)) = (normalized_player.get(idx), normalized_target.get(idx)) else {
            continue;
        };

        if p.visibility_or_full() < MIN_VISIBILITY || t.visibility_or_full() < MIN_VISIBILITY {
            continue;
        }

        let score = distance_to_score(p.point().distance(t.point()), tolerance);
        let weight = landmark_weight(idx);

        landmark_scores.insert(idx, score);
        weighted_sum += score * weight;
        weighted_total += weight;
    }

    let raw_score = if weighted_total > 0.0 {
        weighted_sum / weighted_total * 100.0
    } else {
        0.0
    };

    trace!(target_id = %target.id, raw_score, compared = landmark_scores.len(), "pose compared");

    MatchResult {
        score: raw_score.round() as u32,
        is_match: raw_score >= MATCH_THRESHOLD,
        landmark_scores,
    }
}

// =============================================================================
// MATCH QUALITY
// =============================================================================

/// Discrete feedback tier for a match score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    /// Below 50
    TryAgain,
    /// 50..70
    Close,
    /// 70..75
    Good,
    /// 75..85
    Great,
    /// 85..95
    Excellent,
    /// 95 and above
    Perfect,
}

impl MatchQuality {
    /// Tier for a score.
    pub fn from_score(score: u32) -> Self {
        match score {
            95.. => MatchQuality::Perfect,
            85..=94 => MatchQuality::Excellent,
            75..=84 => MatchQuality::Great,
            70..=74 => MatchQuality::Good,
            50..=69 => MatchQuality::Close,
            _ => MatchQuality::TryAgain,
        }
    }

    /// Feedback label shown to the player.
    pub fn label(self) -> &'static str {
        match self {
            MatchQuality::Perfect => "PERFECT!",
            MatchQuality::Excellent => "Excellent!",
            MatchQuality::Great => "Great!",
            MatchQuality::Good => "Good!",
            MatchQuality::Close => "Close...",
            MatchQuality::TryAgain => "Try again!",
        }
    }
}

impl fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Feedback tier for a match score.
pub fn match_quality(score: u32) -> MatchQuality {
    MatchQuality::from_score(score)
}

/// Scale base points by match quality: x2 / x1.5 / x1.2 / x1, rounded down.
pub fn calculate_bonus(score: u32, base_points: u32) -> u32 {
    match MatchQuality::from_score(score) {
        MatchQuality::Perfect => base_points * 2,
        MatchQuality::Excellent => base_points * 3 / 2,
        MatchQuality::Great => base_points * 6 / 5,
        _ => base_points,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::landmarks::index::*;
    use crate::game::pose::PoseCatalog;

    fn shifted(landmarks: &[Landmark], dx: f64, dy: f64, scale: f64) -> Vec<Landmark> {
        landmarks
            .iter()
            .map(|lm| Landmark { x: lm.x * scale + dx, y: lm.y * scale + dy, ..*lm })
            .collect()
    }

    #[test]
    fn test_short_skeleton_scores_zero() {
        let catalog = PoseCatalog::builtin();
        let target = catalog.by_id("tpose").unwrap();
        let result = compare_poses(&target.landmarks[..32], target, 0.2);
        assert_eq!(result.score, 0);
        assert!(!result.is_match);
        assert!(result.landmark_scores.is_empty());
    }

    #[test]
    fn test_identical_pose_is_perfect() {
        let catalog = PoseCatalog::builtin();
        for target in catalog.all() {
            let result = compare_poses(&target.landmarks, target, 0.15);
            assert_eq!(result.score, 100, "{}", target.id);
            assert!(result.is_match);
            assert_eq!(result.compared_count(), KEY_LANDMARKS.len());
        }
    }

    #[test]
    fn test_translation_and_scale_invariance() {
        let catalog = PoseCatalog::builtin();
        let target = catalog.by_id("star").unwrap();
        let player = shifted(&target.landmarks, 0.1, -0.05, 0.8);
        let result = compare_poses(&player, target, 0.1);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_different_pose_scores_lower() {
        let catalog = PoseCatalog::builtin();
        let tpose = catalog.by_id("tpose").unwrap();
        let hands_up = catalog.by_id("hands-up").unwrap();
        let result = compare_poses(&hands_up.landmarks, tpose, 0.15);
        assert!(result.score < 70, "score {}", result.score);
        assert!(!result.is_match);
    }

    #[test]
    fn test_low_visibility_landmarks_skipped() {
        let catalog = PoseCatalog::builtin();
        let target = catalog.by_id("tpose").unwrap();
        let mut player = target.landmarks.clone();
        player[LEFT_WRIST].visibility = Some(0.2);
        player[LEFT_WRIST].x = 0.9;

        let result = compare_poses(&player, target, 0.15);
        assert!(!result.landmark_scores.contains_key(&LEFT_WRIST));
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_nothing_visible_scores_zero() {
        let catalog = PoseCatalog::builtin();
        let target = catalog.by_id("tpose").unwrap();
        let player: Vec<Landmark> = target
            .landmarks
            .iter()
            .map(|lm| Landmark { visibility: Some(0.0), ..*lm })
            .collect();
        let result = compare_poses(&player, target, 0.15);
        assert_eq!(result, MatchResult::default());
    }

    #[test]
    fn test_normalize_pose_centers_torso() {
        let catalog = PoseCatalog::builtin();
        let target = catalog.by_id("tpose").unwrap();
        let normalized = normalize_pose(&target.landmarks);

        let torso: f64 = [LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP]
            .iter()
            .map(|i| normalized[*i].x)
            .sum::<f64>()
            / 4.0;
        assert!((torso - 0.5).abs() < 1e-12);
        let width = normalized[RIGHT_SHOULDER].x - normalized[LEFT_SHOULDER].x;
        assert!((width - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_pose_without_anchors_is_identity() {
        let partial = vec![Landmark::new(0.1, 0.2); 12];
        assert_eq!(normalize_pose(&partial), partial);
    }

    #[test]
    fn test_degenerate_shoulders_use_fallback_scale() {
        let mut lms = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        lms[NOSE] = Landmark::new(0.5, 0.2);
        let normalized = normalize_pose(&lms);
        // center (0.5, 0.5), scale 0.3
        assert!((normalized[NOSE].y - (0.5 + (0.2 - 0.5) / 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_match_quality_breakpoints() {
        assert_eq!(match_quality(100), MatchQuality::Perfect);
        assert_eq!(match_quality(96).label(), "PERFECT!");
        assert_eq!(match_quality(95), MatchQuality::Perfect);
        assert_eq!(match_quality(94), MatchQuality::Excellent);
        assert_eq!(match_quality(85), MatchQuality::Excellent);
        assert_eq!(match_quality(84), MatchQuality::Great);
        assert_eq!(match_quality(75), MatchQuality::Great);
        assert_eq!(match_quality(74), MatchQuality::Good);
        assert_eq!(match_quality(70), MatchQuality::Good);
        assert_eq!(match_quality(69), MatchQuality::Close);
        assert_eq!(match_quality(50), MatchQuality::Close);
        assert_eq!(match_quality(49).to_string(), "Try again!");
    }

    #[test]
    fn test_calculate_bonus() {
        assert_eq!(calculate_bonus(96, 10), 20);
        assert_eq!(calculate_bonus(90, 10), 15);
        assert_eq!(calculate_bonus(90, 7), 10);
        assert_eq!(calculate_bonus(80, 7), 8);
        assert_eq!(calculate_bonus(72, 10), 10);
        assert_eq!(calculate_bonus(10, 10), 10);
    }
}
