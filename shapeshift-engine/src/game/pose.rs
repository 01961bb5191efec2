//! Reference Poses
//!
//! Immutable catalog of target poses, grouped by difficulty.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::point::Landmark;
use crate::core::rng::DeterministicRng;
use crate::game::landmarks::{index::*, LANDMARK_COUNT};

// =============================================================================
// DIFFICULTY
// =============================================================================

/// Difficulty tag of a target. Ordered easy < medium < hard < expert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Difficulty {
    /// Warm-up targets
    Easy = 0,
    /// Asymmetric or single-arm targets
    Medium = 1,
    /// Low or balance targets
    Hard = 2,
    /// Crossed-limb targets
    Expert = 3,
}

impl Difficulty {
    /// All difficulties in ascending order.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// POSE SHAPE
// =============================================================================

/// A named reference pose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseShape {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// What the player should do
    pub description: String,
    /// Full 33-entry skeleton
    pub landmarks: Vec<Landmark>,
}

/// Key joints of a catalog pose, in this order: nose, shoulders, elbows,
/// wrists, hips, knees, ankles (left before right).
type Joints = [(f64, f64); 13];

const JOINT_SLOTS: [usize; 13] = [
    NOSE,
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
    LEFT_ANKLE,
    RIGHT_ANKLE,
];

impl PoseShape {
    fn from_joints(
        id: &str,
        name: &str,
        difficulty: Difficulty,
        description: &str,
        joints: &Joints,
    ) -> Self {
        // Joints the catalog does not pin sit at the center, invisible.
        let mut landmarks = vec![Landmark::with_visibility(0.5, 0.5, 0.0, 0.0); LANDMARK_COUNT];
        for (slot, (x, y)) in JOINT_SLOTS.iter().zip(joints.iter()) {
            landmarks[*slot] = Landmark::new(*x, *y);
        }

        Self {
            id: id.to_string(),
            name: name.to_string(),
            difficulty,
            description: description.to_string(),
            landmarks,
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

type CatalogEntry = (&'static str, &'static str, Difficulty, &'static str, Joints);

const CATALOG: [CatalogEntry; 16] = [
    (
        "tpose", "T-Pose", Difficulty::Easy, "Arms straight out to sides",
        [(0.5, 0.15), (0.35, 0.3), (0.65, 0.3), (0.2, 0.3), (0.8, 0.3), (0.05, 0.3), (0.95, 0.3),
         (0.4, 0.55), (0.6, 0.55), (0.4, 0.75), (0.6, 0.75), (0.4, 0.95), (0.6, 0.95)],
    ),
    (
        "hands-up", "Hands Up!", Difficulty::Easy, "Both arms raised above head",
        [(0.5, 0.2), (0.4, 0.35), (0.6, 0.35), (0.35, 0.2), (0.65, 0.2), (0.35, 0.05), (0.65, 0.05),
         (0.43, 0.58), (0.57, 0.58), (0.43, 0.78), (0.57, 0.78), (0.43, 0.95), (0.57, 0.95)],
    ),
    (
        "wide-stance", "Wide Stance", Difficulty::Easy, "Legs apart, arms at sides",
        [(0.5, 0.15), (0.4, 0.32), (0.6, 0.32), (0.35, 0.45), (0.65, 0.45), (0.32, 0.58), (0.68, 0.58),
         (0.42, 0.55), (0.58, 0.55), (0.3, 0.75), (0.7, 0.75), (0.25, 0.95), (0.75, 0.95)],
    ),
    (
        "star", "Star", Difficulty::Easy, "Arms and legs spread wide",
        [(0.5, 0.12), (0.38, 0.28), (0.62, 0.28), (0.22, 0.2), (0.78, 0.2), (0.08, 0.1), (0.92, 0.1),
         (0.42, 0.52), (0.58, 0.52), (0.28, 0.72), (0.72, 0.72), (0.18, 0.92), (0.82, 0.92)],
    ),
    (
        "left-point", "Point Left", Difficulty::Medium, "Point to your left with one arm",
        [(0.5, 0.15), (0.38, 0.3), (0.62, 0.3), (0.22, 0.3), (0.65, 0.42), (0.05, 0.3), (0.62, 0.55),
         (0.42, 0.55), (0.58, 0.55), (0.42, 0.75), (0.58, 0.75), (0.42, 0.95), (0.58, 0.95)],
    ),
    (
        "right-point", "Point Right", Difficulty::Medium, "Point to your right with one arm",
        [(0.5, 0.15), (0.38, 0.3), (0.62, 0.3), (0.35, 0.42), (0.78, 0.3), (0.38, 0.55), (0.95, 0.3),
         (0.42, 0.55), (0.58, 0.55), (0.42, 0.75), (0.58, 0.75), (0.42, 0.95), (0.58, 0.95)],
    ),
    (
        "warrior", "Warrior", Difficulty::Medium, "Lunge with arms extended",
        [(0.5, 0.18), (0.38, 0.32), (0.62, 0.32), (0.2, 0.32), (0.8, 0.32), (0.05, 0.32), (0.95, 0.32),
         (0.4, 0.55), (0.6, 0.55), (0.25, 0.7), (0.68, 0.72), (0.2, 0.92), (0.72, 0.92)],
    ),
    (
        "disco", "Disco", Difficulty::Medium, "One arm up, one arm down diagonally",
        [(0.5, 0.15), (0.38, 0.3), (0.62, 0.3), (0.28, 0.42), (0.75, 0.18), (0.2, 0.58), (0.88, 0.05),
         (0.42, 0.55), (0.58, 0.55), (0.42, 0.75), (0.58, 0.75), (0.42, 0.95), (0.58, 0.95)],
    ),
    (
        "airplane", "Airplane", Difficulty::Medium, "Lean to one side with arms out",
        [(0.52, 0.18), (0.38, 0.32), (0.62, 0.28), (0.2, 0.38), (0.82, 0.22), (0.05, 0.45), (0.98, 0.15),
         (0.42, 0.55), (0.58, 0.55), (0.42, 0.75), (0.58, 0.75), (0.42, 0.95), (0.58, 0.95)],
    ),
    (
        "crouch", "Crouch", Difficulty::Hard, "Squat down low",
        [(0.5, 0.35), (0.38, 0.48), (0.62, 0.48), (0.28, 0.52), (0.72, 0.52), (0.35, 0.65), (0.65, 0.65),
         (0.4, 0.68), (0.6, 0.68), (0.32, 0.72), (0.68, 0.72), (0.38, 0.92), (0.62, 0.92)],
    ),
    (
        "tree", "Tree Pose", Difficulty::Hard, "One leg raised, hands together above",
        [(0.5, 0.12), (0.42, 0.28), (0.58, 0.28), (0.42, 0.15), (0.58, 0.15), (0.48, 0.02), (0.52, 0.02),
         (0.45, 0.52), (0.55, 0.52), (0.55, 0.58), (0.55, 0.72), (0.52, 0.68), (0.55, 0.92)],
    ),
    (
        "bow", "Bow", Difficulty::Hard, "Bow forward with arms behind",
        [(0.5, 0.4), (0.42, 0.45), (0.58, 0.45), (0.35, 0.52), (0.65, 0.52), (0.3, 0.45), (0.7, 0.45),
         (0.45, 0.58), (0.55, 0.58), (0.45, 0.75), (0.55, 0.75), (0.45, 0.92), (0.55, 0.92)],
    ),
    (
        "diagonal-reach", "Diagonal Reach", Difficulty::Hard, "Stretch diagonally with opposite arm and leg",
        [(0.5, 0.15), (0.4, 0.3), (0.6, 0.3), (0.28, 0.2), (0.65, 0.42), (0.15, 0.08), (0.65, 0.55),
         (0.45, 0.55), (0.55, 0.55), (0.45, 0.75), (0.7, 0.68), (0.45, 0.92), (0.85, 0.78)],
    ),
    (
        "pretzel", "Pretzel", Difficulty::Expert, "Arms crossed with wide stance",
        [(0.5, 0.15), (0.4, 0.32), (0.6, 0.32), (0.55, 0.4), (0.45, 0.4), (0.65, 0.32), (0.35, 0.32),
         (0.42, 0.55), (0.58, 0.55), (0.28, 0.72), (0.72, 0.72), (0.2, 0.92), (0.8, 0.92)],
    ),
    (
        "lightning", "Lightning Bolt", Difficulty::Expert, "Zigzag pose with arms and legs",
        [(0.45, 0.15), (0.38, 0.3), (0.55, 0.28), (0.52, 0.22), (0.72, 0.35), (0.65, 0.12), (0.88, 0.42),
         (0.42, 0.55), (0.55, 0.52), (0.55, 0.7), (0.42, 0.72), (0.68, 0.88), (0.32, 0.92)],
    ),
    (
        "windmill", "Windmill", Difficulty::Expert, "Touch opposite foot with arm extended",
        [(0.55, 0.35), (0.48, 0.42), (0.62, 0.38), (0.42, 0.55), (0.78, 0.25), (0.35, 0.72), (0.92, 0.12),
         (0.5, 0.58), (0.6, 0.55), (0.42, 0.75), (0.65, 0.72), (0.38, 0.92), (0.7, 0.92)],
    ),
];

/// The built-in reference poses.
#[derive(Clone, Debug)]
pub struct PoseCatalog {
    poses: Vec<PoseShape>,
}

impl Default for PoseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PoseCatalog {
    /// Build the built-in catalog.
    pub fn builtin() -> Self {
        let poses = CATALOG
            .iter()
            .map(|(id, name, difficulty, description, joints)| {
                PoseShape::from_joints(id, name, *difficulty, description, joints)
            })
            .collect();
        Self { poses }
    }

    /// Build a catalog from custom poses.
    ///
    /// Returns `None` when empty, since target selection needs a fallback.
    pub fn from_poses(poses: Vec<PoseShape>) -> Option<Self> {
        if poses.is_empty() {
            None
        } else {
            Some(Self { poses })
        }
    }

    /// All poses in catalog order.
    pub fn all(&self) -> &[PoseShape] {
        &self.poses
    }

    /// Number of poses.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Poses with exactly this difficulty.
    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&PoseShape> {
        self.poses.iter().filter(|p| p.difficulty == difficulty).collect()
    }

    /// Look up a pose by id.
    pub fn by_id(&self, id: &str) -> Option<&PoseShape> {
        self.poses.iter().find(|p| p.id == id)
    }

    /// Pick a pose uniformly among those whose difficulty is in `difficulties`.
    ///
    /// Falls back to the first catalog pose when nothing is eligible.
    pub fn random_pose(&self, difficulties: &[Difficulty], rng: &mut DeterministicRng) -> &PoseShape {
        let eligible: Vec<&PoseShape> = self
            .poses
            .iter()
            .filter(|p| difficulties.contains(&p.difficulty))
            .collect();

        match rng.choose(&eligible) {
            Some(pose) => *pose,
            None => &self.poses[0],
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
