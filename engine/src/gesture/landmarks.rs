//! Hand landmark data structures supplied by the upstream pose estimator.
//!
//! Models the 21-point hand topology (wrist, four points per finger) in
//! normalized image coordinates, plus the per-hand observation wrapper
//! carrying handedness and detection score.  Provides the palm-scale and
//! palm-center references the classifiers normalize against.

use super::geometry::{centroid, dist};

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in estimator output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Wrist plus the four finger MCPs: the rigid part of the palm.
    pub fn palm_joints() -> [HandLandmark; 5] {
        [
            Self::Wrist,
            Self::IndexMcp,
            Self::MiddleMcp,
            Self::RingMcp,
            Self::PinkyMcp,
        ]
    }
}

// ── Hand enums ─────────────────────────────────────────────

/// A resolved hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];
}

/// Handedness label as reported by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Handedness {
    /// Parse an estimator label.  Anything other than left/right is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Unknown => "unknown",
        }
    }

    /// The hand side, if the label was resolved.
    pub fn resolve(&self) -> Option<Hand> {
        match self {
            Self::Left => Some(Hand::Left),
            Self::Right => Some(Hand::Right),
            Self::Unknown => None,
        }
    }
}

impl From<Hand> for Handedness {
    fn from(hand: Hand) -> Self {
        match hand {
            Hand::Left => Self::Left,
            Hand::Right => Self::Right,
        }
    }
}

// ── Observation ────────────────────────────────────────────

/// One detected hand in one camera frame.
#[derive(Debug, Clone)]
pub struct HandObservation {
    /// Normalized (x, y) points indexed by `HandLandmark`.  Should hold 21 entries;
    /// shorter frames are tolerated and classify as "nothing extended".
    pub landmarks: Vec<[f32; 2]>,
    /// Handedness label.  `Unknown` observations are dropped by the detector.
    pub handedness: Handedness,
    /// Detection score (0.0-1.0).
    pub score: f32,
}

impl HandObservation {
    pub fn new(landmarks: Vec<[f32; 2]>, handedness: Handedness, score: f32) -> Self {
        Self {
            landmarks,
            handedness,
            score,
        }
    }

    /// Position of a landmark, or `None` when the frame is too short.
    pub fn point(&self, landmark: HandLandmark) -> Option<[f32; 2]> {
        self.landmarks.get(landmark.index()).copied()
    }

    /// Whether the frame holds the full landmark set.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }
}

// ── Palm references ────────────────────────────────────────

/// Palm scales below this are degenerate (collapsed or missing landmarks).
pub const MIN_PALM_SCALE: f32 = 1e-6;

/// Palm scale substituted for a degenerate one.
pub const FALLBACK_PALM_SCALE: f32 = 0.1;

/// Replace a degenerate palm scale with `fallback`.
pub fn floor_palm_scale(raw: f32, min: f32, fallback: f32) -> f32 {
    if raw < min {
        fallback
    } else {
        raw
    }
}

/// Wrist to middle-finger MCP distance, the size reference every threshold
/// is scaled by.  Short frames get `fallback`.
pub fn palm_scale(landmarks: &[[f32; 2]], min: f32, fallback: f32) -> f32 {
    if landmarks.len() < LANDMARK_COUNT {
        return fallback;
    }
    let raw = dist(
        landmarks[HandLandmark::Wrist.index()],
        landmarks[HandLandmark::MiddleMcp.index()],
    );
    floor_palm_scale(raw, min, fallback)
}

/// Mean of the wrist and finger MCPs.  Tracks lateral hand motion without
/// the jitter of the fingertips.
pub fn palm_center(landmarks: &[[f32; 2]]) -> [f32; 2] {
    if landmarks.len() < LANDMARK_COUNT {
        return centroid(landmarks);
    }
    let points: Vec<[f32; 2]> = HandLandmark::palm_joints()
        .iter()
        .map(|j| landmarks[j.index()])
        .collect();
    centroid(&points)
}

// ── Test helpers ───────────────────────────────────────────

/// Build a synthetic 21-point hand.  `extended` is thumb, index, middle,
/// ring, pinky.  Wrist sits at (0.5, 0.8) and the middle MCP at (0.5, 0.6),
/// so the palm scale is 0.2.  The thumb points toward +x for a left hand
/// and -x for a right hand, matching the mirrored camera view.
#[cfg(test)]
pub(crate) fn make_hand(hand: Hand, extended: [bool; 5]) -> Vec<[f32; 2]> {
    let s = match hand {
        Hand::Left => 1.0,
        Hand::Right => -1.0,
    };
    let mut lms = vec![[0.0, 0.0]; LANDMARK_COUNT];
    lms[HandLandmark::Wrist.index()] = [0.5, 0.8];

    lms[HandLandmark::ThumbCmc.index()] = [0.5 + s * 0.05, 0.75];
    lms[HandLandmark::ThumbMcp.index()] = [0.5 + s * 0.10, 0.70];
    lms[HandLandmark::ThumbIp.index()] = [0.5 + s * 0.14, 0.65];
    lms[HandLandmark::ThumbTip.index()] = if extended[0] {
        [0.5 + s * 0.19, 0.60]
    } else {
        [0.5 + s * 0.08, 0.72]
    };

    let fingers = [
        (HandLandmark::IndexMcp, 0.05),
        (HandLandmark::MiddleMcp, 0.0),
        (HandLandmark::RingMcp, -0.05),
        (HandLandmark::PinkyMcp, -0.10),
    ];
    for (i, (mcp, offset)) in fingers.iter().enumerate() {
        let x = 0.5 + s * offset;
        let base = mcp.index();
        let mcp_y = if *mcp == HandLandmark::MiddleMcp { 0.6 } else { 0.61 };
        lms[base] = [x, mcp_y];
        lms[base + 1] = [x, 0.5];
        if extended[i + 1] {
            lms[base + 2] = [x, 0.42];
            lms[base + 3] = [x, 0.35];
        } else {
            lms[base + 2] = [x, 0.55];
            lms[base + 3] = [x, 0.62];
        }
    }
    lms
}

/// Shift every landmark horizontally.
#[cfg(test)]
pub(crate) fn shift_x(landmarks: &[[f32; 2]], dx: f32) -> Vec<[f32; 2]> {
    landmarks.iter().map(|p| [p[0] + dx, p[1]]).collect()
}

// ── Tests ──────────────────────────────────────────────────
