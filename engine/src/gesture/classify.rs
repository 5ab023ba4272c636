//! Static gesture predicates over finger states.
//!
//! Each predicate is evaluated independently every frame.  They can co-fire
//! with a wave on the same hand; arbitration happens in the detector.

use super::fingers::FingerStates;
use super::landmarks::{HandLandmark, LANDMARK_COUNT};

/// All five fingers extended.
pub fn is_open_palm(s: &FingerStates) -> bool {
    s.thumb && s.index && s.middle && s.ring && s.pinky
}

/// Thumb extended and pointing up (tip above its IP joint and the wrist in
/// image coordinates), the other four curled.
pub fn is_thumbs_up(landmarks: &[[f32; 2]], s: &FingerStates) -> bool {
    if landmarks.len() < LANDMARK_COUNT {
        return false;
    }
    let tip = landmarks[HandLandmark::ThumbTip.index()];
    let ip = landmarks[HandLandmark::ThumbIp.index()];
    let wrist = landmarks[HandLandmark::Wrist.index()];
    let thumb_vertical = tip[1] < ip[1] && tip[1] < wrist[1];
    let others_down = !s.index && !s.middle && !s.ring && !s.pinky;
    s.thumb && thumb_vertical && others_down
}

/// Middle extended; index, ring and pinky curled.  Thumb is ignored.
pub fn is_middle_finger(s: &FingerStates) -> bool {
    s.middle && !s.index && !s.ring && !s.pinky
}

/// Shaka: thumb and pinky out, the three middle fingers curled.
pub fn is_yolo(s: &FingerStates) -> bool {
    s.thumb && !s.index && !s.middle && !s.ring && s.pinky
}

/// Index and middle extended, ring and pinky curled.  Thumb is ignored.
pub fn is_peace(s: &FingerStates) -> bool {
    s.index && s.middle && !s.ring && !s.pinky
}
