//! Hand gesture recognition from 2-D landmark frames.
//!
//! Provides:
//! - `landmarks`: 21-point hand topology, handedness, palm references
//! - `fingers`: per-finger extension classifier
//! - `classify`: static gesture predicates (open palm, thumbs up, ...)
//! - `wave`: stateful lateral-oscillation tracker
//! - `detector`: per-frame aggregation, label arbitration, display hold

pub mod classify;
pub mod detector;
pub mod fingers;
pub mod geometry;
pub mod landmarks;
pub mod wave;

pub use detector::{
    EventHand, EventPayload, FrameResult, GestureConfig, GestureDetector, GestureEvent,
    GestureKind, HandResult, WaveHold, LABEL_PRIORITY, MAX_TOTAL_FINGERS,
};
pub use fingers::{count_fingers, finger_states, Finger, FingerConfig, FingerStates};
pub use landmarks::{Hand, HandLandmark, HandObservation, Handedness, LANDMARK_COUNT};
pub use wave::{AcceptRule, WaveConfig, WaveDecision, WavePhase, WaveStats, WaveTracker};
