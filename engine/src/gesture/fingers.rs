//! Per-frame finger extension classifier.
//!
//! A finger counts as extended when its tip is farther from the wrist than
//! its middle joint by a margin proportional to the palm scale.  The thumb
//! uses a smaller margin against its MCP and must also point toward the
//! outside of the hand, which depends on handedness in a mirrored view.

use super::geometry::dist;
use super::landmarks::{
    palm_scale, Hand, HandLandmark as L, FALLBACK_PALM_SCALE, LANDMARK_COUNT, MIN_PALM_SCALE,
};

// ── Finger ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Thresholds for finger extension.  Margins are fractions of palm scale.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerConfig {
    /// Extra wrist distance a fingertip needs beyond its PIP joint.
    pub finger_margin: f32,
    /// Extra wrist distance the thumb tip needs beyond the thumb MCP.
    pub thumb_margin: f32,
    /// Palm scales below this are treated as degenerate.
    pub min_palm_scale: f32,
    /// Palm scale substituted for a degenerate one.
    pub fallback_palm_scale: f32,
}

impl Default for FingerConfig {
    fn default() -> Self {
        Self {
            finger_margin: 0.08,
            thumb_margin: 0.06,
            min_palm_scale: MIN_PALM_SCALE,
            fallback_palm_scale: FALLBACK_PALM_SCALE,
        }
    }
}

// ── Finger states ──────────────────────────────────────────

/// Extension flag per finger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn get(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    /// Build from the low five bits: bit 0 thumb through bit 4 pinky.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            thumb: bits & 0b00001 != 0,
            index: bits & 0b00010 != 0,
            middle: bits & 0b00100 != 0,
            ring: bits & 0b01000 != 0,
            pinky: bits & 0b10000 != 0,
        }
    }

    pub fn extended_count(&self) -> u8 {
        Finger::ALL.iter().filter(|f| self.get(**f)).count() as u8
    }

    /// Names of the extended fingers, thumb first.
    pub fn extended_names(&self) -> Vec<&'static str> {
        Finger::ALL
            .iter()
            .filter(|f| self.get(**f))
            .map(|f| f.as_str())
            .collect()
    }
}

/// Number of extended fingers (0-5).
pub fn count_fingers(states: &FingerStates) -> u8 {
    states.extended_count()
}

/// Classify all five fingers.  Frames with fewer than 21 landmarks yield
/// all-false.
pub fn finger_states(landmarks: &[[f32; 2]], hand: Hand, config: &FingerConfig) -> FingerStates {
    if landmarks.len() < LANDMARK_COUNT {
        return FingerStates::default();
    }

    let p = |j: L| landmarks[j.index()];
    let wrist = p(L::Wrist);
    let ps = palm_scale(landmarks, config.min_palm_scale, config.fallback_palm_scale);
    let margin = config.finger_margin * ps;

    let extended = |tip: L, pip: L| dist(wrist, p(tip)) > dist(wrist, p(pip)) + margin;

    let thumb_tip = p(L::ThumbTip);
    let thumb_ip = p(L::ThumbIp);
    let thumb_reach =
        dist(wrist, thumb_tip) > dist(wrist, p(L::ThumbMcp)) + config.thumb_margin * ps;
    let thumb_outward = match hand {
        Hand::Left => thumb_tip[0] > thumb_ip[0],
        Hand::Right => thumb_tip[0] < thumb_ip[0],
    };

    FingerStates {
        thumb: thumb_reach && thumb_outward,
        index: extended(L::IndexTip, L::IndexPip),
        middle: extended(L::MiddleTip, L::MiddlePip),
        ring: extended(L::RingTip, L::RingPip),
        pinky: extended(L::PinkyTip, L::PinkyPip),
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::make_hand;

    #[test]
    fn test_short_frame_all_false() {
        let config = FingerConfig::default();
        for n in 0..LANDMARK_COUNT {
            let lms = vec![[0.5, 0.5]; n];
            let states = finger_states(&lms, Hand::Left, &config);
            assert_eq!(states, FingerStates::default(), "{} landmarks", n);
            assert_eq!(count_fingers(&states), 0);
        }
    }

    #[test]
    fn test_all_extended() {
        let config = FingerConfig::default();
        for hand in Hand::BOTH {
            let states = finger_states(&make_hand(hand, [true; 5]), hand, &config);
            assert_eq!(count_fingers(&states), 5, "{:?}: {:?}", hand, states);
        }
    }

    #[test]
    fn test_fist() {
        let config = FingerConfig::default();
        for hand in Hand::BOTH {
            let states = finger_states(&make_hand(hand, [false; 5]), hand, &config);
            assert_eq!(states, FingerStates::default(), "{:?}", hand);
        }
    }

    #[test]
    fn test_each_finger_independently() {
        let config = FingerConfig::default();
        for (i, finger) in Finger::ALL.iter().enumerate() {
            let mut pattern = [false; 5];
            pattern[i] = true;
            let states = finger_states(&make_hand(Hand::Right, pattern), Hand::Right, &config);
            assert!(states.get(*finger), "{} should be extended", finger.as_str());
            assert_eq!(count_fingers(&states), 1, "{:?}", states);
        }
    }

    #[test]
    fn test_thumb_direction_depends_on_handedness() {
        let config = FingerConfig::default();
        // A left-hand pose labelled as right points the thumb the wrong way.
        let lms = make_hand(Hand::Left, [true; 5]);
        assert!(finger_states(&lms, Hand::Left, &config).thumb);
        let mislabelled = finger_states(&lms, Hand::Right, &config);
        assert!(!mislabelled.thumb);
        assert_eq!(count_fingers(&mislabelled), 4);
    }

    #[test]
    fn test_margin_scales_with_palm() {
        let lms = make_hand(Hand::Left, [true; 5]);
        let mut config = FingerConfig::default();
        // Index tip beats its PIP by 0.15 in wrist distance; a margin of
        // one full palm (0.2) is too much.
        config.finger_margin = 1.0;
        let states = finger_states(&lms, Hand::Left, &config);
        assert!(!states.index);
        assert!(!states.middle);
    }

    #[test]
    fn test_count_matches_flags_for_all_combinations() {
        for bits in 0u8..32 {
            let states = FingerStates::from_bits(bits);
            let expected = Finger::ALL.iter().filter(|f| states.get(**f)).count() as u8;
            assert_eq!(count_fingers(&states), expected, "bits {:05b}", bits);
            assert_eq!(count_fingers(&states), bits.count_ones() as u8);
        }
    }

    #[test]
    fn test_extended_names() {
        let peace = FingerStates::from_bits(0b00110);
        assert_eq!(peace.extended_names(), vec!["index", "middle"]);
        assert_eq!(
            FingerStates::from_bits(0b11111).extended_names(),
            vec!["thumb", "index", "middle", "ring", "pinky"]
        );
        assert!(FingerStates::from_bits(0).extended_names().is_empty());
    }
}
