//! Per-frame gesture aggregation and label arbitration.
//!
//! Runs the finger classifier, the static predicates and the hand's wave
//! tracker over every observed hand, collects a flat event list plus a
//! per-hand result map, and appends one aggregate finger-count event.  Per
//! hand, a fired wave is held for display for `display_hold_s` so a
//! single-frame detection stays visible to the renderer.

use std::collections::HashMap;
use tracing::debug;

use super::classify::{is_middle_finger, is_open_palm, is_peace, is_thumbs_up, is_yolo};
use super::fingers::{count_fingers, finger_states, FingerConfig, FingerStates};
use super::geometry::centroid;
use super::landmarks::{palm_center, palm_scale, Hand, HandObservation, LANDMARK_COUNT};
use super::wave::{WaveConfig, WavePhase, WaveStats, WaveTracker};

/// Upper bound on the aggregate finger count.
pub const MAX_TOTAL_FINGERS: u8 = 10;

// ── Gesture kinds ──────────────────────────────────────────

/// Event names emitted by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Lateral oscillation of an open hand.
    Wave,
    /// Thumb up, other fingers curled.
    ThumbsUp,
    /// Middle finger only.
    MiddleFinger,
    /// Index and middle.
    Peace,
    /// All five fingers.
    OpenPalm,
    /// Shaka: thumb and pinky.
    Yolo,
    /// Aggregate finger count.  Emitted once per frame.
    Count,
}

impl GestureKind {
    /// Wire name, also what actuators key on.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wave => "wave",
            Self::ThumbsUp => "thumbs_up",
            Self::MiddleFinger => "middle_finger",
            Self::Peace => "peace",
            Self::OpenPalm => "open_palm",
            Self::Yolo => "yolo",
            Self::Count => "count",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// Per-hand label priority, highest first.
pub const LABEL_PRIORITY: [GestureKind; 6] = [
    GestureKind::Wave,
    GestureKind::ThumbsUp,
    GestureKind::MiddleFinger,
    GestureKind::Peace,
    GestureKind::OpenPalm,
    GestureKind::Yolo,
];

// ── Events ─────────────────────────────────────────────────

/// Which hand(s) an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHand {
    Left,
    Right,
    /// Count event with both sides observed.
    Both,
    /// Count event with no hand observed.
    None,
}

impl EventHand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Both => "both",
            Self::None => "none",
        }
    }
}

impl From<Hand> for EventHand {
    fn from(hand: Hand) -> Self {
        match hand {
            Hand::Left => Self::Left,
            Hand::Right => Self::Right,
        }
    }
}

/// Extra data attached to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventPayload {
    None,
    /// Open palm: extended finger count.
    Fingers { count: u8 },
    /// Yolo variant.
    Style(&'static str),
    /// Wave diagnostics at fire time.
    Wave(WaveStats),
    /// Aggregate count.  `total` is capped at `MAX_TOTAL_FINGERS`.
    Count { left: u8, right: u8, total: u8 },
}

/// One detection in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub hand: EventHand,
    /// Detection score for static gestures, wave confidence for waves,
    /// 1.0/0.0 for the count event depending on whether any hand was seen.
    pub confidence: f32,
    pub timestamp_s: f64,
    pub payload: EventPayload,
}

// ── Results ────────────────────────────────────────────────

/// Classification of one observed hand.
#[derive(Debug, Clone)]
pub struct HandResult {
    pub hand: Hand,
    /// Detection score passed through from the observation.
    pub score: f32,
    pub fingers: FingerStates,
    pub count: u8,
    /// Mean of all landmarks.
    pub center: [f32; 2],
    pub palm_scale: f32,
    /// Window diagnostics, when the wave tracker evaluated this frame.
    pub wave: Option<WaveStats>,
}

/// Output of `GestureDetector::process`.
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub timestamp_s: f64,
    /// Per-hand events in observation order, then the count event last.
    pub events: Vec<GestureEvent>,
    pub per_hand: HashMap<Hand, HandResult>,
    /// Left + right finger count, capped at `MAX_TOTAL_FINGERS`.
    pub total: u8,
}

impl FrameResult {
    /// Non-count events for one hand.
    pub fn events_for(&self, hand: Hand) -> impl Iterator<Item = &GestureEvent> {
        let side = EventHand::from(hand);
        self.events
            .iter()
            .filter(move |e| e.hand == side && e.kind != GestureKind::Count)
    }

    /// Arbitrated label for an observed hand.
    pub fn hand_label(&self, hand: Hand) -> Option<String> {
        self.per_hand
            .get(&hand)
            .map(|r| GestureDetector::arbitrate(&self.events, hand, r.count))
    }
}

// ── Config ─────────────────────────────────────────────────

/// Configuration for the whole detection pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    pub fingers: FingerConfig,
    pub wave: WaveConfig,
    /// Extended fingers needed for a sample to count as "open" in the wave
    /// tracker's open ratio.
    pub open_min_fingers: u8,
    /// Seconds a fired wave stays on display.
    pub display_hold_s: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            fingers: FingerConfig::default(),
            wave: WaveConfig::default(),
            open_min_fingers: 5,
            display_hold_s: 3.0,
        }
    }
}

impl GestureConfig {
    /// Default classifier with the permissive wave preset.
    pub fn permissive() -> Self {
        Self {
            wave: WaveConfig::permissive(),
            ..Self::default()
        }
    }
}

// ── Per-hand tracking ──────────────────────────────────────

/// A fired wave kept on display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveHold {
    pub fired_at: f64,
    /// Visible while `now < until`.
    pub until: f64,
    pub stats: WaveStats,
}

impl WaveHold {
    /// Summary string shown in place of the hand label.
    pub fn description(&self) -> String {
        format!(
            "wave amp={:.2} crossings={} open={:.2}",
            self.stats.amplitude, self.stats.crossings, self.stats.open_ratio
        )
    }
}

/// State carried across frames for a single hand.
#[derive(Debug)]
struct HandState {
    tracker: WaveTracker,
    hold: Option<WaveHold>,
}

impl HandState {
    fn new(config: &WaveConfig) -> Self {
        Self {
            tracker: WaveTracker::new(config.clone()),
            hold: None,
        }
    }

    fn reset(&mut self) {
        self.tracker.reset();
        self.hold = None;
    }
}

// ── Detector ───────────────────────────────────────────────

/// Frame-synchronous gesture detector for up to two hands.
pub struct GestureDetector {
    config: GestureConfig,
    left: HandState,
    right: HandState,
    /// Frames processed since creation or reset.
    frames: u64,
    last_timestamp: Option<f64>,
}

impl GestureDetector {
    pub fn new(config: GestureConfig) -> Self {
        let left = HandState::new(&config.wave);
        let right = HandState::new(&config.wave);
        Self {
            config,
            left,
            right,
            frames: 0,
            last_timestamp: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replace the configuration.  Wave trackers keep their buffers.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.left.tracker.set_config(config.wave.clone());
        self.right.tracker.set_config(config.wave.clone());
        self.config = config;
    }

    fn hand_state(&self, hand: Hand) -> &HandState {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    fn hand_state_mut(&mut self, hand: Hand) -> &mut HandState {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    /// Classify one frame.  Observations without a resolved handedness are
    /// ignored; if two observations claim the same side, the first wins.
    pub fn process(&mut self, hands: &[HandObservation], timestamp_s: f64) -> FrameResult {
        self.frames += 1;
        self.last_timestamp = Some(timestamp_s);

        let mut per_hand: HashMap<Hand, HandResult> = HashMap::new();
        let mut events = Vec::new();

        for obs in hands {
            let hand = match obs.handedness.resolve() {
                Some(h) => h,
                None => {
                    debug!("Dropping hand with {} handedness", obs.handedness.as_str());
                    continue;
                }
            };
            if per_hand.contains_key(&hand) {
                debug!("Duplicate {} hand in frame, dropped", hand.as_str());
                continue;
            }
            let result = self.process_hand(hand, obs, timestamp_s, &mut events);
            per_hand.insert(hand, result);
        }

        let left = per_hand.get(&Hand::Left).map(|r| r.count).unwrap_or(0);
        let right = per_hand.get(&Hand::Right).map(|r| r.count).unwrap_or(0);
        let total = left.saturating_add(right).min(MAX_TOTAL_FINGERS);

        let side = match (
            per_hand.contains_key(&Hand::Left),
            per_hand.contains_key(&Hand::Right),
        ) {
            (true, true) => EventHand::Both,
            (true, false) => EventHand::Left,
            (false, true) => EventHand::Right,
            (false, false) => EventHand::None,
        };
        events.push(GestureEvent {
            kind: GestureKind::Count,
            hand: side,
            confidence: if side == EventHand::None { 0.0 } else { 1.0 },
            timestamp_s,
            payload: EventPayload::Count { left, right, total },
        });

        FrameResult {
            timestamp_s,
            events,
            per_hand,
            total,
        }
    }

    fn process_hand(
        &mut self,
        hand: Hand,
        obs: &HandObservation,
        timestamp_s: f64,
        events: &mut Vec<GestureEvent>,
    ) -> HandResult {
        let lms = &obs.landmarks;
        if !obs.is_complete() {
            debug!(
                "{} hand: {} of {} landmarks, fingers read as curled",
                hand.as_str(),
                lms.len(),
                LANDMARK_COUNT
            );
        }
        let fingers = finger_states(lms, hand, &self.config.fingers);
        let count = count_fingers(&fingers);
        let ps = palm_scale(
            lms,
            self.config.fingers.min_palm_scale,
            self.config.fingers.fallback_palm_scale,
        );

        let event = |kind, payload| GestureEvent {
            kind,
            hand: hand.into(),
            confidence: obs.score,
            timestamp_s,
            payload,
        };

        if is_open_palm(&fingers) {
            events.push(event(GestureKind::OpenPalm, EventPayload::Fingers { count }));
        }
        if is_thumbs_up(lms, &fingers) {
            events.push(event(GestureKind::ThumbsUp, EventPayload::None));
        }
        if is_middle_finger(&fingers) {
            events.push(event(GestureKind::MiddleFinger, EventPayload::None));
        }
        if is_yolo(&fingers) {
            events.push(event(GestureKind::Yolo, EventPayload::Style("shaka")));
        }
        if is_peace(&fingers) {
            events.push(event(GestureKind::Peace, EventPayload::None));
        }

        let x = palm_center(lms)[0];
        let is_open = count >= self.config.open_min_fingers;
        let hold_s = self.config.display_hold_s;

        let hs = self.hand_state_mut(hand);
        if let Some(hold) = hs.hold {
            if timestamp_s >= hold.until {
                debug!("Wave hold expired on {}", hand.as_str());
                hs.hold = None;
            }
        }
        let decision = hs.tracker.update(x, is_open, ps, timestamp_s);
        if decision.fired {
            hs.hold = Some(WaveHold {
                fired_at: timestamp_s,
                until: timestamp_s + hold_s,
                stats: decision.stats,
            });
            events.push(GestureEvent {
                kind: GestureKind::Wave,
                hand: hand.into(),
                confidence: decision.stats.confidence,
                timestamp_s,
                payload: EventPayload::Wave(decision.stats),
            });
        }

        debug!(
            "{} hand: fingers={} [{}] open={} wave={:?}",
            hand.as_str(),
            count,
            fingers.extended_names().join(" "),
            is_open,
            decision.phase
        );

        HandResult {
            hand,
            score: obs.score,
            fingers,
            count,
            center: centroid(lms),
            palm_scale: ps,
            wave: (decision.phase == WavePhase::Evaluated).then_some(decision.stats),
        }
    }

    /// Pick one label for a hand from a frame's events: the highest-priority
    /// gesture fired on that hand, else "<N> fingers", else "hand".
    pub fn arbitrate(events: &[GestureEvent], hand: Hand, count: u8) -> String {
        let side = EventHand::from(hand);
        LABEL_PRIORITY
            .iter()
            .find(|kind| events.iter().any(|e| e.hand == side && e.kind == **kind))
            .map(|kind| kind.label())
            .unwrap_or_else(|| {
                if count > 0 {
                    format!("{} fingers", count)
                } else {
                    "hand".to_string()
                }
            })
    }

    /// The wave currently held for display on a hand, if any.
    pub fn held_wave(&self, hand: Hand, now: f64) -> Option<&WaveHold> {
        self.hand_state(hand)
            .hold
            .as_ref()
            .filter(|hold| now < hold.until)
    }

    /// What the renderer shows for a hand: the held wave description while
    /// it lasts (even if the hand left the frame), else the arbitrated label.
    pub fn display_label(&self, frame: &FrameResult, hand: Hand, now: f64) -> Option<String> {
        match self.held_wave(hand, now) {
            Some(hold) => Some(hold.description()),
            None => frame.hand_label(hand),
        }
    }

    /// Drop all tracker state and display holds.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.frames = 0;
        self.last_timestamp = None;
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        let hand_sexp = |hand: Hand| {
            let hs = self.hand_state(hand);
            let now = self.last_timestamp.unwrap_or(0.0);
            let hold = match self.held_wave(hand, now) {
                Some(h) => format!("{:.3}", h.until),
                None => "nil".to_string(),
            };
            format!(
                "(:samples {} :cooling {} :hold-until {})",
                hs.tracker.samples(),
                if hs.tracker.cooling_down(now) { "t" } else { "nil" },
                hold,
            )
        };
        format!(
            "(:frames {} :left {} :right {})",
            self.frames,
            hand_sexp(Hand::Left),
            hand_sexp(Hand::Right),
        )
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        let c = &self.config;
        format!(
            "(:hold-s {:.3} :open-min-fingers {} :finger-margin {:.3} :thumb-margin {:.3} :window {} :amplitude-threshold {:.4} :crossing-threshold {} :open-ratio {:.3} :cooldown-s {:.3} :smoothing {:.3})",
            c.display_hold_s,
            c.open_min_fingers,
            c.fingers.finger_margin,
            c.fingers.thumb_margin,
            c.wave.window,
            c.wave.amplitude_threshold,
            c.wave.crossing_threshold,
            c.wave.open_ratio,
            c.wave.cooldown_s,
            c.wave.smoothing,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
