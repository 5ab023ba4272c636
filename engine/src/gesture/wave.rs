//! Wave detection: lateral back-and-forth hand oscillation over a sliding
//! window while the hand is mostly open.
//!
//! One `WaveTracker` per hand.  Each update exponentially smooths the palm
//! x position, pushes it with the open flag into two bounded ring buffers,
//! and once the window is full scores it on amplitude (normalized by palm
//! scale), hysteresis crossings around the window midpoint, and the open
//! ratio.  A fired wave clears both buffers and starts a cooldown.

use std::collections::VecDeque;
use tracing::debug;

use super::geometry::clamp01;
use super::landmarks::{floor_palm_scale, FALLBACK_PALM_SCALE, MIN_PALM_SCALE};

/// Smallest smoothing constant accepted; zero would freeze the position.
const MIN_SMOOTHING: f32 = 1e-3;

/// Windows shorter than this never report crossings.
const MIN_CROSSING_SAMPLES: usize = 4;

// ── Config ─────────────────────────────────────────────────

/// Thresholds and timing for wave detection.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveConfig {
    /// Number of samples in the sliding window.
    pub window: usize,
    /// Minimum peak-to-peak amplitude, in palm scales.
    pub amplitude_threshold: f32,
    /// Minimum hysteresis crossings for the strict path.
    pub crossing_threshold: u32,
    /// Minimum meaningful displacement, in palm scales.  Sets the deadband.
    pub min_displacement: f32,
    /// Deadband half-width as a multiple of `min_displacement`.
    pub deadband_factor: f32,
    /// Minimum fraction of open-hand samples in the window.
    pub open_ratio: f32,
    /// Seconds after a fired wave during which samples are ignored.
    pub cooldown_s: f64,
    /// Exponential smoothing constant in (0, 1].  Higher follows faster.
    pub smoothing: f32,
    /// Combined score the fallback path must reach.
    pub fallback_score: f32,
    /// Weight of the amplitude ratio in the combined score.
    pub amplitude_weight: f32,
    /// Weight of the crossing ratio in the combined score.
    pub crossing_weight: f32,
    /// Cap on the crossing ratio so a jittery window cannot carry the score.
    pub crossing_score_cap: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            window: 12,
            amplitude_threshold: 0.18,
            crossing_threshold: 2,
            min_displacement: 0.02,
            deadband_factor: 1.2,
            open_ratio: 0.55,
            cooldown_s: 1.0,
            smoothing: 0.20,
            fallback_score: 1.2,
            amplitude_weight: 0.6,
            crossing_weight: 0.4,
            crossing_score_cap: 3.0,
        }
    }
}

impl WaveConfig {
    /// Loose preset for small, quick waves and noisy open-hand detection.
    pub fn permissive() -> Self {
        Self {
            window: 10,
            amplitude_threshold: 0.012,
            crossing_threshold: 0,
            min_displacement: 0.0008,
            open_ratio: 0.20,
            cooldown_s: 0.4,
            smoothing: 0.12,
            ..Self::default()
        }
    }
}

// ── Decision ───────────────────────────────────────────────

/// Window diagnostics.  All zero unless the window was evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaveStats {
    /// Peak-to-peak smoothed x range divided by palm scale.
    pub amplitude: f32,
    /// Hysteresis crossings of the window midpoint.
    pub crossings: u32,
    /// Fraction of samples flagged open (0.0-1.0).
    pub open_ratio: f32,
    /// 0.55 floor rising with amplitude, saturating at 1.0.
    pub confidence: f32,
}

/// How far an update got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    /// Inside the post-fire cooldown; sample not ingested.
    CoolingDown,
    /// Timestamp older than the last ingested sample; sample dropped.
    OutOfOrder,
    /// Window not yet full.
    Filling,
    /// Window scored.
    Evaluated,
}

/// Accept paths, tried in `ACCEPT_RULES` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptRule {
    /// Amplitude, crossings and open ratio each meet their threshold.
    Strict,
    /// Weighted amplitude + crossing score is convincing on its own.
    Fallback,
}

pub const ACCEPT_RULES: [AcceptRule; 2] = [AcceptRule::Strict, AcceptRule::Fallback];

impl AcceptRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Fallback => "fallback",
        }
    }

    /// Whether this rule accepts the window.  Both paths require the open
    /// ratio.
    pub fn holds(&self, stats: &WaveStats, config: &WaveConfig) -> bool {
        if stats.open_ratio < config.open_ratio {
            return false;
        }
        match self {
            Self::Strict => {
                stats.amplitude >= config.amplitude_threshold
                    && stats.crossings >= config.crossing_threshold
            }
            Self::Fallback => combined_score(stats, config) >= config.fallback_score,
        }
    }
}

/// Weighted score used by the fallback path.
pub fn combined_score(stats: &WaveStats, config: &WaveConfig) -> f32 {
    let amp_score = stats.amplitude / config.amplitude_threshold.max(1e-6);
    let crossing_score = (stats.crossings as f32 / config.crossing_threshold.max(1) as f32)
        .min(config.crossing_score_cap);
    config.amplitude_weight * amp_score + config.crossing_weight * crossing_score
}

/// Result of one `WaveTracker::update`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDecision {
    pub fired: bool,
    /// The rule that accepted the window, when fired.
    pub rule: Option<AcceptRule>,
    pub phase: WavePhase,
    pub stats: WaveStats,
}

impl WaveDecision {
    fn idle(phase: WavePhase) -> Self {
        Self {
            fired: false,
            rule: None,
            phase,
            stats: WaveStats::default(),
        }
    }
}

// ── Crossings ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Above,
    Below,
}

/// Count transitions between the bands above and below the window midpoint.
/// Samples within `deadband` of the midpoint keep the previous band, so
/// jitter around the center never counts while a slow sweep still does.
pub fn count_crossings(xs: &[f32], deadband: f32) -> u32 {
    if xs.len() < MIN_CROSSING_SAMPLES {
        return 0;
    }
    let (lo, hi) = min_max(xs);
    let mid = (lo + hi) * 0.5;

    let mut band: Option<Band> = None;
    let mut crossings = 0;
    for &x in xs {
        let next = if x > mid + deadband {
            Some(Band::Above)
        } else if x < mid - deadband {
            Some(Band::Below)
        } else {
            band
        };
        if let (Some(prev), Some(cur)) = (band, next) {
            if prev != cur {
                crossings += 1;
            }
        }
        band = next;
    }
    crossings
}

fn min_max(xs: &[f32]) -> (f32, f32) {
    xs.iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        })
}

// ── Tracker ────────────────────────────────────────────────

/// Stateful wave detector for one hand.
#[derive(Debug)]
pub struct WaveTracker {
    config: WaveConfig,
    /// Smoothed x positions, oldest first.  At most `window` entries.
    positions: VecDeque<f32>,
    /// Open-hand flags aligned with `positions`.
    open_flags: VecDeque<bool>,
    smoothed: Option<f32>,
    /// Updates before this timestamp (seconds) are ignored.
    cooldown_until: Option<f64>,
    last_timestamp: Option<f64>,
}

impl WaveTracker {
    pub fn new(config: WaveConfig) -> Self {
        let window = config.window.max(1);
        Self {
            config,
            positions: VecDeque::with_capacity(window),
            open_flags: VecDeque::with_capacity(window),
            smoothed: None,
            cooldown_until: None,
            last_timestamp: None,
        }
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Replace the configuration.  Buffered samples are kept, trimmed to
    /// the new window.
    pub fn set_config(&mut self, config: WaveConfig) {
        self.config = config;
        let window = self.window();
        while self.positions.len() > window {
            self.positions.pop_front();
            self.open_flags.pop_front();
        }
    }

    fn window(&self) -> usize {
        self.config.window.max(1)
    }

    /// Samples currently buffered.
    pub fn samples(&self) -> usize {
        self.positions.len()
    }

    /// Whether a fired wave is still suppressing updates at `timestamp_s`.
    pub fn cooling_down(&self, timestamp_s: f64) -> bool {
        self.cooldown_until
            .map(|until| timestamp_s < until)
            .unwrap_or(false)
    }

    /// Feed one sample.  `x` is the palm x position in normalized image
    /// coordinates, `palm_scale` the matching size reference.
    pub fn update(
        &mut self,
        x: f32,
        is_open: bool,
        palm_scale: f32,
        timestamp_s: f64,
    ) -> WaveDecision {
        if self.cooling_down(timestamp_s) {
            return WaveDecision::idle(WavePhase::CoolingDown);
        }
        if let Some(last) = self.last_timestamp {
            if timestamp_s < last {
                debug!(
                    "Wave sample out of order: {:.3}s after {:.3}s, dropped",
                    timestamp_s, last
                );
                return WaveDecision::idle(WavePhase::OutOfOrder);
            }
        }
        self.last_timestamp = Some(timestamp_s);

        let k = self.config.smoothing.clamp(MIN_SMOOTHING, 1.0);
        let smoothed = match self.smoothed {
            Some(prev) => (1.0 - k) * prev + k * x,
            None => x,
        };
        self.smoothed = Some(smoothed);

        let window = self.window();
        while self.positions.len() >= window {
            self.positions.pop_front();
            self.open_flags.pop_front();
        }
        self.positions.push_back(smoothed);
        self.open_flags.push_back(is_open);

        if self.positions.len() < window {
            return WaveDecision::idle(WavePhase::Filling);
        }

        let stats = self.evaluate(palm_scale);
        let rule = ACCEPT_RULES
            .iter()
            .copied()
            .find(|r| r.holds(&stats, &self.config));

        if let Some(rule) = rule {
            self.positions.clear();
            self.open_flags.clear();
            self.cooldown_until = Some(timestamp_s + self.config.cooldown_s);
            debug!(
                "Wave fired ({}): amp={:.3} crossings={} open={:.2} conf={:.2}",
                rule.as_str(),
                stats.amplitude,
                stats.crossings,
                stats.open_ratio,
                stats.confidence,
            );
        }

        WaveDecision {
            fired: rule.is_some(),
            rule,
            phase: WavePhase::Evaluated,
            stats,
        }
    }

    fn evaluate(&self, palm_scale: f32) -> WaveStats {
        let ps = floor_palm_scale(palm_scale, MIN_PALM_SCALE, FALLBACK_PALM_SCALE);
        let xs: Vec<f32> = self.positions.iter().copied().collect();

        let (lo, hi) = min_max(&xs);
        let amplitude = (hi - lo) / ps;

        let deadband = self.config.min_displacement * ps * self.config.deadband_factor;
        let crossings = count_crossings(&xs, deadband);

        let open = self.open_flags.iter().filter(|o| **o).count();
        let open_ratio = open as f32 / self.open_flags.len() as f32;

        let saturation = (self.config.amplitude_threshold * 1.5).max(1e-6);
        let confidence = clamp01(0.55 + 0.45 * (amplitude / saturation).min(1.0));

        WaveStats {
            amplitude,
            crossings,
            open_ratio,
            confidence,
        }
    }

    /// Drop all samples, smoothing history and cooldown.
    pub fn reset(&mut self) {
        self.positions.clear();
        self.open_flags.clear();
        self.smoothed = None;
        self.cooldown_until = None;
        self.last_timestamp = None;
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Unsmoothed config with round numbers so thresholds can be hit exactly.
    fn exact_config() -> WaveConfig {
        WaveConfig {
            window: 12,
            amplitude_threshold: 0.25,
            crossing_threshold: 2,
            open_ratio: 0.5,
            smoothing: 1.0,
            ..WaveConfig::default()
        }
    }

    fn feed(tracker: &mut WaveTracker, xs: &[f32], open: &[bool], t0: f64) -> Vec<WaveDecision> {
        xs.iter()
            .zip(open)
            .enumerate()
            .map(|(i, (&x, &o))| tracker.update(x, o, 1.0, t0 + i as f64 / 30.0))
            .collect()
    }

    #[test]
    fn test_no_fire_before_window_full() {
        let mut tracker = WaveTracker::new(exact_config());
        // Huge oscillation, always open: would fire instantly if allowed.
        for i in 0..11 {
            let x = if i % 2 == 0 { 0.0 } else { 1.0 };
            let d = tracker.update(x, true, 1.0, i as f64 * 0.033);
            assert!(!d.fired, "fired at sample {}", i);
            assert_eq!(d.phase, WavePhase::Filling);
            assert_eq!(d.stats, WaveStats::default());
        }
        assert_eq!(tracker.samples(), 11);
        let d = tracker.update(1.0, true, 1.0, 11.0 * 0.033);
        assert!(d.fired);
    }

    #[test]
    fn test_no_fire_before_window_full_default_config() {
        let mut tracker = WaveTracker::new(WaveConfig::default());
        for i in 0..11 {
            let x = (i as f32 * 1.7).sin();
            let d = tracker.update(x, true, 0.2, i as f64 / 30.0);
            assert!(!d.fired);
            assert_eq!(d.phase, WavePhase::Filling);
        }
    }

    #[test]
    fn test_strict_path_at_exact_thresholds() {
        let mut tracker = WaveTracker::new(exact_config());
        let xs: Vec<f32> = (0..12).map(|i| if i % 2 == 0 { 0.25 } else { 0.5 }).collect();
        // Exactly half the samples open.
        let open: Vec<bool> = (0..12).map(|i| i % 2 == 0).collect();

        let decisions = feed(&mut tracker, &xs, &open, 0.0);
        let last = decisions.last().unwrap();
        assert!(last.fired, "{:?}", last);
        assert_eq!(last.rule, Some(AcceptRule::Strict));
        assert_eq!(last.stats.amplitude, 0.25);
        assert_eq!(last.stats.crossings, 11);
        assert_eq!(last.stats.open_ratio, 0.5);
        // 0.55 + 0.45 * (0.25 / 0.375)
        assert!((last.stats.confidence - 0.85).abs() < 1e-5);
        assert!(decisions[..11].iter().all(|d| !d.fired));
    }

    #[test]
    fn test_fallback_path_single_crossing() {
        let mut tracker = WaveTracker::new(exact_config());
        // One sweep: 6 samples low, 6 high.  Amplitude 0.4375 = 1.75x threshold.
        let xs: Vec<f32> = (0..12).map(|i| if i < 6 { 0.0625 } else { 0.5 }).collect();
        let open = vec![true; 12];

        let last = *feed(&mut tracker, &xs, &open, 0.0).last().unwrap();
        assert_eq!(last.stats.crossings, 1);
        assert_eq!(last.stats.amplitude, 0.4375);
        // 0.6 * 1.75 + 0.4 * 0.5 = 1.25
        assert!((combined_score(&last.stats, tracker.config()) - 1.25).abs() < 1e-5);
        assert!(last.fired);
        assert_eq!(last.rule, Some(AcceptRule::Fallback));
    }

    #[test]
    fn test_single_crossing_at_moderate_amplitude_rejected() {
        let mut tracker = WaveTracker::new(exact_config());
        // Amplitude 0.3125 = 1.25x threshold: 0.6 * 1.25 + 0.4 * 0.5 = 0.95.
        let xs: Vec<f32> = (0..12).map(|i| if i < 6 { 0.0625 } else { 0.375 }).collect();
        let open = vec![true; 12];

        let last = *feed(&mut tracker, &xs, &open, 0.0).last().unwrap();
        assert_eq!(last.phase, WavePhase::Evaluated);
        assert_eq!(last.stats.crossings, 1);
        assert!(!last.fired);
        assert_eq!(last.rule, None);
        // Diagnostics still reported for the HUD.
        assert!(last.stats.amplitude > 0.0);
        assert!(last.stats.confidence >= 0.55);
    }

    #[test]
    fn test_open_ratio_gates_both_paths() {
        let mut tracker = WaveTracker::new(exact_config());
        let xs: Vec<f32> = (0..12).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        // 5 of 12 open: just under 0.5.
        let open: Vec<bool> = (0..12).map(|i| i < 5).collect();

        let last = *feed(&mut tracker, &xs, &open, 0.0).last().unwrap();
        assert!(!last.fired);
        assert_eq!(last.phase, WavePhase::Evaluated);
        assert!(last.stats.open_ratio < tracker.config().open_ratio);
        // Motion alone clears both paths: 4x amplitude, 11 crossings.
        assert!((last.stats.amplitude - 1.0).abs() < 1e-6);
        assert_eq!(last.stats.crossings, 11);
        assert!(combined_score(&last.stats, tracker.config()) >= tracker.config().fallback_score);
    }

    #[test]
    fn test_fire_clears_buffers_and_starts_cooldown() {
        let mut tracker = WaveTracker::new(exact_config());
        let xs: Vec<f32> = (0..12).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        let open = vec![true; 12];
        let decisions = feed(&mut tracker, &xs, &open, 10.0);
        assert!(decisions.last().unwrap().fired);
        assert_eq!(tracker.samples(), 0);

        let fire_t = 10.0 + 11.0 / 30.0;
        assert!(tracker.cooling_down(fire_t + 0.5));
        let d = tracker.update(0.0, true, 1.0, fire_t + 0.5);
        assert_eq!(d.phase, WavePhase::CoolingDown);
        assert_eq!(d.stats, WaveStats::default());
        assert_eq!(tracker.samples(), 0, "cooldown samples must not be ingested");

        assert!(!tracker.cooling_down(fire_t + 1.0));
        let d = tracker.update(0.0, true, 1.0, fire_t + 1.0);
        assert_eq!(d.phase, WavePhase::Filling);
        assert_eq!(tracker.samples(), 1);
    }

    #[test]
    fn test_never_fires_twice_within_cooldown() {
        let config = WaveConfig::default();
        let cooldown = config.cooldown_s;
        let mut tracker = WaveTracker::new(config);

        // 1.5 Hz oscillation, 0.1 peak, 30 fps, 6 seconds, palm scale 0.2.
        let mut fires = Vec::new();
        for i in 0..180 {
            let t = i as f64 / 30.0;
            let x = 0.5 + 0.1 * (2.0 * std::f64::consts::PI * 1.5 * t).sin() as f32;
            let d = tracker.update(x, true, 0.2, t);
            if d.fired {
                fires.push(t);
            }
        }

        assert!(fires.len() >= 2, "expected repeated waves, got {:?}", fires);
        for pair in fires.windows(2) {
            assert!(
                pair[1] - pair[0] >= cooldown,
                "fired at {:.3} and {:.3}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_still_hand_never_fires() {
        let mut tracker = WaveTracker::new(WaveConfig::default());
        for i in 0..120 {
            // Sub-deadband jitter.
            let x = 0.5 + if i % 2 == 0 { 0.001 } else { -0.001 };
            let d = tracker.update(x, true, 0.2, i as f64 / 30.0);
            assert!(!d.fired, "fired on jitter at sample {}", i);
        }
    }

    #[test]
    fn test_out_of_order_sample_dropped() {
        let mut tracker = WaveTracker::new(exact_config());
        tracker.update(0.1, true, 1.0, 2.0);
        let d = tracker.update(0.9, true, 1.0, 1.0);
        assert_eq!(d.phase, WavePhase::OutOfOrder);
        assert_eq!(tracker.samples(), 1);
        // Equal timestamps are accepted.
        let d = tracker.update(0.9, true, 1.0, 2.0);
        assert_eq!(d.phase, WavePhase::Filling);
        assert_eq!(tracker.samples(), 2);
    }

    #[test]
    fn test_smoothing_seeds_then_blends() {
        let mut tracker = WaveTracker::new(WaveConfig {
            window: 3,
            smoothing: 0.25,
            ..WaveConfig::default()
        });
        tracker.update(1.0, true, 1.0, 0.0);
        tracker.update(0.0, true, 1.0, 0.1);
        let xs: Vec<f32> = tracker.positions.iter().copied().collect();
        assert_eq!(xs, vec![1.0, 0.75]);
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut tracker = WaveTracker::new(WaveConfig {
            window: 4,
            smoothing: 1.0,
            open_ratio: 1.1, // never fire
            ..WaveConfig::default()
        });
        for i in 0..10 {
            tracker.update(i as f32, false, 1.0, i as f64);
        }
        let xs: Vec<f32> = tracker.positions.iter().copied().collect();
        assert_eq!(xs, vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(tracker.open_flags.len(), 4);
    }

    #[test]
    fn test_degenerate_palm_scale_uses_fallback() {
        let mut a = WaveTracker::new(exact_config());
        let mut b = WaveTracker::new(exact_config());
        let xs: Vec<f32> = (0..12).map(|i| if i % 2 == 0 { 0.45 } else { 0.5 }).collect();
        let mut last_a = None;
        let mut last_b = None;
        for (i, &x) in xs.iter().enumerate() {
            last_a = Some(a.update(x, true, 0.0, i as f64));
            last_b = Some(b.update(x, true, FALLBACK_PALM_SCALE, i as f64));
        }
        assert_eq!(last_a.unwrap().stats, last_b.unwrap().stats);
        assert!(last_a.unwrap().stats.amplitude.is_finite());
    }

    #[test]
    fn test_confidence_floor_and_saturation() {
        let mut tracker = WaveTracker::new(exact_config());
        let flat = vec![0.5; 12];
        let last = *feed(&mut tracker, &flat, &[false; 12], 0.0).last().unwrap();
        assert_eq!(last.stats.amplitude, 0.0);
        assert!((last.stats.confidence - 0.55).abs() < 1e-6);

        let mut tracker = WaveTracker::new(exact_config());
        let wide: Vec<f32> = (0..12).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        let last = *feed(&mut tracker, &wide, &[true; 12], 0.0).last().unwrap();
        assert!((last.stats.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut tracker = WaveTracker::new(exact_config());
        let xs: Vec<f32> = (0..12).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        feed(&mut tracker, &xs, &[true; 12], 0.0);
        assert!(tracker.cooling_down(0.5));
        tracker.reset();
        assert!(!tracker.cooling_down(0.5));
        assert_eq!(tracker.samples(), 0);
    }

    #[test]
    fn test_set_config_trims_window() {
        let mut tracker = WaveTracker::new(WaveConfig {
            open_ratio: 1.1,
            ..exact_config()
        });
        for i in 0..8 {
            tracker.update(i as f32, false, 1.0, i as f64);
        }
        let smaller = WaveConfig {
            window: 5,
            ..tracker.config().clone()
        };
        tracker.set_config(smaller);
        assert_eq!(tracker.samples(), 5);
    }

    // ── Crossings ──

    #[test]
    fn test_crossings_short_window() {
        assert_eq!(count_crossings(&[], 0.0), 0);
        assert_eq!(count_crossings(&[0.0, 1.0, 0.0], 0.0), 0);
    }

    #[test]
    fn test_crossings_alternating() {
        let xs = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        assert_eq!(count_crossings(&xs, 0.1), 5);
    }

    #[test]
    fn test_crossings_ignore_deadband_jitter() {
        // Excursions of 0.05 around the 0.5 midpoint, deadband 0.1.
        let xs = [0.0, 0.45, 0.55, 0.45, 0.55, 1.0];
        assert_eq!(count_crossings(&xs, 0.1), 1);
    }

    #[test]
    fn test_crossings_slow_sweep_counts() {
        // Slow go-and-return: many small steps, two macro crossings.
        let mut xs: Vec<f32> = (0..=10).map(|i| i as f32 * 0.1).collect();
        xs.extend((0..10).rev().map(|i| i as f32 * 0.1));
        xs.extend((1..=10).map(|i| i as f32 * 0.1));
        assert_eq!(count_crossings(&xs, 0.05), 3);
    }

    // ── Accept rules ──

    #[test]
    fn test_accept_rules_order() {
        assert_eq!(ACCEPT_RULES, [AcceptRule::Strict, AcceptRule::Fallback]);
        assert_eq!(AcceptRule::Strict.as_str(), "strict");
        assert_eq!(AcceptRule::Fallback.as_str(), "fallback");
    }

    #[test]
    fn test_accept_rules_in_isolation() {
        let config = WaveConfig::default();
        let strict = WaveStats {
            amplitude: 0.18,
            crossings: 2,
            open_ratio: 0.55,
            confidence: 0.85,
        };
        assert!(AcceptRule::Strict.holds(&strict, &config));

        let big_no_crossings = WaveStats {
            amplitude: 0.40,
            crossings: 0,
            ..strict
        };
        assert!(!AcceptRule::Strict.holds(&big_no_crossings, &config));
        // 0.6 * 2.22 = 1.33
        assert!(AcceptRule::Fallback.holds(&big_no_crossings, &config));

        let closed = WaveStats {
            open_ratio: 0.5,
            ..big_no_crossings
        };
        assert!(!AcceptRule::Fallback.holds(&closed, &config));
    }

    #[test]
    fn test_combined_score_caps_crossings() {
        let config = WaveConfig::default();
        let jittery = WaveStats {
            amplitude: 0.0,
            crossings: 50,
            open_ratio: 1.0,
            confidence: 0.55,
        };
        // 0.4 * 3.0 = 1.2: crossings alone can just reach the fallback bar.
        assert!((combined_score(&jittery, &config) - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_permissive_zero_crossing_threshold() {
        let config = WaveConfig::permissive();
        assert_eq!(config.crossing_threshold, 0);
        let stats = WaveStats {
            amplitude: 0.012,
            crossings: 0,
            open_ratio: 0.2,
            confidence: 0.55,
        };
        assert!(AcceptRule::Strict.holds(&stats, &config));
        assert!(combined_score(&stats, &config).is_finite());
    }
}
