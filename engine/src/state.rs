//! Engine state: the single struct the dispatcher mutates.
//!
//! Owns the gesture detector plus the boundary settings that sit outside
//! the detector (pixel frame size for label anchors) and a few counters
//! reported by `gesture-status`.

use tracing::info;

use crate::gesture::{FrameResult, GestureConfig, GestureDetector};

pub struct EngineState {
    pub detector: GestureDetector,
    /// Camera frame size in pixels.  When set, labels carry a pixel anchor.
    pub frame_size: Option<(u32, u32)>,
    /// Frame messages classified.
    pub frames_in: u64,
    /// Messages rejected as malformed.
    pub errors: u64,
    /// Most recent classified frame.
    pub last_frame: Option<FrameResult>,
}

impl EngineState {
    pub fn new(config: GestureConfig, frame_size: Option<(u32, u32)>) -> Self {
        info!(
            "gesture engine ready: window={} hold={:.1}s frame={:?}",
            config.wave.window, config.display_hold_s, frame_size
        );
        Self {
            detector: GestureDetector::new(config),
            frame_size,
            frames_in: 0,
            errors: 0,
            last_frame: None,
        }
    }

    /// Forget all per-hand history.  Configuration is kept.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.last_frame = None;
        info!("gesture state reset");
    }
}
