//! Gesture engine: hand gesture events from 2-D landmark frames.
//!
//! Classifies finger extension and static gestures per frame, tracks waves
//! across frames per hand, and arbitrates one display label per hand.  The
//! `ipc` module exposes the engine over a line-oriented s-expression stream.

pub mod gesture;
pub mod ipc;
pub mod state;
