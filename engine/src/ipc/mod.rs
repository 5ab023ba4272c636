//! Line-oriented s-expression protocol: one message in, zero or more
//! event lines plus one response line out.

pub mod dispatch;

pub use dispatch::{format_event, handle_message};
