//! Platform layer
//!
//! Turns wall-clock frames into fixed ticks and raw device events into
//! per-tick input. Nothing here touches the DOM, so both pieces run natively.

pub mod driver;
pub mod input;
pub mod visibility;

pub use driver::LoopDriver;
pub use input::{InputAdapter, InputEvent, Key, to_field};
pub use visibility::on_visibility_change;
