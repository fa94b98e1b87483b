//! Controller layer: UI events, session state transitions, and effect dispatch.

pub mod events;
pub mod orchestration;
pub mod session;
