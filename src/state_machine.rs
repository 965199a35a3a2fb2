//! Per-user conversation state machine
//!
//! Pure transitions in the Elm style: the dispatcher feeds one event in,
//! gets the next state plus effects out, and performs the effects itself.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ConvContext, ConvState, ReplyLookup};
pub use transition::{transition, TransitionResult};
