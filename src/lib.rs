//! Anonymous internal messaging relay
//!
//! Users verify under a group, post categorized messages to an audience
//! without revealing who they are, and receive anonymous replies.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod directory;
pub mod filter;
pub mod router;
pub mod runtime;
pub mod state_machine;
pub mod telegram;
pub mod vocab;
