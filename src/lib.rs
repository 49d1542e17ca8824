//! FIRE (Financial Independence, Retire Early) projection engine.
//!
//! `core` holds the pure calculators; `api` and `cli` are thin surfaces over
//! them.

pub mod api;
pub mod cli;
pub mod core;
