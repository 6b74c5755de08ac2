//! World authority for Questgate.
//!
//! The world runs as a single Tokio task (actor model) that owns the
//! roster of connected players and the static world assets. It is the
//! single source of truth for "who is online"; other components observe
//! it through a [`WorldHandle`] and never touch the roster directly.
//!
//! # Key types
//!
//! - [`spawn_world`] — starts the actor
//! - [`WorldHandle`] — send commands to the running actor
//! - [`JoinOutcome`] / [`LeaveOutcome`] — what a roster change produced
//! - [`WorldAssets`] — map, NPCs and dropped items

mod assets;
mod error;
mod world;

pub use assets::WorldAssets;
pub use error::WorldError;
pub use world::{JoinOutcome, LeaveOutcome, WorldHandle, spawn_world};
