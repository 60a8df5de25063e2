//! Application layer managing session state and user workflows.
//!
//! This module coordinates between the domain layer and presentation layer,
//! managing the in-session pin store, user interactions, and the mode machine
//! driving the UI.

pub mod state;

pub use state::*;
