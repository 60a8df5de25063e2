//! TPINS - Terminal Map Pin Library
//!
//! A terminal-based manager for labeled, tagged, color-coded map pins, built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
