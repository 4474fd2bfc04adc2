//! Shared building blocks for the Clipgrab download client.
//!
//! Everything in this crate is synchronous and free of I/O: the transfer
//! state machine, response classification, and filename handling.

pub mod errors;
pub mod filename;
pub mod models;
pub mod protocol;
pub mod state;
pub mod view;
