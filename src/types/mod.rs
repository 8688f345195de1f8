//! Core message types.

pub mod message;

pub use message::*;
